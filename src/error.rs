//! Errors raised by the scraping pipeline.

use thiserror::Error;

/// Errors that can occur while scraping, normalizing or persisting listings.
#[derive(Debug, Error)]
pub enum ScoutError {
    /// URL carries no recognizable listing or property type marker
    #[error("cannot classify {url}: {reason}")]
    Classification { url: String, reason: String },

    /// Browser failed to load the page within its timeout
    #[error("navigation to {url} failed: {source}")]
    Navigation {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    /// A raw field could not be coerced into its typed value
    #[error("cannot parse {field} from {raw:?}")]
    FieldParse { field: &'static str, raw: String },

    /// Storage write or schema statement failed
    #[error("storage error: {0}")]
    Persistence(#[from] rusqlite::Error),

    /// Configured CSS selector is not valid
    #[error("invalid selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },
}

impl ScoutError {
    pub(crate) fn field(field: &'static str, raw: &str) -> Self {
        ScoutError::FieldParse {
            field,
            raw: raw.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScoutError>;
