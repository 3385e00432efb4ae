use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Something that can render a page and hand back its DOM.
/// Headless Chrome in production, canned HTML in tests.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Navigate to `url` and return the serialized DOM once the page has loaded.
    /// Fails with `ScoutError::Navigation` when loading exceeds `timeout`.
    async fn load_page(&self, url: &str, timeout: Duration) -> Result<String>;

    /// Get the name of the page source
    fn source_name(&self) -> &'static str;
}
