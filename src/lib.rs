pub mod error;
pub mod models;
pub mod normalize;
pub mod scrapers;
pub mod storage;

pub use error::{Result, ScoutError};
pub use scrapers::{BatchReport, ChromePageSource, ListingScraper, PageSource, ScoutConfig};
pub use storage::Storage;
