pub mod browser;
pub mod extract;
pub mod listing;
pub mod traits;
pub mod types;

pub use browser::ChromePageSource;
pub use extract::extract_listings;
pub use listing::{BatchReport, ListingScraper, SkippedRecord, WrittenRecord};
pub use traits::PageSource;
pub use types::{ListingSelectors, LocationDefaults, PropertyTypePolicy, ScoutConfig, UrlMarkers};
