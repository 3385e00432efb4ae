use crate::error::Result;
use crate::models::{ListingType, RawListing};
use crate::normalize::{classify_listing_type, normalize};
use crate::scrapers::extract::extract_listings;
use crate::scrapers::traits::PageSource;
use crate::scrapers::types::ScoutConfig;
use crate::storage::{PropertyIds, Storage};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

/// A listing that made it into the database
#[derive(Debug, Clone, Serialize)]
pub struct WrittenRecord {
    /// Position of the container on the page
    pub index: usize,
    pub address: String,
    #[serde(flatten)]
    pub ids: PropertyIds,
}

/// A listing that was dropped, and why
#[derive(Debug, Clone, Serialize)]
pub struct SkippedRecord {
    pub index: usize,
    pub address: String,
    pub reason: String,
}

/// Outcome of one scrape run
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub target_url: String,
    pub listing_type: ListingType,
    pub attempted: usize,
    pub written: Vec<WrittenRecord>,
    pub skipped: Vec<SkippedRecord>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchReport {
    pub fn written_count(&self) -> usize {
        self.written.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Scrapes one listing index page into the database
pub struct ListingScraper<'a, P: PageSource> {
    pages: &'a P,
    storage: &'a Storage,
    config: &'a ScoutConfig,
}

impl<'a, P: PageSource> ListingScraper<'a, P> {
    pub fn new(pages: &'a P, storage: &'a Storage, config: &'a ScoutConfig) -> Self {
        Self {
            pages,
            storage,
            config,
        }
    }

    /// Scrape the configured target URL
    pub async fn run(&self) -> Result<BatchReport> {
        self.scrape(&self.config.target_url).await
    }

    /// Classify, load, extract and store every listing on `target_url`.
    ///
    /// Classification, navigation and selector errors abort the run.
    /// Anything wrong with a single listing only skips that listing.
    pub async fn scrape(&self, target_url: &str) -> Result<BatchReport> {
        let started_at = Utc::now();
        let listing_type = classify_listing_type(target_url, &self.config.markers)?;
        info!("Scraping {} listings from {}", listing_type, target_url);

        let html = self
            .pages
            .load_page(target_url, self.config.navigation_timeout())
            .await?;

        let raw = extract_listings(&html, &self.config.selectors, listing_type)?;
        info!(
            "Found {} listing containers via {}",
            raw.len(),
            self.pages.source_name()
        );

        let mut report = self.process_batch(target_url, listing_type, &raw);
        report.started_at = started_at;
        Ok(report)
    }

    /// Normalize and store each raw listing on its own. Never fails as a whole.
    pub fn process_batch(
        &self,
        target_url: &str,
        listing_type: ListingType,
        raw: &[RawListing],
    ) -> BatchReport {
        let started_at = Utc::now();
        let mut written = Vec::new();
        let mut skipped = Vec::new();

        for (index, listing) in raw.iter().enumerate() {
            match self.store_listing(target_url, listing) {
                Ok(ids) => {
                    debug!(
                        "Listing {} stored as property {}",
                        index, ids.property_id
                    );
                    written.push(WrittenRecord {
                        index,
                        address: listing.address.clone(),
                        ids,
                    });
                }
                Err(e) => {
                    warn!("Skipping listing {} ({:?}): {}", index, listing.address, e);
                    skipped.push(SkippedRecord {
                        index,
                        address: listing.address.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let report = BatchReport {
            target_url: target_url.to_string(),
            listing_type,
            attempted: raw.len(),
            written,
            skipped,
            started_at,
            finished_at: Utc::now(),
        };

        info!(
            "Batch done: {} attempted, {} written, {} skipped",
            report.attempted,
            report.written_count(),
            report.skipped_count()
        );

        report
    }

    fn store_listing(&self, target_url: &str, listing: &RawListing) -> Result<PropertyIds> {
        let property = normalize(listing, target_url, self.config)?;
        self.storage.write_property(&property, &self.config.location)
    }
}
