use anyhow::Context;
use clap::Parser;
use listing_scout::scrapers::PropertyTypePolicy;
use listing_scout::{ChromePageSource, ListingScraper, ScoutConfig, Storage};
use std::collections::HashSet;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "listing-scout", about = "Scrape a property listing page into SQLite")]
struct Cli {
    /// Listing index page to scrape (defaults to Mendoza rentals)
    #[arg(long)]
    url: Option<String>,
    /// SQLite database file
    #[arg(long)]
    db: Option<String>,
    /// Country stored on every location
    #[arg(long)]
    country: Option<String>,
    /// Skip listings whose property type cannot be read from a URL
    #[arg(long)]
    strict_property_type: bool,
    /// Navigation timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Where to write the JSON batch report
    #[arg(long)]
    report: Option<String>,
    /// Show the browser window
    #[arg(long)]
    headful: bool,
}

impl Cli {
    fn into_config(self) -> ScoutConfig {
        let mut config = ScoutConfig::default();
        if let Some(url) = self.url {
            config.target_url = url;
        }
        if let Some(db) = self.db {
            config.database_path = db;
        }
        if let Some(country) = self.country {
            config.location.country = country;
        }
        if let Some(secs) = self.timeout_secs {
            config.navigation_timeout_secs = secs;
        }
        if let Some(report) = self.report {
            config.report_path = report;
        }
        if self.strict_property_type {
            config.property_type_policy = PropertyTypePolicy::Strict;
        }
        config.headless = !self.headful;
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Cli::parse().into_config();

    info!("🏠 Listing Scout");
    info!("Target: {}", config.target_url);

    let storage = Storage::open(&config.database_path)
        .with_context(|| format!("Failed to open database {}", config.database_path))?;

    let pages = ChromePageSource::launch(config.headless, config.navigation_timeout())?;
    let scraper = ListingScraper::new(&pages, &storage, &config);

    let report = match scraper.run().await {
        Ok(report) => report,
        Err(e) => {
            error!("Scrape aborted: {}", e);
            return Err(e.into());
        }
    };

    info!(
        "✅ {} listings: {} written, {} skipped",
        report.attempted,
        report.written_count(),
        report.skipped_count()
    );
    for skipped in &report.skipped {
        info!("   #{} {}: {}", skipped.index, skipped.address, skipped.reason);
    }

    let written: HashSet<i64> = report.written.iter().map(|w| w.ids.property_id).collect();
    let rows = storage.list_properties()?;
    for (i, row) in rows.iter().filter(|r| written.contains(&r.property_id)).enumerate() {
        println!("{}. {} ({})", i + 1, row.location.street_address, row.price);
        println!("   {}", row.title);
        println!(
            "   {} dorm, {} baños, {} m²",
            row.bedrooms, row.bathrooms, row.square_meters
        );
        if !row.detail_url.is_empty() {
            println!("   URL: {}", row.detail_url);
        }
        println!();
    }

    let json = serde_json::to_string_pretty(&report)?;
    tokio::fs::write(&config.report_path, json)
        .await
        .with_context(|| format!("Failed to write report {}", config.report_path))?;
    info!("💾 Saved batch report to {}", config.report_path);

    Ok(())
}
