use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Search page scraped when no URL is given: rentals around Mendoza
pub const DEFAULT_TARGET_URL: &str = "https://inmoup.com.ar/departamentos-en-alquiler?favoritos=0&limit=100&prevEstadoMap=&localidades=19%2C1%2C2%2C8&lastZoom=13&precio[min]=0&precio[max]=0&moneda=1&sup_cubierta[min]=&sup_cubierta[max]=&expensas[min]=&expensas[max]=";

/// CSS selectors locating each listing field on the index page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListingSelectors {
    /// Repeated element holding one listing
    pub container: String,
    pub price: String,
    /// Element whose `href` points at the detail page
    pub detail_link: String,
    pub bedrooms: String,
    pub bathrooms: String,
    pub area: String,
    pub address: String,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            container: "article.item".to_string(),
            price: ".price".to_string(),
            detail_link: "[itemprop='url']".to_string(),
            bedrooms: ".label-dormitorio".to_string(),
            bathrooms: ".label-banio".to_string(),
            area: ".label-sup-total".to_string(),
            address: "[itemprop='streetAddress']".to_string(),
        }
    }
}

/// URL substrings that encode listing and property type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UrlMarkers {
    pub rent: String,
    pub sale: String,
    pub house: String,
    pub apartment: String,
}

impl Default for UrlMarkers {
    fn default() -> Self {
        Self {
            rent: "alquiler".to_string(),
            sale: "venta".to_string(),
            house: "casa".to_string(),
            apartment: "departamento".to_string(),
        }
    }
}

/// What to do when no URL carries a property type marker
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PropertyTypePolicy {
    /// Treat the listing as an apartment
    #[default]
    FallbackApartment,
    /// Skip the record with a classification error
    Strict,
}

/// Values written to location columns the index page does not provide
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationDefaults {
    pub country: String,
    /// Stored as city, state and zip code
    pub placeholder: String,
}

impl Default for LocationDefaults {
    fn default() -> Self {
        Self {
            country: "Argentina".to_string(),
            placeholder: "Unknown".to_string(),
        }
    }
}

/// Settings for one scrape run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoutConfig {
    pub target_url: String,
    pub database_path: String,
    /// Where the batch report is written
    pub report_path: String,
    pub navigation_timeout_secs: u64,
    pub headless: bool,
    pub selectors: ListingSelectors,
    pub markers: UrlMarkers,
    pub property_type_policy: PropertyTypePolicy,
    pub location: LocationDefaults,
}

impl ScoutConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            target_url: DEFAULT_TARGET_URL.to_string(),
            database_path: "property_database.sqlite".to_string(),
            report_path: "scrape_report.json".to_string(),
            // Index pages with 100 results are slow to render
            navigation_timeout_secs: 60,
            headless: true,
            selectors: ListingSelectors::default(),
            markers: UrlMarkers::default(),
            property_type_policy: PropertyTypePolicy::default(),
            location: LocationDefaults::default(),
        }
    }
}
