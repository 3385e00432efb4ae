use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a listing is offered for rent or for sale
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ListingType {
    Rent,
    Sale,
}

impl ListingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingType::Rent => "RENT",
            ListingType::Sale => "SALE",
        }
    }
}

impl fmt::Display for ListingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structural category of a property
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum PropertyType {
    House,
    Apartment,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::House => "HOUSE",
            PropertyType::Apartment => "APARTMENT",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Currency a price was published in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Ars,
    Usd,
    Unknown,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Ars => "ARS",
            Currency::Usd => "USD",
            Currency::Unknown => "UNKNOWN",
        }
    }

    pub fn from_code(code: &str) -> Self {
        match code {
            "ARS" => Currency::Ars,
            "USD" => Currency::Usd,
            _ => Currency::Unknown,
        }
    }
}

/// Listing price, kept in minor units (cents) so nothing is lost on the way to storage
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Price {
    pub amount_minor: i64,
    pub currency: Currency,
}

impl Price {
    pub fn new(amount_minor: i64, currency: Currency) -> Self {
        Self {
            amount_minor,
            currency,
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}.{:02}",
            self.currency.as_str(),
            self.amount_minor / 100,
            (self.amount_minor % 100).abs()
        )
    }
}

/// One listing container as scraped from the index page, untouched text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawListing {
    pub price: String,
    pub detail_url: String,
    pub bedrooms: String,
    pub bathrooms: String,
    pub area: String,
    pub address: String,
    pub listing_type: ListingType,
}

/// A listing after field normalization, ready to be persisted
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedProperty {
    pub price: Price,
    /// Total surface in square meters
    pub area: u32,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub property_type: PropertyType,
    pub listing_type: ListingType,
    pub address: String,
    pub detail_url: String,
}

impl NormalizedProperty {
    /// Synthesized title, e.g. "HOUSE for SALE"
    pub fn title(&self) -> String {
        format!("{} for {}", self.property_type, self.listing_type)
    }
}

/// Location information for a property
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// A row of `property_location_view`: a property with its location inlined
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropertyRow {
    pub property_id: i64,
    pub title: String,
    pub description: String,
    pub price: Price,
    pub square_meters: u32,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub property_type: String,
    pub listing_type: String,
    pub detail_url: String,
    pub location_id: i64,
    pub location: Location,
}
