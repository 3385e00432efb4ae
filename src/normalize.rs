//! Conversion of raw scraped text into typed listing values.
//!
//! Numbers on the target site follow the es-AR convention ("120.000" is one
//! hundred and twenty thousand, "85,5" is a decimal), but listings are
//! typed by hand and the convention is not always respected. Every numeric
//! field goes through [`parse_number`], which resolves separators the same
//! way for prices and surfaces.

use crate::error::{Result, ScoutError};
use crate::models::{Currency, ListingType, NormalizedProperty, Price, PropertyType, RawListing};
use crate::scrapers::types::{PropertyTypePolicy, ScoutConfig, UrlMarkers};
use regex::Regex;
use std::sync::LazyLock;

static NUMBER_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d.,]*").expect("valid number regex"));
static AREA_UNIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)m(?:ts?)?\.?(?:2|²)").expect("valid unit regex"));
static INTEGER_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid integer regex"));

/// Listing type encoded in the search URL. Never guesses.
pub fn classify_listing_type(url: &str, markers: &UrlMarkers) -> Result<ListingType> {
    let lower = url.to_lowercase();
    if lower.contains(&markers.rent.to_lowercase()) {
        Ok(ListingType::Rent)
    } else if lower.contains(&markers.sale.to_lowercase()) {
        Ok(ListingType::Sale)
    } else {
        Err(ScoutError::Classification {
            url: url.to_string(),
            reason: format!(
                "no '{}' or '{}' marker in URL",
                markers.rent, markers.sale
            ),
        })
    }
}

/// Property type encoded in a URL, `None` when no marker is present
pub fn classify_property_type(url: &str, markers: &UrlMarkers) -> Option<PropertyType> {
    let lower = url.to_lowercase();
    if lower.contains(&markers.house.to_lowercase()) {
        Some(PropertyType::House)
    } else if lower.contains(&markers.apartment.to_lowercase()) {
        Some(PropertyType::Apartment)
    } else {
        None
    }
}

/// Property type of one listing: its detail link first, then the search URL,
/// then whatever `policy` says.
pub fn resolve_property_type(
    detail_url: &str,
    target_url: &str,
    markers: &UrlMarkers,
    policy: PropertyTypePolicy,
) -> Result<PropertyType> {
    if let Some(kind) = classify_property_type(detail_url, markers)
        .or_else(|| classify_property_type(target_url, markers))
    {
        return Ok(kind);
    }

    match policy {
        PropertyTypePolicy::FallbackApartment => Ok(PropertyType::Apartment),
        PropertyTypePolicy::Strict => Err(ScoutError::Classification {
            url: detail_url.to_string(),
            reason: format!(
                "no '{}' or '{}' marker in detail link or search URL",
                markers.house, markers.apartment
            ),
        }),
    }
}

/// A number split into whole part and fraction digits
#[derive(Debug, Clone, PartialEq, Eq)]
struct ParsedNumber {
    whole: u64,
    fraction: String,
}

/// Resolve thousands and decimal separators in a numeric token.
///
/// With both `.` and `,` present the last one is the decimal separator.
/// With only one kind it groups thousands when every group after the
/// first has exactly three digits, otherwise it marks decimals.
fn parse_number(token: &str) -> Option<ParsedNumber> {
    let token = token.trim_end_matches(['.', ',']);
    let has_dot = token.contains('.');
    let has_comma = token.contains(',');

    let decimal_sep = match (has_dot, has_comma) {
        (true, true) => token.rfind(['.', ',']).and_then(|i| token[i..].chars().next()),
        (true, false) if !groups_thousands(token, '.') => Some('.'),
        (false, true) if !groups_thousands(token, ',') => Some(','),
        _ => None,
    };

    let (whole_part, fraction_part) = match decimal_sep {
        Some(sep) => token.rsplit_once(sep)?,
        None => (token, ""),
    };

    let whole_digits: String = whole_part.chars().filter(|c| c.is_ascii_digit()).collect();
    let whole = whole_digits.parse::<u64>().ok()?;
    let fraction = fraction_part.chars().filter(|c| c.is_ascii_digit()).collect();

    Some(ParsedNumber { whole, fraction })
}

fn groups_thousands(token: &str, sep: char) -> bool {
    let mut groups = token.split(sep);
    let head_ok = groups
        .next()
        .map(|head| (1..=3).contains(&head.len()))
        .unwrap_or(false);
    head_ok && groups.all(|group| group.len() == 3)
}

fn first_number(text: &str) -> Option<ParsedNumber> {
    NUMBER_TOKEN
        .find(text)
        .and_then(|m| parse_number(m.as_str()))
}

/// Surface in square meters. Unit tokens ("m2", "m²", "mts2") are removed
/// before looking for a number, trailing words are ignored and decimals
/// truncated.
pub fn parse_area(text: &str) -> Result<u32> {
    let without_units = AREA_UNIT.replace_all(text, " ");
    let number = first_number(&without_units).ok_or_else(|| ScoutError::field("area", text))?;
    u32::try_from(number.whole).map_err(|_| ScoutError::field("area", text))
}

/// Bedroom or bathroom count. An empty text is an error, never zero.
pub fn parse_count(field: &'static str, text: &str) -> Result<u32> {
    INTEGER_TOKEN
        .find(text.trim())
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .ok_or_else(|| ScoutError::field(field, text))
}

fn detect_currency(text: &str) -> Currency {
    let upper = text.to_uppercase();
    if ["U$S", "US$", "USD", "U$D"].iter().any(|m| upper.contains(m)) {
        Currency::Usd
    } else if upper.contains("ARS") || upper.contains('$') {
        Currency::Ars
    } else {
        Currency::Unknown
    }
}

/// Price with its currency. Keeps at most two decimals.
pub fn parse_price(text: &str) -> Result<Price> {
    let number = first_number(text).ok_or_else(|| ScoutError::field("price", text))?;

    let cents: String = number.fraction.chars().chain("00".chars()).take(2).collect();
    let cents: i64 = cents.parse().map_err(|_| ScoutError::field("price", text))?;
    let whole = i64::try_from(number.whole).map_err(|_| ScoutError::field("price", text))?;
    let amount_minor = whole
        .checked_mul(100)
        .and_then(|v| v.checked_add(cents))
        .ok_or_else(|| ScoutError::field("price", text))?;

    Ok(Price::new(amount_minor, detect_currency(text)))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Turn one raw listing into typed values. The first failing field wins.
pub fn normalize(
    raw: &RawListing,
    target_url: &str,
    config: &ScoutConfig,
) -> Result<NormalizedProperty> {
    let address = collapse_whitespace(&raw.address);
    if address.is_empty() {
        return Err(ScoutError::field("address", &raw.address));
    }

    Ok(NormalizedProperty {
        price: parse_price(&raw.price)?,
        area: parse_area(&raw.area)?,
        bedrooms: parse_count("bedrooms", &raw.bedrooms)?,
        bathrooms: parse_count("bathrooms", &raw.bathrooms)?,
        property_type: resolve_property_type(
            &raw.detail_url,
            target_url,
            &config.markers,
            config.property_type_policy,
        )?,
        listing_type: raw.listing_type,
        address,
        detail_url: raw.detail_url.clone(),
    })
}
