use crate::error::{Result, ScoutError};
use crate::models::{ListingType, RawListing};
use crate::scrapers::types::ListingSelectors;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Compiled form of [`ListingSelectors`]
struct CompiledSelectors {
    container: Selector,
    price: Selector,
    detail_link: Selector,
    bedrooms: Selector,
    bathrooms: Selector,
    area: Selector,
    address: Selector,
}

impl CompiledSelectors {
    fn compile(selectors: &ListingSelectors) -> Result<Self> {
        Ok(Self {
            container: parse_selector(&selectors.container)?,
            price: parse_selector(&selectors.price)?,
            detail_link: parse_selector(&selectors.detail_link)?,
            bedrooms: parse_selector(&selectors.bedrooms)?,
            bathrooms: parse_selector(&selectors.bathrooms)?,
            area: parse_selector(&selectors.area)?,
            address: parse_selector(&selectors.address)?,
        })
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| ScoutError::Selector {
        selector: selector.to_string(),
        reason: format!("{:?}", e),
    })
}

/// Trimmed text of the first matching descendant, empty when there is none
fn first_text(element: &ElementRef, selector: &Selector) -> String {
    element
        .select(selector)
        .next()
        .map(|el| {
            el.text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}

fn first_attr(element: &ElementRef, selector: &Selector, attr: &str) -> String {
    element
        .select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|value| value.trim().to_string())
        .unwrap_or_default()
}

/// Collect one [`RawListing`] per listing container in the page HTML.
///
/// Extraction is best-effort per field: a missing element yields an empty
/// string and it is up to normalization to reject the record. Only an
/// invalid selector is an error.
pub fn extract_listings(
    html: &str,
    selectors: &ListingSelectors,
    listing_type: ListingType,
) -> Result<Vec<RawListing>> {
    let compiled = CompiledSelectors::compile(selectors)?;
    let document = Html::parse_document(html);

    let listings: Vec<RawListing> = document
        .select(&compiled.container)
        .map(|card| RawListing {
            price: first_text(&card, &compiled.price),
            detail_url: first_attr(&card, &compiled.detail_link, "href"),
            bedrooms: first_text(&card, &compiled.bedrooms),
            bathrooms: first_text(&card, &compiled.bathrooms),
            area: first_text(&card, &compiled.area),
            address: first_text(&card, &compiled.address),
            listing_type,
        })
        .collect();

    debug!(
        "Found {} '{}' containers in {} bytes of HTML",
        listings.len(),
        selectors.container,
        html.len()
    );

    Ok(listings)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <article class="item">
            <a itemprop="url" href="/casa-en-venta/chacras-de-coria/101"></a>
            <span class="price"> U$S 120.000 </span>
            <span class="label-dormitorio">3</span>
            <span class="label-banio">2</span>
            <span class="label-sup-total">150m2</span>
            <span itemprop="streetAddress">Calle   Falsa 123</span>
          </article>
          <article class="item">
            <a itemprop="url" href="/departamento-en-venta/centro/102"></a>
            <span class="price">$ 85.000.000</span>
            <span class="label-banio">1</span>
            <span class="label-sup-total">45 m2</span>
            <span itemprop="streetAddress">Av. San Martín 1200</span>
          </article>
          <div class="item">not a listing</div>
        </body></html>
    "#;

    #[test]
    fn test_extracts_one_record_per_container() {
        let listings =
            extract_listings(PAGE, &ListingSelectors::default(), ListingType::Sale).unwrap();
        assert_eq!(listings.len(), 2);

        let first = &listings[0];
        assert_eq!(first.price, "U$S 120.000");
        assert_eq!(first.detail_url, "/casa-en-venta/chacras-de-coria/101");
        assert_eq!(first.bedrooms, "3");
        assert_eq!(first.bathrooms, "2");
        assert_eq!(first.area, "150m2");
        assert_eq!(first.address, "Calle Falsa 123");
        assert_eq!(first.listing_type, ListingType::Sale);
    }

    #[test]
    fn test_missing_field_is_empty() {
        let listings =
            extract_listings(PAGE, &ListingSelectors::default(), ListingType::Sale).unwrap();
        assert_eq!(listings[1].bedrooms, "");
        assert_eq!(listings[1].address, "Av. San Martín 1200");
    }

    #[test]
    fn test_no_containers() {
        let listings = extract_listings(
            "<html><body><p>Sin resultados</p></body></html>",
            &ListingSelectors::default(),
            ListingType::Rent,
        )
        .unwrap();
        assert!(listings.is_empty());
    }

    #[test]
    fn test_invalid_selector() {
        let selectors = ListingSelectors {
            price: "span[".to_string(),
            ..ListingSelectors::default()
        };
        let err = extract_listings(PAGE, &selectors, ListingType::Sale).unwrap_err();
        assert!(matches!(err, ScoutError::Selector { .. }));
    }
}
