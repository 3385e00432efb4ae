use async_trait::async_trait;
use listing_scout::models::{Currency, ListingType, Price};
use listing_scout::{ListingScraper, PageSource, Result, ScoutConfig, Storage};
use std::sync::Mutex;
use std::time::Duration;

/// Serves fixed HTML and remembers what it was asked for
struct FixturePages {
    html: String,
    requests: Mutex<Vec<(String, Duration)>>,
}

impl FixturePages {
    fn new(html: &str) -> Self {
        Self {
            html: html.to_string(),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl PageSource for FixturePages {
    async fn load_page(&self, url: &str, timeout: Duration) -> Result<String> {
        self.requests.lock().unwrap().push((url.to_string(), timeout));
        Ok(self.html.clone())
    }

    fn source_name(&self) -> &'static str {
        "fixture"
    }
}

fn card(price: &str, bedrooms: Option<&str>, area: &str, address: &str, href: &str) -> String {
    let bedrooms = bedrooms
        .map(|b| format!(r#"<span class="label-dormitorio">{}</span>"#, b))
        .unwrap_or_default();
    format!(
        r#"<article class="item">
             <a itemprop="url" href="{href}">Ver</a>
             <div class="price">{price}</div>
             {bedrooms}
             <span class="label-banio">1</span>
             <span class="label-sup-total">{area}</span>
             <p itemprop="streetAddress">{address}</p>
           </article>"#
    )
}

fn page(cards: &[String]) -> String {
    format!("<html><body><section>{}</section></body></html>", cards.join("\n"))
}

#[tokio::test]
async fn house_for_sale_end_to_end() {
    let html = page(&[r#"<article class="item">
             <a itemprop="url" href="/propiedades/101">Ver</a>
             <div class="price">U$S 120.000</div>
             <span class="label-dormitorio">3</span>
             <span class="label-banio">2</span>
             <span class="label-sup-total">150m2</span>
             <p itemprop="streetAddress">Calle Falsa 123</p>
           </article>"#
        .to_string()]);
    let pages = FixturePages::new(&html);
    let storage = Storage::open_in_memory().unwrap();
    let config = ScoutConfig::default();
    let scraper = ListingScraper::new(&pages, &storage, &config);

    let report = scraper
        .scrape("https://inmoup.com.ar/casa-en-venta/godoy-cruz")
        .await
        .unwrap();

    assert_eq!(report.listing_type, ListingType::Sale);
    assert_eq!(report.attempted, 1);
    assert_eq!(report.written_count(), 1);
    assert_eq!(report.skipped_count(), 0);

    let rows = storage.list_properties().unwrap();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.property_type, "HOUSE");
    assert_eq!(row.listing_type, "SALE");
    assert_eq!(row.title, "HOUSE for SALE");
    assert_eq!(row.bedrooms, 3);
    assert_eq!(row.bathrooms, 2);
    assert_eq!(row.square_meters, 150);
    assert_eq!(row.price, Price::new(12_000_000, Currency::Usd));
    assert_eq!(row.location.street_address, "Calle Falsa 123");
    assert_eq!(row.location_id, report.written[0].ids.location_id);
}

#[tokio::test]
async fn malformed_listing_does_not_lose_the_batch() {
    let html = page(&[
        card("$ 300.000", Some("2"), "60 m2", "Colón 10", "/departamento/1"),
        card("$ 310.000", Some("1"), "45 m2", "Colón 20", "/departamento/2"),
        card("$ 320.000", None, "50 m2", "Colón 30", "/departamento/3"),
        card("$ 330.000", Some("3"), "90 m2", "Colón 40", "/casa/4"),
        card("$ 340.000", Some("0"), "30 m2", "Colón 50", "/departamento/5"),
    ]);
    let pages = FixturePages::new(&html);
    let storage = Storage::open_in_memory().unwrap();
    let config = ScoutConfig::default();
    let scraper = ListingScraper::new(&pages, &storage, &config);

    let report = scraper
        .scrape("https://inmoup.com.ar/departamentos-en-alquiler?limit=100")
        .await
        .unwrap();

    assert_eq!(report.listing_type, ListingType::Rent);
    assert_eq!(report.attempted, 5);
    assert_eq!(report.written_count(), 4);
    assert_eq!(report.skipped_count(), 1);
    assert_eq!(report.skipped[0].index, 2);
    assert_eq!(report.skipped[0].address, "Colón 30");

    let rows = storage.list_properties().unwrap();
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|r| r.listing_type == "RENT"));
    assert_eq!(rows[2].property_type, "HOUSE");
    assert_eq!(rows[3].bedrooms, 0);
}

#[tokio::test]
async fn navigation_uses_configured_timeout() {
    let pages = FixturePages::new(&page(&[]));
    let storage = Storage::open_in_memory().unwrap();
    let config = ScoutConfig::default();
    let scraper = ListingScraper::new(&pages, &storage, &config);

    let report = scraper.run().await.unwrap();
    assert_eq!(report.attempted, 0);

    let requests = pages.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, config.target_url);
    assert_eq!(requests[0].1, Duration::from_secs(60));
}

#[tokio::test]
async fn unclassifiable_url_never_loads_the_page() {
    let pages = FixturePages::new(&page(&[]));
    let storage = Storage::open_in_memory().unwrap();
    let config = ScoutConfig::default();
    let scraper = ListingScraper::new(&pages, &storage, &config);

    assert!(scraper.scrape("https://inmoup.com.ar/inmuebles").await.is_err());
    assert!(pages.requests.lock().unwrap().is_empty());
}
