//! SQLite persistence for scraped listings.
//!
//! Every listing becomes one `locations` row and one `properties` row
//! written in a single transaction, so a property never exists without
//! its location and a failed property insert leaves no orphan location.

pub mod schema;

use crate::error::Result;
use crate::models::{Currency, Location, NormalizedProperty, Price, PropertyRow};
use crate::scrapers::types::LocationDefaults;
use rusqlite::{params, Connection, Row};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

pub use schema::{ensure_schema, PROPERTY_LOCATION_VIEW};

/// Identifiers generated for one written listing
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct PropertyIds {
    pub property_id: i64,
    pub location_id: i64,
}

/// Handle on the property database. Opened once at startup and passed to
/// whoever needs it.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Open (or create) the database file and make sure the schema exists
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        info!("Opened database {}", path.display());
        Self::with_connection(conn)
    }

    /// Private in-memory database, used by tests
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        ensure_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Underlying connection, for readers sharing the same store
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Persist one listing as a location plus a property referencing it
    pub fn write_property(
        &self,
        property: &NormalizedProperty,
        defaults: &LocationDefaults,
    ) -> Result<PropertyIds> {
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "INSERT INTO locations (street_address, city, state, zip_code, country)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                property.address,
                defaults.placeholder,
                defaults.placeholder,
                defaults.placeholder,
                defaults.country,
            ],
        )?;
        let location_id = tx.last_insert_rowid();

        tx.execute(
            "INSERT INTO properties
             (title, description, price_minor, currency, square_meters, bedrooms, bathrooms,
              property_type, listing_type, detail_url, location_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                property.title(),
                "",
                property.price.amount_minor,
                property.price.currency.as_str(),
                property.area,
                property.bedrooms,
                property.bathrooms,
                property.property_type.as_str(),
                property.listing_type.as_str(),
                property.detail_url,
                location_id,
            ],
        )?;
        let property_id = tx.last_insert_rowid();

        tx.commit()?;
        debug!(
            "Wrote property {} (location {}) for {}",
            property_id, location_id, property.address
        );

        Ok(PropertyIds {
            property_id,
            location_id,
        })
    }

    /// Every property joined with its location, as the read API sees them
    pub fn list_properties(&self) -> Result<Vec<PropertyRow>> {
        let sql = format!(
            "SELECT property_id, title, description, price_minor, currency, square_meters,
                    bedrooms, bathrooms, property_type, listing_type, detail_url,
                    location_id, street_address, city, state, zip_code, country,
                    latitude, longitude
             FROM {} ORDER BY property_id",
            PROPERTY_LOCATION_VIEW
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], property_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

fn property_row(row: &Row) -> rusqlite::Result<PropertyRow> {
    let currency: String = row.get(4)?;
    Ok(PropertyRow {
        property_id: row.get(0)?,
        title: row.get(1)?,
        description: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        price: Price::new(row.get(3)?, Currency::from_code(&currency)),
        square_meters: row.get(5)?,
        bedrooms: row.get(6)?,
        bathrooms: row.get(7)?,
        property_type: row.get(8)?,
        listing_type: row.get(9)?,
        detail_url: row.get::<_, Option<String>>(10)?.unwrap_or_default(),
        location_id: row.get(11)?,
        location: Location {
            street_address: row.get(12)?,
            city: row.get(13)?,
            state: row.get(14)?,
            zip_code: row.get(15)?,
            country: row.get(16)?,
            latitude: row.get(17)?,
            longitude: row.get(18)?,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ListingType, PropertyType};

    fn sample() -> NormalizedProperty {
        NormalizedProperty {
            price: Price::new(12_000_050, Currency::Usd),
            area: 150,
            bedrooms: 3,
            bathrooms: 2,
            property_type: PropertyType::House,
            listing_type: ListingType::Sale,
            address: "Calle Falsa 123".to_string(),
            detail_url: "/casa-en-venta/101".to_string(),
        }
    }

    fn count(storage: &Storage, table: &str) -> i64 {
        storage
            .connection()
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_round_trip_through_view() {
        let storage = Storage::open_in_memory().unwrap();
        let ids = storage
            .write_property(&sample(), &LocationDefaults::default())
            .unwrap();

        let rows = storage.list_properties().unwrap();
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.property_id, ids.property_id);
        assert_eq!(row.location_id, ids.location_id);
        assert_eq!(row.title, "HOUSE for SALE");
        assert_eq!(row.description, "");
        assert_eq!(row.price, Price::new(12_000_050, Currency::Usd));
        assert_eq!(row.square_meters, 150);
        assert_eq!(row.bedrooms, 3);
        assert_eq!(row.bathrooms, 2);
        assert_eq!(row.property_type, "HOUSE");
        assert_eq!(row.listing_type, "SALE");
        assert_eq!(row.detail_url, "/casa-en-venta/101");
        assert_eq!(row.location.street_address, "Calle Falsa 123");
        assert_eq!(row.location.city, "Unknown");
        assert_eq!(row.location.state, "Unknown");
        assert_eq!(row.location.zip_code, "Unknown");
        assert_eq!(row.location.country, "Argentina");
        assert_eq!(row.location.latitude, None);
    }

    #[test]
    fn test_price_stored_in_minor_units() {
        let storage = Storage::open_in_memory().unwrap();
        let mut property = sample();
        property.price = Price::new(12_345_678_901, Currency::Ars);
        storage.write_property(&property, &LocationDefaults::default()).unwrap();

        let (minor, decimal): (i64, f64) = storage
            .connection()
            .query_row(
                "SELECT price_minor, price FROM property_location_view",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(minor, 12_345_678_901);
        assert!((decimal - 123_456_789.01).abs() < 1e-6);

        let rows = storage.list_properties().unwrap();
        assert_eq!(rows[0].price, Price::new(12_345_678_901, Currency::Ars));
    }

    #[test]
    fn test_one_location_per_property() {
        let storage = Storage::open_in_memory().unwrap();
        let first = storage.write_property(&sample(), &LocationDefaults::default()).unwrap();
        let second = storage.write_property(&sample(), &LocationDefaults::default()).unwrap();

        assert_ne!(first.location_id, second.location_id);
        assert_eq!(count(&storage, "locations"), 2);
        assert_eq!(count(&storage, "properties"), 2);
    }

    #[test]
    fn test_configured_country() {
        let storage = Storage::open_in_memory().unwrap();
        let defaults = LocationDefaults {
            country: "Uruguay".to_string(),
            ..LocationDefaults::default()
        };
        storage.write_property(&sample(), &defaults).unwrap();

        let rows = storage.list_properties().unwrap();
        assert_eq!(rows[0].location.country, "Uruguay");
    }

    #[test]
    fn test_failed_property_insert_leaves_no_location() {
        let storage = Storage::open_in_memory().unwrap();
        storage
            .connection()
            .execute_batch(
                "CREATE TRIGGER reject_properties BEFORE INSERT ON properties
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .unwrap();

        let result = storage.write_property(&sample(), &LocationDefaults::default());
        assert!(matches!(result, Err(crate::error::ScoutError::Persistence(_))));
        assert_eq!(count(&storage, "locations"), 0);
        assert_eq!(count(&storage, "properties"), 0);
    }

    #[test]
    fn test_reopen_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("properties.sqlite");

        {
            let storage = Storage::open(&path).unwrap();
            storage.write_property(&sample(), &LocationDefaults::default()).unwrap();
        }

        let storage = Storage::open(&path).unwrap();
        assert_eq!(storage.list_properties().unwrap().len(), 1);
    }
}
