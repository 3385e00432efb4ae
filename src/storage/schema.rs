use crate::error::Result;
use rusqlite::Connection;
use tracing::debug;

/// Name of the join view the read API queries
pub const PROPERTY_LOCATION_VIEW: &str = "property_location_view";

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS locations (
        id             INTEGER PRIMARY KEY AUTOINCREMENT,
        street_address VARCHAR(255) NOT NULL,
        city           VARCHAR(100) NOT NULL,
        state          VARCHAR(50) NOT NULL,
        zip_code       VARCHAR(20) NOT NULL,
        country        VARCHAR(50) NOT NULL,
        latitude       DECIMAL(10, 8),
        longitude      DECIMAL(11, 8)
    );

    -- Shared with the API, nothing here writes to it
    CREATE TABLE IF NOT EXISTS images (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        image_url  VARCHAR(255) NOT NULL,
        is_primary BOOLEAN DEFAULT FALSE
    );

    CREATE TABLE IF NOT EXISTS properties (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        title         VARCHAR(255) NOT NULL,
        description   TEXT,
        price_minor   INTEGER NOT NULL,
        currency      VARCHAR(8) NOT NULL,
        square_meters INTEGER NOT NULL,
        bedrooms      INTEGER,
        bathrooms     INTEGER,
        property_type TEXT NOT NULL CHECK(property_type IN ('HOUSE','APARTMENT')),
        listing_type  TEXT NOT NULL CHECK(listing_type IN ('RENT','SALE')),
        detail_url    TEXT,
        location_id   INTEGER NOT NULL REFERENCES locations(id),
        image_id      INTEGER REFERENCES images(id),
        created_at    TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE INDEX IF NOT EXISTS idx_properties_location ON properties(location_id);

    CREATE VIEW IF NOT EXISTS property_location_view AS
    SELECT
        p.id AS property_id,
        p.title,
        p.description,
        p.price_minor / 100.0 AS price,
        p.price_minor,
        p.currency,
        p.square_meters,
        p.bedrooms,
        p.bathrooms,
        p.property_type,
        p.listing_type,
        p.detail_url,
        l.id AS location_id,
        l.street_address,
        l.city,
        l.state,
        l.zip_code,
        l.country,
        l.latitude,
        l.longitude
    FROM properties p
    JOIN locations l ON p.location_id = l.id;
";

/// Create tables, index and view when missing. Safe to run on every start.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    debug!("Schema verified");
    Ok(())
}
