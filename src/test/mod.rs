//! Shared fixtures for unit tests.

pub(crate) mod linestring;
pub(crate) mod polygon;

/// A vector covering every geometry type, every dimension, empties and nulls.
///
/// Every entry is in the canonical form written by the default WKT writer, and can be encoded
/// as WKB without loss.
pub(crate) fn wkt_fixtures() -> Vec<Option<&'static str>> {
    vec![
        Some("POINT (30 10)"),
        Some("POINT Z (1 2 3)"),
        Some("POINT M (1 2 4)"),
        Some("POINT ZM (1 2 3 4)"),
        Some("POINT EMPTY"),
        None,
        Some("LINESTRING (30 10, 10 30, 40 40)"),
        Some("LINESTRING Z (0 0 0, 1 1 1)"),
        Some("LINESTRING EMPTY"),
        Some("POLYGON ((30 10, 40 40, 20 40, 10 20, 30 10))"),
        Some("POLYGON ((35 10, 45 45, 15 40, 10 20, 35 10), (20 30, 35 35, 30 20, 20 30))"),
        Some("POLYGON EMPTY"),
        Some("MULTIPOINT ((10 40), (40 30), (20 20), (30 10))"),
        Some("MULTIPOINT (EMPTY, (1 2))"),
        Some("MULTILINESTRING ((10 10, 20 20, 10 40), (40 40, 30 30, 40 20, 30 10))"),
        Some("MULTIPOLYGON (((30 20, 45 40, 10 40, 30 20)), ((15 5, 40 10, 10 20, 5 10, 15 5)))"),
        Some("MULTIPOLYGON ZM (((0 0 1 2, 1 0 1 2, 1 1 1 2, 0 0 1 2)))"),
        Some("SRID=4326;GEOMETRYCOLLECTION (POINT (40 10), LINESTRING (10 10, 20 20, 10 40))"),
        Some("GEOMETRYCOLLECTION (GEOMETRYCOLLECTION (POINT (1 1)), MULTIPOINT EMPTY)"),
        Some("GEOMETRYCOLLECTION EMPTY"),
        Some("POINT (-0.5 1234567.125)"),
    ]
}
