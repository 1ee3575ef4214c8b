//! Readers and writers for the supported geometry encodings, plus conversions to and from the
//! [`geo`](::geo) crate.

pub mod geo;
pub mod geometry_vector;
pub mod native;
pub mod wkb;
pub mod wkt;
