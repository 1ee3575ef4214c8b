//! A streaming, event-driven codec for simple-feature geometries.
//!
//! Readers decode a vector of geometries (WKT strings, WKB buffers, native columns or owned
//! geometries) and push each one into a [`Handler`](handler::Handler) as a nested sequence of
//! calls. Writers, filters and summarizers are handlers, so any reader can be combined with any
//! writer without building an intermediate geometry.
//!
//! ```
//! use geostream::driver::Driver;
//! use geostream::io::wkb::{WkbWriter, WkbWriterOptions};
//! use geostream::io::wkt::WktReader;
//!
//! let wkt = [Some("POINT (1 2)"), None];
//! let wkb = Driver::new(WktReader::new(wkt))
//!     .run(WkbWriter::new(WkbWriterOptions::default()))
//!     .unwrap()
//!     .output;
//! assert_eq!(wkb[0].as_ref().map(Vec::len), Some(21));
//! assert_eq!(wkb[1], None);
//! ```

#![cfg_attr(not(test), deny(unused_crate_dependencies))]

pub mod coord;
pub mod datatypes;
pub mod driver;
pub mod error;
pub mod filter;
pub mod handler;
pub mod io;
#[cfg(test)]
pub(crate) mod test;
