//! Read and write geometries encoded as ISO or extended (PostGIS) Well-Known Binary.

mod common;
mod reader;
mod writer;

pub use common::{DimensionEncoding, DimensionPrecedence, Endianness};
pub use reader::{WkbReader, WkbReaderOptions};
pub use writer::{WkbWriter, WkbWriterOptions};
