//! Read and write geometries encoded as [Well-Known Text](https://libgeos.org/specifications/wkt/).

mod reader;
mod writer;

pub use reader::{WktReader, WktReaderOptions};
pub use writer::{WktWriter, WktWriterOptions};
