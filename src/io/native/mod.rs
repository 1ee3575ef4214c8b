//! Column-oriented "native" vectors: points as x/y/z/m columns, rectangles as bounds columns
//! and circles as center/radius columns.

mod circle;
mod rect;
mod xy;

pub use circle::CircleReader;
pub use rect::RectReader;
pub use xy::{XyColumns, XyReader, XyWriter};

use crate::coord::Coord;
use crate::datatypes::{Dimension, GeometryType};
use crate::error::{GeoStreamError, Result};
use crate::handler::{GeometryMeta, Handler, HandlerResult};
use crate::propagate;

/// Check that every column has the length of the first one.
fn check_lengths(columns: &[(&str, usize)]) -> Result<usize> {
    let Some((first_name, len)) = columns.first().copied() else {
        return Ok(0);
    };
    for (name, other) in columns {
        if *other != len {
            return Err(GeoStreamError::InvalidArgument(format!(
                "Column '{name}' has length {other} but '{first_name}' has length {len}"
            )));
        }
    }
    Ok(len)
}

/// Push an XY polygon with a single ring, or an empty polygon when `ring` is `None`.
fn push_polygon(handler: &mut dyn Handler, ring: Option<&[Coord]>) -> HandlerResult {
    let meta = GeometryMeta::new(
        GeometryType::Polygon,
        Dimension::XY,
        Some(usize::from(ring.is_some())),
    );
    propagate!(handler.geometry_start(&meta, None));
    if let Some(ring) = ring {
        let size = Some(ring.len());
        propagate!(handler.ring_start(&meta, size, 0));
        for (i, coord) in ring.iter().enumerate() {
            propagate!(handler.coord(&meta, coord, i));
        }
        propagate!(handler.ring_end(&meta, size, 0));
    }
    handler.geometry_end(&meta, None)
}
