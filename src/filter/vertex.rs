use geo::AffineTransform;

use crate::coord::Coord;
use crate::error::{GeoStreamError, Result};
use crate::filter::forward_to_inner;
use crate::handler::{Finish, GeometryMeta, Handler, HandlerResult};

/// Rewrites every coordinate with a function before forwarding it.
///
/// The function must keep the dimension of the coordinate; changing it is a
/// [GeoStreamError::Structural] error.
pub struct VertexFilter<H, F> {
    inner: H,
    f: F,
}

impl<H, F> VertexFilter<H, F>
where
    H: Handler,
    F: FnMut(Coord) -> Coord,
{
    pub fn new(inner: H, f: F) -> Self {
        Self { inner, f }
    }
}

impl<H: Handler> VertexFilter<H, Box<dyn FnMut(Coord) -> Coord + Send>> {
    /// Apply an affine transform to x and y, leaving z and m untouched.
    pub fn affine(inner: H, transform: AffineTransform) -> Self {
        let f = move |mut coord: Coord| {
            let xy = transform.apply(geo::Coord::from(coord));
            let values = coord.as_mut_slice();
            values[0] = xy.x;
            values[1] = xy.y;
            coord
        };
        Self::new(inner, Box::new(f))
    }
}

impl<H, F> Handler for VertexFilter<H, F>
where
    H: Handler,
    F: FnMut(Coord) -> Coord,
{
    forward_to_inner!(
        vector_start,
        feature_start,
        null_feature,
        geometry_start,
        ring_start,
        ring_end,
        geometry_end,
        feature_end,
        vector_end,
        feature_abandoned,
        error,
    );

    fn coord(&mut self, meta: &GeometryMeta, coord: &Coord, coord_id: usize) -> HandlerResult {
        let transformed = (self.f)(*coord);
        if transformed.dim() != coord.dim() {
            return Err(GeoStreamError::Structural(format!(
                "Vertex function changed a {} coordinate to {}",
                coord.dim(),
                transformed.dim()
            )));
        }
        self.inner.coord(meta, &transformed, coord_id)
    }
}

impl<H, F> Finish for VertexFilter<H, F>
where
    H: Finish,
    F: FnMut(Coord) -> Coord,
{
    type Output = H::Output;

    fn finish(self) -> Result<H::Output> {
        self.inner.finish()
    }
}
