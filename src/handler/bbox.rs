use serde::{Deserialize, Serialize};

use crate::coord::Coord;
use crate::error::Result;
use crate::handler::{Continuation, Finish, GeometryMeta, Handler, HandlerResult, VectorMeta};

/// A closed range of values. An empty interval has `min = +inf` and `max = -inf`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    pub fn empty() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// Extend to include `value`. NaN is ignored.
    fn add(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::empty()
    }
}

/// The per-dimension extent of a set of coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
    pub m: Interval,
}

impl BoundingBox {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether no coordinate contributed to this box.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty() && self.y.is_empty()
    }

    pub fn xmin(&self) -> f64 {
        self.x.min
    }

    pub fn ymin(&self) -> f64 {
        self.y.min
    }

    pub fn xmax(&self) -> f64 {
        self.x.max
    }

    pub fn ymax(&self) -> f64 {
        self.y.max
    }

    pub fn add_coord(&mut self, coord: &Coord) {
        self.x.add(coord.x());
        self.y.add(coord.y());
        if let Some(z) = coord.z() {
            self.z.add(z);
        }
        if let Some(m) = coord.m() {
            self.m.add(m);
        }
    }

    /// Convert to a [`geo::Rect`]. Returns `None` for an empty box.
    pub fn to_rect(&self) -> Option<geo::Rect> {
        if self.is_empty() {
            return None;
        }
        Some(geo::Rect::new(
            geo::coord! { x: self.x.min, y: self.y.min },
            geo::coord! { x: self.x.max, y: self.y.max },
        ))
    }
}

/// Accumulates the [BoundingBox] of every coordinate in a vector.
#[derive(Debug, Clone, Default)]
pub struct BoundingBoxHandler {
    bbox: BoundingBox,
}

impl BoundingBoxHandler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Handler for BoundingBoxHandler {
    fn vector_start(&mut self, _meta: &VectorMeta) -> HandlerResult {
        self.bbox = BoundingBox::empty();
        Ok(Continuation::Continue)
    }

    fn coord(&mut self, _meta: &GeometryMeta, coord: &Coord, _coord_id: usize) -> HandlerResult {
        self.bbox.add_coord(coord);
        Ok(Continuation::Continue)
    }
}

impl Finish for BoundingBoxHandler {
    type Output = BoundingBox;

    fn finish(self) -> Result<BoundingBox> {
        Ok(self.bbox)
    }
}
