use crate::coord::Coord;
use crate::datatypes::GeometryType;
use crate::error::{GeoStreamError, Result};
use crate::handler::{Continuation, Finish, GeometryMeta, Handler, HandlerResult, VectorMeta};
use crate::io::geometry_vector::{Geometry, GeometryVector};

/// A geometry whose `geometry_end` has not been seen yet.
#[derive(Debug)]
struct Partial {
    meta: GeometryMeta,
    coords: Vec<Coord>,
    rings: Vec<Vec<Coord>>,
    parts: Vec<Geometry>,
}

impl Partial {
    fn new(meta: GeometryMeta) -> Self {
        Self {
            meta,
            coords: vec![],
            rings: vec![],
            parts: vec![],
        }
    }

    fn build(self) -> Result<Geometry> {
        let dimension = self.meta.dimension;
        Ok(match self.meta.geometry_type {
            GeometryType::Point => {
                if self.coords.len() > 1 {
                    return Err(GeoStreamError::Structural(format!(
                        "Point with {} coordinates",
                        self.coords.len()
                    )));
                }
                Geometry::Point {
                    dimension,
                    coord: self.coords.first().copied(),
                }
            }
            GeometryType::LineString => Geometry::LineString {
                dimension,
                coords: self.coords,
            },
            GeometryType::Polygon => Geometry::Polygon {
                dimension,
                rings: self.rings,
            },
            GeometryType::MultiPoint => Geometry::MultiPoint {
                dimension,
                parts: self.parts,
            },
            GeometryType::MultiLineString => Geometry::MultiLineString {
                dimension,
                parts: self.parts,
            },
            GeometryType::MultiPolygon => Geometry::MultiPolygon {
                dimension,
                parts: self.parts,
            },
            GeometryType::GeometryCollection => Geometry::GeometryCollection {
                dimension,
                parts: self.parts,
            },
        })
    }
}

/// Materializes a traversal as a [GeometryVector].
///
/// Polygon rings must be closed and the parts of multi geometries must have the matching
/// type; violations are [GeoStreamError::Structural] errors scoped to the feature. Features
/// with different SRIDs cannot share a vector.
#[derive(Debug, Default)]
pub struct GeometryVectorWriter {
    features: Vec<Option<Geometry>>,
    stack: Vec<Partial>,
    current: Option<Geometry>,
    srid: Option<u32>,
}

impl GeometryVectorWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_srid(&mut self, srid: Option<u32>) -> Result<()> {
        match (self.srid, srid) {
            (Some(a), Some(b)) if a != b => Err(GeoStreamError::Structural(format!(
                "SRID {b} differs from SRID {a} of earlier features"
            ))),
            (None, Some(b)) => {
                self.srid = Some(b);
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

impl Handler for GeometryVectorWriter {
    fn vector_start(&mut self, meta: &VectorMeta) -> HandlerResult {
        *self = Self::default();
        if let Some(size) = meta.size {
            self.features.try_reserve(size)?;
        }
        Ok(Continuation::Continue)
    }

    fn feature_start(&mut self, _feat_id: usize) -> HandlerResult {
        self.stack.clear();
        self.current = None;
        Ok(Continuation::Continue)
    }

    fn null_feature(&mut self, _feat_id: usize) -> HandlerResult {
        self.features.push(None);
        Ok(Continuation::Continue)
    }

    fn geometry_start(&mut self, meta: &GeometryMeta, part_id: Option<usize>) -> HandlerResult {
        if part_id.is_none() {
            self.check_srid(meta.srid)?;
        }

        if let Some(parent) = self.stack.last().map(|p| p.meta.geometry_type) {
            if parent
                .child_type()
                .is_some_and(|child| child != meta.geometry_type)
            {
                return Err(GeoStreamError::Structural(format!(
                    "{parent} can't contain {}",
                    meta.geometry_type
                )));
            }
        }

        let mut partial = Partial::new(*meta);
        if let Some(size) = meta.size {
            match meta.geometry_type {
                GeometryType::Point | GeometryType::LineString => {
                    partial.coords.try_reserve(size)?
                }
                GeometryType::Polygon => partial.rings.try_reserve(size)?,
                _ => partial.parts.try_reserve(size)?,
            }
        }
        self.stack.push(partial);
        Ok(Continuation::Continue)
    }

    fn ring_start(
        &mut self,
        _meta: &GeometryMeta,
        size: Option<usize>,
        _ring_id: usize,
    ) -> HandlerResult {
        if let Some(partial) = self.stack.last_mut() {
            partial.coords.clear();
            if let Some(size) = size {
                partial.coords.try_reserve(size)?;
            }
        }
        Ok(Continuation::Continue)
    }

    fn coord(&mut self, _meta: &GeometryMeta, coord: &Coord, _coord_id: usize) -> HandlerResult {
        if let Some(partial) = self.stack.last_mut() {
            partial.coords.push(*coord);
        }
        Ok(Continuation::Continue)
    }

    fn ring_end(
        &mut self,
        _meta: &GeometryMeta,
        _size: Option<usize>,
        ring_id: usize,
    ) -> HandlerResult {
        if let Some(partial) = self.stack.last_mut() {
            let ring = std::mem::take(&mut partial.coords);
            let closed = match (ring.first(), ring.last()) {
                (Some(first), Some(last)) => first.same_as(last),
                _ => false,
            };
            if !closed {
                return Err(GeoStreamError::Structural(format!(
                    "Ring {ring_id} is not closed"
                )));
            }
            partial.rings.push(ring);
        }
        Ok(Continuation::Continue)
    }

    fn geometry_end(&mut self, _meta: &GeometryMeta, _part_id: Option<usize>) -> HandlerResult {
        let Some(partial) = self.stack.pop() else {
            return Ok(Continuation::Continue);
        };
        let geometry = partial.build()?;
        match self.stack.last_mut() {
            Some(parent) => parent.parts.push(geometry),
            None => self.current = Some(geometry),
        }
        Ok(Continuation::Continue)
    }

    fn feature_end(&mut self, _feat_id: usize) -> HandlerResult {
        self.features.push(self.current.take());
        Ok(Continuation::Continue)
    }

    fn feature_abandoned(&mut self, feat_id: usize) {
        if self.features.len() <= feat_id {
            self.features.push(None);
        }
    }
}

impl Finish for GeometryVectorWriter {
    type Output = GeometryVector;

    fn finish(self) -> Result<GeometryVector> {
        let srid = self.srid;
        Ok(GeometryVector::new(self.features).with_srid(srid))
    }
}
