use crate::driver::{push_feature, FeatureSource};
use crate::error::{GeoStreamError, Result};
use crate::handler::{Continuation, GeometryMeta, Handler, HandlerResult, VectorMeta};
use crate::io::geometry_vector::{Geometry, GeometryVector};
use crate::propagate;

/// Replays a [GeometryVector]. Every header carries an exact size.
///
/// Geometries nested deeper than `max_depth` (default 128) are reported as
/// [GeoStreamError::DepthLimitExceeded], as the WKT and WKB readers do.
#[derive(Debug)]
pub struct GeometryVectorReader<'a> {
    vector: &'a GeometryVector,
    next: usize,
    max_depth: usize,
}

impl<'a> GeometryVectorReader<'a> {
    pub fn new(vector: &'a GeometryVector) -> Self {
        Self {
            vector,
            next: 0,
            max_depth: 128,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl FeatureSource for GeometryVectorReader<'_> {
    fn vector_meta(&self) -> VectorMeta {
        VectorMeta::new(
            self.vector.geometry_type,
            self.vector.dimension,
            Some(self.vector.len()),
        )
    }

    fn next_feature(
        &mut self,
        feat_id: usize,
        handler: &mut dyn Handler,
    ) -> Result<Option<Continuation>> {
        let Some(feature) = self.vector.features.get(self.next) else {
            return Ok(None);
        };
        self.next += 1;

        match feature {
            None => handler.null_feature(feat_id).map(Some),
            Some(geometry) => {
                let replay = Replay {
                    srid: self.vector.srid,
                    max_depth: self.max_depth,
                };
                push_feature(handler, feat_id, |handler| {
                    replay.push_geometry(handler, geometry, None, 0)
                })
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Replay {
    srid: Option<u32>,
    max_depth: usize,
}

impl Replay {
    fn push_geometry(
        &self,
        handler: &mut dyn Handler,
        geometry: &Geometry,
        part_id: Option<usize>,
        depth: usize,
    ) -> HandlerResult {
        if depth > self.max_depth {
            return Err(GeoStreamError::DepthLimitExceeded(self.max_depth));
        }

        // Only the outermost geometry carries the SRID.
        let srid = if part_id.is_none() { self.srid } else { None };
        let meta = GeometryMeta::new(
            geometry.geometry_type(),
            geometry.dimension(),
            Some(geometry.size()),
        )
        .with_srid(srid);
        propagate!(handler.geometry_start(&meta, part_id));

        match geometry {
            Geometry::Point { coord, .. } => {
                if let Some(coord) = coord {
                    propagate!(handler.coord(&meta, coord, 0));
                }
            }
            Geometry::LineString { coords, .. } => {
                for (i, coord) in coords.iter().enumerate() {
                    propagate!(handler.coord(&meta, coord, i));
                }
            }
            Geometry::Polygon { rings, .. } => {
                for (ring_id, ring) in rings.iter().enumerate() {
                    let size = Some(ring.len());
                    propagate!(handler.ring_start(&meta, size, ring_id));
                    for (i, coord) in ring.iter().enumerate() {
                        propagate!(handler.coord(&meta, coord, i));
                    }
                    propagate!(handler.ring_end(&meta, size, ring_id));
                }
            }
            Geometry::MultiPoint { parts, .. }
            | Geometry::MultiLineString { parts, .. }
            | Geometry::MultiPolygon { parts, .. }
            | Geometry::GeometryCollection { parts, .. } => {
                for (i, part) in parts.iter().enumerate() {
                    propagate!(self.push_geometry(handler, part, Some(i), depth + 1));
                }
            }
        }

        handler.geometry_end(&meta, part_id)
    }
}
