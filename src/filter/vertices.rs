use serde::{Deserialize, Serialize};

use crate::coord::Coord;
use crate::datatypes::GeometryType;
use crate::driver::push_feature;
use crate::error::{GeoStreamError, Result};
use crate::handler::{Continuation, Finish, GeometryMeta, Handler, HandlerResult, VectorMeta};
use crate::propagate;

/// Where an extracted vertex came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexDetail {
    /// The input feature.
    pub feature: usize,
    /// The index of the point, linestring or polygon within the input feature, counting every
    /// non-collection geometry in traversal order.
    pub part: usize,
    /// The ring within its polygon, for polygon vertices.
    pub ring: Option<usize>,
}

/// The output of a [VerticesFilter]: the wrapped handler's output and, when requested, one
/// [VertexDetail] per output feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexReport<T> {
    pub output: T,
    pub details: Vec<VertexDetail>,
}

/// Explodes every coordinate into its own `POINT` feature.
///
/// The wrapped handler sees a vector of points, one feature per input coordinate, carrying the
/// SRID of the input feature. Null features and empty geometries produce no output.
#[derive(Debug, Clone)]
pub struct VerticesFilter<H> {
    inner: H,
    add_details: bool,
    details: Vec<VertexDetail>,
    feature: usize,
    parts: usize,
    part: usize,
    ring: Option<usize>,
    srid: Option<u32>,
    next_output: usize,
    /// The output feature being pushed, until the wrapped handler has seen all of it.
    pending: Option<usize>,
}

impl<H: Handler> VerticesFilter<H> {
    /// With `add_details`, the output records the feature, part and ring of every vertex.
    pub fn new(inner: H, add_details: bool) -> Self {
        Self {
            inner,
            add_details,
            details: vec![],
            feature: 0,
            parts: 0,
            part: 0,
            ring: None,
            srid: None,
            next_output: 0,
            pending: None,
        }
    }
}

impl<H: Handler> Handler for VerticesFilter<H> {
    fn vector_start(&mut self, meta: &VectorMeta) -> HandlerResult {
        self.details.clear();
        self.next_output = 0;
        self.pending = None;
        self.inner.vector_start(&VectorMeta::new(
            Some(GeometryType::Point),
            meta.dimension,
            None,
        ))
    }

    fn feature_start(&mut self, feat_id: usize) -> HandlerResult {
        self.feature = feat_id;
        self.parts = 0;
        self.ring = None;
        self.srid = None;
        Ok(Continuation::Continue)
    }

    fn geometry_start(&mut self, meta: &GeometryMeta, part_id: Option<usize>) -> HandlerResult {
        if part_id.is_none() {
            self.srid = meta.srid;
        }
        if !meta.geometry_type.is_collection() {
            self.part = self.parts;
            self.parts += 1;
        }
        Ok(Continuation::Continue)
    }

    fn ring_start(
        &mut self,
        _meta: &GeometryMeta,
        _size: Option<usize>,
        ring_id: usize,
    ) -> HandlerResult {
        self.ring = Some(ring_id);
        Ok(Continuation::Continue)
    }

    fn coord(&mut self, _meta: &GeometryMeta, coord: &Coord, _coord_id: usize) -> HandlerResult {
        let feat_id = self.next_output;
        self.next_output += 1;
        if self.add_details {
            self.details.push(VertexDetail {
                feature: self.feature,
                part: self.part,
                ring: self.ring,
            });
        }

        let point =
            GeometryMeta::new(GeometryType::Point, coord.dim(), Some(1)).with_srid(self.srid);
        self.pending = Some(feat_id);
        let result = push_feature(&mut self.inner, feat_id, |handler| {
            propagate!(handler.geometry_start(&point, None));
            propagate!(handler.coord(&point, coord, 0));
            handler.geometry_end(&point, None)
        })?;
        self.pending = None;

        match result {
            Some(Continuation::Abort) => Ok(Continuation::Abort),
            _ => Ok(Continuation::Continue),
        }
    }

    fn ring_end(
        &mut self,
        _meta: &GeometryMeta,
        _size: Option<usize>,
        _ring_id: usize,
    ) -> HandlerResult {
        self.ring = None;
        Ok(Continuation::Continue)
    }

    fn vector_end(&mut self, meta: &VectorMeta) -> Result<()> {
        self.inner.vector_end(&VectorMeta::new(
            Some(GeometryType::Point),
            meta.dimension,
            Some(self.next_output),
        ))
    }

    fn feature_abandoned(&mut self, _feat_id: usize) {
        if let Some(output) = self.pending.take() {
            self.inner.feature_abandoned(output);
        }
    }

    fn error(&mut self, feat_id: usize, err: &GeoStreamError) -> Continuation {
        self.inner.error(feat_id, err)
    }
}

impl<H: Finish> Finish for VerticesFilter<H> {
    type Output = VertexReport<H::Output>;

    fn finish(self) -> Result<Self::Output> {
        Ok(VertexReport {
            output: self.inner.finish()?,
            details: self.details,
        })
    }
}
