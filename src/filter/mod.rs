//! Handlers that wrap another handler and rewrite, observe or police the events flowing into it.

mod debug;
mod identity;
mod problems;
mod vertex;
mod vertices;

pub use debug::DebugFilter;
pub use identity::IdentityFilter;
pub use problems::{Problem, ProblemReport, ProblemsHandler};
pub use vertex::VertexFilter;
pub use vertices::{VertexDetail, VertexReport, VerticesFilter};

/// Implement the named [Handler](crate::handler::Handler) methods by forwarding them to
/// `self.inner`.
macro_rules! forward_to_inner {
    (vector_start) => {
        fn vector_start(&mut self, meta: &$crate::handler::VectorMeta) -> $crate::handler::HandlerResult {
            self.inner.vector_start(meta)
        }
    };
    (feature_start) => {
        fn feature_start(&mut self, feat_id: usize) -> $crate::handler::HandlerResult {
            self.inner.feature_start(feat_id)
        }
    };
    (null_feature) => {
        fn null_feature(&mut self, feat_id: usize) -> $crate::handler::HandlerResult {
            self.inner.null_feature(feat_id)
        }
    };
    (geometry_start) => {
        fn geometry_start(
            &mut self,
            meta: &$crate::handler::GeometryMeta,
            part_id: Option<usize>,
        ) -> $crate::handler::HandlerResult {
            self.inner.geometry_start(meta, part_id)
        }
    };
    (ring_start) => {
        fn ring_start(
            &mut self,
            meta: &$crate::handler::GeometryMeta,
            size: Option<usize>,
            ring_id: usize,
        ) -> $crate::handler::HandlerResult {
            self.inner.ring_start(meta, size, ring_id)
        }
    };
    (coord) => {
        fn coord(
            &mut self,
            meta: &$crate::handler::GeometryMeta,
            coord: &$crate::coord::Coord,
            coord_id: usize,
        ) -> $crate::handler::HandlerResult {
            self.inner.coord(meta, coord, coord_id)
        }
    };
    (ring_end) => {
        fn ring_end(
            &mut self,
            meta: &$crate::handler::GeometryMeta,
            size: Option<usize>,
            ring_id: usize,
        ) -> $crate::handler::HandlerResult {
            self.inner.ring_end(meta, size, ring_id)
        }
    };
    (geometry_end) => {
        fn geometry_end(
            &mut self,
            meta: &$crate::handler::GeometryMeta,
            part_id: Option<usize>,
        ) -> $crate::handler::HandlerResult {
            self.inner.geometry_end(meta, part_id)
        }
    };
    (feature_end) => {
        fn feature_end(&mut self, feat_id: usize) -> $crate::handler::HandlerResult {
            self.inner.feature_end(feat_id)
        }
    };
    (vector_end) => {
        fn vector_end(&mut self, meta: &$crate::handler::VectorMeta) -> $crate::error::Result<()> {
            self.inner.vector_end(meta)
        }
    };
    (feature_abandoned) => {
        fn feature_abandoned(&mut self, feat_id: usize) {
            self.inner.feature_abandoned(feat_id)
        }
    };
    (error) => {
        fn error(
            &mut self,
            feat_id: usize,
            err: &$crate::error::GeoStreamError,
        ) -> $crate::handler::Continuation {
            self.inner.error(feat_id, err)
        }
    };
    ($($method:ident),+ $(,)?) => {
        $($crate::filter::forward_to_inner!($method);)+
    };
}

pub(crate) use forward_to_inner;
