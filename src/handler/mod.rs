//! The event protocol shared by every reader, writer and filter.
//!
//! A reader pushes a geometry vector into a [Handler] as a strictly nested sequence of calls:
//!
//! ```text
//! vector_start
//!   feature_start | null_feature
//!     geometry_start
//!       ring_start
//!         coord ...
//!       ring_end
//!       geometry_start (part_id = Some(0)) ... geometry_end
//!     geometry_end
//!   feature_end
//! vector_end
//! ```
//!
//! Every call returns a [Continuation]. When a call returns anything but
//! [Continuation::Continue], the caller stops the current scope without issuing the matching
//! `_end` calls. An `Err` is a reported error: the reader abandons the feature and the driver
//! asks the handler chain, through [Handler::error], what to do next.

mod bbox;
mod count;
mod meta;
mod void;

pub use bbox::{BoundingBox, BoundingBoxHandler, Interval};
pub use count::{CountHandler, Counts, FeatureCount};
pub use meta::{MetaHandler, VectorMetaHandler};
pub use void::VoidHandler;

use serde::{Deserialize, Serialize};

use crate::coord::Coord;
use crate::datatypes::{Dimension, GeometryType};
use crate::error::{GeoStreamError, Result};

/// The control signal returned by every handler call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Continuation {
    /// Keep going.
    Continue,
    /// Skip the remainder of the current feature and continue with the next one.
    AbortFeature,
    /// Stop the whole traversal.
    Abort,
}

/// The result of a handler call.
pub type HandlerResult = Result<Continuation>;

/// Evaluate a [HandlerResult], returning early from the enclosing function unless it is
/// `Ok(Continuation::Continue)`.
///
/// This is the `?` operator of the event protocol: errors propagate as errors and abort codes
/// propagate as return values.
#[macro_export]
macro_rules! propagate {
    ($call:expr) => {
        match $call? {
            $crate::handler::Continuation::Continue => {}
            other => return Ok(other),
        }
    };
}

/// Header information about one geometry or part of a geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeometryMeta {
    pub geometry_type: GeometryType,
    pub dimension: Dimension,
    /// The number of coordinates (points and linestrings), rings (polygons) or parts
    /// (collections). `None` when the source cannot know it up front.
    pub size: Option<usize>,
    pub srid: Option<u32>,
}

impl GeometryMeta {
    pub fn new(geometry_type: GeometryType, dimension: Dimension, size: Option<usize>) -> Self {
        Self {
            geometry_type,
            dimension,
            size,
            srid: None,
        }
    }

    pub fn with_srid(mut self, srid: Option<u32>) -> Self {
        self.srid = srid;
        self
    }

    /// Whether this geometry is known to have no content.
    pub fn is_empty(&self) -> bool {
        self.size == Some(0)
    }
}

/// Header information about a whole geometry vector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VectorMeta {
    /// The type shared by every feature, or `None` when mixed or unknown.
    pub geometry_type: Option<GeometryType>,
    /// The dimension shared by every feature, or `None` when mixed or unknown.
    pub dimension: Option<Dimension>,
    /// The number of features, or `None` for streaming sources.
    pub size: Option<usize>,
}

impl VectorMeta {
    pub fn new(
        geometry_type: Option<GeometryType>,
        dimension: Option<Dimension>,
        size: Option<usize>,
    ) -> Self {
        Self {
            geometry_type,
            dimension,
            size,
        }
    }
}

/// A consumer of the event protocol.
///
/// Every method has a default implementation that ignores the event, so a handler only
/// implements the events it cares about. Handlers are scoped to one traversal: accumulators are
/// reset in [Handler::vector_start] and results are handed out by [Finish::finish].
#[allow(unused_variables)]
pub trait Handler {
    fn vector_start(&mut self, meta: &VectorMeta) -> HandlerResult {
        Ok(Continuation::Continue)
    }

    fn feature_start(&mut self, feat_id: usize) -> HandlerResult {
        Ok(Continuation::Continue)
    }

    /// Replaces `feature_start`, the geometry calls and `feature_end` for a null feature.
    fn null_feature(&mut self, feat_id: usize) -> HandlerResult {
        Ok(Continuation::Continue)
    }

    /// `part_id` is `None` for the outermost geometry of a feature and the index of the part
    /// within its parent otherwise.
    fn geometry_start(&mut self, meta: &GeometryMeta, part_id: Option<usize>) -> HandlerResult {
        Ok(Continuation::Continue)
    }

    fn ring_start(
        &mut self,
        meta: &GeometryMeta,
        size: Option<usize>,
        ring_id: usize,
    ) -> HandlerResult {
        Ok(Continuation::Continue)
    }

    fn coord(&mut self, meta: &GeometryMeta, coord: &Coord, coord_id: usize) -> HandlerResult {
        Ok(Continuation::Continue)
    }

    fn ring_end(
        &mut self,
        meta: &GeometryMeta,
        size: Option<usize>,
        ring_id: usize,
    ) -> HandlerResult {
        Ok(Continuation::Continue)
    }

    fn geometry_end(&mut self, meta: &GeometryMeta, part_id: Option<usize>) -> HandlerResult {
        Ok(Continuation::Continue)
    }

    fn feature_end(&mut self, feat_id: usize) -> HandlerResult {
        Ok(Continuation::Continue)
    }

    fn vector_end(&mut self, meta: &VectorMeta) -> Result<()> {
        Ok(())
    }

    /// Feature `feat_id` was abandoned after an error and will not see its remaining calls.
    ///
    /// Called by error-absorbing handlers such as
    /// [`ProblemsHandler`](crate::filter::ProblemsHandler) so that handlers producing one entry
    /// per feature can keep their output aligned with the input.
    fn feature_abandoned(&mut self, feat_id: usize) {}

    /// Decide how to proceed after `err` was reported while processing feature `feat_id`.
    ///
    /// The default treats every error as fatal.
    fn error(&mut self, feat_id: usize, err: &GeoStreamError) -> Continuation {
        Continuation::Abort
    }
}

/// A [Handler] that materializes a result once its traversal is over.
pub trait Finish: Handler {
    type Output;

    fn finish(self) -> Result<Self::Output>;
}

macro_rules! impl_forwarding_handler {
    ($ty:ty) => {
        impl<H: Handler + ?Sized> Handler for $ty {
            fn vector_start(&mut self, meta: &VectorMeta) -> HandlerResult {
                (**self).vector_start(meta)
            }

            fn feature_start(&mut self, feat_id: usize) -> HandlerResult {
                (**self).feature_start(feat_id)
            }

            fn null_feature(&mut self, feat_id: usize) -> HandlerResult {
                (**self).null_feature(feat_id)
            }

            fn geometry_start(
                &mut self,
                meta: &GeometryMeta,
                part_id: Option<usize>,
            ) -> HandlerResult {
                (**self).geometry_start(meta, part_id)
            }

            fn ring_start(
                &mut self,
                meta: &GeometryMeta,
                size: Option<usize>,
                ring_id: usize,
            ) -> HandlerResult {
                (**self).ring_start(meta, size, ring_id)
            }

            fn coord(
                &mut self,
                meta: &GeometryMeta,
                coord: &Coord,
                coord_id: usize,
            ) -> HandlerResult {
                (**self).coord(meta, coord, coord_id)
            }

            fn ring_end(
                &mut self,
                meta: &GeometryMeta,
                size: Option<usize>,
                ring_id: usize,
            ) -> HandlerResult {
                (**self).ring_end(meta, size, ring_id)
            }

            fn geometry_end(
                &mut self,
                meta: &GeometryMeta,
                part_id: Option<usize>,
            ) -> HandlerResult {
                (**self).geometry_end(meta, part_id)
            }

            fn feature_end(&mut self, feat_id: usize) -> HandlerResult {
                (**self).feature_end(feat_id)
            }

            fn vector_end(&mut self, meta: &VectorMeta) -> Result<()> {
                (**self).vector_end(meta)
            }

            fn feature_abandoned(&mut self, feat_id: usize) {
                (**self).feature_abandoned(feat_id)
            }

            fn error(&mut self, feat_id: usize, err: &GeoStreamError) -> Continuation {
                (**self).error(feat_id, err)
            }
        }
    };
}

impl_forwarding_handler!(Box<H>);
impl_forwarding_handler!(&mut H);

impl<H: Finish> Finish for Box<H> {
    type Output = H::Output;

    fn finish(self) -> Result<Self::Output> {
        (*self).finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Vec<&'static str>,
    }

    impl Handler for Recorder {
        fn feature_start(&mut self, _feat_id: usize) -> HandlerResult {
            self.events.push("feature_start");
            Ok(Continuation::Continue)
        }

        fn coord(&mut self, _meta: &GeometryMeta, _coord: &Coord, coord_id: usize) -> HandlerResult {
            self.events.push("coord");
            if coord_id == 1 {
                Ok(Continuation::AbortFeature)
            } else {
                Ok(Continuation::Continue)
            }
        }
    }

    fn push_coords(handler: &mut dyn Handler) -> HandlerResult {
        let meta = GeometryMeta::new(GeometryType::LineString, Dimension::XY, Some(3));
        for i in 0..3 {
            propagate!(handler.coord(&meta, &Coord::xy(0., 0.), i));
        }
        Ok(Continuation::Continue)
    }

    #[test]
    fn propagate_returns_abort_codes() {
        let mut recorder = Recorder::default();
        let result = push_coords(&mut recorder).unwrap();
        assert_eq!(result, Continuation::AbortFeature);
        assert_eq!(recorder.events, vec!["coord", "coord"]);
    }

    #[test]
    fn boxed_handlers_forward() {
        let mut boxed: Box<dyn Handler> = Box::new(Recorder::default());
        assert_eq!(boxed.feature_start(0).unwrap(), Continuation::Continue);
        assert_eq!(
            boxed.error(0, &GeoStreamError::Structural("x".into())),
            Continuation::Abort
        );
    }

    #[test]
    fn geometry_meta_serializes_its_header_fields() {
        let meta =
            GeometryMeta::new(GeometryType::Point, Dimension::XYZ, Some(1)).with_srid(Some(4326));
        let json = serde_json::to_value(meta).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "geometry_type": "Point",
                "dimension": "XYZ",
                "size": 1,
                "srid": 4326,
            })
        );
        let back: GeometryMeta = serde_json::from_value(json).unwrap();
        assert_eq!(back, meta);
    }
}
