//! The driver loop: pumps features from a [FeatureSource] into a handler chain and applies the
//! shared cancellation, error and recovery policy.

use tracing::{debug, warn};

use crate::error::{GeoStreamError, Result};
use crate::handler::{Continuation, Finish, Handler, HandlerResult, VectorMeta};

/// A reader that pushes one feature at a time into a handler.
pub trait FeatureSource {
    /// Header information about the whole vector, passed to `vector_start`.
    fn vector_meta(&self) -> VectorMeta;

    /// Push feature `feat_id` into `handler`, including its `feature_start`/`feature_end` (or
    /// `null_feature`) calls.
    ///
    /// Returns `Ok(None)` once the source is exhausted. The input of a feature is consumed before
    /// it is decoded, so after an `Err` the next call continues with the following feature.
    fn next_feature(
        &mut self,
        feat_id: usize,
        handler: &mut dyn Handler,
    ) -> Result<Option<Continuation>>;
}

impl<S: FeatureSource + ?Sized> FeatureSource for Box<S> {
    fn vector_meta(&self) -> VectorMeta {
        (**self).vector_meta()
    }

    fn next_feature(
        &mut self,
        feat_id: usize,
        handler: &mut dyn Handler,
    ) -> Result<Option<Continuation>> {
        (**self).next_feature(feat_id, handler)
    }
}

/// How a traversal ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Every feature of the source was visited.
    Completed,
    /// A handler returned [Continuation::Abort] while processing `feature`.
    Cancelled { feature: usize },
}

/// The result of a traversal.
#[derive(Debug, Clone, PartialEq)]
pub struct Traversal<T> {
    pub output: T,
    /// The number of features the source produced, including skipped and failed ones.
    pub features: usize,
    pub status: Status,
}

/// Owns a [FeatureSource] and runs traversals over it.
///
/// ```
/// use geostream::driver::Driver;
/// use geostream::handler::CountHandler;
/// use geostream::io::wkt::WktReader;
///
/// let reader = WktReader::new([Some("POINT (1 2)"), None]);
/// let counts = Driver::new(reader).run(CountHandler::new()).unwrap().output;
/// assert_eq!(counts.features, 2);
/// ```
#[derive(Debug)]
pub struct Driver<S: FeatureSource> {
    source: S,
}

impl<S: FeatureSource> Driver<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn into_inner(self) -> S {
        self.source
    }

    /// Run a traversal that owns `handler` and return its output.
    ///
    /// The handler chain is dropped on every exit path, including errors.
    pub fn run<H: Finish>(self, mut handler: H) -> Result<Traversal<H::Output>> {
        let (features, status) = self.drive(&mut handler)?;
        Ok(Traversal {
            output: handler.finish()?,
            features,
            status,
        })
    }

    /// Run a traversal with a borrowed handler, leaving its state for the caller to inspect.
    pub fn traverse(self, handler: &mut dyn Handler) -> Result<Traversal<()>> {
        let (features, status) = self.drive(handler)?;
        Ok(Traversal {
            output: (),
            features,
            status,
        })
    }

    fn drive(mut self, handler: &mut dyn Handler) -> Result<(usize, Status)> {
        let meta = self.source.vector_meta();
        debug!(size = ?meta.size, "starting traversal");

        let mut features = 0;
        let mut status = Status::Completed;

        if handler.vector_start(&meta)? == Continuation::Abort {
            status = Status::Cancelled { feature: 0 };
        }

        while status == Status::Completed {
            let feat_id = features;
            let result = match self.source.next_feature(feat_id, handler) {
                Ok(None) => break,
                result => result,
            };
            features += 1;

            match result {
                Ok(Some(Continuation::Abort)) => {
                    debug!(feature = feat_id, "traversal cancelled");
                    status = Status::Cancelled { feature: feat_id };
                }
                Ok(_) => {}
                Err(err) if err.is_fatal() => {
                    warn!(feature = feat_id, error = %err, "fatal error");
                    return Err(aborted(feat_id, err));
                }
                Err(err) => match handler.error(feat_id, &err) {
                    Continuation::Abort => {
                        debug!(feature = feat_id, error = %err, "error escalated");
                        return Err(aborted(feat_id, err));
                    }
                    _ => debug!(feature = feat_id, error = %err, "error recovered"),
                },
            }
        }

        handler.vector_end(&meta)?;
        debug!(features, "finished traversal");
        Ok((features, status))
    }
}

/// Push one non-null feature: `feature_start`, the calls made by `body`, then `feature_end`.
pub(crate) fn push_feature(
    handler: &mut dyn Handler,
    feat_id: usize,
    body: impl FnOnce(&mut dyn Handler) -> HandlerResult,
) -> Result<Option<Continuation>> {
    match handler.feature_start(feat_id)? {
        Continuation::Continue => {}
        other => return Ok(Some(other)),
    }
    match body(&mut *handler)? {
        Continuation::Continue => {}
        other => return Ok(Some(other)),
    }
    handler.feature_end(feat_id).map(Some)
}

fn aborted(feature: usize, err: GeoStreamError) -> GeoStreamError {
    GeoStreamError::Aborted {
        feature,
        source: Box::new(err),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::datatypes::GeometryType;
    use crate::filter::ProblemsHandler;
    use crate::handler::{CountHandler, GeometryMeta, HandlerResult, VoidHandler};
    use crate::io::wkt::{WktReader, WktWriter};

    /// Cancels the traversal at a given feature.
    struct CancelAt(usize);

    impl Handler for CancelAt {
        fn feature_start(&mut self, feat_id: usize) -> HandlerResult {
            if feat_id == self.0 {
                Ok(Continuation::Abort)
            } else {
                Ok(Continuation::Continue)
            }
        }
    }

    /// Checks that start and end calls are balanced for every completed feature.
    #[derive(Default)]
    struct Balance {
        geometries: isize,
        rings: isize,
        starts: Vec<(GeometryType, Option<usize>)>,
        ended: bool,
    }

    impl Handler for Balance {
        fn geometry_start(&mut self, meta: &GeometryMeta, part_id: Option<usize>) -> HandlerResult {
            self.geometries += 1;
            self.starts.push((meta.geometry_type, part_id));
            Ok(Continuation::Continue)
        }

        fn geometry_end(&mut self, _meta: &GeometryMeta, _part_id: Option<usize>) -> HandlerResult {
            self.geometries -= 1;
            Ok(Continuation::Continue)
        }

        fn ring_start(
            &mut self,
            _meta: &GeometryMeta,
            _size: Option<usize>,
            _ring_id: usize,
        ) -> HandlerResult {
            self.rings += 1;
            Ok(Continuation::Continue)
        }

        fn ring_end(
            &mut self,
            _meta: &GeometryMeta,
            _size: Option<usize>,
            _ring_id: usize,
        ) -> HandlerResult {
            self.rings -= 1;
            Ok(Continuation::Continue)
        }

        fn vector_end(&mut self, _meta: &VectorMeta) -> Result<()> {
            self.ended = true;
            Ok(())
        }
    }

    #[test]
    fn balanced_nesting() {
        let wkt = [
            Some("GEOMETRYCOLLECTION (POINT (0 0), LINESTRING (0 0, 1 1))"),
            Some("MULTIPOLYGON (((0 0, 1 0, 1 1, 0 0)), EMPTY)"),
            None,
        ];
        let mut balance = Balance::default();
        let traversal = Driver::new(WktReader::new(wkt))
            .traverse(&mut balance)
            .unwrap();
        assert_eq!(traversal.status, Status::Completed);
        assert_eq!(traversal.features, 3);
        assert_eq!(balance.geometries, 0);
        assert_eq!(balance.rings, 0);
        assert!(balance.ended);
        assert_eq!(
            &balance.starts[..3],
            &[
                (GeometryType::GeometryCollection, None),
                (GeometryType::Point, Some(0)),
                (GeometryType::LineString, Some(1)),
            ]
        );
    }

    #[test]
    fn cancellation_reports_feature() {
        let wkt = [Some("POINT (0 0)"), Some("POINT (1 1)"), Some("POINT (2 2)")];
        let traversal = Driver::new(WktReader::new(wkt))
            .traverse(&mut CancelAt(1))
            .unwrap();
        assert_eq!(traversal.status, Status::Cancelled { feature: 1 });
        assert_eq!(traversal.features, 2);
    }

    #[test]
    fn strict_mode_escalates() {
        let wkt = [Some("POINT (1 2")];
        let err = Driver::new(WktReader::new(wkt))
            .run(WktWriter::default())
            .unwrap_err();
        match err {
            GeoStreamError::Aborted { feature, source } => {
                assert_eq!(feature, 0);
                assert!(matches!(*source, GeoStreamError::Malformed { .. }));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn lenient_mode_records_problem() {
        let wkt = [Some("POINT (1 2")];
        let report = Driver::new(WktReader::new(wkt))
            .run(ProblemsHandler::new(WktWriter::default()))
            .unwrap()
            .output;
        assert_eq!(report.output, vec![None]);
        assert_eq!(report.problems.len(), 1);
        assert_eq!(report.problems[0].feature, 0);
    }

    #[test]
    fn recovered_errors_continue_with_next_feature() {
        let wkt = [Some("POINT (1 2"), Some("POINT (3 4)"), Some("LINESTRING (0 0, 1)")];
        let traversal = Driver::new(WktReader::new(wkt))
            .run(ProblemsHandler::new(CountHandler::new()))
            .unwrap();
        assert_eq!(traversal.features, 3);
        assert_eq!(traversal.status, Status::Completed);
        assert_eq!(traversal.output.problems.len(), 2);
        assert_eq!(traversal.output.output.features, 3);
    }

    #[test]
    fn empty_source() {
        let wkt: [Option<&str>; 0] = [];
        let traversal = Driver::new(WktReader::new(wkt)).run(VoidHandler).unwrap();
        assert_eq!(traversal.features, 0);
        assert_eq!(traversal.status, Status::Completed);
    }
}
