use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{GeoStreamError, Result};
use crate::filter::forward_to_inner;
use crate::handler::{Continuation, Finish, Handler, HandlerResult, VectorMeta};

/// An error recovered from while processing one feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub feature: usize,
    pub message: String,
}

/// The output of a [ProblemsHandler]: the wrapped handler's output and every recovered error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemReport<T> {
    pub output: T,
    pub problems: Vec<Problem>,
}

/// Turns feature-scoped errors into recorded problems instead of failing the traversal.
///
/// A failing feature is skipped and the traversal moves on to the next one. The wrapped handler
/// is told through [Handler::feature_abandoned], so writers store a null entry in its place and
/// their output stays aligned with the input.
/// Allocation failures are fatal and never offered for recovery.
#[derive(Debug, Clone, Default)]
pub struct ProblemsHandler<H> {
    inner: H,
    problems: Vec<Problem>,
    max_problems: Option<usize>,
}

impl<H: Handler> ProblemsHandler<H> {
    pub fn new(inner: H) -> Self {
        Self {
            inner,
            problems: vec![],
            max_problems: None,
        }
    }

    /// Give up once more than `max_problems` features have failed.
    pub fn with_max_problems(mut self, max_problems: usize) -> Self {
        self.max_problems = Some(max_problems);
        self
    }

    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }
}

impl<H: Handler> Handler for ProblemsHandler<H> {
    fn vector_start(&mut self, meta: &VectorMeta) -> HandlerResult {
        self.problems.clear();
        self.inner.vector_start(meta)
    }

    forward_to_inner!(
        feature_start,
        null_feature,
        geometry_start,
        ring_start,
        coord,
        ring_end,
        geometry_end,
        feature_end,
        vector_end,
        feature_abandoned,
    );

    fn error(&mut self, feat_id: usize, err: &GeoStreamError) -> Continuation {
        warn!(feature = feat_id, error = %err, "skipping feature");
        self.problems.push(Problem {
            feature: feat_id,
            message: err.to_string(),
        });
        match self.max_problems {
            Some(max) if self.problems.len() > max => Continuation::Abort,
            _ => {
                self.inner.feature_abandoned(feat_id);
                Continuation::AbortFeature
            }
        }
    }
}

impl<H: Finish> Finish for ProblemsHandler<H> {
    type Output = ProblemReport<H::Output>;

    fn finish(self) -> Result<Self::Output> {
        Ok(ProblemReport {
            output: self.inner.finish()?,
            problems: self.problems,
        })
    }
}
