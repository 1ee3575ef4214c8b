use crate::error::Result;
use crate::filter::forward_to_inner;
use crate::handler::{Finish, Handler};

/// Forwards every event to the wrapped handler unchanged.
#[derive(Debug, Clone, Default)]
pub struct IdentityFilter<H> {
    inner: H,
}

impl<H: Handler> IdentityFilter<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> H {
        self.inner
    }
}

impl<H: Handler> Handler for IdentityFilter<H> {
    forward_to_inner!(
        vector_start,
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
        error,
    );
}

impl<H: Finish> Finish for IdentityFilter<H> {
    type Output = H::Output;

    fn finish(self) -> Result<H::Output> {
        self.inner.finish()
    }
}
