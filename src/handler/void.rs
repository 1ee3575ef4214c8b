use crate::error::Result;
use crate::handler::{Finish, Handler};

/// A handler that ignores every event.
///
/// Combined with [`ProblemsHandler`](crate::filter::ProblemsHandler) it validates input
/// without materializing anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct VoidHandler;

impl VoidHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Handler for VoidHandler {}

impl Finish for VoidHandler {
    type Output = ();

    fn finish(self) -> Result<()> {
        Ok(())
    }
}
