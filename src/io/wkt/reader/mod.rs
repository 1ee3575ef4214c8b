mod parser;
mod tokenizer;

use serde::{Deserialize, Serialize};

use crate::driver::{push_feature, FeatureSource};
use crate::error::Result;
use crate::handler::{Continuation, Handler, HandlerResult, VectorMeta};
use crate::io::wkt::reader::parser::Parser;

/// Options for [WktReader].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WktReaderOptions {
    /// Parse every feature twice so that every `geometry_start` and `ring_start` carries an
    /// exact size.
    pub reveal_size: bool,

    /// The maximum nesting depth of geometry collections and multi geometries.
    pub max_depth: usize,
}

impl Default for WktReaderOptions {
    fn default() -> Self {
        Self {
            reveal_size: false,
            max_depth: 128,
        }
    }
}

/// Reads a vector of WKT strings, where `None` is a null feature.
///
/// The input may be any iterator, so features can be supplied incrementally. The vector size is
/// known when the iterator reports an exact size hint.
#[derive(Debug)]
pub struct WktReader<I> {
    iter: I,
    options: WktReaderOptions,
}

impl<I, S> WktReader<I>
where
    I: Iterator<Item = Option<S>>,
    S: AsRef<str>,
{
    pub fn new(input: impl IntoIterator<IntoIter = I>) -> Self {
        Self::new_with_options(input, Default::default())
    }

    pub fn new_with_options(
        input: impl IntoIterator<IntoIter = I>,
        options: WktReaderOptions,
    ) -> Self {
        Self {
            iter: input.into_iter(),
            options,
        }
    }

    fn read_text(&self, text: &str, handler: &mut dyn Handler) -> HandlerResult {
        let sizes = if self.options.reveal_size {
            let mut counting = Parser::counting(text, self.options.max_depth);
            counting.parse_feature()?;
            Some(counting.into_sizes())
        } else {
            None
        };

        Parser::emitting(text, handler, sizes, self.options.max_depth).parse_feature()
    }
}

impl<I, S> FeatureSource for WktReader<I>
where
    I: Iterator<Item = Option<S>>,
    S: AsRef<str>,
{
    fn vector_meta(&self) -> VectorMeta {
        let size = match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(lower),
            _ => None,
        };
        VectorMeta::new(None, None, size)
    }

    fn next_feature(
        &mut self,
        feat_id: usize,
        handler: &mut dyn Handler,
    ) -> Result<Option<Continuation>> {
        let Some(item) = self.iter.next() else {
            return Ok(None);
        };

        let Some(text) = item else {
            return handler.null_feature(feat_id).map(Some);
        };

        push_feature(handler, feat_id, |handler| {
            self.read_text(text.as_ref(), handler)
        })
    }
}
