use std::io::Write;

use itertools::Itertools;
use tracing::trace;

use crate::coord::Coord;
use crate::error::{GeoStreamError, Result};
use crate::handler::{Continuation, Finish, GeometryMeta, Handler, HandlerResult, VectorMeta};

/// Forwards every event unchanged, printing one line per call to a sink and to `tracing` at the
/// TRACE level.
///
/// Each line shows the call, its arguments and what the downstream handler returned, indented
/// by nesting level. Failures writing to the sink are ignored.
#[derive(Debug)]
pub struct DebugFilter<H, W> {
    inner: H,
    sink: W,
    level: usize,
}

impl<H: Handler, W: Write> DebugFilter<H, W> {
    pub fn new(inner: H, sink: W) -> Self {
        Self {
            inner,
            sink,
            level: 0,
        }
    }

    fn log<T: std::fmt::Debug>(&mut self, call: std::fmt::Arguments, result: &Result<T>) {
        let outcome = match result {
            Ok(value) => format!("{value:?}"),
            Err(err) => format!("Err({err})"),
        };
        let line = format!("{:indent$}{call} => {outcome}", "", indent = self.level * 2);
        trace!("{line}");
        let _ = writeln!(self.sink, "{line}");
    }
}

fn describe_meta(meta: &GeometryMeta) -> String {
    let mut out = format!("{} {}", meta.geometry_type, meta.dimension);
    if let Some(size) = meta.size {
        out.push_str(&format!(" [{size}]"));
    }
    if let Some(srid) = meta.srid {
        out.push_str(&format!(" srid={srid}"));
    }
    out
}

impl<H: Handler, W: Write> Handler for DebugFilter<H, W> {
    fn vector_start(&mut self, meta: &VectorMeta) -> HandlerResult {
        let result = self.inner.vector_start(meta);
        self.log(format_args!("vector_start({meta:?})"), &result);
        self.level += 1;
        result
    }

    fn feature_start(&mut self, feat_id: usize) -> HandlerResult {
        // Features abandoned by an abort code never see their end calls.
        self.level = 1;
        let result = self.inner.feature_start(feat_id);
        self.log(format_args!("feature_start({feat_id})"), &result);
        self.level += 1;
        result
    }

    fn null_feature(&mut self, feat_id: usize) -> HandlerResult {
        self.level = 1;
        let result = self.inner.null_feature(feat_id);
        self.log(format_args!("null_feature({feat_id})"), &result);
        result
    }

    fn geometry_start(&mut self, meta: &GeometryMeta, part_id: Option<usize>) -> HandlerResult {
        let result = self.inner.geometry_start(meta, part_id);
        let meta = describe_meta(meta);
        self.log(format_args!("geometry_start({meta}, {part_id:?})"), &result);
        self.level += 1;
        result
    }

    fn ring_start(
        &mut self,
        meta: &GeometryMeta,
        size: Option<usize>,
        ring_id: usize,
    ) -> HandlerResult {
        let result = self.inner.ring_start(meta, size, ring_id);
        self.log(format_args!("ring_start({size:?}, {ring_id})"), &result);
        self.level += 1;
        result
    }

    fn coord(&mut self, meta: &GeometryMeta, coord: &Coord, coord_id: usize) -> HandlerResult {
        let result = self.inner.coord(meta, coord, coord_id);
        let ordinates = coord.as_slice().iter().join(" ");
        self.log(format_args!("coord({ordinates}, {coord_id})"), &result);
        result
    }

    fn ring_end(
        &mut self,
        meta: &GeometryMeta,
        size: Option<usize>,
        ring_id: usize,
    ) -> HandlerResult {
        self.level = self.level.saturating_sub(1);
        let result = self.inner.ring_end(meta, size, ring_id);
        self.log(format_args!("ring_end({size:?}, {ring_id})"), &result);
        result
    }

    fn geometry_end(&mut self, meta: &GeometryMeta, part_id: Option<usize>) -> HandlerResult {
        self.level = self.level.saturating_sub(1);
        let result = self.inner.geometry_end(meta, part_id);
        let meta = describe_meta(meta);
        self.log(format_args!("geometry_end({meta}, {part_id:?})"), &result);
        result
    }

    fn feature_end(&mut self, feat_id: usize) -> HandlerResult {
        self.level = self.level.saturating_sub(1);
        let result = self.inner.feature_end(feat_id);
        self.log(format_args!("feature_end({feat_id})"), &result);
        result
    }

    fn vector_end(&mut self, meta: &VectorMeta) -> Result<()> {
        self.level = 0;
        let result = self.inner.vector_end(meta);
        self.log(format_args!("vector_end()"), &result);
        result
    }

    fn feature_abandoned(&mut self, feat_id: usize) {
        self.level = 1;
        self.inner.feature_abandoned(feat_id);
        self.log(
            format_args!("feature_abandoned({feat_id})"),
            &Ok::<_, GeoStreamError>(()),
        );
    }

    fn error(&mut self, feat_id: usize, err: &GeoStreamError) -> Continuation {
        self.level = 1;
        let continuation = self.inner.error(feat_id, err);
        self.log(
            format_args!("error({feat_id}, {err})"),
            &Ok::<_, GeoStreamError>(continuation),
        );
        continuation
    }
}

impl<H: Finish, W: Write> Finish for DebugFilter<H, W> {
    type Output = H::Output;

    fn finish(self) -> Result<H::Output> {
        self.inner.finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::driver::Driver;
    use crate::handler::{CountHandler, MetaHandler, VoidHandler};
    use crate::io::wkt::WktReader;

    #[test]
    fn prints_nested_calls() {
        let mut sink = Vec::new();
        Driver::new(WktReader::new([Some("POLYGON ((0 0, 1 0, 0 0))"), None]))
            .run(DebugFilter::new(VoidHandler::new(), &mut sink))
            .unwrap();
        let text = String::from_utf8(sink).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 12);
        assert_eq!(lines[1], "  feature_start(0) => Continue");
        assert_eq!(lines[2], "    geometry_start(POLYGON XY, None) => Continue");
        assert_eq!(lines[3], "      ring_start(None, 0) => Continue");
        assert_eq!(lines[5], "        coord(1 0, 1) => Continue");
        assert_eq!(lines[7], "      ring_end(Some(3), 0) => Continue");
        assert!(lines[8].starts_with("    geometry_end(POLYGON XY"));
        assert_eq!(lines[10], "  null_feature(1) => Continue");
        assert_eq!(lines[11], "vector_end() => ()");
    }

    #[test]
    fn indentation_recovers_after_abort_codes() {
        let mut sink = Vec::new();
        Driver::new(WktReader::new([
            Some("MULTIPOINT ((0 0))"),
            Some("POINT (1 1)"),
        ]))
        .run(DebugFilter::new(MetaHandler::new(), &mut sink))
        .unwrap();
        let text = String::from_utf8(sink).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[1..],
            [
                "  feature_start(0) => Continue",
                "    geometry_start(MULTIPOINT XY, None) => AbortFeature",
                "  feature_start(1) => Continue",
                "    geometry_start(POINT XY [1], None) => AbortFeature",
                "vector_end() => ()",
            ]
        );
    }

    #[test]
    fn does_not_change_results() {
        let wkt = [Some("MULTIPOINT (0 0, 1 1)"), Some("POINT (1"), None];
        let direct = Driver::new(WktReader::new(wkt))
            .run(crate::filter::ProblemsHandler::new(CountHandler::new()))
            .unwrap();
        let debugged = Driver::new(WktReader::new(wkt))
            .run(DebugFilter::new(
                crate::filter::ProblemsHandler::new(CountHandler::new()),
                std::io::sink(),
            ))
            .unwrap();
        assert_eq!(direct, debugged);
    }
}
