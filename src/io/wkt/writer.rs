use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::coord::Coord;
use crate::datatypes::GeometryType;
use crate::error::Result;
use crate::handler::{Continuation, Finish, GeometryMeta, Handler, HandlerResult, VectorMeta};

/// Options for [WktWriter].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WktWriterOptions {
    /// The number of decimal places ordinates are rounded to.
    ///
    /// This is lossy for magnitudes below `0.5 * 10^-precision`, which are written as `0`. The
    /// default of 16 therefore flattens values under `5e-17`; raise it to keep them.
    pub precision: usize,

    /// Write the shortest representation of each rounded ordinate instead of padding it to
    /// `precision` decimal places.
    pub trim: bool,

    /// Stop every feature after this many coordinates, writing `...` and closing all open
    /// parentheses.
    pub max_coords: Option<usize>,
}

impl Default for WktWriterOptions {
    fn default() -> Self {
        Self {
            precision: 16,
            trim: true,
            max_coords: None,
        }
    }
}

/// An open geometry or ring and the number of items written into it so far.
#[derive(Debug)]
struct Frame {
    /// `None` for rings.
    geometry_type: Option<GeometryType>,
    children: usize,
}

/// Writes every feature as WKT, producing one `Option<String>` per feature.
///
/// A feature stopped by [Continuation::AbortFeature] produces no entry. A feature abandoned
/// after a recovered error produces `None`, keeping the output aligned with the input.
#[derive(Debug, Default)]
pub struct WktWriter {
    options: WktWriterOptions,
    result: Vec<Option<String>>,
    buf: String,
    stack: Vec<Frame>,
    coords: usize,
}

impl WktWriter {
    pub fn new(options: WktWriterOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    /// A writer for short, human-readable previews of at most `max_coords` coordinates per
    /// feature.
    pub fn formatter(precision: usize, trim: bool, max_coords: usize) -> Self {
        Self::new(WktWriterOptions {
            precision,
            trim,
            max_coords: Some(max_coords),
        })
    }

    /// Write the separator that precedes the next item of the innermost open frame.
    fn open_item(&mut self) {
        if let Some(frame) = self.stack.last_mut() {
            self.buf.push_str(if frame.children == 0 { "(" } else { ", " });
            frame.children += 1;
        }
    }

    fn close_frame(&mut self) {
        if let Some(frame) = self.stack.pop() {
            self.buf
                .push_str(if frame.children == 0 { "EMPTY" } else { ")" });
        }
    }

    fn write_ordinate(&mut self, value: f64) {
        if value.is_nan() {
            self.buf.push_str("nan");
        } else if value.is_infinite() {
            self.buf
                .push_str(if value > 0.0 { "inf" } else { "-inf" });
        } else {
            let mut fixed = format!("{:.*}", self.options.precision, value);
            let rounded: f64 = fixed.parse().unwrap_or(value);
            // Never write negative zero.
            if rounded == 0.0 && fixed.starts_with('-') {
                fixed.remove(0);
            }
            if self.options.trim {
                let rounded = if rounded == 0.0 { 0.0 } else { rounded };
                let _ = write!(self.buf, "{rounded}");
            } else {
                self.buf.push_str(&fixed);
            }
        }
    }

    /// Finish a feature that reached `max_coords`.
    fn truncate(&mut self) -> HandlerResult {
        self.open_item();
        self.buf.push_str("...");
        while let Some(frame) = self.stack.pop() {
            if frame.children > 0 {
                self.buf.push(')');
            }
        }
        self.result.push(Some(std::mem::take(&mut self.buf)));
        Ok(Continuation::AbortFeature)
    }
}

impl Handler for WktWriter {
    fn vector_start(&mut self, meta: &VectorMeta) -> HandlerResult {
        self.result.clear();
        if let Some(size) = meta.size {
            self.result.try_reserve(size)?;
        }
        Ok(Continuation::Continue)
    }

    fn feature_start(&mut self, _feat_id: usize) -> HandlerResult {
        self.buf.clear();
        self.stack.clear();
        self.coords = 0;
        Ok(Continuation::Continue)
    }

    fn null_feature(&mut self, _feat_id: usize) -> HandlerResult {
        self.result.push(None);
        Ok(Continuation::Continue)
    }

    fn geometry_start(&mut self, meta: &GeometryMeta, part_id: Option<usize>) -> HandlerResult {
        let parent = self.stack.last().and_then(|frame| frame.geometry_type);
        self.open_item();

        // Parts of multi geometries are written without their keyword.
        if matches!(parent, None | Some(GeometryType::GeometryCollection)) {
            if let (None, Some(srid)) = (part_id, meta.srid) {
                let _ = write!(self.buf, "SRID={srid};");
            }
            self.buf.push_str(meta.geometry_type.wkt_keyword());
            self.buf.push_str(meta.dimension.wkt_suffix());
            self.buf.push(' ');
        }

        self.stack.push(Frame {
            geometry_type: Some(meta.geometry_type),
            children: 0,
        });
        Ok(Continuation::Continue)
    }

    fn ring_start(
        &mut self,
        _meta: &GeometryMeta,
        _size: Option<usize>,
        _ring_id: usize,
    ) -> HandlerResult {
        self.open_item();
        self.stack.push(Frame {
            geometry_type: None,
            children: 0,
        });
        Ok(Continuation::Continue)
    }

    fn coord(&mut self, _meta: &GeometryMeta, coord: &Coord, _coord_id: usize) -> HandlerResult {
        self.coords += 1;
        if self
            .options
            .max_coords
            .is_some_and(|max| self.coords > max)
        {
            return self.truncate();
        }

        self.open_item();
        for (i, value) in coord.as_slice().iter().enumerate() {
            if i > 0 {
                self.buf.push(' ');
            }
            self.write_ordinate(*value);
        }
        Ok(Continuation::Continue)
    }

    fn ring_end(
        &mut self,
        _meta: &GeometryMeta,
        _size: Option<usize>,
        _ring_id: usize,
    ) -> HandlerResult {
        self.close_frame();
        Ok(Continuation::Continue)
    }

    fn geometry_end(&mut self, _meta: &GeometryMeta, _part_id: Option<usize>) -> HandlerResult {
        self.close_frame();
        Ok(Continuation::Continue)
    }

    fn feature_end(&mut self, _feat_id: usize) -> HandlerResult {
        self.result.push(Some(std::mem::take(&mut self.buf)));
        Ok(Continuation::Continue)
    }

    fn feature_abandoned(&mut self, feat_id: usize) {
        if self.result.len() <= feat_id {
            self.result.push(None);
        }
    }
}

impl Finish for WktWriter {
    type Output = Vec<Option<String>>;

    fn finish(self) -> Result<Self::Output> {
        Ok(self.result)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::driver::{Driver, Status};
    use crate::filter::IdentityFilter;
    use crate::io::wkt::WktReader;

    fn format_with(wkt: &[Option<&str>], writer: WktWriter) -> Vec<Option<String>> {
        Driver::new(WktReader::new(wkt.iter().copied()))
            .run(writer)
            .unwrap()
            .output
    }

    fn format(wkt: &str) -> String {
        format_with(&[Some(wkt)], WktWriter::default())
            .remove(0)
            .unwrap()
    }

    #[test]
    fn canonical_output() {
        let cases = [
            ("POINT (1 2)", "POINT (1 2)"),
            ("point(1.5 -2)", "POINT (1.5 -2)"),
            ("POINT Z (1 2 3)", "POINT Z (1 2 3)"),
            ("POINT (1 2 3 4)", "POINT ZM (1 2 3 4)"),
            ("LINESTRING M (0 0 1, 1 1 2)", "LINESTRING M (0 0 1, 1 1 2)"),
            (
                "POLYGON ((0 0, 10 0, 10 10, 0 0), (1 1, 2 1, 2 2, 1 1))",
                "POLYGON ((0 0, 10 0, 10 10, 0 0), (1 1, 2 1, 2 2, 1 1))",
            ),
            ("MULTIPOINT (1 2, 3 4)", "MULTIPOINT ((1 2), (3 4))"),
            ("MULTIPOINT (EMPTY, (1 2))", "MULTIPOINT (EMPTY, (1 2))"),
            (
                "MULTIPOLYGON (((0 0, 1 0, 1 1, 0 0)), EMPTY)",
                "MULTIPOLYGON (((0 0, 1 0, 1 1, 0 0)), EMPTY)",
            ),
            (
                "GEOMETRYCOLLECTION (POINT (0 0), LINESTRING EMPTY)",
                "GEOMETRYCOLLECTION (POINT (0 0), LINESTRING EMPTY)",
            ),
            ("POINT EMPTY", "POINT EMPTY"),
            ("GEOMETRYCOLLECTION EMPTY", "GEOMETRYCOLLECTION EMPTY"),
            ("SRID=4326;POINT (1 2)", "SRID=4326;POINT (1 2)"),
            ("POINT (nan 1)", "POINT (nan 1)"),
            ("POINT (inf -inf)", "POINT (inf -inf)"),
        ];
        for (input, expected) in cases {
            assert_eq!(format(input), expected, "formatting {input}");
        }
    }

    #[test]
    fn reformatting_is_idempotent() {
        let inputs = [
            "LINESTRING (0.1 0.2, 1.1 2.2, 3.3333333333333335 -0.000001)",
            "MULTIPOLYGON (((0 0, 1 0, 1 1, 0 0)), ((5 5, 6 5, 6 6, 5 5)))",
            "GEOMETRYCOLLECTION (POINT Z (1 2 3), GEOMETRYCOLLECTION (POINT Z (4 5 6)))",
        ];
        for options in [
            WktWriterOptions::default(),
            WktWriterOptions {
                precision: 3,
                trim: false,
                max_coords: None,
            },
        ] {
            for input in inputs {
                let once = format_with(&[Some(input)], WktWriter::new(options));
                let once = once[0].as_deref();
                let twice = format_with(&[once], WktWriter::new(options));
                assert_eq!(twice[0].as_deref(), once);
            }
        }
    }

    #[test]
    fn precision_and_trim() {
        let wkt = [Some("POINT (1.123456789 -0.0001)")];
        let rounded = format_with(
            &wkt,
            WktWriter::new(WktWriterOptions {
                precision: 3,
                ..Default::default()
            }),
        );
        assert_eq!(rounded[0].as_deref(), Some("POINT (1.123 0)"));

        let padded = format_with(
            &[Some("POINT (1 2.5)")],
            WktWriter::new(WktWriterOptions {
                precision: 2,
                trim: false,
                max_coords: None,
            }),
        );
        assert_eq!(padded[0].as_deref(), Some("POINT (1.00 2.50)"));
    }

    #[test]
    fn negative_zero_and_tiny_values() {
        let padded = format_with(
            &[Some("POINT (-0.0001 1)"), Some("POINT (-0 -0.0)")],
            WktWriter::new(WktWriterOptions {
                precision: 3,
                trim: false,
                max_coords: None,
            }),
        );
        assert_eq!(padded[0].as_deref(), Some("POINT (0.000 1.000)"));
        assert_eq!(padded[1].as_deref(), Some("POINT (0.000 0.000)"));

        assert_eq!(format("POINT (-0 1e-17)"), "POINT (0 0)");
        assert_eq!(
            format("POINT (1e-16 -6e-17)"),
            "POINT (0.0000000000000001 -0.0000000000000001)"
        );
    }

    #[test]
    fn null_features_stay_null() {
        let out = format_with(&[Some("POINT (0 0)"), None], WktWriter::default());
        assert_eq!(out, vec![Some("POINT (0 0)".to_string()), None]);
    }

    #[test]
    fn formatter_truncates() {
        let out = format_with(
            &[
                Some("LINESTRING (0 0, 1 1, 2 2, 3 3)"),
                Some("LINESTRING (0 0, 1 1)"),
                Some("POLYGON ((0 0, 1 0, 1 1, 0 0))"),
                Some("GEOMETRYCOLLECTION (POINT (0 0), MULTIPOINT ((1 1), (2 2)))"),
            ],
            WktWriter::formatter(16, true, 2),
        );
        assert_eq!(
            out,
            vec![
                Some("LINESTRING (0 0, 1 1, ...)".to_string()),
                Some("LINESTRING (0 0, 1 1)".to_string()),
                Some("POLYGON ((0 0, 1 0, ...))".to_string()),
                Some("GEOMETRYCOLLECTION (POINT (0 0), MULTIPOINT ((1 1), (...)))".to_string()),
            ]
        );
    }

    #[test]
    fn formatter_skips_rest_of_feature_only() {
        let traversal = Driver::new(WktReader::new([
            Some("MULTIPOINT (0 0, 1 1, 2 2)"),
            Some("POINT (5 5)"),
        ]))
        .run(WktWriter::formatter(16, true, 1))
        .unwrap();
        assert_eq!(traversal.status, Status::Completed);
        assert_eq!(
            traversal.output,
            vec![
                Some("MULTIPOINT ((0 0), (...))".to_string()),
                Some("POINT (5 5)".to_string()),
            ]
        );
    }

    #[test]
    fn identity_filter_is_transparent() {
        let wkt = [
            Some("SRID=3857;MULTILINESTRING ((0 0, 1 1), (2 2, 3 3))"),
            None,
            Some("GEOMETRYCOLLECTION (POINT (0 0))"),
        ];
        let direct = format_with(&wkt, WktWriter::default());
        let filtered = Driver::new(WktReader::new(wkt))
            .run(IdentityFilter::new(WktWriter::default()))
            .unwrap()
            .output;
        assert_eq!(direct, filtered);
    }
}
