use crate::coord::Coord;
use crate::datatypes::{Dimension, GeometryType};
use crate::driver::{push_feature, FeatureSource};
use crate::error::Result;
use crate::handler::{Continuation, Handler, VectorMeta};
use crate::io::native::{check_lengths, push_polygon};

/// Reads rectangles given as `xmin`, `ymin`, `xmax`, `ymax` columns as polygons.
///
/// Each rectangle becomes a closed five-coordinate ring
/// `(xmin ymin, xmax ymin, xmax ymax, xmin ymax, xmin ymin)`. A rectangle with any NaN bound is
/// an empty polygon.
#[derive(Debug)]
pub struct RectReader {
    xmin: Vec<f64>,
    ymin: Vec<f64>,
    xmax: Vec<f64>,
    ymax: Vec<f64>,
    len: usize,
    next: usize,
}

impl RectReader {
    pub fn try_new(xmin: Vec<f64>, ymin: Vec<f64>, xmax: Vec<f64>, ymax: Vec<f64>) -> Result<Self> {
        let len = check_lengths(&[
            ("xmin", xmin.len()),
            ("ymin", ymin.len()),
            ("xmax", xmax.len()),
            ("ymax", ymax.len()),
        ])?;
        Ok(Self {
            xmin,
            ymin,
            xmax,
            ymax,
            len,
            next: 0,
        })
    }

    /// Read `geo` rectangles.
    pub fn from_rects(rects: &[geo::Rect]) -> Self {
        let (mut xmin, mut ymin, mut xmax, mut ymax) = (vec![], vec![], vec![], vec![]);
        for rect in rects {
            xmin.push(rect.min().x);
            ymin.push(rect.min().y);
            xmax.push(rect.max().x);
            ymax.push(rect.max().y);
        }
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
            len: rects.len(),
            next: 0,
        }
    }

    fn ring(&self, i: usize) -> Option<[Coord; 5]> {
        let (x0, y0, x1, y1) = (self.xmin[i], self.ymin[i], self.xmax[i], self.ymax[i]);
        if [x0, y0, x1, y1].iter().any(|v| v.is_nan()) {
            return None;
        }
        Some([
            Coord::xy(x0, y0),
            Coord::xy(x1, y0),
            Coord::xy(x1, y1),
            Coord::xy(x0, y1),
            Coord::xy(x0, y0),
        ])
    }
}

impl FeatureSource for RectReader {
    fn vector_meta(&self) -> VectorMeta {
        VectorMeta::new(
            Some(GeometryType::Polygon),
            Some(Dimension::XY),
            Some(self.len),
        )
    }

    fn next_feature(
        &mut self,
        feat_id: usize,
        handler: &mut dyn Handler,
    ) -> Result<Option<Continuation>> {
        if self.next >= self.len {
            return Ok(None);
        }
        let ring = self.ring(self.next);
        self.next += 1;

        push_feature(handler, feat_id, |handler| {
            push_polygon(handler, ring.as_ref().map(|ring| ring.as_slice()))
        })
    }
}
