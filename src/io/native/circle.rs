use std::f64::consts::PI;

use crate::coord::Coord;
use crate::datatypes::{Dimension, GeometryType};
use crate::driver::{push_feature, FeatureSource};
use crate::error::{GeoStreamError, Result};
use crate::handler::{Continuation, Handler, VectorMeta};
use crate::io::native::{check_lengths, push_polygon};

/// Reads circles given as center `x`, `y` and `radius` columns as polygons approximating each
/// circle with `n_segments` segments.
///
/// Vertex `i` lies at angle `2πi / n_segments` from the positive x axis; the ring is closed by
/// repeating the first vertex. A circle with any NaN value is an empty polygon.
#[derive(Debug)]
pub struct CircleReader {
    x: Vec<f64>,
    y: Vec<f64>,
    radius: Vec<f64>,
    n_segments: usize,
    len: usize,
    next: usize,
}

impl CircleReader {
    pub fn try_new(x: Vec<f64>, y: Vec<f64>, radius: Vec<f64>, n_segments: usize) -> Result<Self> {
        if n_segments < 3 {
            return Err(GeoStreamError::InvalidArgument(format!(
                "A circle needs at least 3 segments, got {n_segments}"
            )));
        }
        let len = check_lengths(&[("x", x.len()), ("y", y.len()), ("radius", radius.len())])?;
        Ok(Self {
            x,
            y,
            radius,
            n_segments,
            len,
            next: 0,
        })
    }

    fn ring(&self, i: usize) -> Option<Vec<Coord>> {
        let (cx, cy, r) = (self.x[i], self.y[i], self.radius[i]);
        if cx.is_nan() || cy.is_nan() || r.is_nan() {
            return None;
        }
        let n = self.n_segments;
        let mut ring: Vec<Coord> = (0..n)
            .map(|i| {
                let angle = 2. * PI * i as f64 / n as f64;
                Coord::xy(cx + r * angle.cos(), cy + r * angle.sin())
            })
            .collect();
        ring.push(ring[0]);
        Some(ring)
    }
}

impl FeatureSource for CircleReader {
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
            push_polygon(handler, ring.as_deref())
        })
    }
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;

    use super::*;
    use crate::driver::Driver;
    use crate::handler::{BoundingBoxHandler, CountHandler};
    use crate::io::wkt::WktWriter;

    #[test]
    fn square_approximation() {
        let reader = CircleReader::try_new(vec![0.], vec![0.], vec![1.], 4).unwrap();
        let wkt = Driver::new(reader)
            .run(WktWriter::new(crate::io::wkt::WktWriterOptions {
                precision: 6,
                ..Default::default()
            }))
            .unwrap()
            .output;
        assert_eq!(
            wkt,
            vec![Some("POLYGON ((1 0, 0 1, -1 0, 0 -1, 1 0))".to_string())]
        );
    }

    #[test]
    fn rings_are_closed_with_n_plus_one_coords() {
        let reader =
            CircleReader::try_new(vec![10., f64::NAN], vec![20., 0.], vec![2., 1.], 32).unwrap();
        let counts = Driver::new(reader).run(CountHandler::new()).unwrap().output;
        assert_eq!(counts.per_feature[0].coords, 33);
        assert_eq!(counts.per_feature[0].rings, 1);
        assert_eq!(counts.per_feature[1].coords, 0);
    }

    #[test]
    fn bounding_box_touches_radius() {
        let reader = CircleReader::try_new(vec![10.], vec![20.], vec![2.], 64).unwrap();
        let bbox = Driver::new(reader)
            .run(BoundingBoxHandler::new())
            .unwrap()
            .output;
        assert_relative_eq!(bbox.xmin(), 8.);
        assert_relative_eq!(bbox.xmax(), 12.);
        assert_relative_eq!(bbox.ymin(), 18.);
        assert_relative_eq!(bbox.ymax(), 22.);
    }

    #[test]
    fn too_few_segments() {
        assert!(matches!(
            CircleReader::try_new(vec![0.], vec![0.], vec![1.], 2),
            Err(GeoStreamError::InvalidArgument(_))
        ));
    }
}
