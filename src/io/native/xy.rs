use serde::{Deserialize, Serialize};

use crate::coord::Coord;
use crate::datatypes::{Dimension, GeometryType};
use crate::driver::{push_feature, FeatureSource};
use crate::error::{GeoStreamError, Result};
use crate::handler::{
    Continuation, Finish, GeometryMeta, Handler, HandlerResult, VectorMeta,
};
use crate::io::native::check_lengths;
use crate::propagate;

/// Points stored as parallel ordinate columns. A row whose ordinates are all NaN is an empty
/// point.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct XyColumns {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Option<Vec<f64>>,
    pub m: Option<Vec<f64>>,
}

impl XyColumns {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        Self {
            x,
            y,
            z: None,
            m: None,
        }
    }

    pub fn with_z(mut self, z: Vec<f64>) -> Self {
        self.z = Some(z);
        self
    }

    pub fn with_m(mut self, m: Vec<f64>) -> Self {
        self.m = Some(m);
        self
    }

    pub fn dimension(&self) -> Dimension {
        Dimension::from_flags(self.z.is_some(), self.m.is_some())
    }

    /// The number of rows, once the columns are known to have equal lengths.
    fn checked_len(&self) -> Result<usize> {
        let mut columns = vec![("x", self.x.len()), ("y", self.y.len())];
        if let Some(z) = &self.z {
            columns.push(("z", z.len()));
        }
        if let Some(m) = &self.m {
            columns.push(("m", m.len()));
        }
        check_lengths(&columns)
    }

    fn row(&self, i: usize) -> Coord {
        let mut coord = Coord::nan(self.dimension());
        let values = coord.as_mut_slice();
        values[0] = self.x[i];
        values[1] = self.y[i];
        let mut next = 2;
        for column in [&self.z, &self.m].into_iter().flatten() {
            values[next] = column[i];
            next += 1;
        }
        coord
    }

    fn push_row(&mut self, coord: &Coord) {
        self.x.push(coord.x());
        self.y.push(coord.y());
        if let Some(z) = &mut self.z {
            z.push(coord.z().unwrap_or(f64::NAN));
        }
        if let Some(m) = &mut self.m {
            m.push(coord.m().unwrap_or(f64::NAN));
        }
    }
}

/// Reads [XyColumns] as a vector of points.
#[derive(Debug)]
pub struct XyReader {
    columns: XyColumns,
    len: usize,
    next: usize,
}

impl XyReader {
    pub fn try_new(columns: XyColumns) -> Result<Self> {
        let len = columns.checked_len()?;
        Ok(Self {
            columns,
            len,
            next: 0,
        })
    }
}

impl FeatureSource for XyReader {
    fn vector_meta(&self) -> VectorMeta {
        VectorMeta::new(
            Some(GeometryType::Point),
            Some(self.columns.dimension()),
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
        let coord = self.columns.row(self.next);
        self.next += 1;

        push_feature(handler, feat_id, |handler| {
            let empty = coord.is_nan();
            let meta = GeometryMeta::new(
                GeometryType::Point,
                coord.dim(),
                Some(usize::from(!empty)),
            );
            propagate!(handler.geometry_start(&meta, None));
            if !empty {
                propagate!(handler.coord(&meta, &coord, 0));
            }
            handler.geometry_end(&meta, None)
        })
    }
}

/// Collects point features into [XyColumns].
///
/// Null features and empty points become rows of NaN. The z and m columns are present when any
/// feature has them.
#[derive(Debug, Default)]
pub struct XyWriter {
    rows: Vec<Coord>,
    current: Option<Coord>,
    dimension: Dimension,
}

impl XyWriter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Handler for XyWriter {
    fn vector_start(&mut self, meta: &VectorMeta) -> HandlerResult {
        self.rows.clear();
        self.dimension = Dimension::XY;
        if let Some(size) = meta.size {
            self.rows.try_reserve(size)?;
        }
        Ok(Continuation::Continue)
    }

    fn feature_start(&mut self, _feat_id: usize) -> HandlerResult {
        self.current = None;
        Ok(Continuation::Continue)
    }

    fn null_feature(&mut self, _feat_id: usize) -> HandlerResult {
        self.rows.push(Coord::nan(Dimension::XY));
        Ok(Continuation::Continue)
    }

    fn geometry_start(&mut self, meta: &GeometryMeta, _part_id: Option<usize>) -> HandlerResult {
        if meta.geometry_type != GeometryType::Point {
            return Err(GeoStreamError::IncorrectGeometryType(format!(
                "Can't write {} as a point",
                meta.geometry_type
            )));
        }
        self.dimension = self.dimension.union(meta.dimension);
        Ok(Continuation::Continue)
    }

    fn coord(&mut self, _meta: &GeometryMeta, coord: &Coord, _coord_id: usize) -> HandlerResult {
        self.current = Some(*coord);
        Ok(Continuation::Continue)
    }

    fn feature_end(&mut self, _feat_id: usize) -> HandlerResult {
        let row = self.current.take().unwrap_or(Coord::nan(Dimension::XY));
        self.rows.push(row);
        Ok(Continuation::Continue)
    }

    fn feature_abandoned(&mut self, feat_id: usize) {
        if self.rows.len() <= feat_id {
            self.rows.push(Coord::nan(Dimension::XY));
        }
    }
}

impl Finish for XyWriter {
    type Output = XyColumns;

    fn finish(self) -> Result<XyColumns> {
        let mut columns = XyColumns {
            x: Vec::with_capacity(self.rows.len()),
            y: Vec::with_capacity(self.rows.len()),
            z: self.dimension.has_z().then(Vec::new),
            m: self.dimension.has_m().then(Vec::new),
        };
        for row in &self.rows {
            columns.push_row(row);
        }
        Ok(columns)
    }
}
