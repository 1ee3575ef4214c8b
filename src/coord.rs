use serde::{Deserialize, Serialize};

use crate::datatypes::Dimension;

/// A single coordinate with between two and four ordinates.
///
/// The ordinates are stored in `x, y, [z], [m]` order; which of z and m are present is
/// determined by the coordinate's [Dimension].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Coord {
    values: [f64; 4],
    dim: Dimension,
}

impl Coord {
    /// A two-dimensional coordinate.
    pub fn xy(x: f64, y: f64) -> Self {
        Self {
            values: [x, y, f64::NAN, f64::NAN],
            dim: Dimension::XY,
        }
    }

    pub fn xyz(x: f64, y: f64, z: f64) -> Self {
        Self {
            values: [x, y, z, f64::NAN],
            dim: Dimension::XYZ,
        }
    }

    pub fn xym(x: f64, y: f64, m: f64) -> Self {
        Self {
            values: [x, y, m, f64::NAN],
            dim: Dimension::XYM,
        }
    }

    pub fn xyzm(x: f64, y: f64, z: f64, m: f64) -> Self {
        Self {
            values: [x, y, z, m],
            dim: Dimension::XYZM,
        }
    }

    /// Construct from ordinates in `x, y, [z], [m]` order.
    ///
    /// Returns `None` when `ordinates.len()` does not equal `dim.size()`.
    pub fn from_slice(ordinates: &[f64], dim: Dimension) -> Option<Self> {
        if ordinates.len() != dim.size() {
            return None;
        }
        let mut values = [f64::NAN; 4];
        values[..ordinates.len()].copy_from_slice(ordinates);
        Some(Self { values, dim })
    }

    /// A coordinate of the given dimension with every ordinate set to NaN.
    pub fn nan(dim: Dimension) -> Self {
        Self {
            values: [f64::NAN; 4],
            dim,
        }
    }

    pub fn dim(&self) -> Dimension {
        self.dim
    }

    pub fn x(&self) -> f64 {
        self.values[0]
    }

    pub fn y(&self) -> f64 {
        self.values[1]
    }

    pub fn z(&self) -> Option<f64> {
        self.dim.has_z().then_some(self.values[2])
    }

    pub fn m(&self) -> Option<f64> {
        match self.dim {
            Dimension::XYM => Some(self.values[2]),
            Dimension::XYZM => Some(self.values[3]),
            _ => None,
        }
    }

    /// The ordinates of this coordinate, in `x, y, [z], [m]` order.
    pub fn as_slice(&self) -> &[f64] {
        &self.values[..self.dim.size()]
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        let n = self.dim.size();
        &mut self.values[..n]
    }

    /// Whether every ordinate is NaN. This is how WKB and the XY columns encode an empty point.
    pub fn is_nan(&self) -> bool {
        self.as_slice().iter().all(|v| v.is_nan())
    }

    /// Ordinate-wise equality where NaN equals NaN.
    pub(crate) fn same_as(&self, other: &Coord) -> bool {
        self.dim == other.dim
            && self
                .as_slice()
                .iter()
                .zip(other.as_slice())
                .all(|(a, b)| a == b || (a.is_nan() && b.is_nan()))
    }
}

impl PartialEq for Coord {
    fn eq(&self, other: &Self) -> bool {
        self.dim == other.dim && self.as_slice() == other.as_slice()
    }
}

impl From<geo::Coord> for Coord {
    fn from(value: geo::Coord) -> Self {
        Coord::xy(value.x, value.y)
    }
}

impl From<Coord> for geo::Coord {
    /// Only the first two dimensions will be kept.
    fn from(value: Coord) -> Self {
        geo::Coord {
            x: value.x(),
            y: value.y(),
        }
    }
}
