//! An owned, in-memory geometry vector, for materializing a traversal and replaying it.

mod reader;
mod writer;

pub use reader::GeometryVectorReader;
pub use writer::GeometryVectorWriter;

use serde::{Deserialize, Serialize};

use crate::coord::Coord;
use crate::datatypes::{Dimension, GeometryType};

/// A single owned geometry.
///
/// Every geometry carries its own dimension; parts of a collection may differ from their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    /// `coord` is `None` for an empty point.
    Point {
        dimension: Dimension,
        coord: Option<Coord>,
    },
    LineString {
        dimension: Dimension,
        coords: Vec<Coord>,
    },
    /// The first ring is the exterior. Every ring is closed.
    Polygon {
        dimension: Dimension,
        rings: Vec<Vec<Coord>>,
    },
    MultiPoint {
        dimension: Dimension,
        parts: Vec<Geometry>,
    },
    MultiLineString {
        dimension: Dimension,
        parts: Vec<Geometry>,
    },
    MultiPolygon {
        dimension: Dimension,
        parts: Vec<Geometry>,
    },
    GeometryCollection {
        dimension: Dimension,
        parts: Vec<Geometry>,
    },
}

impl Geometry {
    pub fn geometry_type(&self) -> GeometryType {
        match self {
            Geometry::Point { .. } => GeometryType::Point,
            Geometry::LineString { .. } => GeometryType::LineString,
            Geometry::Polygon { .. } => GeometryType::Polygon,
            Geometry::MultiPoint { .. } => GeometryType::MultiPoint,
            Geometry::MultiLineString { .. } => GeometryType::MultiLineString,
            Geometry::MultiPolygon { .. } => GeometryType::MultiPolygon,
            Geometry::GeometryCollection { .. } => GeometryType::GeometryCollection,
        }
    }

    pub fn dimension(&self) -> Dimension {
        match self {
            Geometry::Point { dimension, .. }
            | Geometry::LineString { dimension, .. }
            | Geometry::Polygon { dimension, .. }
            | Geometry::MultiPoint { dimension, .. }
            | Geometry::MultiLineString { dimension, .. }
            | Geometry::MultiPolygon { dimension, .. }
            | Geometry::GeometryCollection { dimension, .. } => *dimension,
        }
    }

    /// The parts of a multi geometry or collection, or `None` for other types.
    pub fn parts(&self) -> Option<&[Geometry]> {
        match self {
            Geometry::MultiPoint { parts, .. }
            | Geometry::MultiLineString { parts, .. }
            | Geometry::MultiPolygon { parts, .. }
            | Geometry::GeometryCollection { parts, .. } => Some(parts),
            _ => None,
        }
    }

    /// The number of coordinates (points and linestrings), rings (polygons) or parts.
    pub fn size(&self) -> usize {
        match self {
            Geometry::Point { coord, .. } => usize::from(coord.is_some()),
            Geometry::LineString { coords, .. } => coords.len(),
            Geometry::Polygon { rings, .. } => rings.len(),
            other => other.parts().map_or(0, <[Geometry]>::len),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }
}

/// A vector of owned geometries with vector-level metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeometryVector {
    /// One entry per feature; `None` is a null feature.
    pub features: Vec<Option<Geometry>>,
    /// The type shared by every non-null feature, or `None` when mixed or unknown.
    pub geometry_type: Option<GeometryType>,
    /// The dimension covering every non-null feature.
    pub dimension: Option<Dimension>,
    pub srid: Option<u32>,
}

impl GeometryVector {
    /// Build a vector from its features, deriving the shared type and dimension.
    pub fn new(features: Vec<Option<Geometry>>) -> Self {
        let mut geometry_type = None;
        let mut dimension: Option<Dimension> = None;
        for (i, geom) in features.iter().flatten().enumerate() {
            geometry_type = match geometry_type {
                _ if i == 0 => Some(geom.geometry_type()),
                Some(t) if t == geom.geometry_type() => Some(t),
                _ => None,
            };
            dimension = Some(match dimension {
                Some(dim) => dim.union(geom.dimension()),
                None => geom.dimension(),
            });
        }
        Self {
            features,
            geometry_type,
            dimension,
            srid: None,
        }
    }

    pub fn with_srid(mut self, srid: Option<u32>) -> Self {
        self.srid = srid;
        self
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&Geometry>> + '_ {
        self.features.iter().map(Option::as_ref)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn vector_metadata() {
        let point = Geometry::Point {
            dimension: Dimension::XY,
            coord: Some(Coord::xy(1., 2.)),
        };
        let line = Geometry::LineString {
            dimension: Dimension::XYZ,
            coords: vec![Coord::xyz(0., 0., 0.), Coord::xyz(1., 1., 1.)],
        };

        let uniform = GeometryVector::new(vec![Some(point.clone()), None, Some(point.clone())]);
        assert_eq!(uniform.geometry_type, Some(GeometryType::Point));
        assert_eq!(uniform.dimension, Some(Dimension::XY));
        assert_eq!(uniform.len(), 3);

        let mixed = GeometryVector::new(vec![Some(point), Some(line.clone())]);
        assert_eq!(mixed.geometry_type, None);
        assert_eq!(mixed.dimension, Some(Dimension::XYZ));
        assert_eq!(line.size(), 2);

        let nulls = GeometryVector::new(vec![None]);
        assert_eq!(nulls.geometry_type, None);
        assert_eq!(nulls.dimension, None);
    }
}
