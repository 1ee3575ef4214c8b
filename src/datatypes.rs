//! Geometry type and dimension definitions shared by every reader, writer and handler.

use std::fmt::Display;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};

/// The geometry types of the simple features model.
///
/// The discriminants are the base WKB type codes.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[repr(u32)]
pub enum GeometryType {
    /// A Point
    Point = 1,
    /// A LineString
    LineString = 2,
    /// A Polygon
    Polygon = 3,
    /// A MultiPoint
    MultiPoint = 4,
    /// A MultiLineString
    MultiLineString = 5,
    /// A MultiPolygon
    MultiPolygon = 6,
    /// A GeometryCollection
    GeometryCollection = 7,
}

impl GeometryType {
    /// The upper case WKT keyword for this type.
    pub fn wkt_keyword(&self) -> &'static str {
        match self {
            GeometryType::Point => "POINT",
            GeometryType::LineString => "LINESTRING",
            GeometryType::Polygon => "POLYGON",
            GeometryType::MultiPoint => "MULTIPOINT",
            GeometryType::MultiLineString => "MULTILINESTRING",
            GeometryType::MultiPolygon => "MULTIPOLYGON",
            GeometryType::GeometryCollection => "GEOMETRYCOLLECTION",
        }
    }

    /// Parse a WKT keyword, ignoring ASCII case.
    pub fn from_wkt_keyword(keyword: &str) -> Option<Self> {
        [
            GeometryType::Point,
            GeometryType::LineString,
            GeometryType::Polygon,
            GeometryType::MultiPoint,
            GeometryType::MultiLineString,
            GeometryType::MultiPolygon,
            GeometryType::GeometryCollection,
        ]
        .into_iter()
        .find(|t| t.wkt_keyword().eq_ignore_ascii_case(keyword))
    }

    /// Whether the parts of this geometry are themselves geometries.
    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            GeometryType::MultiPoint
                | GeometryType::MultiLineString
                | GeometryType::MultiPolygon
                | GeometryType::GeometryCollection
        )
    }

    /// The type every part of a multi geometry must have.
    ///
    /// Returns `None` for single geometries and for geometry collections, whose parts may be of
    /// any type.
    pub fn child_type(&self) -> Option<GeometryType> {
        match self {
            GeometryType::MultiPoint => Some(GeometryType::Point),
            GeometryType::MultiLineString => Some(GeometryType::LineString),
            GeometryType::MultiPolygon => Some(GeometryType::Polygon),
            _ => None,
        }
    }
}

impl Display for GeometryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wkt_keyword())
    }
}

/// The coordinate dimension of a geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Dimension {
    /// Two-dimensional.
    #[default]
    XY,

    /// Three-dimensional.
    XYZ,

    /// XYM (2D with measure).
    XYM,

    /// XYZM (3D with measure).
    XYZM,
}

impl Dimension {
    /// Construct from flags for the presence of Z and M ordinates.
    pub fn from_flags(has_z: bool, has_m: bool) -> Self {
        match (has_z, has_m) {
            (false, false) => Dimension::XY,
            (true, false) => Dimension::XYZ,
            (false, true) => Dimension::XYM,
            (true, true) => Dimension::XYZM,
        }
    }

    /// Returns the number of dimensions.
    pub fn size(&self) -> usize {
        match self {
            Dimension::XY => 2,
            Dimension::XYZ => 3,
            Dimension::XYM => 3,
            Dimension::XYZM => 4,
        }
    }

    pub fn has_z(&self) -> bool {
        matches!(self, Dimension::XYZ | Dimension::XYZM)
    }

    pub fn has_m(&self) -> bool {
        matches!(self, Dimension::XYM | Dimension::XYZM)
    }

    /// The smallest dimension that contains both `self` and `other`.
    pub fn union(&self, other: Dimension) -> Dimension {
        Dimension::from_flags(
            self.has_z() || other.has_z(),
            self.has_m() || other.has_m(),
        )
    }

    /// The WKT suffix written after the geometry keyword.
    pub(crate) fn wkt_suffix(&self) -> &'static str {
        match self {
            Dimension::XY => "",
            Dimension::XYZ => " Z",
            Dimension::XYM => " M",
            Dimension::XYZM => " ZM",
        }
    }
}

impl Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dimension::XY => write!(f, "XY"),
            Dimension::XYZ => write!(f, "XYZ"),
            Dimension::XYM => write!(f, "XYM"),
            Dimension::XYZM => write!(f, "XYZM"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn geometry_type_codes() {
        assert_eq!(u32::from(GeometryType::Point), 1);
        assert_eq!(u32::from(GeometryType::GeometryCollection), 7);
        assert_eq!(
            GeometryType::try_from(3u32).unwrap(),
            GeometryType::Polygon
        );
        assert!(GeometryType::try_from(0u32).is_err());
        assert!(GeometryType::try_from(8u32).is_err());
    }

    #[test]
    fn keywords() {
        assert_eq!(
            GeometryType::from_wkt_keyword("multiLineString"),
            Some(GeometryType::MultiLineString)
        );
        assert_eq!(GeometryType::from_wkt_keyword("CIRCULARSTRING"), None);
        assert_eq!(GeometryType::MultiPolygon.to_string(), "MULTIPOLYGON");
    }

    #[test]
    fn dimension_flags() {
        let dims = [
            Dimension::XY,
            Dimension::XYZ,
            Dimension::XYM,
            Dimension::XYZM,
        ];
        for dim in dims {
            assert_eq!(Dimension::from_flags(dim.has_z(), dim.has_m()), dim);
        }
        assert_eq!(Dimension::XYZ.union(Dimension::XYM), Dimension::XYZM);
        assert_eq!(Dimension::XYM.size(), 3);
    }
}
