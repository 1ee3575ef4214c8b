//! Convert between owned geometries and [`geo`] geometries.

mod scalar;

pub use scalar::{
    coord_to_geo, geometry_collection_to_geo, geometry_to_geo, line_string_to_geo,
    multi_line_string_to_geo, multi_point_to_geo, multi_polygon_to_geo, point_to_geo,
    polygon_to_geo,
};

use crate::coord::Coord;
use crate::datatypes::Dimension;
use crate::io::geometry_vector::{Geometry, GeometryVector};

fn coords_from_geo(line_string: &geo::LineString) -> Vec<Coord> {
    line_string.0.iter().map(|c| Coord::from(*c)).collect()
}

fn polygon_from_geo(polygon: &geo::Polygon) -> Geometry {
    let mut rings = vec![];
    if !polygon.exterior().0.is_empty() {
        rings.push(coords_from_geo(polygon.exterior()));
        rings.extend(polygon.interiors().iter().map(coords_from_geo));
    }
    Geometry::Polygon {
        dimension: Dimension::XY,
        rings,
    }
}

impl From<&geo::Geometry> for Geometry {
    /// Lines become linestrings; rectangles and triangles become polygons.
    fn from(value: &geo::Geometry) -> Self {
        let dimension = Dimension::XY;
        let point = |p: &geo::Point| Geometry::Point {
            dimension,
            coord: Some(Coord::from(p.0)),
        };
        let line_string = |ls: &geo::LineString| Geometry::LineString {
            dimension,
            coords: coords_from_geo(ls),
        };

        match value {
            geo::Geometry::Point(p) => point(p),
            geo::Geometry::Line(line) => Geometry::LineString {
                dimension,
                coords: vec![Coord::from(line.start), Coord::from(line.end)],
            },
            geo::Geometry::LineString(ls) => line_string(ls),
            geo::Geometry::Polygon(polygon) => polygon_from_geo(polygon),
            geo::Geometry::MultiPoint(mp) => Geometry::MultiPoint {
                dimension,
                parts: mp.iter().map(point).collect(),
            },
            geo::Geometry::MultiLineString(mls) => Geometry::MultiLineString {
                dimension,
                parts: mls.iter().map(line_string).collect(),
            },
            geo::Geometry::MultiPolygon(mp) => Geometry::MultiPolygon {
                dimension,
                parts: mp.iter().map(polygon_from_geo).collect(),
            },
            geo::Geometry::GeometryCollection(gc) => Geometry::GeometryCollection {
                dimension,
                parts: gc.iter().map(Geometry::from).collect(),
            },
            geo::Geometry::Rect(rect) => polygon_from_geo(&rect.to_polygon()),
            geo::Geometry::Triangle(triangle) => polygon_from_geo(&triangle.to_polygon()),
        }
    }
}

impl FromIterator<Option<geo::Geometry>> for GeometryVector {
    fn from_iter<T: IntoIterator<Item = Option<geo::Geometry>>>(iter: T) -> Self {
        GeometryVector::new(
            iter.into_iter()
                .map(|geom| geom.as_ref().map(Geometry::from))
                .collect(),
        )
    }
}
