use crate::coord::Coord;
use crate::error::{GeoStreamError, Result};
use crate::io::geometry_vector::Geometry;

/// Convert a coordinate to a [`geo::Coord`].
///
/// Only the first two dimensions will be kept.
pub fn coord_to_geo(coord: &Coord) -> geo::Coord {
    geo::Coord {
        x: coord.x(),
        y: coord.y(),
    }
}

fn line_string_from_coords(coords: &[Coord]) -> geo::LineString {
    geo::LineString::new(coords.iter().map(coord_to_geo).collect())
}

fn unexpected(expected: &str, found: &Geometry) -> GeoStreamError {
    GeoStreamError::IncorrectGeometryType(format!(
        "Expected {expected} but found {}",
        found.geometry_type()
    ))
}

/// Convert a Point to a [`geo::Point`].
///
/// Only the first two dimensions will be kept. [`geo`] has no empty point, so empty points are
/// an error.
pub fn point_to_geo(point: &Geometry) -> Result<geo::Point> {
    match point {
        Geometry::Point {
            coord: Some(coord), ..
        } => Ok(geo::Point(coord_to_geo(coord))),
        Geometry::Point { coord: None, .. } => Err(GeoStreamError::IncorrectGeometryType(
            "Can't convert an empty point to geo".to_string(),
        )),
        other => Err(unexpected("POINT", other)),
    }
}

/// Convert a LineString to a [`geo::LineString`].
///
/// Only the first two dimensions will be kept.
pub fn line_string_to_geo(line_string: &Geometry) -> Result<geo::LineString> {
    match line_string {
        Geometry::LineString { coords, .. } => Ok(line_string_from_coords(coords)),
        other => Err(unexpected("LINESTRING", other)),
    }
}

/// Convert a Polygon to a [`geo::Polygon`].
///
/// Only the first two dimensions will be kept.
pub fn polygon_to_geo(polygon: &Geometry) -> Result<geo::Polygon> {
    match polygon {
        Geometry::Polygon { rings, .. } => {
            let mut rings = rings.iter().map(|ring| line_string_from_coords(ring));
            let exterior = rings.next().unwrap_or_else(|| geo::LineString::new(vec![]));
            Ok(geo::Polygon::new(exterior, rings.collect()))
        }
        other => Err(unexpected("POLYGON", other)),
    }
}

fn parts<'a>(geometry: &'a Geometry, expected: &str) -> Result<&'a [Geometry]> {
    geometry.parts().ok_or_else(|| unexpected(expected, geometry))
}

/// Convert a MultiPoint to a [`geo::MultiPoint`].
///
/// Only the first two dimensions will be kept.
pub fn multi_point_to_geo(multi_point: &Geometry) -> Result<geo::MultiPoint> {
    let points = parts(multi_point, "MULTIPOINT")?
        .iter()
        .map(point_to_geo)
        .collect::<Result<Vec<_>>>()?;
    Ok(geo::MultiPoint::new(points))
}

/// Convert a MultiLineString to a [`geo::MultiLineString`].
///
/// Only the first two dimensions will be kept.
pub fn multi_line_string_to_geo(multi_line_string: &Geometry) -> Result<geo::MultiLineString> {
    let lines = parts(multi_line_string, "MULTILINESTRING")?
        .iter()
        .map(line_string_to_geo)
        .collect::<Result<Vec<_>>>()?;
    Ok(geo::MultiLineString::new(lines))
}

/// Convert a MultiPolygon to a [`geo::MultiPolygon`].
///
/// Only the first two dimensions will be kept.
pub fn multi_polygon_to_geo(multi_polygon: &Geometry) -> Result<geo::MultiPolygon> {
    let polygons = parts(multi_polygon, "MULTIPOLYGON")?
        .iter()
        .map(polygon_to_geo)
        .collect::<Result<Vec<_>>>()?;
    Ok(geo::MultiPolygon::new(polygons))
}

/// Convert any Geometry to a [`geo::Geometry`].
///
/// Only the first two dimensions will be kept.
pub fn geometry_to_geo(geometry: &Geometry) -> Result<geo::Geometry> {
    Ok(match geometry {
        Geometry::Point { .. } => geo::Geometry::Point(point_to_geo(geometry)?),
        Geometry::LineString { .. } => geo::Geometry::LineString(line_string_to_geo(geometry)?),
        Geometry::Polygon { .. } => geo::Geometry::Polygon(polygon_to_geo(geometry)?),
        Geometry::MultiPoint { .. } => geo::Geometry::MultiPoint(multi_point_to_geo(geometry)?),
        Geometry::MultiLineString { .. } => {
            geo::Geometry::MultiLineString(multi_line_string_to_geo(geometry)?)
        }
        Geometry::MultiPolygon { .. } => {
            geo::Geometry::MultiPolygon(multi_polygon_to_geo(geometry)?)
        }
        Geometry::GeometryCollection { .. } => {
            geo::Geometry::GeometryCollection(geometry_collection_to_geo(geometry)?)
        }
    })
}

/// Convert a GeometryCollection to a [`geo::GeometryCollection`].
///
/// Only the first two dimensions will be kept.
pub fn geometry_collection_to_geo(collection: &Geometry) -> Result<geo::GeometryCollection> {
    let geometries = parts(collection, "GEOMETRYCOLLECTION")?
        .iter()
        .map(geometry_to_geo)
        .collect::<Result<Vec<_>>>()?;
    Ok(geo::GeometryCollection::new_from(geometries))
}
