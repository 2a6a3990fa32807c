use geo::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon,
};
use itertools::Itertools;

/// Serialize a geometry as canonical WKT, e.g. `POINT (4.8913 52.3684)`.
///
/// [`geo::Line`] is written as a `LINESTRING`, [`geo::Rect`] and [`geo::Triangle`] as a
/// `POLYGON`.
pub trait ToWkt {
    fn to_wkt(&self) -> String;
}

impl ToWkt for Geometry {
    fn to_wkt(&self) -> String {
        geometry_to_wkt(self)
    }
}

fn coord_to_wkt(coord: &Coord) -> String {
    format!("{} {}", coord.x, coord.y)
}

fn coords_to_wkt<'a>(coords: impl Iterator<Item = &'a Coord>) -> String {
    format!("({})", coords.map(coord_to_wkt).join(", "))
}

fn point_to_wkt(point: &Point) -> String {
    if point.x().is_nan() && point.y().is_nan() {
        return "POINT EMPTY".to_string();
    }
    format!("POINT ({})", coord_to_wkt(&point.0))
}

fn line_string_to_wkt(line_string: &LineString) -> String {
    if line_string.0.is_empty() {
        return "LINESTRING EMPTY".to_string();
    }
    format!("LINESTRING {}", coords_to_wkt(line_string.0.iter()))
}

fn polygon_rings(polygon: &Polygon) -> String {
    let mut rings = std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(|ring| coords_to_wkt(ring.0.iter()));
    format!("({})", rings.join(", "))
}

fn polygon_to_wkt(polygon: &Polygon) -> String {
    if polygon.exterior().0.is_empty() {
        return "POLYGON EMPTY".to_string();
    }
    format!("POLYGON {}", polygon_rings(polygon))
}

fn multi_point_to_wkt(multi_point: &MultiPoint) -> String {
    if multi_point.0.is_empty() {
        return "MULTIPOINT EMPTY".to_string();
    }
    let mut points = multi_point
        .0
        .iter()
        .map(|point| format!("({})", coord_to_wkt(&point.0)));
    format!("MULTIPOINT ({})", points.join(", "))
}

fn multi_line_string_to_wkt(multi_line_string: &MultiLineString) -> String {
    if multi_line_string.0.is_empty() {
        return "MULTILINESTRING EMPTY".to_string();
    }
    let mut lines = multi_line_string
        .0
        .iter()
        .map(|line| coords_to_wkt(line.0.iter()));
    format!("MULTILINESTRING ({})", lines.join(", "))
}

fn multi_polygon_to_wkt(multi_polygon: &MultiPolygon) -> String {
    if multi_polygon.0.is_empty() {
        return "MULTIPOLYGON EMPTY".to_string();
    }
    let mut polygons = multi_polygon.0.iter().map(polygon_rings);
    format!("MULTIPOLYGON ({})", polygons.join(", "))
}

fn geometry_collection_to_wkt(collection: &GeometryCollection) -> String {
    if collection.0.is_empty() {
        return "GEOMETRYCOLLECTION EMPTY".to_string();
    }
    let mut geometries = collection.0.iter().map(geometry_to_wkt);
    format!("GEOMETRYCOLLECTION ({})", geometries.join(", "))
}

fn geometry_to_wkt(geometry: &Geometry) -> String {
    match geometry {
        Geometry::Point(geom) => point_to_wkt(geom),
        Geometry::Line(geom) => line_string_to_wkt(&LineString::from(vec![geom.start, geom.end])),
        Geometry::LineString(geom) => line_string_to_wkt(geom),
        Geometry::Polygon(geom) => polygon_to_wkt(geom),
        Geometry::MultiPoint(geom) => multi_point_to_wkt(geom),
        Geometry::MultiLineString(geom) => multi_line_string_to_wkt(geom),
        Geometry::MultiPolygon(geom) => multi_polygon_to_wkt(geom),
        Geometry::GeometryCollection(geom) => geometry_collection_to_wkt(geom),
        Geometry::Rect(geom) => polygon_to_wkt(&geom.to_polygon()),
        Geometry::Triangle(geom) => polygon_to_wkt(&geom.to_polygon()),
    }
}
