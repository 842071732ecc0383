//! Conversion of shapefile shapes into `GeoJSON` geometries.

use geojson::{Geometry, Value};
use log::warn;
use shapefile::{Point, PointM, PointZ, PolygonRing, Shape};

/// A shapefile point type that can be written as a `GeoJSON` position.
///
/// Measures are dropped; Z is kept.
pub(crate) trait ToPosition {
    fn to_position(&self) -> Vec<f64>;
}

impl ToPosition for Point {
    fn to_position(&self) -> Vec<f64> {
        vec![self.x, self.y]
    }
}

impl ToPosition for PointM {
    fn to_position(&self) -> Vec<f64> {
        vec![self.x, self.y]
    }
}

impl ToPosition for PointZ {
    fn to_position(&self) -> Vec<f64> {
        vec![self.x, self.y, self.z]
    }
}

/// Converts a shape into a geometry, `None` for null and unsupported shapes.
pub(crate) fn shape_to_geometry(shape: &Shape) -> Option<Geometry> {
    let value = match shape {
        Shape::NullShape => return None,
        Shape::Point(p) => Value::Point(p.to_position()),
        Shape::PointM(p) => Value::Point(p.to_position()),
        Shape::PointZ(p) => Value::Point(p.to_position()),
        Shape::Multipoint(m) => multipoint(m.points()),
        Shape::MultipointM(m) => multipoint(m.points()),
        Shape::MultipointZ(m) => multipoint(m.points()),
        Shape::Polyline(l) => polyline(l.parts()),
        Shape::PolylineM(l) => polyline(l.parts()),
        Shape::PolylineZ(l) => polyline(l.parts()),
        Shape::Polygon(p) => polygon(p.rings()),
        Shape::PolygonM(p) => polygon(p.rings()),
        Shape::PolygonZ(p) => polygon(p.rings()),
        _ => {
            warn!("Multipatch shapes are not supported, feature has no geometry");
            return None;
        },
    };

    let bbox = match &value {
        Value::LineString(_)
        | Value::MultiLineString(_)
        | Value::Polygon(_)
        | Value::MultiPolygon(_) => bbox_2d(&value),
        _ => None,
    };
    Some(Geometry {
        bbox,
        value,
        foreign_members: None,
    })
}

fn positions<P: ToPosition>(points: &[P]) -> Vec<Vec<f64>> {
    points.iter().map(ToPosition::to_position).collect()
}

fn multipoint<P: ToPosition>(points: &[P]) -> Value {
    match points {
        [single] => Value::Point(single.to_position()),
        _ => Value::MultiPoint(positions(points)),
    }
}

fn polyline<P: ToPosition>(parts: &[Vec<P>]) -> Value {
    match parts {
        [single] => Value::LineString(positions(single)),
        _ => Value::MultiLineString(parts.iter().map(|part| positions(part)).collect()),
    }
}

/// Groups rings into polygons.
///
/// Every outer ring starts a polygon and inner rings attach to the latest one. An
/// inner ring seen before any outer ring starts a polygon of its own.
fn polygon<P: ToPosition>(rings: &[PolygonRing<P>]) -> Value {
    let mut polygons: Vec<Vec<Vec<Vec<f64>>>> = Vec::new();
    for ring in rings {
        match ring {
            PolygonRing::Outer(points) => polygons.push(vec![positions(points)]),
            PolygonRing::Inner(points) => match polygons.last_mut() {
                Some(polygon) => polygon.push(positions(points)),
                None => polygons.push(vec![positions(points)]),
            },
        }
    }

    if polygons.len() == 1 {
        Value::Polygon(polygons.remove(0))
    } else {
        Value::MultiPolygon(polygons)
    }
}

/// Planar bounding box `[min_x, min_y, max_x, max_y]` of a geometry.
fn bbox_2d(value: &Value) -> Option<Vec<f64>> {
    let mut bounds: Option<[f64; 4]> = None;
    let mut extend = |position: &Vec<f64>| {
        let (Some(&x), Some(&y)) = (position.first(), position.get(1)) else {
            return;
        };
        let b = bounds.get_or_insert([x, y, x, y]);
        b[0] = b[0].min(x);
        b[1] = b[1].min(y);
        b[2] = b[2].max(x);
        b[3] = b[3].max(y);
    };

    match value {
        Value::LineString(line) => line.iter().for_each(&mut extend),
        Value::MultiLineString(lines) => lines.iter().flatten().for_each(&mut extend),
        Value::Polygon(rings) => rings.iter().flatten().for_each(&mut extend),
        Value::MultiPolygon(polygons) => polygons.iter().flatten().flatten().for_each(&mut extend),
        _ => {},
    }
    bounds.map(Vec::from)
}
