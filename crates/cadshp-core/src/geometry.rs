//! Mapping of GeoJSON geometries to drawing primitives.
//!
//! | Geometry | Primitives |
//! |---|---|
//! | Point | one circle |
//! | LineString | one line (2 positions) or one open polyline (more) |
//! | Polygon | one closed polyline per ring; holes are not subtracted |
//! | MultiPoint | one circle per point |
//! | MultiLineString | the LineString rule per component |
//! | MultiPolygon | one closed polyline per ring of every polygon |
//!
//! Every position is padded to three dimensions (missing Z is `0`) and multiplied by
//! the scale factor. Planning is pure; [`emit_primitives`] then creates the entities
//! and attaches them to a layer.

use cadshp_core_common::{EntityEditor, Handle, Point3, PolylineFlags};
use geojson::{Geometry, Value};
use log::{error, warn};
use serde::Serialize;

use crate::error::{ContextExt, Result};
use crate::options::ImportOptions;

/// One entity creation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Primitive {
    Circle { center: Point3, radius: f64 },
    Line { start: Point3, end: Point3 },
    Polyline { vertices: Vec<Point3>, flags: PolylineFlags },
}

/// Primitives planned for one geometry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryPlan {
    pub primitives: Vec<Primitive>,
    /// Parts that produced nothing: unsupported kinds and degenerate lines.
    pub skipped: usize,
}

/// Translates geometries into primitives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryMapper {
    scale: f64,
    point_radius: f64,
}

impl GeometryMapper {
    #[must_use]
    pub const fn new(scale: f64, point_radius: f64) -> Self {
        Self {
            scale,
            point_radius,
        }
    }

    #[must_use]
    pub fn from_options(options: &ImportOptions) -> Self {
        Self::new(options.scale, options.point_radius)
    }

    /// Pads a position to 3D and applies the scale.
    ///
    /// Ordinates beyond the third (measures) are ignored.
    #[must_use]
    pub fn to_point(&self, position: &[f64]) -> Point3 {
        let ordinate = |i: usize| position.get(i).copied().unwrap_or(0.0) * self.scale;
        Point3::new(ordinate(0), ordinate(1), ordinate(2))
    }

    /// Plans the primitives of a geometry without touching the drawing.
    #[must_use]
    pub fn plan(&self, geometry: &Geometry) -> GeometryPlan {
        let mut plan = GeometryPlan::default();
        self.plan_value(&geometry.value, &mut plan);
        plan
    }

    fn plan_value(&self, value: &Value, plan: &mut GeometryPlan) {
        match value {
            Value::Point(position) => self.plan_point(position, plan),
            Value::MultiPoint(positions) => {
                for position in positions {
                    self.plan_point(position, plan);
                }
            },
            Value::LineString(positions) => self.plan_line(positions, plan),
            Value::MultiLineString(lines) => {
                for positions in lines {
                    self.plan_line(positions, plan);
                }
            },
            Value::Polygon(rings) => self.plan_rings(rings, plan),
            Value::MultiPolygon(polygons) => {
                for rings in polygons {
                    self.plan_rings(rings, plan);
                }
            },
            Value::GeometryCollection(members) => {
                error!(
                    "Unsupported geometry type 'GeometryCollection' ({} members), no entities created",
                    members.len()
                );
                plan.skipped += 1;
            },
        }
    }

    fn plan_point(&self, position: &[f64], plan: &mut GeometryPlan) {
        plan.primitives.push(Primitive::Circle {
            center: self.to_point(position),
            radius: self.point_radius,
        });
    }

    fn plan_line(&self, positions: &[Vec<f64>], plan: &mut GeometryPlan) {
        match positions {
            [] | [_] => {
                warn!(
                    "LineString with {} position(s) cannot be drawn, skipping",
                    positions.len()
                );
                plan.skipped += 1;
            },
            [start, end] => plan.primitives.push(Primitive::Line {
                start: self.to_point(start),
                end: self.to_point(end),
            }),
            _ => plan.primitives.push(Primitive::Polyline {
                vertices: positions.iter().map(|p| self.to_point(p)).collect(),
                flags: PolylineFlags::OPEN,
            }),
        }
    }

    fn plan_rings(&self, rings: &[Vec<Vec<f64>>], plan: &mut GeometryPlan) {
        for ring in rings {
            if ring.is_empty() {
                plan.skipped += 1;
                continue;
            }
            plan.primitives.push(Primitive::Polyline {
                vertices: ring.iter().map(|p| self.to_point(p)).collect(),
                flags: PolylineFlags::CLOSED,
            });
        }
    }
}

/// Creates the planned primitives and attaches each one to `layer`.
///
/// # Errors
///
/// Returns a host error when the editor rejects a creation or the back-reference.
pub async fn emit_primitives<E>(
    editor: &mut E,
    layer: Handle,
    primitives: Vec<Primitive>,
) -> Result<Vec<Handle>>
where
    E: EntityEditor + ?Sized,
{
    let mut handles = Vec::with_capacity(primitives.len());
    for primitive in primitives {
        let handle = match primitive {
            Primitive::Circle { center, radius } => editor
                .add_circle(center, radius)
                .await
                .with_host_context("add circle")?,
            Primitive::Line { start, end } => editor
                .add_line(start, end)
                .await
                .with_host_context("add line")?,
            Primitive::Polyline { vertices, flags } => editor
                .add_polyline(vertices, flags)
                .await
                .with_host_context("add polyline")?,
        };
        editor
            .set_layer_ref(handle, layer)
            .await
            .with_host_context("set entity layer")?;
        handles.push(handle);
    }
    Ok(handles)
}
