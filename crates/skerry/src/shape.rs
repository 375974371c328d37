//! # Collision Shapes
//!
//! Three primitive shapes, one closed enum. Two of them are flat (they live
//! in the XY plane and ignore Z), the third is a full 3D box:
//!
//! ```text
//!  Circle                  Rectangle                 Aabb
//!    .-""-.                 ┌──────────┐ ← pos + (w,h)   ┌─────┐
//!   /  r   \                │          │                /     /│ d
//!  |   ●────|  ● = position │          │  h            ┌─────┐ │
//!   \      /                ●──────────┘               │  ●  │ /  ● = position (center)
//!    `-..-'                pos    w                    └─────┘
//! ```
//!
//! Only the `position` of a shape is ever moved at runtime; the collision
//! component copies the owner's world position into it every tick.
//!
//! ## Intersection Rules
//!
//! | a \ b      | Circle                  | Rectangle                  | Aabb          |
//! |------------|-------------------------|----------------------------|---------------|
//! | Circle     | `dist <= ra + rb`       | closest point `< r²`       | never         |
//! | Rectangle  | closest point `< r²`    | corner containment         | never         |
//! | Aabb       | never                   | never                      | axis overlap  |
//!
//! The rectangle test only checks whether a corner of one rectangle lies in
//! the other. Two rectangles crossing like a plus sign, with no corner inside
//! either, are reported as not intersecting.

use serde_json::Value;

use crate::error::{ConfigError, ConfigResult};
use crate::math::{Vec2, Vec3};

/// A collision primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Flat circle centered on `position`.
    Circle {
        position: Vec3,
        /// Pivot as a fraction of the radius, used when drawing.
        origin: Vec2,
        radius: f32,
    },
    /// Flat rectangle whose minimum corner is `position`.
    Rectangle {
        position: Vec3,
        /// Pivot as a fraction of the size, used when drawing.
        origin: Vec2,
        width: f32,
        height: f32,
    },
    /// Axis-aligned box centered on `position`.
    Aabb {
        position: Vec3,
        width: f32,
        height: f32,
        depth: f32,
    },
}

impl Shape {
    pub fn circle(radius: f32) -> Self {
        Self::Circle {
            position: Vec3::ZERO,
            origin: Vec2::ZERO,
            radius,
        }
    }

    pub fn rectangle(width: f32, height: f32) -> Self {
        Self::Rectangle {
            position: Vec3::ZERO,
            origin: Vec2::ZERO,
            width,
            height,
        }
    }

    pub fn aabb(width: f32, height: f32, depth: f32) -> Self {
        Self::Aabb {
            position: Vec3::ZERO,
            width,
            height,
            depth,
        }
    }

    /// Return a copy moved to `position`.
    pub fn at(mut self, position: Vec3) -> Self {
        self.set_position(position);
        self
    }

    pub fn position(&self) -> Vec3 {
        match self {
            Self::Circle { position, .. } | Self::Rectangle { position, .. } | Self::Aabb { position, .. } => {
                *position
            }
        }
    }

    pub fn set_position(&mut self, to: Vec3) {
        match self {
            Self::Circle { position, .. } | Self::Rectangle { position, .. } | Self::Aabb { position, .. } => {
                *position = to
            }
        }
    }

    /// Drawing offset derived from the pivot.
    pub fn offset(&self) -> Vec3 {
        match *self {
            Self::Circle { origin, radius, .. } => {
                Vec3::new(radius + radius * origin.x, radius + radius * origin.y, 0.0)
            }
            Self::Rectangle { origin, width, height, .. } => Vec3::new(width * origin.x, height * origin.y, 0.0),
            Self::Aabb { .. } => Vec3::ZERO,
        }
    }

    /// Lowercase tag, as used in entity-spec documents.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::Circle { .. } => "circle",
            Self::Rectangle { .. } => "rectangle",
            Self::Aabb { .. } => "aabb",
        }
    }

    /// Whether the two shapes overlap. Symmetric for every pair of variants.
    pub fn intersects(&self, other: &Shape) -> bool {
        match (*self, *other) {
            (Self::Circle { position: a, radius: ra, .. }, Self::Circle { position: b, radius: rb, .. }) => {
                a.distance(b) <= ra + rb
            }
            (
                Self::Circle { position, radius, .. },
                Self::Rectangle { position: corner, width, height, .. },
            )
            | (
                Self::Rectangle { position: corner, width, height, .. },
                Self::Circle { position, radius, .. },
            ) => {
                let (lo, hi) = rectangle_bounds(corner, width, height);
                circle_rectangle(position, radius, lo, hi)
            }
            (Self::Rectangle { .. }, Self::Rectangle { .. }) => {
                self.rectangle_corners().iter().any(|c| other.contains_point(*c))
                    || other.rectangle_corners().iter().any(|c| self.contains_point(*c))
            }
            (Self::Aabb { position: a, width: wa, height: ha, depth: da }, Self::Aabb { position: b, width: wb, height: hb, depth: db }) => {
                let (a_min, a_max) = (a - Vec3::new(wa, ha, da) / 2.0, a + Vec3::new(wa, ha, da) / 2.0);
                let (b_min, b_max) = (b - Vec3::new(wb, hb, db) / 2.0, b + Vec3::new(wb, hb, db) / 2.0);
                a_min.cmple(b_max).all() && a_max.cmpge(b_min).all()
            }
            _ => false,
        }
    }

    /// Whether `point` lies inside (or on the edge of) the shape.
    pub fn contains_point(&self, point: Vec3) -> bool {
        match *self {
            Self::Circle { position, radius, .. } => position.distance(point) <= radius,
            Self::Rectangle { position, width, height, .. } => {
                let (lo, hi) = rectangle_bounds(position, width, height);
                let p = point.truncate();
                p.cmpge(lo).all() && p.cmple(hi).all()
            }
            Self::Aabb { position, width, height, depth } => {
                let half = Vec3::new(width, height, depth) / 2.0;
                (point - position).abs().cmple(half).all()
            }
        }
    }

    fn rectangle_corners(&self) -> [Vec3; 4] {
        match *self {
            Self::Rectangle { position, width, height, .. } => {
                let (lo, hi) = rectangle_bounds(position, width, height);
                [
                    Vec3::new(lo.x, lo.y, position.z),
                    Vec3::new(hi.x, lo.y, position.z),
                    Vec3::new(lo.x, hi.y, position.z),
                    Vec3::new(hi.x, hi.y, position.z),
                ]
            }
            _ => [self.position(); 4],
        }
    }

    /// Build a shape from its JSON description.
    ///
    /// ```json
    /// { "type": "aabb", "width": 0.8, "height": 1.2, "depth": 0.8 }
    /// ```
    pub fn from_json(json: &Value) -> ConfigResult<Self> {
        let tag = json
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| missing("shape", "type"))?;

        let number = |field: &str| -> ConfigResult<f32> {
            match json.get(field) {
                None => Err(missing(tag, field)),
                Some(v) => v.as_f64().map(|n| n as f32).ok_or_else(|| ConfigError::InvalidField {
                    type_tag: tag.to_string(),
                    field: field.to_string(),
                    reason: format!("expected a number, got {v}"),
                }),
            }
        };
        let vec2 = |field: &str| -> Vec2 {
            json.get(field)
                .map(|v| {
                    let axis = |k: &str| v.get(k).and_then(Value::as_f64).unwrap_or(0.0) as f32;
                    Vec2::new(axis("x"), axis("y"))
                })
                .unwrap_or(Vec2::ZERO)
        };
        let position = json.get("position").map(read_vec3).unwrap_or(Vec3::ZERO);

        let shape = match tag.to_ascii_lowercase().as_str() {
            "circle" | "circle2d" => Self::Circle {
                position,
                origin: vec2("origin"),
                radius: number("radius")?,
            },
            "rectangle" | "rectangle2d" => Self::Rectangle {
                position,
                origin: vec2("origin"),
                width: number("width")?,
                height: number("height")?,
            },
            "aabb" => Self::Aabb {
                position,
                width: number("width")?,
                height: number("height")?,
                depth: number("depth")?,
            },
            _ => return Err(ConfigError::UnsupportedShape(tag.to_string())),
        };
        Ok(shape)
    }
}

/// Min and max corners of a rectangle in the XY plane. A negative width or
/// height extends the rectangle to the left of / below `position`.
fn rectangle_bounds(position: Vec3, width: f32, height: f32) -> (Vec2, Vec2) {
    let start = position.truncate();
    let end = start + Vec2::new(width, height);
    (start.min(end), start.max(end))
}

/// Squared distance from the circle center to the clamped closest point of the rectangle.
fn circle_rectangle(center: Vec3, radius: f32, lo: Vec2, hi: Vec2) -> bool {
    let closest = center.truncate().clamp(lo, hi);
    center.truncate().distance_squared(closest) < radius * radius
}

/// Read a `{x, y, z}` object; absent axes are zero.
pub(crate) fn read_vec3(value: &Value) -> Vec3 {
    let axis = |k: &str| value.get(k).and_then(Value::as_f64).unwrap_or(0.0) as f32;
    Vec3::new(axis("x"), axis("y"), axis("z"))
}

fn missing(type_tag: &str, field: &str) -> ConfigError {
    ConfigError::MissingField {
        kind: "shape",
        type_tag: type_tag.to_string(),
        field: field.to_string(),
    }
}
