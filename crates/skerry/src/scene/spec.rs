//! Entity-spec documents.
//!
//! ```json
//! {
//!   "name": "point_0",
//!   "transform": { "position": { "x": 2, "y": 0.5 }, "rotation": { "y": -0.785 }, "scale": { "x": 0.25, "y": 0.25, "z": 0.25 } },
//!   "components": [ { "type": "cube", "name": "point_0_cube", "materialName": "point" } ],
//!   "behaviors":  [ { "type": "rotation", "name": "spin", "rotation": { "y": 1.5 } } ],
//!   "children":   []
//! }
//! ```
//!
//! Component and behavior entries stay raw JSON: their shape depends on the
//! `type` tag and is checked by the [`Registry`](crate::registry::Registry)
//! builders.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigResult;
use crate::math::{Transform, Vec3};

/// A vector where every axis is optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialVec3 {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f32>,
}

impl PartialVec3 {
    /// Fill absent axes from `fallback`.
    pub fn or(&self, fallback: Vec3) -> Vec3 {
        Vec3::new(
            self.x.unwrap_or(fallback.x),
            self.y.unwrap_or(fallback.y),
            self.z.unwrap_or(fallback.z),
        )
    }
}

impl From<Vec3> for PartialVec3 {
    fn from(v: Vec3) -> Self {
        Self {
            x: Some(v.x),
            y: Some(v.y),
            z: Some(v.z),
        }
    }
}

/// Transform section of a spec. Position and rotation default to 0, scale to 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformSpec {
    pub position: PartialVec3,
    pub rotation: PartialVec3,
    pub scale: PartialVec3,
}

impl TransformSpec {
    pub fn to_transform(&self) -> Transform {
        Transform {
            position: self.position.or(Vec3::ZERO),
            rotation: self.rotation.or(Vec3::ZERO),
            scale: self.scale.or(Vec3::ONE),
        }
    }
}

impl From<Transform> for TransformSpec {
    fn from(t: Transform) -> Self {
        Self {
            position: t.position.into(),
            rotation: t.rotation.into(),
            scale: t.scale.into(),
        }
    }
}

/// One object and its subtree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitySpec {
    pub name: String,
    #[serde(default)]
    pub transform: TransformSpec,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub behaviors: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<EntitySpec>,
}

impl EntitySpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn from_json(json: &Value) -> ConfigResult<Self> {
        Ok(Self::deserialize(json)?)
    }

    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform.into();
        self
    }

    pub fn with_component(mut self, component: Value) -> Self {
        self.components.push(component);
        self
    }

    pub fn with_behavior(mut self, behavior: Value) -> Self {
        self.behaviors.push(behavior);
        self
    }

    pub fn with_child(mut self, child: EntitySpec) -> Self {
        self.children.push(child);
        self
    }

    /// Number of objects in this subtree, including itself.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(EntitySpec::count).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn partial_transform_fills_defaults() {
        let spec = EntitySpec::from_json(&json!({
            "name": "a",
            "transform": { "position": { "y": 2 }, "rotation": { "y": -0.5 }, "scale": { "x": 0.5 } }
        }))
        .unwrap();
        let t = spec.transform.to_transform();
        assert_eq!(t.position, Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(t.rotation, Vec3::new(0.0, -0.5, 0.0));
        assert_eq!(t.scale, Vec3::new(0.5, 1.0, 1.0));
    }

    #[test]
    fn nested_children_parse() {
        let spec = EntitySpec::from_json_str(
            r#"{ "name": "root", "children": [ { "name": "a", "children": [ { "name": "b" } ] }, { "name": "c" } ] }"#,
        )
        .unwrap();
        assert_eq!(spec.count(), 4);
        assert_eq!(spec.children[0].children[0].name, "b");
        assert_eq!(spec.transform.to_transform(), Transform::IDENTITY);
    }

    #[test]
    fn name_is_required() {
        assert!(EntitySpec::from_json(&json!({ "components": [] })).is_err());
    }

    #[test]
    fn builder_round_trips_through_json() {
        let spec = EntitySpec::new("tile")
            .with_transform(Transform::from_xyz(1.0, 0.0, 2.0))
            .with_component(json!({ "type": "cube", "name": "c", "materialName": "ground" }));
        let text = serde_json::to_string(&spec).unwrap();
        assert_eq!(EntitySpec::from_json_str(&text).unwrap(), spec);
    }
}
