//! # Registry — Type Tags to Builders
//!
//! Entity-spec documents name their components and behaviors by a string
//! `type` tag. The [`Registry`] maps each tag to a builder closure and turns
//! a JSON description into a live [`Component`] or [`Behavior`]:
//!
//! ```text
//!  { "type": "collision", "name": "groundCollision", "shape": {...} }
//!        │                          │
//!        ▼                          ▼
//!   builder lookup             required name
//!        │
//!        ▼
//!   builder(fields) ──► ComponentKind::Collision(..) ──► Component { id, name, .. }
//! ```
//!
//! The registry is an explicit value, built once at startup and handed to the
//! simulation. There is no global registration: two simulations can run
//! side by side with different builder sets.

use std::collections::HashMap;

use serde_json::Value;

use crate::behavior::{
    Behavior, BehaviorKind, ItemBehavior, KeyboardMovementBehavior, PlayerBehavior, RotationBehavior,
    ScrollBehavior,
};
use crate::component::{CollisionComponent, Component, ComponentKind, CubeComponent};
use crate::config::PlayerTuning;
use crate::error::{ConfigError, ConfigResult};
use crate::math::Vec3;
use crate::shape::read_vec3;

/// Builds a component kind from its spec fields.
pub type ComponentBuilder = Box<dyn Fn(&Fields<'_>) -> ConfigResult<ComponentKind>>;

/// Builds a behavior kind from its spec fields.
pub type BehaviorBuilder = Box<dyn Fn(&Fields<'_>) -> ConfigResult<BehaviorKind>>;

/// String-keyed builder tables plus the id counter.
pub struct Registry {
    components: HashMap<String, ComponentBuilder>,
    behaviors: HashMap<String, BehaviorBuilder>,
    next_id: u32,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            components: HashMap::new(),
            behaviors: HashMap::new(),
            next_id: 0,
        }
    }

    /// Every built-in component and behavior with default player tuning.
    pub fn with_builtins() -> Self {
        Self::with_player_tuning(PlayerTuning::default())
    }

    /// Every built-in component and behavior; `player` behaviors use `tuning`.
    pub fn with_player_tuning(tuning: PlayerTuning) -> Self {
        let mut registry = Self::new();

        registry.register_component("cube", |f| CubeComponent::from_fields(f).map(ComponentKind::Cube));
        registry.register_component("collision", |f| {
            CollisionComponent::from_fields(f).map(ComponentKind::Collision)
        });

        registry.register_behavior("player", move |f| {
            PlayerBehavior::from_fields(f, tuning).map(BehaviorKind::Player)
        });
        registry.register_behavior("item", |f| ItemBehavior::from_fields(f, None).map(BehaviorKind::Item));
        registry.register_behavior("point", |f| {
            ItemBehavior::from_fields(f, Some("ding")).map(BehaviorKind::Item)
        });
        registry.register_behavior("rotation", |f| RotationBehavior::from_fields(f).map(BehaviorKind::Rotation));
        registry.register_behavior("keyboardMovement", |f| {
            KeyboardMovementBehavior::from_fields(f).map(BehaviorKind::KeyboardMovement)
        });
        registry.register_behavior("scroll", |f| ScrollBehavior::from_fields(f).map(BehaviorKind::Scroll));

        registry
    }

    /// Register (or replace) a component builder.
    pub fn register_component(
        &mut self,
        type_tag: impl Into<String>,
        builder: impl Fn(&Fields<'_>) -> ConfigResult<ComponentKind> + 'static,
    ) {
        let type_tag = type_tag.into();
        if self.components.insert(type_tag.clone(), Box::new(builder)).is_some() {
            log::warn!("Component builder `{type_tag}` replaced.");
        }
    }

    /// Register (or replace) a behavior builder.
    pub fn register_behavior(
        &mut self,
        type_tag: impl Into<String>,
        builder: impl Fn(&Fields<'_>) -> ConfigResult<BehaviorKind> + 'static,
    ) {
        let type_tag = type_tag.into();
        if self.behaviors.insert(type_tag.clone(), Box::new(builder)).is_some() {
            log::warn!("Behavior builder `{type_tag}` replaced.");
        }
    }

    pub fn has_component(&self, type_tag: &str) -> bool {
        self.components.contains_key(type_tag)
    }

    pub fn has_behavior(&self, type_tag: &str) -> bool {
        self.behaviors.contains_key(type_tag)
    }

    /// Build a component from `{ "type": ..., "name": ..., ... }`.
    pub fn build_component(&mut self, json: &Value) -> ConfigResult<Component> {
        let type_tag = read_type(json, "component")?;
        let builder = self.components.get(&type_tag).ok_or_else(|| ConfigError::UnknownType {
            kind: "component",
            type_tag: type_tag.clone(),
        })?;
        let fields = Fields::new(json, &type_tag, "component");
        let name = fields.str("name")?;
        let kind = builder(&fields)?;
        let id = self.allocate_id();
        Ok(Component::new(id, name, type_tag, kind))
    }

    /// Build a behavior from `{ "type": ..., "name": ..., ... }`.
    pub fn build_behavior(&mut self, json: &Value) -> ConfigResult<Behavior> {
        let type_tag = read_type(json, "behavior")?;
        let builder = self.behaviors.get(&type_tag).ok_or_else(|| ConfigError::UnknownType {
            kind: "behavior",
            type_tag: type_tag.clone(),
        })?;
        let fields = Fields::new(json, &type_tag, "behavior");
        let name = fields.str("name")?;
        let kind = builder(&fields)?;
        let id = self.allocate_id();
        Ok(Behavior::new(id, name, type_tag, kind))
    }

    fn allocate_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

fn read_type(json: &Value, kind: &'static str) -> ConfigResult<String> {
    match json.get("type") {
        Some(Value::String(tag)) => Ok(tag.clone()),
        Some(other) => Err(ConfigError::InvalidField {
            type_tag: kind.to_string(),
            field: "type".into(),
            reason: format!("expected a string, got {other}"),
        }),
        None => Err(ConfigError::MissingField {
            kind,
            type_tag: "<untyped>".into(),
            field: "type".into(),
        }),
    }
}

// ── Field access ───────────────────────────────────────────────────────────

/// Typed view over one component/behavior JSON object.
///
/// Every accessor names the type tag and field in its error so a bad
/// document points straight at the offending line.
pub struct Fields<'a> {
    json: &'a Value,
    type_tag: &'a str,
    kind: &'static str,
}

impl<'a> Fields<'a> {
    pub fn new(json: &'a Value, type_tag: &'a str, kind: &'static str) -> Self {
        Self { json, type_tag, kind }
    }

    pub fn type_tag(&self) -> &str {
        self.type_tag
    }

    pub fn get(&self, field: &str) -> Option<&'a Value> {
        self.json.get(field)
    }

    pub fn required(&self, field: &str) -> ConfigResult<&'a Value> {
        self.get(field).ok_or_else(|| self.missing(field))
    }

    pub fn str(&self, field: &str) -> ConfigResult<String> {
        match self.required(field)? {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(self.invalid(field, format!("expected a string, got {other}"))),
        }
    }

    pub fn opt_str(&self, field: &str) -> Option<String> {
        match self.get(field)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn f32(&self, field: &str) -> ConfigResult<f32> {
        let value = self.required(field)?;
        value
            .as_f64()
            .map(|n| n as f32)
            .ok_or_else(|| self.invalid(field, format!("expected a number, got {value}")))
    }

    pub fn opt_f32(&self, field: &str) -> ConfigResult<Option<f32>> {
        if self.get(field).is_none() {
            return Ok(None);
        }
        self.f32(field).map(Some)
    }

    pub fn opt_bool(&self, field: &str) -> ConfigResult<Option<bool>> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(self.invalid(field, format!("expected a boolean, got {other}"))),
        }
    }

    pub fn vec3(&self, field: &str) -> ConfigResult<Vec3> {
        self.required(field).map(read_vec3)
    }

    pub fn opt_vec3(&self, field: &str) -> Option<Vec3> {
        self.get(field).map(read_vec3)
    }

    pub fn missing(&self, field: &str) -> ConfigError {
        ConfigError::MissingField {
            kind: self.kind,
            type_tag: self.type_tag.to_string(),
            field: field.to_string(),
        }
    }

    pub fn invalid(&self, field: &str, reason: String) -> ConfigError {
        ConfigError::InvalidField {
            type_tag: self.type_tag.to_string(),
            field: field.to_string(),
            reason,
        }
    }
}
