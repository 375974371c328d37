//! # Components
//!
//! A component is a passive piece of an object: it loads, ticks, draws and
//! unloads with its owner but never decides anything. The set is closed:
//!
//! | Tag         | Kind                       | Does                                           |
//! |-------------|----------------------------|------------------------------------------------|
//! | `cube`      | [`CubeComponent`]          | draws a cube at the owner's world matrix       |
//! | `collision` | [`CollisionComponent`]     | keeps a collider in the [`CollisionManager`]   |
//!
//! The collision component is the bridge between the entity graph and the
//! collision manager: it registers on load, copies the owner's world
//! position into its shape every tick, and unregisters on unload.

use crate::collision::{ColliderDesc, ColliderId, ColliderInfo, CollisionKind, CollisionManager};
use crate::error::ConfigResult;
use crate::math::{Mat4, Vec3};
use crate::platform::{AssetProvider, CubeDraw, Renderer};
use crate::registry::Fields;
use crate::scene::ObjectId;
use crate::shape::Shape;

/// A named, owned component instance.
#[derive(Debug, Clone)]
pub struct Component {
    /// Registry-assigned, unique per registry.
    pub id: u32,
    pub name: String,
    pub type_tag: String,
    /// Set when the component is attached to an object.
    pub owner: Option<ObjectId>,
    pub kind: ComponentKind,
}

/// Closed set of component behaviors.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentKind {
    Cube(CubeComponent),
    Collision(CollisionComponent),
}

/// What a component may touch while loading.
pub struct LoadCtx<'a> {
    pub collisions: &'a mut CollisionManager,
    pub assets: &'a mut dyn AssetProvider,
    pub owner: ObjectId,
    pub world_position: Vec3,
}

impl Component {
    pub fn new(id: u32, name: impl Into<String>, type_tag: impl Into<String>, kind: ComponentKind) -> Self {
        Self {
            id,
            name: name.into(),
            type_tag: type_tag.into(),
            owner: None,
            kind,
        }
    }

    pub fn load(&mut self, ctx: &mut LoadCtx<'_>) {
        self.owner = Some(ctx.owner);
        match &mut self.kind {
            ComponentKind::Cube(cube) => {
                if !ctx.assets.is_loaded(&cube.material) {
                    ctx.assets.load(&cube.material);
                }
            }
            ComponentKind::Collision(collision) => {
                if let Some(handle) = collision.handle.take() {
                    ctx.collisions.unregister(handle);
                }
                let desc = ColliderDesc {
                    name: self.name.clone(),
                    shape: collision.shape.at(ctx.world_position),
                    owner: Some(ctx.owner),
                    is_static: collision.is_static,
                    impenetrable: collision.impenetrable,
                };
                collision.handle = Some(ctx.collisions.register(desc));
                collision.contacts = 0;
            }
        }
    }

    pub fn update(&mut self, _dt: f32, world_position: Vec3, collisions: &mut CollisionManager) {
        if let ComponentKind::Collision(collision) = &mut self.kind {
            collision.shape.set_position(world_position);
            if let Some(handle) = collision.handle {
                collisions.set_position(handle, world_position);
            }
        }
    }

    pub fn render(&self, world: &Mat4, assets: &dyn AssetProvider, renderer: &mut dyn Renderer) {
        if let ComponentKind::Cube(cube) = &self.kind {
            if !assets.is_loaded(&cube.material) {
                return;
            }
            renderer.draw_cube(&CubeDraw {
                material: &cube.material,
                size: cube.size,
                origin: cube.origin,
                alpha: cube.alpha,
                world: *world,
            });
        }
    }

    pub fn unload(&mut self, collisions: &mut CollisionManager) {
        if let ComponentKind::Collision(collision) = &mut self.kind {
            if let Some(handle) = collision.handle.take() {
                collisions.unregister(handle);
            }
            collision.contacts = 0;
        }
    }

    pub fn on_collision_entry(&mut self, other: &ColliderInfo) {
        self.on_collision(CollisionKind::Entry, other);
    }

    pub fn on_collision_update(&mut self, other: &ColliderInfo) {
        self.on_collision(CollisionKind::Update, other);
    }

    pub fn on_collision_exit(&mut self, other: &ColliderInfo) {
        self.on_collision(CollisionKind::Exit, other);
    }

    /// Dispatch a collision hook by kind.
    pub fn on_collision(&mut self, kind: CollisionKind, other: &ColliderInfo) {
        let ComponentKind::Collision(collision) = &mut self.kind else {
            return;
        };
        match kind {
            CollisionKind::Entry => collision.contacts += 1,
            CollisionKind::Update => {}
            CollisionKind::Exit => collision.contacts = collision.contacts.saturating_sub(1),
        }
        log::trace!("{}: {kind:?} with {} ({} contacts)", self.name, other.name, collision.contacts);
    }

    /// The collider handle, for collision components that are loaded.
    pub fn collider(&self) -> Option<ColliderId> {
        match &self.kind {
            ComponentKind::Collision(collision) => collision.handle,
            ComponentKind::Cube(_) => None,
        }
    }

    pub fn as_collision(&self) -> Option<&CollisionComponent> {
        match &self.kind {
            ComponentKind::Collision(collision) => Some(collision),
            ComponentKind::Cube(_) => None,
        }
    }
}

// ── Cube ───────────────────────────────────────────────────────────────────

/// A flat-shaded cube.
#[derive(Debug, Clone, PartialEq)]
pub struct CubeComponent {
    pub material: String,
    pub size: Vec3,
    pub origin: Vec3,
    pub alpha: f32,
}

impl CubeComponent {
    pub fn new(material: impl Into<String>) -> Self {
        Self {
            material: material.into(),
            size: Vec3::ONE,
            origin: Vec3::ZERO,
            alpha: 1.0,
        }
    }

    /// `{ "materialName": "ground", "width": 1, "height": 1, "depth": 1, "alpha": 0.4 }`
    pub fn from_fields(fields: &Fields<'_>) -> ConfigResult<Self> {
        let material = match fields.opt_str("materialName") {
            Some(name) => name,
            None => fields.str("material")?,
        };
        let size = Vec3::new(
            fields.opt_f32("width")?.unwrap_or(1.0),
            fields.opt_f32("height")?.unwrap_or(1.0),
            fields.opt_f32("depth")?.unwrap_or(1.0),
        );
        Ok(Self {
            material,
            size,
            origin: fields.opt_vec3("origin").unwrap_or(Vec3::ZERO),
            alpha: fields.opt_f32("alpha")?.unwrap_or(1.0).clamp(0.0, 1.0),
        })
    }
}

// ── Collision ──────────────────────────────────────────────────────────────

/// A collider that follows its owner.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionComponent {
    pub shape: Shape,
    pub is_static: bool,
    pub impenetrable: bool,
    /// Set while registered.
    pub handle: Option<ColliderId>,
    /// Open entry relationships.
    pub contacts: usize,
}

impl CollisionComponent {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            is_static: true,
            impenetrable: false,
            handle: None,
            contacts: 0,
        }
    }

    /// `{ "shape": { "type": "aabb", ... }, "static": false, "impenetrable": true }`
    pub fn from_fields(fields: &Fields<'_>) -> ConfigResult<Self> {
        let shape = Shape::from_json(fields.required("shape")?)?;
        Ok(Self {
            shape,
            is_static: fields.opt_bool("static")?.unwrap_or(true),
            impenetrable: fields.opt_bool("impenetrable")?.unwrap_or(false),
            handle: None,
            contacts: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::platform::MemoryAssets;
    use serde_json::json;

    struct Recorder(Vec<(String, f32)>);

    impl Renderer for Recorder {
        fn draw_cube(&mut self, cube: &CubeDraw<'_>) {
            self.0.push((cube.material.to_string(), cube.alpha));
        }
    }

    fn fields(json: &serde_json::Value) -> Fields<'_> {
        Fields::new(json, "test", "component")
    }

    #[test]
    fn cube_draws_only_after_material_loads() {
        let mut cube = Component::new(0, "body", "cube", ComponentKind::Cube(CubeComponent::new("player")));
        let mut collisions = CollisionManager::new();
        let mut assets = MemoryAssets::with_game_materials();
        let mut renderer = Recorder(Vec::new());

        cube.load(&mut LoadCtx {
            collisions: &mut collisions,
            assets: &mut assets,
            owner: ObjectId(1),
            world_position: Vec3::ZERO,
        });
        cube.render(&Mat4::IDENTITY, &assets, &mut renderer);
        assert!(renderer.0.is_empty());

        assets.take_completed();
        cube.render(&Mat4::IDENTITY, &assets, &mut renderer);
        assert_eq!(renderer.0, vec![("player".to_string(), 1.0)]);
    }

    #[test]
    fn collision_registers_follows_and_unregisters() {
        let shape = Shape::aabb(1.0, 1.0, 1.0);
        let mut comp = Component::new(0, "box", "collision", ComponentKind::Collision(CollisionComponent::new(shape)));
        let mut collisions = CollisionManager::new();
        let mut assets = MemoryAssets::new();

        comp.load(&mut LoadCtx {
            collisions: &mut collisions,
            assets: &mut assets,
            owner: ObjectId(3),
            world_position: Vec3::new(1.0, 2.0, 3.0),
        });
        let handle = comp.collider().unwrap();
        assert_eq!(collisions.shape(handle).unwrap().position(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(collisions.info(handle).unwrap().owner, Some(ObjectId(3)));

        comp.update(0.1, Vec3::new(5.0, 0.0, 0.0), &mut collisions);
        assert_eq!(collisions.shape(handle).unwrap().position(), Vec3::new(5.0, 0.0, 0.0));

        comp.unload(&mut collisions);
        assert!(comp.collider().is_none());
        assert!(collisions.is_empty());
    }

    #[test]
    fn collision_hooks_count_contacts() {
        let mut comp = Component::new(
            0,
            "c",
            "collision",
            ComponentKind::Collision(CollisionComponent::new(Shape::circle(1.0))),
        );
        let other = ColliderInfo {
            id: ColliderId(9),
            name: "other".into(),
            owner: None,
            is_static: true,
            impenetrable: false,
        };
        comp.on_collision_entry(&other);
        comp.on_collision_update(&other);
        assert_eq!(comp.as_collision().unwrap().contacts, 1);
        comp.on_collision_exit(&other);
        comp.on_collision_exit(&other);
        assert_eq!(comp.as_collision().unwrap().contacts, 0);
    }

    #[test]
    fn builders_read_fields() {
        let json = json!({ "materialName": "ground", "alpha": 0.4, "height": 2 });
        let cube = CubeComponent::from_fields(&fields(&json)).unwrap();
        assert_eq!(cube.material, "ground");
        assert_eq!(cube.size, Vec3::new(1.0, 2.0, 1.0));
        assert!((cube.alpha - 0.4).abs() < 1e-6);

        let json = json!({ "static": false, "shape": { "type": "circle", "radius": 1 } });
        let collision = CollisionComponent::from_fields(&fields(&json)).unwrap();
        assert!(!collision.is_static);
        assert!(!collision.impenetrable);
    }

    #[test]
    fn builders_name_missing_fields() {
        let json = json!({ "alpha": 0.4 });
        let err = CubeComponent::from_fields(&fields(&json)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { ref field, .. } if field == "material"));

        let json = json!({});
        let err = CollisionComponent::from_fields(&fields(&json)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { ref field, .. } if field == "shape"));

        let json = json!({ "shape": { "type": "triangle" } });
        let err = CollisionComponent::from_fields(&fields(&json)).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedShape(_)));
    }
}
