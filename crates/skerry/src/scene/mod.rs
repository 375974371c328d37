//! # Scene — The Entity Graph
//!
//! Every game object lives in one arena owned by the [`Scene`], addressed by
//! an [`ObjectId`]. The tree is expressed with handles: each object stores
//! its parent's id and the ordered ids of its children. The scene owns an
//! invisible `__ROOT__` object that everything else hangs from.
//!
//! ```text
//!  __ROOT__
//!  └── level_1
//!      ├── tile_0_0   [cube, collision]
//!      ├── tile_1_0   [cube, collision]
//!      ├── point_0    [cube, collision] {point, rotation}
//!      └── player     [cube, collision] {player}
//! ```
//!
//! ## Lifecycle
//!
//! ```text
//!  instantiate ──► load ──► update_ready ──► update / render (every tick) ──► unload
//!   (registry)   (matrices,   (siblings,                                   (colliders and
//!                colliders,   subscriptions)                               subscriptions released,
//!                assets)                                                    subtree destroyed)
//! ```
//!
//! ## Transform Propagation
//!
//! Matrices are recomputed for every object on every tick, parent first:
//! `local = T · R · S`, `world = parent.world · local`. There is no dirty
//! tracking.
//!
//! ## Deferred Effects
//!
//! Behaviors run while the scene is mutably borrowed, so anything that would
//! change the tree or the bus (unloading, posting, subscribing) goes into the
//! [`Outbox`] and is applied by the simulation after the call returns.

mod object;
pub mod spec;

pub use object::GameObject;
pub use spec::{EntitySpec, PartialVec3, TransformSpec};

use std::collections::HashMap;

use serde_json::Value;

use crate::behavior::{Behavior, BehaviorCtx, ReadyCtx};
use crate::collision::{CollisionEvent, CollisionManager};
use crate::component::{Component, LoadCtx};
use crate::error::ConfigResult;
use crate::input::InputState;
use crate::math::{Mat4, Vec3};
use crate::message::{Message, Outbox, Subscriber};
use crate::platform::{AssetProvider, Renderer};
use crate::registry::Registry;

/// Name of the scene's root object.
pub const ROOT_NAME: &str = "__ROOT__";

/// Handle to a [`GameObject`]. Monotonically assigned, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub u32);

/// Everything a tick of [`Scene::update`] may touch outside the scene.
pub struct FrameCtx<'a> {
    pub collisions: &'a mut CollisionManager,
    pub input: &'a InputState,
    pub out: &'a mut Outbox,
}

/// Arena of game objects.
pub struct Scene {
    objects: HashMap<ObjectId, GameObject>,
    root: ObjectId,
    next_id: u32,
}

impl Scene {
    pub fn new() -> Self {
        let root = ObjectId(0);
        let mut objects = HashMap::new();
        let mut root_object = GameObject::new(root, ROOT_NAME);
        root_object.loaded = true;
        root_object.ready = true;
        objects.insert(root, root_object);
        Self {
            objects,
            root,
            next_id: 1,
        }
    }

    pub fn root(&self) -> ObjectId {
        self.root
    }

    pub fn get(&self, id: ObjectId) -> Option<&GameObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        self.objects.get_mut(&id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Number of live objects, root included.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.len() <= 1
    }

    // ── Structure ──────────────────────────────────────────────────────────

    /// Create a detached object. Attach it with [`add_child`](Self::add_child).
    pub fn spawn(&mut self, name: impl Into<String>) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.objects.insert(id, GameObject::new(id, name));
        id
    }

    /// Create an object directly under `parent`.
    pub fn spawn_child(&mut self, parent: ObjectId, name: impl Into<String>) -> ObjectId {
        let id = self.spawn(name);
        self.add_child(parent, id);
        id
    }

    /// Move `child` under `parent`, detaching it from its previous parent.
    ///
    /// Refused (returns `false`) when either object is missing, when `child`
    /// is the root, or when the move would create a cycle.
    pub fn add_child(&mut self, parent: ObjectId, child: ObjectId) -> bool {
        if !self.contains(parent) || !self.contains(child) || child == self.root {
            log::warn!("Cannot attach {child:?} to {parent:?}: object missing or root.");
            return false;
        }
        if self.is_ancestor(child, parent) {
            log::warn!("Cannot attach {child:?} to {parent:?}: would create a cycle.");
            return false;
        }
        self.detach(child);
        if let Some(p) = self.objects.get_mut(&parent) {
            p.children.push(child);
        }
        if let Some(c) = self.objects.get_mut(&child) {
            c.parent = Some(parent);
        }
        true
    }

    /// Remove `child` from its parent's child list. The object stays alive.
    pub fn detach(&mut self, child: ObjectId) {
        let Some(parent) = self.objects.get_mut(&child).and_then(|c| c.parent.take()) else {
            return;
        };
        if let Some(p) = self.objects.get_mut(&parent) {
            p.children.retain(|c| *c != child);
        }
    }

    /// Whether `ancestor` is `id` or lies on its parent chain.
    pub fn is_ancestor(&self, ancestor: ObjectId, id: ObjectId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.objects.get(&node).and_then(|o| o.parent);
        }
        false
    }

    /// Build a subtree from a spec document and attach it under `parent`.
    ///
    /// On a configuration error nothing is left behind in the scene.
    pub fn instantiate(&mut self, parent: ObjectId, spec: &EntitySpec, registry: &mut Registry) -> ConfigResult<ObjectId> {
        let id = self.spawn(spec.name.clone());
        match self.populate(id, spec, registry) {
            Ok(()) => {
                self.add_child(parent, id);
                Ok(id)
            }
            Err(err) => {
                self.remove_subtree(id);
                Err(err)
            }
        }
    }

    fn populate(&mut self, id: ObjectId, spec: &EntitySpec, registry: &mut Registry) -> ConfigResult<()> {
        let mut components: Vec<Component> = Vec::with_capacity(spec.components.len());
        for json in &spec.components {
            components.push(registry.build_component(json)?);
        }
        let mut behaviors: Vec<Behavior> = Vec::with_capacity(spec.behaviors.len());
        for json in &spec.behaviors {
            behaviors.push(registry.build_behavior(json)?);
        }
        if let Some(object) = self.objects.get_mut(&id) {
            object.transform = spec.transform.to_transform();
            for component in components {
                object.add_component(component);
            }
            for behavior in behaviors {
                object.add_behavior(behavior);
            }
        }
        for child in &spec.children {
            let child_id = self.spawn(child.name.clone());
            self.add_child(id, child_id);
            self.populate(child_id, child, registry)?;
        }
        Ok(())
    }

    /// Drop a subtree from the arena without running unload hooks.
    fn remove_subtree(&mut self, id: ObjectId) {
        self.detach(id);
        for node in self.subtree(id) {
            self.objects.remove(&node);
        }
    }

    /// Ids of `id` and all its descendants, parents before children.
    pub fn subtree(&self, id: ObjectId) -> Vec<ObjectId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            let Some(object) = self.objects.get(&node) else {
                continue;
            };
            out.push(node);
            stack.extend(object.children.iter().rev());
        }
        out
    }

    // ── Lifecycle ──────────────────────────────────────────────────────────

    /// Load a subtree: compute matrices, register colliders, request assets.
    pub fn load(&mut self, id: ObjectId, collisions: &mut CollisionManager, assets: &mut dyn AssetProvider) {
        let parent_world = self.parent_world(id);
        self.load_object(id, parent_world, collisions, assets);
    }

    fn load_object(
        &mut self,
        id: ObjectId,
        parent_world: Mat4,
        collisions: &mut CollisionManager,
        assets: &mut dyn AssetProvider,
    ) {
        let Some(object) = self.objects.get_mut(&id) else {
            return;
        };
        object.refresh_matrices(&parent_world);
        if !object.loaded {
            let mut ctx = LoadCtx {
                collisions: &mut *collisions,
                assets: &mut *assets,
                owner: id,
                world_position: object.world_position(),
            };
            for component in &mut object.components {
                component.load(&mut ctx);
            }
            object.loaded = true;
        }
        let world = object.world_matrix;
        let children = object.children.clone();
        for child in children {
            self.load_object(child, world, collisions, assets);
        }
    }

    /// Let behaviors of a loaded subtree resolve siblings and subscribe.
    ///
    /// Runs once per object; objects already ready are skipped.
    pub fn update_ready(&mut self, id: ObjectId, out: &mut Outbox) -> ConfigResult<()> {
        for node in self.subtree(id) {
            let Some(object) = self.objects.get_mut(&node) else {
                continue;
            };
            if !object.loaded || object.ready {
                continue;
            }
            let mut behaviors = std::mem::take(&mut object.behaviors);
            let object = &*object;
            let mut result = Ok(());
            for (index, behavior) in behaviors.iter_mut().enumerate() {
                let mut ctx = ReadyCtx {
                    me: Subscriber::Behavior(node, index),
                    owner: object,
                    out: &mut *out,
                };
                result = behavior.update_ready(&mut ctx);
                if result.is_err() {
                    break;
                }
            }
            if let Some(object) = self.objects.get_mut(&node) {
                object.behaviors = behaviors;
                object.ready = result.is_ok();
            }
            result?;
        }
        Ok(())
    }

    /// Advance the whole tree by one tick.
    pub fn update(&mut self, dt: f32, ctx: &mut FrameCtx<'_>) {
        let root = self.root;
        self.update_object(root, Mat4::IDENTITY, dt, ctx);
    }

    fn update_object(&mut self, id: ObjectId, parent_world: Mat4, dt: f32, ctx: &mut FrameCtx<'_>) {
        let Some(object) = self.objects.get_mut(&id) else {
            return;
        };
        if !object.active || !object.loaded {
            return;
        }
        object.refresh_matrices(&parent_world);
        let world_position = object.world_position();

        for component in &mut object.components {
            component.update(dt, world_position, ctx.collisions);
        }

        let GameObject { behaviors, transform, .. } = &mut *object;
        for (index, behavior) in behaviors.iter_mut().enumerate() {
            behavior.update(
                dt,
                &mut BehaviorCtx {
                    me: Subscriber::Behavior(id, index),
                    owner: id,
                    transform: &mut *transform,
                    world_position,
                    input: ctx.input,
                    out: &mut *ctx.out,
                },
            );
        }

        let world = object.world_matrix;
        let children = object.children.clone();
        for child in children {
            self.update_object(child, world, dt, ctx);
        }
    }

    /// Draw every loaded, active object.
    pub fn render(&self, assets: &dyn AssetProvider, renderer: &mut dyn Renderer) {
        for id in self.subtree(self.root) {
            let Some(object) = self.objects.get(&id) else {
                continue;
            };
            if !object.active || !object.loaded {
                continue;
            }
            for component in &object.components {
                component.render(&object.world_matrix, assets, renderer);
            }
        }
    }

    /// Unload and destroy a subtree.
    ///
    /// Colliders are unregistered, every behavior releases its subscriptions
    /// (via `out`), and the objects leave the arena. Unloading the root
    /// destroys everything under it but keeps the root itself.
    pub fn unload(&mut self, id: ObjectId, collisions: &mut CollisionManager, out: &mut Outbox) {
        if id == self.root {
            let children = self.objects.get(&id).map(|o| o.children.clone()).unwrap_or_default();
            for child in children {
                self.unload(child, collisions, out);
            }
            return;
        }
        if !self.contains(id) {
            log::debug!("Unload of {id:?} ignored: already destroyed.");
            return;
        }

        let nodes = self.subtree(id);
        for node in nodes.iter().rev() {
            let Some(object) = self.objects.get_mut(node) else {
                continue;
            };
            object.active = false;
            for component in &mut object.components {
                component.unload(collisions);
            }
            for (index, behavior) in object.behaviors.iter_mut().enumerate() {
                behavior.unload(Subscriber::Behavior(*node, index), out);
            }
            object.loaded = false;
        }
        log::debug!("Destroyed {} object(s) under {id:?}", nodes.len());
        self.remove_subtree(id);
    }

    // ── Queries ────────────────────────────────────────────────────────────

    /// First object called `name`, depth first from `start` (inclusive).
    pub fn object_by_name(&self, start: ObjectId, name: &str) -> Option<ObjectId> {
        self.subtree(start)
            .into_iter()
            .find(|id| self.objects.get(id).is_some_and(|o| o.name == name))
    }

    /// First component called `name`, depth first from `start` (inclusive).
    pub fn component_by_name(&self, start: ObjectId, name: &str) -> Option<(ObjectId, &Component)> {
        self.subtree(start)
            .into_iter()
            .find_map(|id| self.objects.get(&id)?.component(name).map(|c| (id, c)))
    }

    /// First behavior called `name`, depth first from `start` (inclusive).
    pub fn behavior_by_name(&self, start: ObjectId, name: &str) -> Option<(ObjectId, &Behavior)> {
        self.subtree(start)
            .into_iter()
            .find_map(|id| self.objects.get(&id)?.behavior(name).map(|b| (id, b)))
    }

    pub fn world_position(&self, id: ObjectId) -> Option<Vec3> {
        self.objects.get(&id).map(GameObject::world_position)
    }

    fn parent_world(&self, id: ObjectId) -> Mat4 {
        self.objects
            .get(&id)
            .and_then(|o| o.parent)
            .and_then(|p| self.objects.get(&p))
            .map(|p| p.world_matrix)
            .unwrap_or(Mat4::IDENTITY)
    }

    // ── Dispatch ───────────────────────────────────────────────────────────

    /// Hand a message to behavior `index` of `object`.
    ///
    /// Deliveries to destroyed objects or missing behaviors are dropped.
    pub fn deliver(&mut self, object: ObjectId, index: usize, message: &Message, input: &InputState, out: &mut Outbox) {
        let Some(target) = self.objects.get_mut(&object) else {
            log::debug!("{} for destroyed {object:?} dropped", message.code);
            return;
        };
        if !target.active {
            return;
        }
        let world_position = target.world_position();
        let GameObject { behaviors, transform, .. } = target;
        let Some(behavior) = behaviors.get_mut(index) else {
            log::debug!("{} for missing behavior {index} of {object:?} dropped", message.code);
            return;
        };
        behavior.on_message(
            message,
            &mut BehaviorCtx {
                me: Subscriber::Behavior(object, index),
                owner: object,
                transform,
                world_position,
                input,
                out,
            },
        );
    }

    /// Run the collision hook of both components of a pair.
    pub fn collision_hook(&mut self, event: &CollisionEvent) {
        let data = &event.data;
        for (own, other) in [(&data.a, &data.b), (&data.b, &data.a)] {
            let Some(object) = own.owner.and_then(|o| self.objects.get_mut(&o)) else {
                continue;
            };
            if let Some(component) = object.components.iter_mut().find(|c| c.collider() == Some(own.id)) {
                component.on_collision(event.kind, other);
            }
        }
    }

    /// Push runtime data into the first behavior called `name` under `start`.
    ///
    /// Returns `Ok(false)` when no such behavior exists.
    pub fn apply_to_behavior(&mut self, start: ObjectId, name: &str, data: &Value) -> ConfigResult<bool> {
        let Some((owner, _)) = self.behavior_by_name(start, name) else {
            return Ok(false);
        };
        let Some(behavior) = self
            .objects
            .get_mut(&owner)
            .and_then(|o| o.behaviors.iter_mut().find(|b| b.name == name))
        else {
            return Ok(false);
        };
        behavior.apply(data)?;
        Ok(true)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::PlayerState;
    use crate::error::ConfigError;
    use crate::math::Transform;
    use crate::message::Command;
    use crate::platform::MemoryAssets;
    use serde_json::json;

    struct World {
        scene: Scene,
        registry: Registry,
        collisions: CollisionManager,
        assets: MemoryAssets,
        input: InputState,
        out: Outbox,
    }

    impl World {
        fn new() -> Self {
            Self {
                scene: Scene::new(),
                registry: Registry::with_builtins(),
                collisions: CollisionManager::new(),
                assets: MemoryAssets::with_game_materials(),
                input: InputState::new(),
                out: Outbox::new(),
            }
        }

        fn build(&mut self, spec: &EntitySpec) -> ConfigResult<ObjectId> {
            let root = self.scene.root();
            let id = self.scene.instantiate(root, spec, &mut self.registry)?;
            self.scene.load(id, &mut self.collisions, &mut self.assets);
            self.scene.update_ready(id, &mut self.out)?;
            Ok(id)
        }

        fn tick(&mut self, dt: f32) {
            self.scene.update(
                dt,
                &mut FrameCtx {
                    collisions: &mut self.collisions,
                    input: &self.input,
                    out: &mut self.out,
                },
            );
        }
    }

    fn player_spec() -> EntitySpec {
        EntitySpec::new("player")
            .with_transform(Transform::from_xyz(0.0, 0.5, 0.0))
            .with_component(json!({
                "type": "collision", "name": "playerCollision", "static": false,
                "shape": { "type": "aabb", "width": 0.5, "height": 1, "depth": 0.5 }
            }))
            .with_behavior(json!({
                "type": "player", "name": "PlayerBehavior", "speed": 2.0,
                "playerCollisionComponent": "playerCollision",
                "groundCollisionComponent": "groundCollision"
            }))
    }

    #[test]
    fn ids_are_never_reused() {
        let mut scene = Scene::new();
        let a = scene.spawn_child(scene.root(), "a");
        scene.unload(a, &mut CollisionManager::new(), &mut Outbox::new());
        let b = scene.spawn("b");
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn add_child_moves_ownership() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.spawn_child(root, "a");
        let b = scene.spawn_child(root, "b");
        let c = scene.spawn_child(a, "c");

        assert!(scene.add_child(b, c));
        assert!(scene.get(a).unwrap().children().is_empty());
        assert_eq!(scene.get(b).unwrap().children(), &[c]);
        assert_eq!(scene.get(c).unwrap().parent(), Some(b));

        // Cycles are refused.
        assert!(!scene.add_child(c, b));
        assert!(!scene.add_child(c, root));
    }

    #[test]
    fn world_matrix_composes_parent_and_child() {
        let mut w = World::new();
        let spec = EntitySpec::new("parent")
            .with_transform(Transform::from_xyz(1.0, 0.0, 0.0).with_scale(Vec3::splat(2.0)))
            .with_child(EntitySpec::new("child").with_transform(Transform::from_xyz(0.0, 1.0, 0.0)));
        let parent = w.build(&spec).unwrap();
        w.tick(0.016);

        let child = w.scene.object_by_name(parent, "child").unwrap();
        let pos = w.scene.world_position(child).unwrap();
        assert!((pos - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-5);

        // Moving the parent moves the child next tick.
        w.scene.get_mut(parent).unwrap().transform.position.x = 5.0;
        w.tick(0.016);
        let pos = w.scene.world_position(child).unwrap();
        assert!((pos - Vec3::new(5.0, 2.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn lookups_are_depth_first_first_match() {
        let mut w = World::new();
        let spec = EntitySpec::new("top")
            .with_child(
                EntitySpec::new("left").with_child(EntitySpec::new("dup").with_component(json!({
                    "type": "cube", "name": "body", "materialName": "ground"
                }))),
            )
            .with_child(EntitySpec::new("dup").with_component(json!({
                "type": "cube", "name": "body", "materialName": "point"
            })));
        let top = w.build(&spec).unwrap();

        let left = w.scene.object_by_name(top, "left").unwrap();
        let dup = w.scene.object_by_name(top, "dup").unwrap();
        assert_eq!(w.scene.get(dup).unwrap().parent(), Some(left));

        let (owner, body) = w.scene.component_by_name(top, "body").unwrap();
        assert_eq!(owner, dup);
        assert!(matches!(&body.kind, crate::component::ComponentKind::Cube(c) if c.material == "ground"));
        assert!(w.scene.object_by_name(top, "nobody").is_none());
    }

    #[test]
    fn load_registers_and_unload_releases() {
        let mut w = World::new();
        let player = w.build(&player_spec()).unwrap();
        assert_eq!(w.collisions.len(), 1);

        let subscribed: Vec<_> = std::iter::from_fn(|| w.out.pop()).collect();
        let me = Subscriber::Behavior(player, 0);
        assert!(subscribed.contains(&Command::Subscribe("COLLISION_ENTRY::playerCollision".into(), me)));
        assert!(subscribed.contains(&Command::Subscribe("COLLISION_EXIT::playerCollision".into(), me)));

        w.scene.unload(player, &mut w.collisions, &mut w.out);
        assert!(w.collisions.is_empty());
        assert!(!w.scene.contains(player));
        assert!(w.scene.get(w.scene.root()).unwrap().children().is_empty());
        let released: Vec<_> = std::iter::from_fn(|| w.out.pop()).collect();
        assert_eq!(released.len(), 2);
        assert!(released.iter().all(|c| matches!(c, Command::Unsubscribe(_, s) if *s == me)));
    }

    #[test]
    fn missing_sibling_fails_update_ready() {
        let mut w = World::new();
        let spec = EntitySpec::new("player").with_behavior(json!({
            "type": "player", "name": "p",
            "playerCollisionComponent": "playerCollision",
            "groundCollisionComponent": "groundCollision"
        }));
        let err = w.build(&spec).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSibling { ref name, .. } if name == "playerCollision"));
    }

    #[test]
    fn bad_spec_leaves_nothing_behind() {
        let mut w = World::new();
        let spec = EntitySpec::new("ok").with_child(
            EntitySpec::new("bad").with_component(json!({ "type": "laser", "name": "x" })),
        );
        let before = w.scene.len();
        assert!(matches!(w.build(&spec), Err(ConfigError::UnknownType { .. })));
        assert_eq!(w.scene.len(), before);
    }

    #[test]
    fn collision_position_follows_world_position() {
        let mut w = World::new();
        let player = w.build(&player_spec()).unwrap();
        w.scene.get_mut(player).unwrap().transform.position = Vec3::new(3.0, 0.5, -2.0);
        w.tick(0.0);
        let (_, comp) = w.scene.component_by_name(player, "playerCollision").unwrap();
        let handle = comp.collider().unwrap();
        assert_eq!(w.collisions.shape(handle).unwrap().position(), Vec3::new(3.0, 0.5, -2.0));
    }

    fn scroller_spec() -> EntitySpec {
        EntitySpec::new("backdrop")
            .with_transform(Transform::from_xyz(4.0, 0.0, 0.0))
            .with_behavior(json!({
                "type": "scroll", "name": "drift",
                "velocity": { "x": -1 }, "minPosition": { "x": -4 }, "resetPosition": { "x": 4 },
                "startMessage": "GO", "resetMessage": "BACK"
            }))
    }

    fn scrolling(scene: &Scene, id: ObjectId) -> bool {
        match &scene.get(id).unwrap().behaviors[0].kind {
            crate::behavior::BehaviorKind::Scroll(scroll) => scroll.is_scrolling(),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn deliver_reaches_behavior_and_ignores_destroyed() {
        let mut w = World::new();
        let id = w.build(&scroller_spec()).unwrap();
        while w.out.pop().is_some() {}

        let go = Message::new("GO", crate::message::Sender::Engine);
        w.scene.deliver(id, 0, &go, &w.input, &mut w.out);
        assert!(scrolling(&w.scene, id));
        w.tick(2.0);
        assert_eq!(w.scene.get(id).unwrap().transform.position.x, 2.0);

        let back = Message::new("BACK", crate::message::Sender::Engine);
        w.scene.deliver(id, 0, &back, &w.input, &mut w.out);
        assert_eq!(w.scene.get(id).unwrap().transform.position.x, 4.0);

        // Unknown behavior index: nothing moves, nothing is queued.
        w.scene.deliver(id, 7, &back, &w.input, &mut w.out);
        assert_eq!(w.scene.get(id).unwrap().transform.position.x, 4.0);
        assert!(w.out.is_empty());

        w.scene.unload(id, &mut w.collisions, &mut w.out);
        while w.out.pop().is_some() {}
        let objects = w.scene.len();
        w.scene.deliver(id, 0, &go, &w.input, &mut w.out);
        assert!(!w.scene.contains(id));
        assert_eq!(w.scene.len(), objects);
        assert!(w.out.is_empty());
    }

    #[test]
    fn apply_reaches_named_behavior() {
        let mut w = World::new();
        let player = w.build(&player_spec()).unwrap();
        assert!(w.scene.apply_to_behavior(player, "PlayerBehavior", &json!({ "speed": 5.0 })).unwrap());
        assert!(!w.scene.apply_to_behavior(player, "Nope", &json!({})).unwrap());
        let (_, b) = w.scene.behavior_by_name(player, "PlayerBehavior").unwrap();
        let p = b.as_player().unwrap();
        assert_eq!(p.speed, 5.0);
        assert_eq!(p.state(), PlayerState::Idle);
    }
}
