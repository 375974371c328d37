//! # Collision Manager
//!
//! Brute-force pairwise detection with enter / update / exit semantics.
//!
//! ```text
//!  tick N:   intersects(a, b)?  ── yes, untracked ──► ENTRY   (pair tracked, stamped N)
//!                               ── yes, tracked   ──► UPDATE  (stamp refreshed to N)
//!  end of N: any pair stamped < N               ──► EXIT    (pair dropped)
//! ```
//!
//! A pair is tracked exactly when its shapes intersected on the most recent
//! evaluated tick. Every unordered pair is tested once per tick, so cost grows
//! with the square of the collider count; that is fine for a few hundred
//! tiles and nothing more.
//!
//! ENTRY and EXIT are announced twice on the bus, once per collider name
//! (`COLLISION_ENTRY::<a>` then `COLLISION_ENTRY::<b>`), as HIGH messages
//! carrying a [`CollisionData`]. UPDATE is hook-only. The hook events are
//! also returned from [`CollisionManager::update`] so the simulation can call
//! the components' `on_collision_*` hooks.

use std::collections::BTreeMap;

use crate::math::Vec3;
use crate::message::{Message, Outbox, Payload, Sender, channel};
use crate::scene::ObjectId;
use crate::shape::Shape;

/// Handle to a registered collider. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColliderId(pub u32);

/// Snapshot of a collider, as carried by collision messages.
#[derive(Debug, Clone, PartialEq)]
pub struct ColliderInfo {
    pub id: ColliderId,
    pub name: String,
    /// Object that owns the collision component, if any.
    pub owner: Option<ObjectId>,
    pub is_static: bool,
    pub impenetrable: bool,
}

/// Context of a `COLLISION_ENTRY::*` / `COLLISION_EXIT::*` message.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionData {
    pub a: ColliderInfo,
    pub b: ColliderInfo,
    /// Tick on which the pair was first (entry) or last (exit) seen.
    pub tick: u64,
}

impl CollisionData {
    /// Whether either side carries `name`.
    pub fn involves(&self, name: &str) -> bool {
        self.a.name == name || self.b.name == name
    }

    /// The side that is not named `name`. `None` if neither side is.
    pub fn other(&self, name: &str) -> Option<&ColliderInfo> {
        if self.a.name == name {
            Some(&self.b)
        } else if self.b.name == name {
            Some(&self.a)
        } else {
            None
        }
    }
}

/// Which hook a [`CollisionEvent`] maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionKind {
    Entry,
    Update,
    Exit,
}

/// One hook invocation owed to both colliders of a pair.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionEvent {
    pub kind: CollisionKind,
    pub data: CollisionData,
}

/// Registration parameters.
#[derive(Debug, Clone)]
pub struct ColliderDesc {
    pub name: String,
    pub shape: Shape,
    pub owner: Option<ObjectId>,
    pub is_static: bool,
    pub impenetrable: bool,
}

impl ColliderDesc {
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            shape,
            owner: None,
            is_static: false,
            impenetrable: false,
        }
    }
}

struct Collider {
    id: ColliderId,
    desc: ColliderDesc,
}

impl Collider {
    fn info(&self) -> ColliderInfo {
        ColliderInfo {
            id: self.id,
            name: self.desc.name.clone(),
            owner: self.desc.owner,
            is_static: self.desc.is_static,
            impenetrable: self.desc.impenetrable,
        }
    }
}

struct TrackedPair {
    data: CollisionData,
    last_seen: u64,
}

/// Owns every registered collider and the set of currently touching pairs.
#[derive(Default)]
pub struct CollisionManager {
    /// Registration order.
    colliders: Vec<Collider>,
    /// Keyed by (lower id, higher id).
    pairs: BTreeMap<(ColliderId, ColliderId), TrackedPair>,
    tick: u64,
    next_id: u32,
}

impl CollisionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, desc: ColliderDesc) -> ColliderId {
        let id = ColliderId(self.next_id);
        self.next_id += 1;
        log::trace!("Collider registered: {} ({id:?})", desc.name);
        self.colliders.push(Collider { id, desc });
        id
    }

    /// Remove a collider. Its tracked pairs are dropped without EXIT events.
    pub fn unregister(&mut self, id: ColliderId) -> bool {
        let Some(index) = self.colliders.iter().position(|c| c.id == id) else {
            log::warn!("Cannot unregister collider {id:?}: not registered.");
            return false;
        };
        self.colliders.remove(index);
        self.pairs.retain(|(a, b), _| *a != id && *b != id);
        true
    }

    pub fn set_position(&mut self, id: ColliderId, position: Vec3) {
        if let Some(collider) = self.colliders.iter_mut().find(|c| c.id == id) {
            collider.desc.shape.set_position(position);
        }
    }

    pub fn shape(&self, id: ColliderId) -> Option<&Shape> {
        self.colliders.iter().find(|c| c.id == id).map(|c| &c.desc.shape)
    }

    pub fn info(&self, id: ColliderId) -> Option<ColliderInfo> {
        self.colliders.iter().find(|c| c.id == id).map(Collider::info)
    }

    /// Forget every collider and pair.
    pub fn clear(&mut self) {
        self.colliders.clear();
        self.pairs.clear();
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// Currently tracked pairs.
    pub fn pairs(&self) -> impl Iterator<Item = &CollisionData> {
        self.pairs.values().map(|p| &p.data)
    }

    pub fn is_colliding(&self, a: ColliderId, b: ColliderId) -> bool {
        self.pairs.contains_key(&pair_key(a, b))
    }

    /// Number of ticks evaluated so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Evaluate one tick. Messages go to `out`; hook events are returned in order.
    pub fn update(&mut self, out: &mut Outbox) -> Vec<CollisionEvent> {
        self.tick += 1;
        let tick = self.tick;
        let mut events = Vec::new();

        for i in 0..self.colliders.len() {
            for j in (i + 1)..self.colliders.len() {
                let (first, second) = (&self.colliders[i], &self.colliders[j]);
                if !first.desc.shape.intersects(&second.desc.shape) {
                    continue;
                }
                let key = pair_key(first.id, second.id);
                match self.pairs.get_mut(&key) {
                    Some(pair) => {
                        pair.last_seen = tick;
                        events.push(CollisionEvent {
                            kind: CollisionKind::Update,
                            data: pair.data.clone(),
                        });
                    }
                    None => {
                        let data = CollisionData {
                            a: first.info(),
                            b: second.info(),
                            tick,
                        };
                        log::debug!("Collision entry: {} <-> {}", data.a.name, data.b.name);
                        announce(out, &data, channel::collision_entry);
                        events.push(CollisionEvent {
                            kind: CollisionKind::Entry,
                            data: data.clone(),
                        });
                        self.pairs.insert(key, TrackedPair { data, last_seen: tick });
                    }
                }
            }
        }

        let stale: Vec<_> = self
            .pairs
            .iter()
            .filter(|(_, pair)| pair.last_seen != tick)
            .map(|(key, _)| *key)
            .collect();
        for key in stale {
            if let Some(pair) = self.pairs.remove(&key) {
                let mut data = pair.data;
                data.tick = pair.last_seen;
                log::debug!("Collision exit: {} <-> {}", data.a.name, data.b.name);
                announce(out, &data, channel::collision_exit);
                events.push(CollisionEvent {
                    kind: CollisionKind::Exit,
                    data,
                });
            }
        }

        events
    }
}

fn pair_key(a: ColliderId, b: ColliderId) -> (ColliderId, ColliderId) {
    if a <= b { (a, b) } else { (b, a) }
}

fn announce(out: &mut Outbox, data: &CollisionData, code: fn(&str) -> String) {
    for name in [&data.a.name, &data.b.name] {
        out.post(
            Message::new(code(name), Sender::Collisions)
                .with_context(Payload::Collision(data.clone()))
                .high(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Command, Priority};

    fn codes(out: &mut Outbox) -> Vec<String> {
        let mut codes = Vec::new();
        while let Some(cmd) = out.pop() {
            if let Command::Post(m) = cmd {
                assert_eq!(m.priority, Priority::High);
                codes.push(m.code);
            }
        }
        codes
    }

    fn count(events: &[CollisionEvent], kind: CollisionKind) -> usize {
        events.iter().filter(|e| e.kind == kind).count()
    }

    #[test]
    fn entry_update_exit_lifecycle() {
        let mut manager = CollisionManager::new();
        let a = manager.register(ColliderDesc::new("a", Shape::circle(1.0)));
        let b = manager.register(ColliderDesc::new("b", Shape::circle(1.0).at(Vec3::new(1.5, 0.0, 0.0))));
        let mut out = Outbox::new();

        let mut entries = 0;
        let mut exits = 0;
        for _ in 0..5 {
            let events = manager.update(&mut out);
            entries += count(&events, CollisionKind::Entry);
            exits += count(&events, CollisionKind::Exit);
        }
        assert_eq!(entries, 1);
        assert_eq!(exits, 0);
        assert!(manager.is_colliding(a, b));
        assert_eq!(codes(&mut out), vec!["COLLISION_ENTRY::a", "COLLISION_ENTRY::b"]);

        // Tick 6: three apart.
        manager.set_position(b, Vec3::new(3.0, 0.0, 0.0));
        let events = manager.update(&mut out);
        assert_eq!(count(&events, CollisionKind::Exit), 1);
        assert_eq!(codes(&mut out), vec!["COLLISION_EXIT::a", "COLLISION_EXIT::b"]);
        assert!(!manager.is_colliding(a, b));

        for _ in 0..3 {
            let events = manager.update(&mut out);
            assert!(events.is_empty());
        }
        assert!(out.is_empty());
    }

    #[test]
    fn update_events_while_touching() {
        let mut manager = CollisionManager::new();
        manager.register(ColliderDesc::new("a", Shape::aabb(1.0, 1.0, 1.0)));
        manager.register(ColliderDesc::new("b", Shape::aabb(1.0, 1.0, 1.0)));
        let mut out = Outbox::new();

        let first = manager.update(&mut out);
        assert_eq!(first[0].kind, CollisionKind::Entry);
        let second = manager.update(&mut out);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].kind, CollisionKind::Update);
        // UPDATE posts nothing.
        assert_eq!(codes(&mut out).len(), 2);
    }

    #[test]
    fn entry_context_names_both_sides() {
        let mut manager = CollisionManager::new();
        let mut ground = ColliderDesc::new("groundCollision", Shape::aabb(1.0, 1.0, 1.0));
        ground.is_static = true;
        manager.register(ground);
        manager.register(ColliderDesc::new("playerCollision", Shape::aabb(0.5, 1.0, 0.5)));
        let mut out = Outbox::new();
        manager.update(&mut out);

        let Some(Command::Post(message)) = out.pop() else {
            panic!("expected a post");
        };
        let data = message.collision().unwrap();
        assert!(data.involves("playerCollision"));
        let other = data.other("playerCollision").unwrap();
        assert_eq!(other.name, "groundCollision");
        assert!(other.is_static);
        assert_eq!(data.tick, 1);
    }

    #[test]
    fn unregister_drops_pairs_silently() {
        let mut manager = CollisionManager::new();
        let a = manager.register(ColliderDesc::new("a", Shape::circle(1.0)));
        let b = manager.register(ColliderDesc::new("b", Shape::circle(1.0)));
        let mut out = Outbox::new();
        manager.update(&mut out);
        codes(&mut out);

        assert!(manager.unregister(b));
        assert!(!manager.is_colliding(a, b));
        assert!(manager.update(&mut out).is_empty());
        assert!(out.is_empty());
        assert!(!manager.unregister(b));
    }

    #[test]
    fn clear_forgets_everything() {
        let mut manager = CollisionManager::new();
        manager.register(ColliderDesc::new("a", Shape::circle(1.0)));
        manager.register(ColliderDesc::new("b", Shape::circle(1.0)));
        manager.update(&mut Outbox::new());
        manager.clear();
        assert!(manager.is_empty());
        assert_eq!(manager.pairs().count(), 0);
    }

    #[test]
    fn three_way_overlap_tracks_three_pairs() {
        let mut manager = CollisionManager::new();
        for name in ["a", "b", "c"] {
            manager.register(ColliderDesc::new(name, Shape::circle(1.0)));
        }
        let events = manager.update(&mut Outbox::new());
        assert_eq!(count(&events, CollisionKind::Entry), 3);
        assert_eq!(manager.pairs().count(), 3);
    }
}
