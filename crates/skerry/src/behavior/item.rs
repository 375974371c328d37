//! Collectible items.
//!
//! An item watches its own collision component. The first time the
//! collector's collider (`playerCollision` unless configured otherwise)
//! enters it, the item removes its owner from the scene, plays its sound and
//! posts its message. The level's points are items whose message is
//! `POINT::<levelId>`.

use super::{BehaviorCtx, ReadyCtx, Subscriptions};
use crate::error::{ConfigError, ConfigResult};
use crate::message::{Message, Sender, channel};
use crate::registry::Fields;

/// Collider name that collects items when none is configured.
pub const DEFAULT_COLLECTOR: &str = "playerCollision";

#[derive(Debug, Clone, PartialEq)]
pub struct ItemBehavior {
    /// Name of the sibling collision component that detects pickup.
    pub collision_name: String,
    /// Collider name allowed to collect.
    pub collector: String,
    /// Code posted (NORMAL) on pickup.
    pub message: Option<String>,
    pub sound: Option<String>,
    collected: bool,
}

impl ItemBehavior {
    pub fn new(collision_name: impl Into<String>) -> Self {
        Self {
            collision_name: collision_name.into(),
            collector: DEFAULT_COLLECTOR.to_string(),
            message: None,
            sound: None,
            collected: false,
        }
    }

    /// `{ "collisionName": "point_0_collision", "message": "POINT::1", "collector": "playerCollision", "sound": "ding" }`
    ///
    /// `default_sound` is used when the document names none.
    pub fn from_fields(fields: &Fields<'_>, default_sound: Option<&str>) -> ConfigResult<Self> {
        Ok(Self {
            collision_name: fields.str("collisionName")?,
            collector: fields.opt_str("collector").unwrap_or_else(|| DEFAULT_COLLECTOR.to_string()),
            message: fields.opt_str("message"),
            sound: fields.opt_str("sound").or_else(|| default_sound.map(str::to_string)),
            collected: false,
        })
    }

    pub fn is_collected(&self) -> bool {
        self.collected
    }

    pub fn update_ready(&mut self, ctx: &mut ReadyCtx<'_>, subs: &mut Subscriptions) -> ConfigResult<()> {
        let has_collider = ctx
            .owner
            .component(&self.collision_name)
            .is_some_and(|c| c.as_collision().is_some());
        if !has_collider {
            return Err(ConfigError::MissingSibling {
                owner: ctx.owner.name.clone(),
                kind: "collision component",
                name: self.collision_name.clone(),
            });
        }
        subs.add(channel::collision_entry(&self.collision_name), ctx.me, ctx.out);
        Ok(())
    }

    pub fn on_message(&mut self, message: &Message, ctx: &mut BehaviorCtx<'_>) {
        if self.collected || message.code != channel::collision_entry(&self.collision_name) {
            return;
        }
        let Some(data) = message.collision() else {
            return;
        };
        if !data.involves(&self.collector) {
            return;
        }

        self.collected = true;
        log::debug!("Item `{}` collected", self.collision_name);
        if let Some(sound) = &self.sound {
            ctx.out.play_sound(sound.clone());
        }
        ctx.out.unload(ctx.owner);
        if let Some(code) = &self.message {
            ctx.out.post(Message::new(code.clone(), Sender::Object(ctx.owner)));
        }
    }

    pub fn apply(&mut self, fields: &Fields<'_>) -> ConfigResult<()> {
        if let Some(message) = fields.opt_str("message") {
            self.message = Some(message);
        }
        if let Some(collector) = fields.opt_str("collector") {
            self.collector = collector;
        }
        if let Some(sound) = fields.opt_str("sound") {
            self.sound = Some(sound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{ColliderId, ColliderInfo, CollisionData};
    use crate::input::InputState;
    use crate::math::{Transform, Vec3};
    use crate::message::{Command, Outbox, Payload, Priority, Subscriber};
    use crate::scene::ObjectId;
    use serde_json::json;

    fn info(name: &str) -> ColliderInfo {
        ColliderInfo {
            id: ColliderId(0),
            name: name.into(),
            owner: None,
            is_static: false,
            impenetrable: false,
        }
    }

    fn entry(own: &str, other: &str) -> Message {
        Message::new(channel::collision_entry(own), Sender::Collisions)
            .with_context(Payload::Collision(CollisionData {
                a: info(own),
                b: info(other),
                tick: 1,
            }))
            .high()
    }

    fn deliver(item: &mut ItemBehavior, message: &Message) -> Outbox {
        let mut out = Outbox::new();
        let mut transform = Transform::IDENTITY;
        let input = InputState::new();
        item.on_message(
            message,
            &mut BehaviorCtx {
                me: Subscriber::Behavior(ObjectId(4), 0),
                owner: ObjectId(4),
                transform: &mut transform,
                world_position: Vec3::ZERO,
                input: &input,
                out: &mut out,
            },
        );
        out
    }

    #[test]
    fn collector_entry_collects_once() {
        let json = json!({ "collisionName": "p_col", "message": "POINT::2" });
        let mut item = ItemBehavior::from_fields(&Fields::new(&json, "point", "behavior"), Some("ding")).unwrap();

        let mut out = deliver(&mut item, &entry("p_col", "playerCollision"));
        assert!(item.is_collected());
        assert_eq!(out.pop(), Some(Command::PlaySound("ding".into())));
        assert_eq!(out.pop(), Some(Command::Unload(ObjectId(4))));
        match out.pop() {
            Some(Command::Post(m)) => {
                assert_eq!(m.code, "POINT::2");
                assert_eq!(m.priority, Priority::Normal);
            }
            other => panic!("unexpected {other:?}"),
        }

        let out = deliver(&mut item, &entry("p_col", "playerCollision"));
        assert!(out.is_empty());
    }

    #[test]
    fn other_colliders_are_ignored() {
        let json = json!({ "collisionName": "p_col" });
        let mut item = ItemBehavior::from_fields(&Fields::new(&json, "item", "behavior"), None).unwrap();
        let out = deliver(&mut item, &entry("p_col", "groundCollision"));
        assert!(out.is_empty());
        assert!(!item.is_collected());
    }

    #[test]
    fn collision_name_is_required() {
        let json = json!({ "message": "X" });
        let err = ItemBehavior::from_fields(&Fields::new(&json, "item", "behavior"), None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { ref field, .. } if field == "collisionName"));
    }
}
