//! # Behaviors
//!
//! Behaviors are the active half of an object: they read input, react to
//! messages and move their owner. Components only follow.
//!
//! ```text
//!   load ──► update_ready (once) ──► update(dt) / on_message ... ──► unload
//!                 │                                                    │
//!           resolve siblings,                                   release every
//!           subscribe to codes                                  subscription
//! ```
//!
//! | Tag                | Kind                          |
//! |--------------------|-------------------------------|
//! | `player`           | [`PlayerBehavior`]            |
//! | `item` / `point`   | [`ItemBehavior`]              |
//! | `rotation`         | [`RotationBehavior`]          |
//! | `keyboardMovement` | [`KeyboardMovementBehavior`]  |
//! | `scroll`           | [`ScrollBehavior`]            |
//!
//! A behavior never holds the bus. Its subscriber handle (`me`) and an
//! [`Outbox`] arrive through the context of every call.

pub mod item;
pub mod motion;
pub mod player;

pub use item::ItemBehavior;
pub use motion::{KeyboardMovementBehavior, RotationBehavior, ScrollBehavior};
pub use player::{PlayerBehavior, PlayerState};

use serde_json::Value;

use crate::error::ConfigResult;
use crate::input::InputState;
use crate::math::{Transform, Vec3};
use crate::message::{Message, Outbox, Subscriber};
use crate::scene::{GameObject, ObjectId};

/// Context of [`Behavior::update_ready`].
pub struct ReadyCtx<'a> {
    pub me: Subscriber,
    /// The owner, with its components attached and loaded.
    pub owner: &'a GameObject,
    pub out: &'a mut Outbox,
}

/// Context of [`Behavior::update`] and [`Behavior::on_message`].
pub struct BehaviorCtx<'a> {
    pub me: Subscriber,
    pub owner: ObjectId,
    /// The owner's local transform.
    pub transform: &'a mut Transform,
    /// The owner's world position as of this tick's matrix update.
    pub world_position: Vec3,
    pub input: &'a InputState,
    pub out: &'a mut Outbox,
}

/// Codes a behavior subscribed to, so unload can release them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Subscriptions {
    codes: Vec<String>,
}

impl Subscriptions {
    pub fn add(&mut self, code: String, me: Subscriber, out: &mut Outbox) {
        if self.codes.contains(&code) {
            return;
        }
        out.subscribe(code.clone(), me);
        self.codes.push(code);
    }

    pub fn release(&mut self, me: Subscriber, out: &mut Outbox) {
        for code in self.codes.drain(..) {
            out.unsubscribe(code, me);
        }
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }
}

/// A named, owned behavior instance.
#[derive(Debug, Clone)]
pub struct Behavior {
    pub id: u32,
    pub name: String,
    pub type_tag: String,
    pub owner: Option<ObjectId>,
    pub kind: BehaviorKind,
    pub subscriptions: Subscriptions,
}

/// Closed set of behavior logic.
#[derive(Debug, Clone, PartialEq)]
pub enum BehaviorKind {
    Player(PlayerBehavior),
    Item(ItemBehavior),
    Rotation(RotationBehavior),
    KeyboardMovement(KeyboardMovementBehavior),
    Scroll(ScrollBehavior),
}

impl Behavior {
    pub fn new(id: u32, name: impl Into<String>, type_tag: impl Into<String>, kind: BehaviorKind) -> Self {
        Self {
            id,
            name: name.into(),
            type_tag: type_tag.into(),
            owner: None,
            kind,
            subscriptions: Subscriptions::default(),
        }
    }

    /// Resolve sibling references and subscribe. Runs once, after load.
    pub fn update_ready(&mut self, ctx: &mut ReadyCtx<'_>) -> ConfigResult<()> {
        self.owner = Some(ctx.owner.id);
        match &mut self.kind {
            BehaviorKind::Player(player) => player.update_ready(ctx, &mut self.subscriptions),
            BehaviorKind::Item(item) => item.update_ready(ctx, &mut self.subscriptions),
            BehaviorKind::Scroll(scroll) => scroll.update_ready(ctx, &mut self.subscriptions),
            BehaviorKind::Rotation(_) | BehaviorKind::KeyboardMovement(_) => Ok(()),
        }
    }

    pub fn update(&mut self, dt: f32, ctx: &mut BehaviorCtx<'_>) {
        match &mut self.kind {
            BehaviorKind::Player(player) => player.update(dt, ctx),
            BehaviorKind::Item(_) => {}
            BehaviorKind::Rotation(rotation) => rotation.update(dt, ctx),
            BehaviorKind::KeyboardMovement(movement) => movement.update(dt, ctx),
            BehaviorKind::Scroll(scroll) => scroll.update(dt, ctx),
        }
    }

    pub fn on_message(&mut self, message: &Message, ctx: &mut BehaviorCtx<'_>) {
        match &mut self.kind {
            BehaviorKind::Player(player) => player.on_message(message, ctx),
            BehaviorKind::Item(item) => item.on_message(message, ctx),
            BehaviorKind::Scroll(scroll) => scroll.on_message(message, ctx),
            BehaviorKind::Rotation(_) | BehaviorKind::KeyboardMovement(_) => {
                log::trace!("{} ignores {}", self.name, message.code);
            }
        }
    }

    /// Push runtime data into the behavior (same field names as its spec).
    pub fn apply(&mut self, data: &Value) -> ConfigResult<()> {
        let fields = crate::registry::Fields::new(data, &self.type_tag, "behavior");
        match &mut self.kind {
            BehaviorKind::Player(player) => player.apply(&fields),
            BehaviorKind::Item(item) => item.apply(&fields),
            BehaviorKind::Rotation(rotation) => rotation.apply(&fields),
            BehaviorKind::KeyboardMovement(movement) => movement.apply(&fields),
            BehaviorKind::Scroll(scroll) => scroll.apply(&fields),
        }
    }

    /// Release every subscription.
    pub fn unload(&mut self, me: Subscriber, out: &mut Outbox) {
        self.subscriptions.release(me, out);
    }

    pub fn as_player(&self) -> Option<&PlayerBehavior> {
        match &self.kind {
            BehaviorKind::Player(player) => Some(player),
            _ => None,
        }
    }
}
