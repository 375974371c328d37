//! # Messages — Publish/Subscribe Between Gameplay Pieces
//!
//! Gameplay objects never call each other directly. They post [`Message`]s
//! on string channel codes and subscribe to the codes they care about.
//!
//! ```text
//!  CollisionManager ──COLLISION_ENTRY::playerCollision──► PlayerBehavior
//!  ItemBehavior ──────POINT::3──────────────────────────► Level 3
//!  PlayerBehavior ────PLAYER_DIED───────────────────────► Level 3, HUD
//! ```
//!
//! ## Priority Lanes
//!
//! - [`Priority::High`] messages are delivered to every subscriber before the
//!   post returns.
//! - [`Priority::Normal`] messages are queued per subscriber and drained in
//!   FIFO order, at most `messages_per_drain` entries per frame.
//!
//! Handlers never own the bus. They push commands into an [`Outbox`] and the
//! simulation applies them as soon as the handler returns.

pub mod bus;
pub mod outbox;

pub use bus::MessageBus;
pub use outbox::{Command, Outbox};

use crate::collision::CollisionData;
use crate::input::{KeyContext, MouseContext};
use crate::level::LevelReport;
use crate::scene::ObjectId;

/// Channel codes and code builders.
pub mod channel {
    pub const PLAYER_DIED: &str = "PLAYER_DIED";
    pub const KEY_DOWN: &str = "KEY_DOWN";
    pub const KEY_UP: &str = "KEY_UP";
    pub const MOUSE_DOWN: &str = "MOUSE_DOWN";
    pub const MOUSE_UP: &str = "MOUSE_UP";
    pub const DIFFICULTY_UPDATED: &str = "DIFFICULTY_UPDATED";

    pub const COLLISION_ENTRY: &str = "COLLISION_ENTRY::";
    pub const COLLISION_EXIT: &str = "COLLISION_EXIT::";
    pub const POINT: &str = "POINT::";
    pub const LEVEL_WON: &str = "LEVEL_WON::";
    pub const LEVEL_LOST: &str = "LEVEL_LOST::";
    pub const ASSET_LOADED: &str = "ASSET_LOADED::";

    pub fn collision_entry(collider: &str) -> String {
        format!("{COLLISION_ENTRY}{collider}")
    }

    pub fn collision_exit(collider: &str) -> String {
        format!("{COLLISION_EXIT}{collider}")
    }

    pub fn point(level_id: u32) -> String {
        format!("{POINT}{level_id}")
    }

    pub fn level_won(level_id: u32) -> String {
        format!("{LEVEL_WON}{level_id}")
    }

    pub fn level_lost(level_id: u32) -> String {
        format!("{LEVEL_LOST}{level_id}")
    }

    pub fn asset_loaded(path: &str) -> String {
        format!("{ASSET_LOADED}{path}")
    }
}

/// Delivery lane of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    /// Queued; delivered by [`MessageBus::drain`].
    #[default]
    Normal,
    /// Delivered synchronously inside [`MessageBus::post`].
    High,
}

/// Who posted a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    Engine,
    Collisions,
    Input,
    Assets,
    Object(ObjectId),
    Level(u32),
}

/// Optional context carried by a message.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Collision(CollisionData),
    Key(KeyContext),
    Mouse(MouseContext),
    Level(LevelReport),
    Asset(String),
}

/// A message posted on a channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub code: String,
    pub sender: Sender,
    pub context: Option<Payload>,
    pub priority: Priority,
}

impl Message {
    /// A NORMAL-priority message without context.
    pub fn new(code: impl Into<String>, sender: Sender) -> Self {
        Self {
            code: code.into(),
            sender,
            context: None,
            priority: Priority::Normal,
        }
    }

    /// Attach a context payload.
    pub fn with_context(mut self, context: Payload) -> Self {
        self.context = Some(context);
        self
    }

    /// Switch to the HIGH lane.
    pub fn high(mut self) -> Self {
        self.priority = Priority::High;
        self
    }

    /// The collision context, if this message carries one.
    pub fn collision(&self) -> Option<&CollisionData> {
        match &self.context {
            Some(Payload::Collision(data)) => Some(data),
            _ => None,
        }
    }
}

/// Handle the bus delivers to. Resolved by the simulation at dispatch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subscriber {
    /// The behavior at `index` on object `ObjectId`.
    Behavior(ObjectId, usize),
    /// A level's orchestration logic.
    Level(u32),
    /// An external observer registered with [`Simulation::add_observer`](crate::sim::Simulation::add_observer).
    Observer(usize),
}

/// Something outside the entity graph that reacts to messages (HUD text, audio cues).
pub trait MessageHandler {
    fn on_message(&mut self, message: &Message);
}
