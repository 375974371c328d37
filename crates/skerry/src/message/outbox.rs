//! Deferred side effects requested by gameplay code.
//!
//! Components, behaviors, the collision manager and the level orchestrator
//! are all borrowed mutably while they run, so none of them can hold the bus
//! (or the scene) at the same time. Instead they push [`Command`]s here and
//! the simulation applies them the moment the callee returns.

use std::collections::VecDeque;

use super::{Message, Sender, Subscriber};
use crate::scene::ObjectId;

/// One deferred side effect.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Post a message on the bus (HIGH is still delivered before the outer post returns).
    Post(Message),
    /// Subscribe a handler to a code.
    Subscribe(String, Subscriber),
    /// Remove a handler from a code.
    Unsubscribe(String, Subscriber),
    /// Unload and destroy an object subtree.
    Unload(ObjectId),
    /// Play a named sound on the audio sink.
    PlaySound(String),
}

/// FIFO command buffer.
#[derive(Debug, Default)]
pub struct Outbox {
    commands: VecDeque<Command>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an already-built message.
    pub fn post(&mut self, message: Message) {
        self.commands.push_back(Command::Post(message));
    }

    /// Queue a NORMAL message without context.
    pub fn send(&mut self, code: impl Into<String>, sender: Sender) {
        self.post(Message::new(code, sender));
    }

    /// Queue a HIGH message without context.
    pub fn send_high(&mut self, code: impl Into<String>, sender: Sender) {
        self.post(Message::new(code, sender).high());
    }

    pub fn subscribe(&mut self, code: impl Into<String>, subscriber: Subscriber) {
        self.commands.push_back(Command::Subscribe(code.into(), subscriber));
    }

    pub fn unsubscribe(&mut self, code: impl Into<String>, subscriber: Subscriber) {
        self.commands.push_back(Command::Unsubscribe(code.into(), subscriber));
    }

    pub fn unload(&mut self, object: ObjectId) {
        self.commands.push_back(Command::Unload(object));
    }

    pub fn play_sound(&mut self, name: impl Into<String>) {
        self.commands.push_back(Command::PlaySound(name.into()));
    }

    /// Take the oldest command.
    pub fn pop(&mut self) -> Option<Command> {
        self.commands.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Iterate queued commands without consuming them.
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }
}
