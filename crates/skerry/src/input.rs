//! Keyboard and mouse input state.
//!
//! [`InputState`] keeps one table of [`Button`]s (keys and mouse buttons
//! alike) with the edge each went through this tick: held, pressed,
//! released, or tapped (both within the tick). The platform
//! layer feeds it raw events; every press/release is also turned into a
//! `KEY_DOWN` / `KEY_UP` / `MOUSE_DOWN` / `MOUSE_UP` message that the
//! simulation posts at the start of the next tick.
//!
//! Directional steering reads arrows and WASD:
//!
//! ```text
//!            Up (-Z)
//!               ▲
//!  Left (-X) ◄──┼──► Right (+X)
//!               ▼
//!           Down (+Z)
//! ```

use std::collections::HashMap;

use crate::math::{Vec2, Vec3};
use crate::message::{Message, Payload, Sender, channel};

pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;

/// Anything that can be held down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Key(KeyCode),
    Mouse(MouseButton),
}

/// What happened to a button during the current tick.
///
/// A button pressed and released within one tick is `Tapped`: it is no
/// longer held but both edges are still visible until the tick ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Held,
    Pressed,
    Released,
    Tapped,
}

/// One of the four grid directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Map a key to a direction (arrows and WASD).
    pub fn from_key(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::ArrowUp | KeyCode::KeyW => Some(Self::Up),
            KeyCode::ArrowDown | KeyCode::KeyS => Some(Self::Down),
            KeyCode::ArrowLeft | KeyCode::KeyA => Some(Self::Left),
            KeyCode::ArrowRight | KeyCode::KeyD => Some(Self::Right),
            _ => None,
        }
    }

    /// Unit vector on the ground plane.
    pub fn unit(self) -> Vec3 {
        match self {
            Self::Up => Vec3::NEG_Z,
            Self::Down => Vec3::Z,
            Self::Left => Vec3::NEG_X,
            Self::Right => Vec3::X,
        }
    }

    /// `true` for Left/Right.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

/// Context of a `KEY_DOWN` / `KEY_UP` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyContext {
    pub key: KeyCode,
}

/// Context of a `MOUSE_DOWN` / `MOUSE_UP` message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseContext {
    pub left_down: bool,
    pub right_down: bool,
    pub position: Vec2,
}

/// Keyboard, mouse and cursor state for one tick.
#[derive(Default)]
pub struct InputState {
    /// Buttons that are held or changed this tick. Released buttons stay
    /// until `end_tick` so their edge can be queried.
    buttons: HashMap<Button, Edge>,
    cursor: Vec2,
    /// Held directional keys, oldest first.
    held_directions: Vec<KeyCode>,
    /// Messages produced by raw events, not yet posted.
    pending: Vec<Message>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_down(&self, button: Button) -> bool {
        matches!(self.buttons.get(&button), Some(Edge::Held | Edge::Pressed))
    }

    /// Went down during this tick.
    pub fn was_pressed(&self, button: Button) -> bool {
        matches!(self.buttons.get(&button), Some(Edge::Pressed | Edge::Tapped))
    }

    /// Came up during this tick.
    pub fn was_released(&self, button: Button) -> bool {
        matches!(self.buttons.get(&button), Some(Edge::Released | Edge::Tapped))
    }

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.is_down(Button::Key(key))
    }

    pub fn is_mouse_down(&self, button: MouseButton) -> bool {
        self.is_down(Button::Mouse(button))
    }

    /// Cursor position in window coordinates.
    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    /// The most recently pressed directional key that is still held.
    pub fn direction(&self) -> Option<Direction> {
        self.held_directions.last().copied().and_then(Direction::from_key)
    }

    /// Whether any key mapped to `direction` is held.
    pub fn is_direction_down(&self, direction: Direction) -> bool {
        self.held_directions
            .iter()
            .any(|k| Direction::from_key(*k) == Some(direction))
    }

    /// Record a press; `false` when the button was already down.
    fn press(&mut self, button: Button) -> bool {
        let edge = self.buttons.get(&button).copied();
        if matches!(edge, Some(Edge::Held | Edge::Pressed)) {
            return false;
        }
        self.buttons.insert(button, Edge::Pressed);
        true
    }

    /// Record a release; `false` when the button was not down.
    fn release(&mut self, button: Button) -> bool {
        let next = match self.buttons.get(&button) {
            Some(Edge::Held) => Edge::Released,
            Some(Edge::Pressed) => Edge::Tapped,
            _ => return false,
        };
        self.buttons.insert(button, next);
        true
    }

    /// Raw key press from the platform layer. Auto-repeat presses are ignored.
    pub fn press_key(&mut self, key: KeyCode) {
        if !self.press(Button::Key(key)) {
            return;
        }
        if Direction::from_key(key).is_some() {
            self.held_directions.push(key);
        }
        self.pending.push(
            Message::new(channel::KEY_DOWN, Sender::Input).with_context(Payload::Key(KeyContext { key })),
        );
    }

    /// Raw key release from the platform layer.
    pub fn release_key(&mut self, key: KeyCode) {
        if !self.release(Button::Key(key)) {
            return;
        }
        self.held_directions.retain(|k| *k != key);
        self.pending.push(
            Message::new(channel::KEY_UP, Sender::Input).with_context(Payload::Key(KeyContext { key })),
        );
    }

    pub fn move_cursor(&mut self, position: Vec2) {
        self.cursor = position;
    }

    pub fn press_mouse(&mut self, button: MouseButton) {
        if self.press(Button::Mouse(button)) {
            let context = self.mouse_context();
            self.pending.push(Message::new(channel::MOUSE_DOWN, Sender::Input).with_context(context));
        }
    }

    pub fn release_mouse(&mut self, button: MouseButton) {
        if self.release(Button::Mouse(button)) {
            let context = self.mouse_context();
            self.pending.push(Message::new(channel::MOUSE_UP, Sender::Input).with_context(context));
        }
    }

    fn mouse_context(&self) -> Payload {
        Payload::Mouse(MouseContext {
            left_down: self.is_mouse_down(MouseButton::Left),
            right_down: self.is_mouse_down(MouseButton::Right),
            position: self.cursor,
        })
    }

    /// Messages produced since the last call, in event order.
    pub(crate) fn take_messages(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.pending)
    }

    /// Settle this tick's edges: pressed buttons become held, released
    /// ones are forgotten. Called once the tick has been simulated.
    pub(crate) fn end_tick(&mut self) {
        self.buttons.retain(|_, edge| match edge {
            Edge::Held | Edge::Pressed => {
                *edge = Edge::Held;
                true
            }
            Edge::Released | Edge::Tapped => false,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release_track_state() {
        let space = Button::Key(KeyCode::Space);
        let mut input = InputState::new();
        input.press_key(KeyCode::Space);
        assert!(input.is_key_down(KeyCode::Space));
        assert!(input.was_pressed(space));

        input.end_tick();
        assert!(input.is_down(space));
        assert!(!input.was_pressed(space));

        input.release_key(KeyCode::Space);
        assert!(!input.is_key_down(KeyCode::Space));
        assert!(input.was_released(space));

        input.end_tick();
        assert!(!input.was_released(space));
    }

    #[test]
    fn tap_within_one_tick_shows_both_edges() {
        let left = Button::Mouse(MouseButton::Left);
        let mut input = InputState::new();
        input.press_mouse(MouseButton::Left);
        input.release_mouse(MouseButton::Left);
        assert!(!input.is_mouse_down(MouseButton::Left));
        assert!(input.was_pressed(left));
        assert!(input.was_released(left));

        // Pressing again in the same tick is a fresh press.
        input.press_mouse(MouseButton::Left);
        assert!(input.is_down(left));
        let codes: Vec<_> = input.take_messages().into_iter().map(|m| m.code).collect();
        assert_eq!(codes, vec![channel::MOUSE_DOWN, channel::MOUSE_UP, channel::MOUSE_DOWN]);

        input.end_tick();
        assert!(input.is_down(left));
        assert!(!input.was_pressed(left));
    }

    #[test]
    fn key_events_become_messages() {
        let mut input = InputState::new();
        input.press_key(KeyCode::KeyD);
        input.press_key(KeyCode::KeyD);
        input.release_key(KeyCode::KeyD);

        let codes: Vec<_> = input.take_messages().into_iter().map(|m| m.code).collect();
        assert_eq!(codes, vec![channel::KEY_DOWN, channel::KEY_UP]);
        assert!(input.take_messages().is_empty());
    }

    #[test]
    fn mouse_context_reports_buttons_and_cursor() {
        let mut input = InputState::new();
        input.move_cursor(Vec2::new(10.0, 20.0));
        input.press_mouse(MouseButton::Left);

        let messages = input.take_messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(
            messages[0].context,
            Some(Payload::Mouse(MouseContext {
                left_down: true,
                right_down: false,
                position: Vec2::new(10.0, 20.0),
            }))
        );
    }

    #[test]
    fn latest_held_direction_wins() {
        let mut input = InputState::new();
        assert_eq!(input.direction(), None);

        input.press_key(KeyCode::ArrowRight);
        input.press_key(KeyCode::KeyW);
        assert_eq!(input.direction(), Some(Direction::Up));

        input.release_key(KeyCode::KeyW);
        assert_eq!(input.direction(), Some(Direction::Right));
        assert!(input.is_direction_down(Direction::Right));
    }

    #[test]
    fn direction_vectors() {
        assert_eq!(Direction::Right.unit(), Vec3::X);
        assert_eq!(Direction::Up.unit(), Vec3::NEG_Z);
        assert!(Direction::Left.is_horizontal());
        assert!(!Direction::Down.is_horizontal());
    }
}
