//! Simple motion behaviors: constant spin, free keyboard movement and
//! message-controlled scrolling.

use super::{BehaviorCtx, ReadyCtx, Subscriptions};
use crate::error::ConfigResult;
use crate::input::Direction;
use crate::math::Vec3;
use crate::message::Message;
use crate::registry::Fields;

/// Spins the owner at a constant rate.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationBehavior {
    /// Radians per second around each axis.
    pub rate: Vec3,
}

impl RotationBehavior {
    pub fn new(rate: Vec3) -> Self {
        Self { rate }
    }

    /// `{ "rotation": { "y": 1.5 } }`
    pub fn from_fields(fields: &Fields<'_>) -> ConfigResult<Self> {
        Ok(Self::new(fields.opt_vec3("rotation").unwrap_or(Vec3::ZERO)))
    }

    pub fn update(&mut self, dt: f32, ctx: &mut BehaviorCtx<'_>) {
        ctx.transform.rotation += self.rate * dt;
    }

    pub fn apply(&mut self, fields: &Fields<'_>) -> ConfigResult<()> {
        if let Some(rate) = fields.opt_vec3("rotation") {
            self.rate = rate;
        }
        Ok(())
    }
}

/// Moves the owner on the ground plane while direction keys are held.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyboardMovementBehavior {
    /// Units per second.
    pub speed: f32,
}

impl KeyboardMovementBehavior {
    pub fn new(speed: f32) -> Self {
        Self { speed }
    }

    /// `{ "speed": 3.0 }`
    pub fn from_fields(fields: &Fields<'_>) -> ConfigResult<Self> {
        Ok(Self::new(fields.opt_f32("speed")?.unwrap_or(1.0)))
    }

    pub fn update(&mut self, dt: f32, ctx: &mut BehaviorCtx<'_>) {
        let step: Vec3 = [Direction::Up, Direction::Down, Direction::Left, Direction::Right]
            .into_iter()
            .filter(|d| ctx.input.is_direction_down(*d))
            .map(Direction::unit)
            .sum();
        ctx.transform.position += step * self.speed * dt;
    }

    pub fn apply(&mut self, fields: &Fields<'_>) -> ConfigResult<()> {
        if let Some(speed) = fields.opt_f32("speed")? {
            self.speed = speed;
        }
        Ok(())
    }
}

/// Slides the owner at a constant velocity while started, jumping back to
/// `reset_position` once it has passed `min_position` on every axis.
///
/// ```text
///   reset ◄──────── jump ─────────┐
///     ●  ──► velocity ──► ... ──► min
/// ```
///
/// Start, stop and reset are driven by messages; with no start code
/// configured the behavior never moves.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollBehavior {
    /// Units per second.
    pub velocity: Vec3,
    pub min_position: Vec3,
    pub reset_position: Vec3,
    pub start_message: Option<String>,
    pub stop_message: Option<String>,
    /// Restores the position the owner had when it became ready.
    pub reset_message: Option<String>,
    scrolling: bool,
    initial_position: Vec3,
}

impl ScrollBehavior {
    pub fn new(velocity: Vec3, min_position: Vec3, reset_position: Vec3) -> Self {
        Self {
            velocity,
            min_position,
            reset_position,
            start_message: None,
            stop_message: None,
            reset_message: None,
            scrolling: false,
            initial_position: Vec3::ZERO,
        }
    }

    /// `{ "velocity": { "x": -1 }, "minPosition": { "x": -10 }, "resetPosition": { "x": 10 },
    ///    "startMessage": "GAME_START", "stopMessage": "GAME_OVER", "resetMessage": "GAME_RESET" }`
    pub fn from_fields(fields: &Fields<'_>) -> ConfigResult<Self> {
        Ok(Self {
            start_message: fields.opt_str("startMessage"),
            stop_message: fields.opt_str("stopMessage"),
            reset_message: fields.opt_str("resetMessage"),
            ..Self::new(fields.vec3("velocity")?, fields.vec3("minPosition")?, fields.vec3("resetPosition")?)
        })
    }

    pub fn is_scrolling(&self) -> bool {
        self.scrolling
    }

    pub fn update_ready(&mut self, ctx: &mut ReadyCtx<'_>, subs: &mut Subscriptions) -> ConfigResult<()> {
        for code in [&self.start_message, &self.stop_message, &self.reset_message].into_iter().flatten() {
            subs.add(code.clone(), ctx.me, ctx.out);
        }
        self.initial_position = ctx.owner.transform.position;
        Ok(())
    }

    pub fn update(&mut self, dt: f32, ctx: &mut BehaviorCtx<'_>) {
        if !self.scrolling {
            return;
        }
        ctx.transform.position += self.velocity * dt;
        if ctx.transform.position.cmple(self.min_position).all() {
            ctx.transform.position = self.reset_position;
        }
    }

    pub fn on_message(&mut self, message: &Message, ctx: &mut BehaviorCtx<'_>) {
        let code = Some(&message.code);
        if code == self.start_message.as_ref() {
            self.scrolling = true;
        } else if code == self.stop_message.as_ref() {
            self.scrolling = false;
        } else if code == self.reset_message.as_ref() {
            ctx.transform.position = self.initial_position;
        }
    }

    pub fn apply(&mut self, fields: &Fields<'_>) -> ConfigResult<()> {
        if let Some(velocity) = fields.opt_vec3("velocity") {
            self.velocity = velocity;
        }
        if let Some(min) = fields.opt_vec3("minPosition") {
            self.min_position = min;
        }
        if let Some(reset) = fields.opt_vec3("resetPosition") {
            self.reset_position = reset;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{InputState, KeyCode};
    use crate::math::Transform;
    use crate::message::{Command, Outbox, Sender, Subscriber};
    use crate::scene::{GameObject, ObjectId};

    fn run(input: &InputState, transform: &mut Transform, f: impl FnOnce(&mut BehaviorCtx<'_>)) {
        let mut out = Outbox::new();
        let mut ctx = BehaviorCtx {
            me: Subscriber::Behavior(ObjectId(1), 0),
            owner: ObjectId(1),
            transform,
            world_position: Vec3::ZERO,
            input,
            out: &mut out,
        };
        f(&mut ctx);
    }

    #[test]
    fn rotation_is_per_second() {
        let mut spin = RotationBehavior::new(Vec3::new(0.0, 2.0, 0.0));
        let mut transform = Transform::IDENTITY;
        let input = InputState::new();
        run(&input, &mut transform, |ctx| spin.update(0.5, ctx));
        assert!((transform.rotation.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn keyboard_movement_follows_held_keys() {
        let mut walk = KeyboardMovementBehavior::new(2.0);
        let mut transform = Transform::IDENTITY;
        let mut input = InputState::new();
        input.press_key(KeyCode::KeyD);
        input.press_key(KeyCode::ArrowUp);
        run(&input, &mut transform, |ctx| walk.update(0.5, ctx));
        assert!((transform.position - Vec3::new(1.0, 0.0, -1.0)).length() < 1e-6);
    }

    fn scroller() -> ScrollBehavior {
        ScrollBehavior {
            start_message: Some("GAME_START".into()),
            stop_message: Some("GAME_OVER".into()),
            reset_message: Some("GAME_RESET".into()),
            ..ScrollBehavior::new(Vec3::new(-4.0, 0.0, 0.0), Vec3::new(-10.0, 0.0, 0.0), Vec3::new(10.0, 0.0, 0.0))
        }
    }

    fn message(code: &str) -> Message {
        Message::new(code, Sender::Engine)
    }

    #[test]
    fn scroll_subscribes_to_its_codes() {
        let mut scroll = scroller();
        let mut owner = GameObject::new(ObjectId(1), "backdrop");
        owner.transform.position = Vec3::new(2.0, 0.0, 0.0);
        let mut out = Outbox::new();
        let mut subs = Subscriptions::default();
        let me = Subscriber::Behavior(ObjectId(1), 0);
        let mut ctx = ReadyCtx { me, owner: &owner, out: &mut out };
        scroll.update_ready(&mut ctx, &mut subs).unwrap();

        assert_eq!(subs.codes(), ["GAME_START", "GAME_OVER", "GAME_RESET"]);
        assert_eq!(out.pop(), Some(Command::Subscribe("GAME_START".into(), me)));
        assert_eq!(scroll.initial_position, Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn scroll_waits_for_start_and_halts_on_stop() {
        let mut scroll = scroller();
        let mut transform = Transform::IDENTITY;
        let input = InputState::new();

        run(&input, &mut transform, |ctx| scroll.update(1.0, ctx));
        assert_eq!(transform.position, Vec3::ZERO);

        run(&input, &mut transform, |ctx| {
            scroll.on_message(&message("GAME_START"), ctx);
            scroll.update(0.5, ctx);
        });
        assert!(scroll.is_scrolling());
        assert_eq!(transform.position, Vec3::new(-2.0, 0.0, 0.0));

        run(&input, &mut transform, |ctx| {
            scroll.on_message(&message("GAME_OVER"), ctx);
            scroll.update(0.5, ctx);
        });
        assert!(!scroll.is_scrolling());
        assert_eq!(transform.position, Vec3::new(-2.0, 0.0, 0.0));
    }

    #[test]
    fn scroll_wraps_past_min_position() {
        let mut scroll = scroller();
        let mut transform = Transform::from_xyz(-8.0, 0.0, 0.0);
        let input = InputState::new();
        run(&input, &mut transform, |ctx| {
            scroll.on_message(&message("GAME_START"), ctx);
            scroll.update(0.25, ctx);
        });
        assert_eq!(transform.position, Vec3::new(-9.0, 0.0, 0.0));

        run(&input, &mut transform, |ctx| scroll.update(0.5, ctx));
        assert_eq!(transform.position, Vec3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn scroll_reset_restores_initial_position() {
        let mut scroll = scroller();
        scroll.initial_position = Vec3::new(2.0, 0.0, 0.0);
        let mut transform = Transform::from_xyz(-5.0, 0.0, 0.0);
        let input = InputState::new();
        run(&input, &mut transform, |ctx| scroll.on_message(&message("GAME_RESET"), ctx));
        assert_eq!(transform.position, Vec3::new(2.0, 0.0, 0.0));
    }
}
