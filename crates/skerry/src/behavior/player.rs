//! # Player Movement
//!
//! Grid-aligned, four-directional movement with Pac-Man style turning: a
//! direction key only *requests* a turn, and the turn happens once the
//! player is close enough to a grid line to take it cleanly.
//!
//! ```text
//!                 direction key
//!   ┌──────┐   (commit when aligned)   ┌────────┐
//!   │ Idle │ ────────────────────────► │ Moving │ ◄─┐ direction key
//!   └──────┘                           └────────┘ ──┘ (commit when aligned)
//!      ▲  ▲ impenetrable entry              │
//!      │  └─────────────────────────────────┤
//!      │                                    │ last ground contact exits
//!      │  y < fall_reset_height       ┌────────┐
//!      └──────────────────────────────│ Fallen │  PLAYER_DIED (once), "dead"
//!         reset to resetPosition      └────────┘
//! ```
//!
//! ## Turning
//!
//! Moving along X requires the Z coordinate to be within the snap tolerance
//! of an integer; moving along Z checks X. On commit the off-axis coordinate
//! snaps onto the grid line, so the player can never cut a corner.
//!
//! ## Ground
//!
//! The player is grounded while at least one entry relationship with the
//! collider named by `groundCollisionComponent` is open. Entries only count
//! while alive; the exit of the last one is a fall.

use super::{BehaviorCtx, ReadyCtx, Subscriptions};
use crate::config::PlayerTuning;
use crate::error::{ConfigError, ConfigResult};
use crate::input::Direction;
use crate::math::Vec3;
use crate::message::{Message, Sender, channel};
use crate::registry::Fields;

/// Movement state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerState {
    #[default]
    Idle,
    Moving,
    Fallen,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerBehavior {
    /// Tiles per second.
    pub speed: f32,
    /// Name of the player's own collision component.
    pub player_collision: String,
    /// Collider name that counts as ground.
    pub ground_collision: String,
    /// Where a fallen player respawns. Defaults to the spawn position.
    pub reset_position: Option<Vec3>,
    pub tuning: PlayerTuning,
    state: PlayerState,
    velocity: Vec3,
    heading: Option<Direction>,
    pending: Option<Direction>,
    ground_contacts: usize,
}

impl PlayerBehavior {
    pub fn new(speed: f32, tuning: PlayerTuning) -> Self {
        Self {
            speed,
            player_collision: "playerCollision".into(),
            ground_collision: "groundCollision".into(),
            reset_position: None,
            tuning,
            state: PlayerState::Idle,
            velocity: Vec3::ZERO,
            heading: None,
            pending: None,
            ground_contacts: 0,
        }
    }

    /// ```json
    /// { "playerCollisionComponent": "playerCollision",
    ///   "groundCollisionComponent": "groundCollision",
    ///   "speed": 2.0, "resetPosition": { "x": 0, "y": 0.5, "z": 0 } }
    /// ```
    pub fn from_fields(fields: &Fields<'_>, tuning: PlayerTuning) -> ConfigResult<Self> {
        let mut tuning = tuning;
        if let Some(tolerance) = fields.opt_f32("snapTolerance")? {
            tuning.snap_tolerance = tolerance;
        }
        Ok(Self {
            player_collision: fields.str("playerCollisionComponent")?,
            ground_collision: fields.str("groundCollisionComponent")?,
            reset_position: fields.opt_vec3("resetPosition"),
            ..Self::new(fields.opt_f32("speed")?.unwrap_or(1.0), tuning)
        })
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn pending(&self) -> Option<Direction> {
        self.pending
    }

    pub fn ground_contacts(&self) -> usize {
        self.ground_contacts
    }

    pub fn update_ready(&mut self, ctx: &mut ReadyCtx<'_>, subs: &mut Subscriptions) -> ConfigResult<()> {
        let has_collider = ctx
            .owner
            .component(&self.player_collision)
            .is_some_and(|c| c.as_collision().is_some());
        if !has_collider {
            return Err(ConfigError::MissingSibling {
                owner: ctx.owner.name.clone(),
                kind: "collision component",
                name: self.player_collision.clone(),
            });
        }
        if self.reset_position.is_none() {
            self.reset_position = Some(ctx.owner.transform.position);
        }
        subs.add(channel::collision_entry(&self.player_collision), ctx.me, ctx.out);
        subs.add(channel::collision_exit(&self.player_collision), ctx.me, ctx.out);
        Ok(())
    }

    pub fn update(&mut self, dt: f32, ctx: &mut BehaviorCtx<'_>) {
        if self.state == PlayerState::Fallen {
            self.velocity.y -= self.tuning.gravity * dt;
            ctx.transform.position += self.velocity * dt;
            if ctx.transform.position.y < self.tuning.fall_reset_height {
                self.reset(ctx);
            }
            return;
        }

        if let Some(direction) = ctx.input.direction() {
            if self.heading != Some(direction) {
                self.pending = Some(direction);
            }
        }
        if let Some(direction) = self.pending {
            self.try_turn(direction, ctx);
        }

        ctx.transform.position += self.velocity * dt;
    }

    /// Commit `direction` if the off-axis coordinate is close to a grid line.
    fn try_turn(&mut self, direction: Direction, ctx: &mut BehaviorCtx<'_>) {
        let position = &mut ctx.transform.position;
        let off_axis = if direction.is_horizontal() {
            &mut position.z
        } else {
            &mut position.x
        };
        if (*off_axis - off_axis.round()).abs() >= self.tuning.snap_tolerance {
            return;
        }
        *off_axis = off_axis.round();
        self.velocity = direction.unit() * self.speed;
        self.heading = Some(direction);
        self.pending = None;
        self.state = PlayerState::Moving;
    }

    pub fn on_message(&mut self, message: &Message, ctx: &mut BehaviorCtx<'_>) {
        let Some(data) = message.collision() else {
            return;
        };
        let Some(other) = data.other(&self.player_collision) else {
            return;
        };
        let is_ground = other.name == self.ground_collision;

        if message.code == channel::collision_entry(&self.player_collision) {
            if self.state == PlayerState::Fallen {
                return;
            }
            if is_ground {
                self.ground_contacts += 1;
            } else if other.impenetrable {
                self.stop(ctx);
            }
        } else if message.code == channel::collision_exit(&self.player_collision) && is_ground {
            self.ground_contacts = self.ground_contacts.saturating_sub(1);
            if self.ground_contacts == 0 && self.state != PlayerState::Fallen {
                self.fall(ctx);
            }
        }
    }

    /// Halt on the current grid cell.
    fn stop(&mut self, ctx: &mut BehaviorCtx<'_>) {
        let position = &mut ctx.transform.position;
        position.x = position.x.round();
        position.z = position.z.round();
        self.velocity = Vec3::ZERO;
        self.heading = None;
        self.pending = None;
        self.state = PlayerState::Idle;
    }

    fn fall(&mut self, ctx: &mut BehaviorCtx<'_>) {
        log::info!("Player fell at {:?}", ctx.transform.position);
        self.state = PlayerState::Fallen;
        self.velocity = Vec3::ZERO;
        self.heading = None;
        self.pending = None;
        ctx.out.play_sound("dead");
        ctx.out.post(Message::new(channel::PLAYER_DIED, Sender::Object(ctx.owner)));
    }

    fn reset(&mut self, ctx: &mut BehaviorCtx<'_>) {
        if let Some(position) = self.reset_position {
            ctx.transform.position = position;
        }
        log::debug!("Player reset to {:?}", ctx.transform.position);
        self.state = PlayerState::Idle;
        self.velocity = Vec3::ZERO;
        self.heading = None;
        self.pending = None;
        self.ground_contacts = 0;
    }

    pub fn apply(&mut self, fields: &Fields<'_>) -> ConfigResult<()> {
        if let Some(speed) = fields.opt_f32("speed")? {
            self.speed = speed;
            if let Some(heading) = self.heading {
                self.velocity = heading.unit() * speed;
            }
        }
        if let Some(position) = fields.opt_vec3("resetPosition") {
            self.reset_position = Some(position);
        }
        Ok(())
    }
}
