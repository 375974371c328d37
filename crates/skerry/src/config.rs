//! # Game Configuration
//!
//! Every tuning number of the tile game lives in one serde document so a
//! designer can tweak it without recompiling:
//!
//! ```json
//! {
//!   "initial": { "speed": 2.0, "points_to_collect": 3, "width": 15, "depth": 10 },
//!   "step":    { "speed": 0.25, "points_to_collect": 1, "width": 2, "depth": 1 },
//!   "lives": 3,
//!   "map":    { "hole_threshold": -0.3, "playable_ratio": 0.6 },
//!   "player": { "snap_tolerance": 0.2 },
//!   "seed": 42
//! }
//! ```
//!
//! Missing sections and fields fall back to [`Default`], which reproduces
//! the shipped game's tuning.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::message::bus::DEFAULT_MESSAGES_PER_DRAIN;

// ── Difficulty ─────────────────────────────────────────────────────────────

/// The knobs that change from one level to the next.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Difficulty {
    /// Player speed in tiles per second.
    pub speed: f32,
    pub points_to_collect: usize,
    /// Map width in tiles (X).
    pub width: usize,
    /// Map depth in tiles (Z).
    pub depth: usize,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self {
            speed: 2.0,
            points_to_collect: 3,
            width: 15,
            depth: 10,
        }
    }
}

impl Difficulty {
    /// The difficulty of the level after this one was won.
    ///
    /// Width and depth stop growing at the caps. The point count never exceeds
    /// what the (capped) grid could hold alongside a start tile.
    pub fn harder(&self, step: &DifficultyStep, max_width: usize, max_depth: usize) -> Self {
        let width = (self.width + step.width).min(max_width.max(self.width));
        let depth = (self.depth + step.depth).min(max_depth.max(self.depth));
        let capacity = (width * depth).saturating_sub(1);
        Self {
            speed: self.speed + step.speed,
            points_to_collect: (self.points_to_collect + step.points_to_collect).min(capacity),
            width,
            depth,
        }
    }
}

/// Increments applied by [`Difficulty::harder`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyStep {
    pub speed: f32,
    pub points_to_collect: usize,
    pub width: usize,
    pub depth: usize,
}

impl Default for DifficultyStep {
    fn default() -> Self {
        Self {
            speed: 0.25,
            points_to_collect: 1,
            width: 2,
            depth: 1,
        }
    }
}

// ── Map generation ─────────────────────────────────────────────────────────

/// Procedural map tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Noise samples below this become holes.
    pub hole_threshold: f32,
    /// Multiplier applied to tile coordinates before sampling.
    pub noise_scale: f32,
    /// Largest component must exceed this fraction of the grid.
    pub playable_ratio: f32,
    /// Regeneration attempts before falling back to a solid grid.
    pub max_attempts: u32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            hole_threshold: -0.3,
            noise_scale: 1.0,
            playable_ratio: 0.6,
            max_attempts: 64,
        }
    }
}

// ── Player ─────────────────────────────────────────────────────────────────

/// Player movement tuning shared by every `player` behavior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Max distance from a grid line at which a turn may commit.
    pub snap_tolerance: f32,
    /// Height below which a fallen player is reset.
    pub fall_reset_height: f32,
    /// Downward acceleration while falling, units/s².
    pub gravity: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            snap_tolerance: 0.2,
            fall_reset_height: -10.0,
            gravity: 9.81,
        }
    }
}

// ── Root document ──────────────────────────────────────────────────────────

/// Complete game configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Difficulty of the first level (and after a game over).
    pub initial: Difficulty,
    pub step: DifficultyStep,
    pub max_width: usize,
    pub max_depth: usize,
    /// Lives at game start and after a game over.
    pub lives: u32,
    pub map: MapConfig,
    pub player: PlayerTuning,
    /// NORMAL-lane entries delivered per tick.
    pub messages_per_drain: usize,
    /// Fixed map seed; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            initial: Difficulty::default(),
            step: DifficultyStep::default(),
            max_width: 31,
            max_depth: 21,
            lives: 3,
            map: MapConfig::default(),
            player: PlayerTuning::default(),
            messages_per_drain: DEFAULT_MESSAGES_PER_DRAIN,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded game config from {}", path.display());
        Ok(config)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        let invalid = |field: &str, reason: String| ConfigError::InvalidField {
            type_tag: "config".into(),
            field: field.into(),
            reason,
        };

        if self.initial.width == 0 || self.initial.depth == 0 {
            return Err(invalid("initial", "map width and depth must be at least 1".into()));
        }
        if self.initial.points_to_collect + 1 > self.initial.width * self.initial.depth {
            return Err(invalid(
                "initial.points_to_collect",
                format!(
                    "{} points and a start tile do not fit a {}x{} grid",
                    self.initial.points_to_collect, self.initial.width, self.initial.depth
                ),
            ));
        }
        if self.initial.speed <= 0.0 {
            return Err(invalid("initial.speed", "must be positive".into()));
        }
        if self.lives == 0 {
            return Err(invalid("lives", "must be at least 1".into()));
        }
        if !(0.0..1.0).contains(&self.map.playable_ratio) {
            return Err(invalid("map.playable_ratio", "must be in [0, 1)".into()));
        }
        if !(0.0..0.5).contains(&self.player.snap_tolerance) {
            return Err(invalid("player.snap_tolerance", "must be in [0, 0.5)".into()));
        }
        if self.messages_per_drain == 0 {
            return Err(invalid("messages_per_drain", "must be at least 1".into()));
        }
        Ok(())
    }
}
