//! # Levels — Maps, Points, Lives
//!
//! The [`LevelManager`] turns generated maps into playable levels and keeps
//! score:
//!
//! ```text
//!  MapGenerator ──LevelMap──► templates::level ──EntitySpec──► Scene
//!
//!  POINT::<id>   ──► collected += 1 ── collected == target ──► LEVEL_WON::<id>,  Advance
//!  PLAYER_DIED   ──► lives -= 1     ── lives == 0          ──► LEVEL_LOST::<id>, Reset
//! ```
//!
//! Requests are not applied while messages are being handled. The
//! simulation calls [`LevelManager::apply_request`] at the end of the tick:
//! the finished level is unloaded (colliders and subscriptions released) and
//! the next one is built. Every new level posts `DIFFICULTY_UPDATED` with a
//! [`LevelReport`].
//!
//! Lives carry over from one level to the next; only a game over restores
//! them.

pub mod templates;

use crate::collision::CollisionManager;
use crate::config::{Difficulty, GameConfig};
use crate::error::EngineError;
use crate::map::{LevelMap, MapGenerator};
use crate::message::{Message, Outbox, Payload, Sender, Subscriber, channel};
use crate::platform::AssetProvider;
use crate::registry::Registry;
use crate::scene::{ObjectId, Scene};

/// Snapshot of a level's score, attached to level messages.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelReport {
    pub level_id: u32,
    pub collected: usize,
    pub points_to_collect: usize,
    pub lives: u32,
    pub difficulty: Difficulty,
}

/// A live level.
#[derive(Debug)]
pub struct Level {
    pub id: u32,
    pub difficulty: Difficulty,
    pub collected: usize,
    pub lives: u32,
    /// Root object of the level's subtree.
    pub root: ObjectId,
    pub map: LevelMap,
    finished: bool,
}

impl Level {
    pub fn report(&self) -> LevelReport {
        LevelReport {
            level_id: self.id,
            collected: self.collected,
            points_to_collect: self.map.points_to_collect,
            lives: self.lives,
            difficulty: self.difficulty,
        }
    }

    /// Won or lost; further points and deaths are ignored.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn codes(&self) -> [String; 2] {
        [channel::point(self.id), channel::PLAYER_DIED.to_string()]
    }
}

/// What to do once the current tick is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelRequest {
    /// Level won: next map, one step harder.
    Advance,
    /// Game over: back to the initial difficulty and lives.
    Reset,
}

/// Everything building or tearing down a level touches.
pub struct LevelCtx<'a> {
    pub scene: &'a mut Scene,
    pub registry: &'a mut Registry,
    pub collisions: &'a mut CollisionManager,
    pub assets: &'a mut dyn AssetProvider,
    pub out: &'a mut Outbox,
}

/// Builds levels and tracks win/lose.
#[derive(Debug)]
pub struct LevelManager {
    config: GameConfig,
    generator: MapGenerator,
    difficulty: Difficulty,
    lives: u32,
    next_id: u32,
    active: Option<Level>,
    request: Option<LevelRequest>,
}

impl LevelManager {
    pub fn new(config: GameConfig) -> Self {
        let generator = MapGenerator::new(config.map, config.seed);
        Self {
            difficulty: config.initial,
            lives: config.lives,
            generator,
            config,
            next_id: 1,
            active: None,
            request: None,
        }
    }

    pub fn active(&self) -> Option<&Level> {
        self.active.as_ref()
    }

    /// Difficulty of the current (or next) level.
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn pending_request(&self) -> Option<LevelRequest> {
        self.request
    }

    /// Queue a transition. A game over wins over an advance.
    pub fn request(&mut self, request: LevelRequest) {
        if self.request != Some(LevelRequest::Reset) {
            self.request = Some(request);
        }
    }

    // ── Messages ───────────────────────────────────────────────────────────

    /// Handle a message delivered to `Subscriber::Level(level_id)`.
    pub fn on_message(&mut self, level_id: u32, message: &Message, out: &mut Outbox) {
        let Some(level) = self.active.as_mut().filter(|l| l.id == level_id) else {
            log::debug!("{} for inactive level {level_id} dropped", message.code);
            return;
        };
        if level.finished {
            return;
        }

        if message.code == channel::point(level_id) {
            level.collected += 1;
            log::info!(
                "Level {level_id}: {}/{} points",
                level.collected,
                level.map.points_to_collect
            );
            if level.collected >= level.map.points_to_collect {
                level.finished = true;
                log::info!("Level {level_id} won");
                out.post(
                    Message::new(channel::level_won(level_id), Sender::Level(level_id))
                        .with_context(Payload::Level(level.report())),
                );
                self.request(LevelRequest::Advance);
            }
        } else if message.code == channel::PLAYER_DIED {
            level.lives = level.lives.saturating_sub(1);
            self.lives = level.lives;
            log::info!("Level {level_id}: player died, {} lives left", level.lives);
            if level.lives == 0 {
                level.finished = true;
                log::info!("Level {level_id} lost");
                out.post(
                    Message::new(channel::level_lost(level_id), Sender::Level(level_id))
                        .with_context(Payload::Level(level.report())),
                );
                self.request(LevelRequest::Reset);
            }
        }
    }

    // ── Lifecycle ──────────────────────────────────────────────────────────

    /// Build a level at the current difficulty. An active level is torn down
    /// first.
    pub fn start(&mut self, ctx: &mut LevelCtx<'_>) -> Result<&Level, EngineError> {
        self.destroy(ctx);

        let map = self.generator.generate(&self.difficulty)?;
        let id = self.next_id;
        self.next_id += 1;

        let spec = templates::level(id, &map, self.difficulty.speed);
        let parent = ctx.scene.root();
        let root = ctx.scene.instantiate(parent, &spec, ctx.registry)?;
        ctx.scene.load(root, ctx.collisions, ctx.assets);
        if let Err(err) = ctx.scene.update_ready(root, ctx.out) {
            ctx.scene.unload(root, ctx.collisions, ctx.out);
            return Err(err.into());
        }

        let level = Level {
            id,
            difficulty: self.difficulty,
            collected: 0,
            lives: self.lives,
            root,
            map,
            finished: false,
        };
        for code in level.codes() {
            ctx.out.subscribe(code, Subscriber::Level(id));
        }
        log::info!(
            "Level {id} started: {}x{} map, {} points, speed {}, {} lives{}",
            level.map.width,
            level.map.depth,
            level.map.points_to_collect,
            level.difficulty.speed,
            level.lives,
            if level.map.fallback { " (fallback map)" } else { "" }
        );
        ctx.out.post(
            Message::new(channel::DIFFICULTY_UPDATED, Sender::Level(id)).with_context(Payload::Level(level.report())),
        );

        Ok(&*self.active.insert(level))
    }

    /// Unload the active level, if any.
    pub fn destroy(&mut self, ctx: &mut LevelCtx<'_>) {
        let Some(level) = self.active.take() else {
            return;
        };
        for code in level.codes() {
            ctx.out.unsubscribe(code, Subscriber::Level(level.id));
        }
        ctx.scene.unload(level.root, ctx.collisions, ctx.out);
        log::debug!("Level {} destroyed", level.id);
    }

    /// Apply a queued request. Returns whether a new level was built.
    pub fn apply_request(&mut self, ctx: &mut LevelCtx<'_>) -> Result<bool, EngineError> {
        let Some(request) = self.request.take() else {
            return Ok(false);
        };
        match request {
            LevelRequest::Advance => {
                self.difficulty = self
                    .difficulty
                    .harder(&self.config.step, self.config.max_width, self.config.max_depth);
            }
            LevelRequest::Reset => {
                log::info!("Game over; back to the first difficulty");
                self.difficulty = self.config.initial;
                self.lives = self.config.lives;
            }
        }
        self.start(ctx)?;
        Ok(true)
    }
}
