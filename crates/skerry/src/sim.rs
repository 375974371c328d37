//! # Simulation — One Tick at a Time
//!
//! [`Simulation`] owns every piece of the game and advances them in a fixed
//! order. The platform calls [`update`](Simulation::update) and
//! [`render`](Simulation::render) once per frame; nothing in here waits or
//! spawns threads.
//!
//! ```text
//!  update(dt)
//!   ├── 1. time.advance(dt)
//!   ├── 2. input events      ──► KEY_* / MOUSE_* messages
//!   ├── 3. asset completions ──► ASSET_LOADED::<path>
//!   ├── 4. bus.drain         ──► queued NORMAL messages (capped)
//!   ├── 5. scene.update      ──► matrices, colliders, behaviors
//!   ├── 6. collisions.update ──► COLLISION_ENTRY / COLLISION_EXIT (HIGH)
//!   └── 7. level request     ──► tear down + build the next level
//! ```
//!
//! After every step the [`Outbox`] is flushed: queued posts go through the
//! bus, subscriptions change, objects are unloaded and sounds play. Posts
//! made while a HIGH message is being delivered are flushed before the next
//! step starts, so a HIGH chain always settles inside the step that began it.

use crate::collision::CollisionManager;
use crate::config::GameConfig;
use crate::error::EngineError;
use crate::input::InputState;
use crate::level::{LevelCtx, LevelManager};
use crate::message::{Command, Message, MessageBus, MessageHandler, Outbox, Payload, Sender, Subscriber, channel};
use crate::platform::{Platform, Renderer};
use crate::registry::Registry;
use crate::scene::{FrameCtx, Scene};
use crate::time::Time;

/// Commands applied by one flush before it assumes a message loop.
const MAX_COMMANDS_PER_FLUSH: usize = 100_000;

/// The game core.
pub struct Simulation {
    config: GameConfig,
    time: Time,
    bus: MessageBus<Subscriber>,
    scene: Scene,
    registry: Registry,
    collisions: CollisionManager,
    input: InputState,
    levels: LevelManager,
    platform: Platform,
    observers: Vec<Box<dyn MessageHandler>>,
    out: Outbox,
    started: bool,
}

impl Simulation {
    /// Validate `config` and assemble an idle simulation. Call
    /// [`start`](Self::start) (or just [`update`](Self::update)) to build the
    /// first level.
    pub fn new(config: GameConfig, registry: Registry, platform: Platform) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            time: Time::new(),
            bus: MessageBus::with_drain_limit(config.messages_per_drain),
            scene: Scene::new(),
            registry,
            collisions: CollisionManager::new(),
            input: InputState::new(),
            levels: LevelManager::new(config.clone()),
            platform,
            observers: Vec::new(),
            out: Outbox::new(),
            started: false,
            config,
        })
    }

    /// Built-in registry (tuned by `config.player`) and the default in-memory platform.
    pub fn with_config(config: GameConfig) -> Result<Self, EngineError> {
        let registry = Registry::with_player_tuning(config.player);
        Self::new(config, registry, Platform::default())
    }

    /// Build the first level. Calling it again restarts the current one.
    pub fn start(&mut self) -> Result<(), EngineError> {
        let Self {
            scene,
            registry,
            collisions,
            platform,
            out,
            levels,
            ..
        } = self;
        let mut ctx = LevelCtx {
            scene,
            registry,
            collisions,
            assets: platform.assets.as_mut(),
            out,
        };
        levels.start(&mut ctx)?;
        self.started = true;
        self.flush();
        Ok(())
    }

    /// Advance the game by `dt` seconds.
    pub fn update(&mut self, dt: f32) -> Result<(), EngineError> {
        if !self.started {
            self.start()?;
        }

        self.time.advance(dt);
        let dt = self.time.delta_secs();

        for message in self.input.take_messages() {
            self.out.post(message);
        }
        for path in self.platform.assets.take_completed() {
            self.out.post(
                Message::new(channel::asset_loaded(&path), Sender::Assets).with_context(Payload::Asset(path)),
            );
        }
        self.flush();

        self.drain();
        self.flush();

        self.scene.update(
            dt,
            &mut FrameCtx {
                collisions: &mut self.collisions,
                input: &self.input,
                out: &mut self.out,
            },
        );
        self.flush();

        let events = self.collisions.update(&mut self.out);
        for event in &events {
            self.scene.collision_hook(event);
        }
        self.flush();

        self.apply_level_request()?;

        self.input.end_tick();
        Ok(())
    }

    /// Draw the active scene.
    pub fn render(&self, renderer: &mut dyn Renderer) {
        self.scene.render(self.platform.assets.as_ref(), renderer);
    }

    // ── Messaging ──────────────────────────────────────────────────────────

    /// Post a message from outside the simulation. HIGH messages reach
    /// their subscribers before this returns.
    pub fn post(&mut self, message: Message) {
        self.out.post(message);
        self.flush();
    }

    /// Register an external handler for `codes`. Returns its subscriber
    /// handle.
    pub fn add_observer(&mut self, codes: &[&str], handler: Box<dyn MessageHandler>) -> Subscriber {
        let subscriber = Subscriber::Observer(self.observers.len());
        self.observers.push(handler);
        for code in codes {
            self.bus.subscribe(code, subscriber);
        }
        subscriber
    }

    pub fn subscribe(&mut self, code: &str, subscriber: Subscriber) -> bool {
        self.bus.subscribe(code, subscriber)
    }

    pub fn unsubscribe(&mut self, code: &str, subscriber: Subscriber) -> bool {
        self.bus.unsubscribe(code, subscriber)
    }

    fn drain(&mut self) {
        let Self {
            bus,
            scene,
            levels,
            observers,
            input,
            out,
            ..
        } = self;
        let mut targets = Targets {
            scene,
            levels,
            observers,
            input,
            out,
        };
        let delivered = bus.drain(|handler, message| targets.deliver(handler, message));
        if delivered > 0 {
            log::trace!("Drained {delivered} message(s), {} still queued", bus.pending());
        }
    }

    /// Apply queued commands until none are left.
    fn flush(&mut self) {
        let mut applied = 0;
        while let Some(command) = self.out.pop() {
            applied += 1;
            if applied > MAX_COMMANDS_PER_FLUSH {
                log::warn!("Outbox flush stopped after {MAX_COMMANDS_PER_FLUSH} commands; dropping the rest.");
                while self.out.pop().is_some() {}
                return;
            }
            match command {
                Command::Post(message) => {
                    let Self {
                        bus,
                        scene,
                        levels,
                        observers,
                        input,
                        out,
                        ..
                    } = self;
                    let mut targets = Targets {
                        scene,
                        levels,
                        observers,
                        input,
                        out,
                    };
                    bus.post(message, |handler, message| targets.deliver(handler, message));
                }
                Command::Subscribe(code, subscriber) => {
                    self.bus.subscribe(&code, subscriber);
                }
                Command::Unsubscribe(code, subscriber) => {
                    self.bus.unsubscribe(&code, subscriber);
                }
                Command::Unload(object) => {
                    self.scene.unload(object, &mut self.collisions, &mut self.out);
                }
                Command::PlaySound(name) => self.platform.audio.play_sound(&name),
            }
        }
    }

    fn apply_level_request(&mut self) -> Result<(), EngineError> {
        if self.levels.pending_request().is_none() {
            return Ok(());
        }
        let Self {
            scene,
            registry,
            collisions,
            platform,
            out,
            levels,
            ..
        } = self;
        let mut ctx = LevelCtx {
            scene,
            registry,
            collisions,
            assets: platform.assets.as_mut(),
            out,
        };
        levels.apply_request(&mut ctx)?;
        self.flush();
        Ok(())
    }

    // ── Accessors ──────────────────────────────────────────────────────────

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn time(&self) -> &Time {
        &self.time
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn collisions(&self) -> &CollisionManager {
        &self.collisions
    }

    pub fn bus(&self) -> &MessageBus<Subscriber> {
        &self.bus
    }

    pub fn levels(&self) -> &LevelManager {
        &self.levels
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Feed raw input events here between ticks.
    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }
}

/// The receiving end of a delivery, borrowed field by field from the
/// simulation so the bus can be borrowed at the same time.
struct Targets<'a> {
    scene: &'a mut Scene,
    levels: &'a mut LevelManager,
    observers: &'a mut [Box<dyn MessageHandler>],
    input: &'a InputState,
    out: &'a mut Outbox,
}

impl Targets<'_> {
    fn deliver(&mut self, handler: Subscriber, message: &Message) {
        match handler {
            Subscriber::Behavior(object, index) => {
                self.scene.deliver(object, index, message, self.input, self.out);
            }
            Subscriber::Level(id) => self.levels.on_message(id, message, self.out),
            Subscriber::Observer(index) => match self.observers.get_mut(index) {
                Some(observer) => observer.on_message(message),
                None => log::debug!("{} for unknown observer {index} dropped", message.code),
            },
        }
    }
}
