//! Convenience re-exports: `use skerry::prelude::*` brings in the common items.

// Core
pub use crate::config::{Difficulty, DifficultyStep, GameConfig, MapConfig, PlayerTuning};
pub use crate::error::{ConfigError, ConfigResult, EngineError, MapError};
pub use crate::math::{Mat4, Quat, Transform, Vec2, Vec3, Vec4};
pub use crate::sim::Simulation;
pub use crate::time::Time;

// Messaging
pub use crate::message::{Message, MessageBus, MessageHandler, Payload, Priority, Sender, Subscriber, channel};

// Entity graph
pub use crate::behavior::{Behavior, BehaviorKind, PlayerState};
pub use crate::component::{Component, ComponentKind};
pub use crate::registry::Registry;
pub use crate::scene::{EntitySpec, GameObject, ObjectId, Scene};

// Collisions
pub use crate::collision::{ColliderDesc, ColliderId, CollisionKind, CollisionManager};
pub use crate::shape::Shape;

// Levels
pub use crate::level::{LevelManager, LevelReport};
pub use crate::map::{LevelMap, MapGenerator, TileKind};

// Platform
pub use crate::input::{Button, Direction, InputState, KeyCode, MouseButton};
pub use crate::platform::{Asset, AssetProvider, AudioSink, CubeDraw, MemoryAssets, NullAudio, Platform, Renderer};
