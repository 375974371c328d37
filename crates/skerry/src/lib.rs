//! # Skerry — Tile-Hopping Game Core
//!
//! The simulation half of a small 3D game: a player steers across a
//! procedurally generated island of tiles, collects points and tries not to
//! fall into the sea.
//!
//! ```text
//!  MapGenerator ──► LevelManager ──► Scene (objects, components, behaviors)
//!                        ▲                │
//!                        │          CollisionManager
//!                        └──── MessageBus ◄┘
//! ```
//!
//! Graphics, audio, asset loading and raw input belong to the platform
//! layer; the core only sees them through the traits in [`platform`] and
//! the state in [`input`].
//!
//! Start with `use skerry::prelude::*` and drive a
//! [`Simulation`](sim::Simulation) once per frame.

pub mod behavior;
pub mod collision;
pub mod component;
pub mod config;
pub mod error;
pub mod input;
pub mod level;
pub mod map;
pub mod math;
pub mod message;
pub mod noise;
pub mod platform;
pub mod prelude;
pub mod registry;
pub mod scene;
pub mod shape;
pub mod sim;
pub mod time;
