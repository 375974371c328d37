//! # Platform Collaborators
//!
//! The simulation core does not talk to a GPU, a file system or a sound card.
//! It talks to three narrow traits and lets the host decide what sits behind
//! them:
//!
//! ```text
//!  Simulation ──draw_cube──────► Renderer      (wgpu, WebGL, a test recorder)
//!             ──load/is_loaded─► AssetProvider (fetch + decode, in the background)
//!             ──play_sound─────► AudioSink     (mixer, or nothing at all)
//! ```
//!
//! Asset loading is fire-and-forget. [`AssetProvider::load`] returns at once;
//! the simulation polls [`AssetProvider::take_completed`] every tick and turns
//! each finished path into an `ASSET_LOADED::<path>` message.

use std::collections::{HashMap, HashSet};

use crate::math::{Mat4, Vec3, Vec4};

// ── Rendering ──────────────────────────────────────────────────────────────

/// One cube to draw this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubeDraw<'a> {
    /// Material (asset) name.
    pub material: &'a str,
    /// Edge lengths before the world matrix is applied.
    pub size: Vec3,
    /// Pivot offset in local space.
    pub origin: Vec3,
    /// Opacity multiplier.
    pub alpha: f32,
    /// Owner's world matrix.
    pub world: Mat4,
}

/// Opaque graphics handle.
pub trait Renderer {
    fn draw_cube(&mut self, cube: &CubeDraw<'_>);
}

// ── Assets ─────────────────────────────────────────────────────────────────

/// Decoded asset data.
#[derive(Debug, Clone, PartialEq)]
pub enum Asset {
    /// Flat-colored material.
    Material { color: Vec4 },
    /// A JSON document (level data, entity specs).
    Json(serde_json::Value),
    /// Raw bytes the core does not interpret.
    Bytes(Vec<u8>),
}

/// Asynchronous asset source.
pub trait AssetProvider {
    /// `true` once the asset's data is available through [`get`](Self::get).
    fn is_loaded(&self, path: &str) -> bool;

    /// Request an asset. Never blocks; repeated requests are ignored.
    fn load(&mut self, path: &str);

    fn get(&self, path: &str) -> Option<&Asset>;

    /// Paths that finished loading since the last call.
    fn take_completed(&mut self) -> Vec<String>;
}

/// In-process asset source: data is registered up front and "loads" on the
/// tick after it is requested.
#[derive(Debug, Default)]
pub struct MemoryAssets {
    available: HashMap<String, Asset>,
    loaded: HashSet<String>,
    requested: Vec<String>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// The flat materials the built-in tile game draws with.
    pub fn with_game_materials() -> Self {
        let mut assets = Self::new();
        assets.insert("ground", Asset::Material { color: Vec4::new(0.35, 0.55, 0.3, 1.0) });
        assets.insert("player", Asset::Material { color: Vec4::new(0.9, 0.3, 0.2, 1.0) });
        assets.insert("point", Asset::Material { color: Vec4::new(1.0, 0.85, 0.1, 1.0) });
        assets
    }

    /// Make an asset available to future `load` requests.
    pub fn insert(&mut self, path: impl Into<String>, asset: Asset) {
        self.available.insert(path.into(), asset);
    }

    /// Number of requests still waiting to complete.
    pub fn pending(&self) -> usize {
        self.requested.len()
    }
}

impl AssetProvider for MemoryAssets {
    fn is_loaded(&self, path: &str) -> bool {
        self.loaded.contains(path)
    }

    fn load(&mut self, path: &str) {
        if self.loaded.contains(path) || self.requested.iter().any(|p| p == path) {
            return;
        }
        if !self.available.contains_key(path) {
            log::warn!("Unable to load asset `{path}`: no data registered under that name.");
            return;
        }
        self.requested.push(path.to_string());
    }

    fn get(&self, path: &str) -> Option<&Asset> {
        if self.loaded.contains(path) {
            self.available.get(path)
        } else {
            None
        }
    }

    fn take_completed(&mut self) -> Vec<String> {
        let completed = std::mem::take(&mut self.requested);
        for path in &completed {
            log::debug!("Asset loaded: {path}");
            self.loaded.insert(path.clone());
        }
        completed
    }
}

// ── Audio ──────────────────────────────────────────────────────────────────

/// Fire-and-forget sound playback.
pub trait AudioSink {
    fn play_sound(&mut self, name: &str);
}

/// Audio sink that only logs.
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play_sound(&mut self, name: &str) {
        log::debug!("Sound requested: {name}");
    }
}

// ── Bundle ─────────────────────────────────────────────────────────────────

/// The collaborators a [`Simulation`](crate::sim::Simulation) talks to.
pub struct Platform {
    pub assets: Box<dyn AssetProvider>,
    pub audio: Box<dyn AudioSink>,
}

impl Platform {
    pub fn new(assets: Box<dyn AssetProvider>, audio: Box<dyn AudioSink>) -> Self {
        Self { assets, audio }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::new(Box::new(MemoryAssets::with_game_materials()), Box::new(NullAudio))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_completes_on_next_poll() {
        let mut assets = MemoryAssets::with_game_materials();
        assert!(!assets.is_loaded("ground"));

        assets.load("ground");
        assets.load("ground");
        assert_eq!(assets.pending(), 1);
        assert!(assets.get("ground").is_none());

        assert_eq!(assets.take_completed(), vec!["ground".to_string()]);
        assert!(assets.is_loaded("ground"));
        assert!(matches!(assets.get("ground"), Some(Asset::Material { .. })));
        assert!(assets.take_completed().is_empty());
    }

    #[test]
    fn unknown_asset_never_loads() {
        let mut assets = MemoryAssets::new();
        assets.load("missing.png");
        assert_eq!(assets.pending(), 0);
        assert!(assets.take_completed().is_empty());
        assert!(!assets.is_loaded("missing.png"));
    }

    #[test]
    fn loaded_asset_is_not_requested_again() {
        let mut assets = MemoryAssets::with_game_materials();
        assets.load("point");
        assets.take_completed();
        assets.load("point");
        assert_eq!(assets.pending(), 0);
    }
}
