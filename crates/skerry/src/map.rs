//! # Procedural Maps
//!
//! A level is a `width × depth` grid of tiles carved by simplex noise:
//!
//! ```text
//!  noise(x, z) < threshold ──► HOLE        . . # . . . .
//!  otherwise               ──► DEFAULT     . # # . . S .     # hole
//!                                          . . . . P . .     S start
//!                                          . . P . . . #     P point
//! ```
//!
//! ## Acceptance
//!
//! Non-hole tiles are grouped into 4-connected components. A grid is
//! playable when its largest component (the *mainland*) covers more than
//! `playable_ratio` of all tiles. Unplayable grids are regenerated from a
//! fresh seed, up to `max_attempts` times; after that the generator gives up
//! on noise and returns a solid grid. Points and the start tile are then
//! drawn from the mainland, so every one of them is reachable.
//!
//! ## Coordinates
//!
//! Column `c`, row `r` sits at `x = c - width / 2`, `z = r - depth / 2`
//! (integer division) so tile centers fall on integer grid lines. Tiles are
//! shifted down by half their height: every tile's top face is at `y = 0`.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};

use crate::config::{Difficulty, MapConfig};
use crate::error::MapError;
use crate::math::Vec3;
use crate::noise::SimplexNoise;

// ── Tiles ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TileKind {
    #[default]
    Default,
    Hole,
    Start,
    Point,
}

impl TileKind {
    pub fn is_hole(self) -> bool {
        self == TileKind::Hole
    }
}

/// One grid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct MapTile {
    pub kind: TileKind,
    pub column: usize,
    pub row: usize,
    /// Center of the tile in level space.
    pub position: Vec3,
    /// `x`/`z` are 1; `y` is the tile height.
    pub scale: Vec3,
    /// Brightness offset in `[0, 1]`, derived from the noise magnitude.
    pub shade: f32,
    /// Set by the flood fill.
    pub visited: bool,
    /// Connected-component id, `None` for holes.
    pub component: Option<usize>,
    pub mainland: bool,
}

impl MapTile {
    fn new(kind: TileKind, column: usize, row: usize, width: usize, depth: usize, height: f32, shade: f32) -> Self {
        let x = column as i64 - (width / 2) as i64;
        let z = row as i64 - (depth / 2) as i64;
        Self {
            kind,
            column,
            row,
            position: Vec3::new(x as f32, -height / 2.0, z as f32),
            scale: Vec3::new(1.0, height, 1.0),
            shade,
            visited: false,
            component: None,
            mainland: false,
        }
    }

    /// Point on the tile's top face.
    pub fn top(&self) -> Vec3 {
        Vec3::new(self.position.x, self.position.y + self.scale.y / 2.0, self.position.z)
    }
}

/// Height of a solid (fallback or hand-built) tile.
const FLAT_HEIGHT: f32 = 0.2;

// ── Level map ──────────────────────────────────────────────────────────────

/// A generated grid, row-major (`index = row * width + column`).
#[derive(Debug, Clone, PartialEq)]
pub struct LevelMap {
    pub width: usize,
    pub depth: usize,
    pub tiles: Vec<MapTile>,
    /// Seed of the noise field that produced this grid.
    pub seed: u64,
    pub points_to_collect: usize,
    /// Tile count of the largest component.
    pub mainland_size: usize,
    /// Whether this is the solid grid used after too many failed attempts.
    pub fallback: bool,
}

impl LevelMap {
    /// Flat grid from explicit tile kinds, `width` per row.
    ///
    /// Trailing kinds that do not fill a whole row are ignored.
    pub fn from_kinds(width: usize, kinds: &[TileKind]) -> Self {
        let depth = kinds.len().checked_div(width).unwrap_or(0);
        let mut tiles = Vec::with_capacity(width * depth);
        for row in 0..depth {
            for column in 0..width {
                let kind = kinds[row * width + column];
                tiles.push(MapTile::new(kind, column, row, width, depth, FLAT_HEIGHT, 0.0));
            }
        }
        Self {
            width,
            depth,
            tiles,
            seed: 0,
            points_to_collect: kinds.iter().filter(|k| **k == TileKind::Point).count(),
            mainland_size: 0,
            fallback: false,
        }
    }

    /// Every tile solid.
    fn solid(width: usize, depth: usize) -> Self {
        Self::from_kinds(width, &vec![TileKind::Default; width * depth])
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tile(&self, column: usize, row: usize) -> Option<&MapTile> {
        if column >= self.width || row >= self.depth {
            return None;
        }
        self.tiles.get(row * self.width + column)
    }

    /// The start tile, if one has been placed.
    pub fn start(&self) -> Option<&MapTile> {
        self.tiles.iter().find(|t| t.kind == TileKind::Start)
    }

    pub fn points(&self) -> impl Iterator<Item = &MapTile> {
        self.tiles.iter().filter(|t| t.kind == TileKind::Point)
    }

    /// Tiles that get a ground entity.
    pub fn solid_tiles(&self) -> impl Iterator<Item = &MapTile> {
        self.tiles.iter().filter(|t| !t.kind.is_hole())
    }

    /// Label the 4-connected components of non-hole tiles.
    ///
    /// Resets and then sets `visited` and `component` on every tile. Returns
    /// the size of each component, indexed by component id.
    pub fn label_components(&mut self) -> Vec<usize> {
        for tile in &mut self.tiles {
            tile.visited = false;
            tile.component = None;
        }

        let mut sizes = Vec::new();
        let mut queue = VecDeque::new();
        for seed in 0..self.tiles.len() {
            if self.tiles[seed].visited || self.tiles[seed].kind.is_hole() {
                continue;
            }
            let id = sizes.len();
            let mut size = 0;
            self.tiles[seed].visited = true;
            queue.push_back(seed);
            while let Some(index) = queue.pop_front() {
                self.tiles[index].component = Some(id);
                size += 1;
                for next in self.neighbours(index) {
                    let tile = &mut self.tiles[next];
                    if !tile.visited && !tile.kind.is_hole() {
                        tile.visited = true;
                        queue.push_back(next);
                    }
                }
            }
            sizes.push(size);
        }
        sizes
    }

    /// Flag the largest component as mainland. Returns its size.
    ///
    /// Ties go to the component found first.
    pub fn mark_mainland(&mut self) -> usize {
        let sizes = self.label_components();
        let mut largest: Option<(usize, usize)> = None;
        for (id, size) in sizes.iter().copied().enumerate() {
            if largest.is_none_or(|(_, best)| size > best) {
                largest = Some((id, size));
            }
        }
        let (mainland, size) = largest.map_or((None, 0), |(id, size)| (Some(id), size));
        for tile in &mut self.tiles {
            tile.mainland = mainland.is_some() && tile.component == mainland;
        }
        self.mainland_size = size;
        size
    }

    fn neighbours(&self, index: usize) -> impl Iterator<Item = usize> + use<> {
        let (width, depth) = (self.width, self.depth);
        let (column, row) = (index % width, index / width);
        let left = (column > 0).then(|| index - 1);
        let right = (column + 1 < width).then(|| index + 1);
        let up = (row > 0).then(|| index - width);
        let down = (row + 1 < depth).then(|| index + width);
        [left, right, up, down].into_iter().flatten()
    }
}

// ── Generator ──────────────────────────────────────────────────────────────

/// Builds playable maps from noise.
#[derive(Debug)]
pub struct MapGenerator {
    rng: StdRng,
    config: MapConfig,
}

impl MapGenerator {
    /// `seed` fixes every map this generator will produce; `None` seeds from
    /// entropy.
    pub fn new(config: MapConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng, config }
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Generate an accepted map for `difficulty`.
    pub fn generate(&mut self, difficulty: &Difficulty) -> Result<LevelMap, MapError> {
        let Difficulty {
            width,
            depth,
            points_to_collect,
            ..
        } = *difficulty;
        if width == 0 || depth == 0 || points_to_collect + 1 > width * depth {
            return Err(MapError::TooSmall {
                width,
                depth,
                points: points_to_collect,
            });
        }

        let required = self.config.playable_ratio * (width * depth) as f32;
        let mut accepted = None;
        for attempt in 1..=self.config.max_attempts {
            let seed = self.rng.next_u64();
            let mut map = self.carve(width, depth, seed);
            let mainland = map.mark_mainland();
            // The mainland must also hold every point plus the start.
            if mainland as f32 > required && mainland > points_to_collect {
                log::debug!("Map {width}x{depth} accepted on attempt {attempt} (seed {seed}, mainland {mainland})");
                accepted = Some(map);
                break;
            }
            log::trace!("Map seed {seed} rejected: mainland {mainland} <= {required}");
        }

        let mut map = match accepted {
            Some(map) => map,
            None => {
                log::warn!(
                    "No playable {width}x{depth} map after {} attempts; using a solid grid",
                    self.config.max_attempts
                );
                let mut map = LevelMap::solid(width, depth);
                map.fallback = true;
                map.mark_mainland();
                map
            }
        };

        self.place(&mut map, points_to_collect);
        Ok(map)
    }

    /// Classify every cell from one noise field.
    fn carve(&self, width: usize, depth: usize, seed: u64) -> LevelMap {
        let noise = SimplexNoise::new(seed);
        let scale = f64::from(self.config.noise_scale);
        let mut tiles = Vec::with_capacity(width * depth);
        for row in 0..depth {
            for column in 0..width {
                let x = column as f64 - (width / 2) as f64;
                let z = row as f64 - (depth / 2) as f64;
                let value = noise.sample(x * scale, z * scale) as f32;
                let kind = if value < self.config.hole_threshold {
                    TileKind::Hole
                } else {
                    TileKind::Default
                };
                let height = 0.2 + (value * 8.0).abs();
                let shade = (value / 1.5).abs();
                tiles.push(MapTile::new(kind, column, row, width, depth, height, shade));
            }
        }
        LevelMap {
            width,
            depth,
            tiles,
            seed,
            points_to_collect: 0,
            mainland_size: 0,
            fallback: false,
        }
    }

    /// Draw points and then the start tile from the mainland.
    fn place(&mut self, map: &mut LevelMap, points_to_collect: usize) {
        let mainland: Vec<usize> = map
            .tiles
            .iter()
            .enumerate()
            .filter(|(_, t)| t.mainland && t.kind == TileKind::Default)
            .map(|(i, _)| i)
            .collect();

        let mut picked: Vec<usize> = mainland
            .choose_multiple(&mut self.rng, points_to_collect + 1)
            .copied()
            .collect();
        if let Some(start) = picked.pop() {
            map.tiles[start].kind = TileKind::Start;
        }
        for index in picked {
            map.tiles[index].kind = TileKind::Point;
        }
        map.points_to_collect = points_to_collect;
    }
}
