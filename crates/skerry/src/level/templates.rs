//! Entity-spec documents for the three things a level is made of.
//!
//! ```text
//!  ground tile   [cube "ground", collision groundCollision (static AABB)]
//!  point         [cube "point", collision <name>_collision] {point, rotation}
//!  player        [cube "player", collision playerCollision (dynamic)] {player}
//! ```
//!
//! These are plain data: the registry turns them into components and
//! behaviors exactly as it would a document loaded from disk.

use serde_json::json;

use crate::map::{LevelMap, MapTile};
use crate::math::{Transform, Vec3};
use crate::message::channel;
use crate::scene::EntitySpec;

pub const GROUND_COLLISION: &str = "groundCollision";
pub const PLAYER_COLLISION: &str = "playerCollision";
pub const PLAYER_NAME: &str = "player";
pub const PLAYER_BEHAVIOR: &str = "PlayerBehavior";

/// Ground cubes are narrower than the grid so gaps show between tiles.
const TILE_FOOTPRINT: f32 = 0.8;
/// The ground collider pokes this far above and below the visible tile.
const GROUND_MARGIN: f32 = 0.2;
const PLAYER_SIZE: Vec3 = Vec3::new(0.5, 1.0, 0.5);
const POINT_SCALE: f32 = 0.25;
/// Point spin, radians per second around Y.
const POINT_SPIN: f32 = 1.5;

/// Where an object of height `height` stands on `tile`.
fn standing_on(tile: &MapTile, height: f32) -> Vec3 {
    tile.top() + Vec3::Y * (height / 2.0)
}

pub fn ground(name: &str, tile: &MapTile) -> EntitySpec {
    let height = tile.scale.y;
    EntitySpec::new(name)
        .with_transform(
            Transform::from_xyz(tile.position.x, tile.position.y, tile.position.z)
                .with_scale(Vec3::new(TILE_FOOTPRINT, height, TILE_FOOTPRINT)),
        )
        .with_component(json!({
            "type": "cube",
            "name": format!("{name}_cube"),
            "materialName": "ground",
            "alpha": tile.shade,
        }))
        .with_component(json!({
            "type": "collision",
            "name": GROUND_COLLISION,
            "shape": {
                "type": "aabb",
                "width": TILE_FOOTPRINT,
                "height": height + GROUND_MARGIN,
                "depth": TILE_FOOTPRINT,
            },
        }))
}

pub fn player(start: &MapTile, speed: f32) -> EntitySpec {
    let position = standing_on(start, PLAYER_SIZE.y);
    EntitySpec::new(PLAYER_NAME)
        .with_transform(Transform::from_xyz(position.x, position.y, position.z).with_scale(PLAYER_SIZE))
        .with_component(json!({ "type": "cube", "name": "playerBody", "materialName": "player" }))
        .with_component(json!({
            "type": "collision",
            "name": PLAYER_COLLISION,
            "static": false,
            "shape": { "type": "aabb", "width": PLAYER_SIZE.x, "height": PLAYER_SIZE.y, "depth": PLAYER_SIZE.z },
        }))
        .with_behavior(json!({
            "type": "player",
            "name": PLAYER_BEHAVIOR,
            "playerCollisionComponent": PLAYER_COLLISION,
            "groundCollisionComponent": GROUND_COLLISION,
            "speed": speed,
            "resetPosition": { "x": position.x, "y": position.y, "z": position.z },
        }))
}

pub fn point(name: &str, tile: &MapTile, level_id: u32) -> EntitySpec {
    let position = standing_on(tile, PLAYER_SIZE.y);
    let collision = format!("{name}_collision");
    EntitySpec::new(name)
        .with_transform(
            Transform::from_xyz(position.x, position.y, position.z)
                .with_scale(Vec3::splat(POINT_SCALE))
                .with_rotation(Vec3::new(0.0, -std::f32::consts::FRAC_PI_4, 0.0)),
        )
        .with_component(json!({ "type": "cube", "name": format!("{name}_cube"), "materialName": "point" }))
        .with_component(json!({
            "type": "collision",
            "name": collision,
            "shape": { "type": "aabb", "width": PLAYER_SIZE.x, "height": PLAYER_SIZE.y, "depth": PLAYER_SIZE.z },
        }))
        .with_behavior(json!({
            "type": "point",
            "name": format!("{name}_point"),
            "collisionName": collision,
            "message": channel::point(level_id),
        }))
        .with_behavior(json!({
            "type": "rotation",
            "name": format!("{name}_spin"),
            "rotation": { "y": POINT_SPIN },
        }))
}

/// The whole level: ground tiles, then points, then the player.
pub fn level(level_id: u32, map: &LevelMap, speed: f32) -> EntitySpec {
    let mut spec = EntitySpec::new(format!("level_{level_id}"));
    for tile in map.solid_tiles() {
        spec = spec.with_child(ground(&format!("tile_{}_{}", tile.column, tile.row), tile));
    }
    for (index, tile) in map.points().enumerate() {
        spec = spec.with_child(point(&format!("point_{index}"), tile, level_id));
    }
    if let Some(start) = map.start() {
        spec = spec.with_child(player(start, speed));
    }
    spec
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::TileKind::{Default as D, Hole as H, Point as P, Start as S};
    use crate::registry::Registry;
    use crate::scene::Scene;

    fn small_map() -> LevelMap {
        LevelMap::from_kinds(3, &[S, H, P, D, D, D])
    }

    #[test]
    fn level_document_covers_every_solid_tile() {
        let map = small_map();
        let spec = level(4, &map, 2.0);
        // 5 ground tiles, 1 point, 1 player, plus the level root.
        assert_eq!(spec.count(), 8);
        assert_eq!(spec.name, "level_4");
        let last = spec.children.last().unwrap();
        assert_eq!(last.name, PLAYER_NAME);
    }

    #[test]
    fn player_stands_on_the_start_tile() {
        let map = small_map();
        let start = map.start().unwrap();
        let t = player(start, 3.0).transform.to_transform();
        assert_eq!(t.position.x, start.position.x);
        assert_eq!(t.position.z, start.position.z);
        assert!((t.position.y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn point_reports_to_its_level() {
        let map = small_map();
        let spec = point("point_0", map.points().next().unwrap(), 7);
        assert_eq!(spec.behaviors[0]["message"], "POINT::7");
        assert_eq!(spec.behaviors[0]["collisionName"], "point_0_collision");
    }

    #[test]
    fn documents_build_through_the_registry() {
        let mut scene = Scene::new();
        let mut registry = Registry::with_builtins();
        let root = scene.root();
        let id = scene.instantiate(root, &level(1, &small_map(), 2.0), &mut registry).unwrap();
        assert_eq!(scene.subtree(id).len(), 8);
        let (_, player) = scene.behavior_by_name(id, PLAYER_BEHAVIOR).unwrap();
        assert_eq!(player.as_player().unwrap().speed, 2.0);
        assert!(scene.component_by_name(id, GROUND_COLLISION).is_some());
    }
}
