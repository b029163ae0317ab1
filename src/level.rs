use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::animation::AnimationController;
use crate::components::*;
use crate::physics::Gravity;
use crate::render::body_translation;
use crate::spider::Spider;
use crate::sprites::SpriteCatalog;

/// Bundled copy of the level, used when no level file can be read.
const EMBEDDED_LEVEL: &str = include_str!("../assets/data/level01.json");

const WALL_IMAGE: &str = "invisible-wall";
const FALLBACK_WALL_SIZE: Vec2 = Vec2::new(8.0, 32.0);
const FALLBACK_HERO_SIZE: Vec2 = Vec2::new(36.0, 42.0);
const FALLBACK_SPIDER_SIZE: Vec2 = Vec2::new(42.0, 32.0);
const FALLBACK_COIN_SIZE: Vec2 = Vec2::new(22.0, 22.0);

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlatformDef {
    pub x: f32,
    pub y: f32,
    pub image: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpiderDef {
    pub x: f32,
    pub y: f32,
    /// Initial patrol direction; anything negative starts walking left
    #[serde(default = "default_direction")]
    pub direction: i8,
}

fn default_direction() -> i8 {
    1
}

/// Declarative level description. Loaded once and never mutated; restarts
/// rebuild the scene from it.
#[derive(Resource, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    pub platforms: Vec<PlatformDef>,
    pub hero: Point,
    pub spiders: Vec<SpiderDef>,
    pub coins: Vec<Point>,
}

impl LevelData {
    pub fn from_json(source: &str) -> Result<Self, String> {
        serde_json::from_str(source).map_err(|e| format!("Invalid level data: {e}"))
    }

    pub fn load(path: &Path) -> Result<Self, String> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
        Self::from_json(&source)
    }

    pub fn embedded() -> Self {
        Self::from_json(EMBEDDED_LEVEL).unwrap_or_else(|err| {
            eprintln!("[Platformer] Embedded level is broken: {err}");
            Self::default()
        })
    }
}

/// Where an invisible enemy wall goes and which of its own corners sits there.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallPlacement {
    pub x: f32,
    pub y: f32,
    pub anchor: Vec2,
}

/// Walls stand on the platform's top surface, flush against its left and
/// right edges: the left wall hangs off the left edge by its bottom-right
/// corner, the right wall by its bottom-left corner.
pub fn enemy_wall_placements(platform: &PlatformDef, width: f32) -> [WallPlacement; 2] {
    [
        WallPlacement {
            x: platform.x,
            y: platform.y,
            anchor: Vec2::new(1.0, 1.0),
        },
        WallPlacement {
            x: platform.x + width,
            y: platform.y,
            anchor: Vec2::new(0.0, 1.0),
        },
    ]
}

fn transform_for(body: &Body, z: f32) -> Transform {
    Transform::from_translation(body_translation(body, z))
}

fn attach_sprite(
    entity: &mut EntityCommands,
    catalog: &SpriteCatalog,
    image: &str,
    headless: bool,
) {
    if headless {
        return;
    }
    if let Some(sprite) = catalog.make_sprite(image) {
        entity.insert(sprite);
    }
}

/// Spawns every entity of `level` and returns the hero. Gravity is switched
/// on last, once everything exists.
pub fn spawn_level(
    commands: &mut Commands,
    level: &LevelData,
    catalog: &SpriteCatalog,
    config: &GameConfig,
    headless: bool,
) -> Entity {
    if !headless {
        if let Some(sprite) = catalog.make_sprite("background") {
            commands.spawn((SceneEntity, sprite, Transform::from_xyz(0.0, 0.0, -10.0)));
        }
    }

    let wall_size = catalog.size(WALL_IMAGE).unwrap_or(FALLBACK_WALL_SIZE);
    for platform in &level.platforms {
        let Some(size) = catalog.size(&platform.image) else {
            warn!(
                "[Platformer] Skipping platform at ({}, {}): unknown image '{}'",
                platform.x, platform.y, platform.image
            );
            continue;
        };
        let body = Body::fixed(platform.x, platform.y, size, Vec2::ZERO);
        let mut entity = commands.spawn((Platform, SceneEntity, body, transform_for(&body, 0.0)));
        attach_sprite(&mut entity, catalog, &platform.image, headless);

        for wall in enemy_wall_placements(platform, size.x) {
            let body = Body::fixed(wall.x, wall.y, wall_size, wall.anchor);
            commands.spawn((EnemyWall, SceneEntity, body, transform_for(&body, 0.0)));
        }
    }

    let spider_size = catalog.size("spider").unwrap_or(FALLBACK_SPIDER_SIZE);
    for def in &level.spiders {
        let mut body = Body::anchored(def.x, def.y, spider_size, Vec2::splat(0.5));
        body.collide_world_bounds = true;
        body.velocity.x = if def.direction < 0 {
            -config.spider_speed
        } else {
            config.spider_speed
        };
        let mut entity = commands.spawn((
            Spider::default(),
            SceneEntity,
            body,
            AnimationController::new("spider", "crawl"),
            transform_for(&body, 2.0),
        ));
        attach_sprite(&mut entity, catalog, "spider", headless);
    }

    let hero_size = catalog.size("hero").unwrap_or(FALLBACK_HERO_SIZE);
    let mut body = Body::anchored(level.hero.x, level.hero.y, hero_size, Vec2::splat(0.5));
    body.collide_world_bounds = true;
    let mut entity = commands.spawn((
        Hero,
        SceneEntity,
        body,
        AnimationController::new("hero", "stop"),
        transform_for(&body, 3.0),
    ));
    attach_sprite(&mut entity, catalog, "hero", headless);
    let hero = entity.id();

    let coin_size = catalog.size("coin").unwrap_or(FALLBACK_COIN_SIZE);
    for coin in &level.coins {
        let mut body = Body::anchored(coin.x, coin.y, coin_size, Vec2::splat(0.5));
        body.allow_gravity = false;
        let mut entity = commands.spawn((
            Coin,
            SceneEntity,
            body,
            AnimationController::new("coin", "rotate"),
            transform_for(&body, 1.0),
        ));
        attach_sprite(&mut entity, catalog, "coin", headless);
    }

    commands.insert_resource(Gravity(Vec2::new(0.0, config.gravity)));
    info!(
        "[Platformer] Level loaded: {} platforms, {} spiders, {} coins",
        level.platforms.len(),
        level.spiders.len(),
        level.coins.len()
    );
    hero
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    fn spawn_headless(mut commands: Commands, level: Res<LevelData>) {
        spawn_level(
            &mut commands,
            &level,
            &SpriteCatalog::default(),
            &GameConfig::default(),
            true,
        );
    }

    fn level_world(level: LevelData) -> World {
        let mut world = World::new();
        world.insert_resource(level);
        world.run_system_once(spawn_headless).expect("spawn level");
        world
    }

    fn count<T: Component>(world: &mut World) -> usize {
        world.query_filtered::<Entity, With<T>>().iter(world).count()
    }

    #[test]
    fn embedded_level_parses() {
        let level = LevelData::embedded();
        assert_eq!(level.hero, Point { x: 21.0, y: 525.0 });
        assert_eq!(level.platforms.len(), 8);
        assert_eq!(level.platforms[0].image, "ground");
        assert_eq!(level.spiders.len(), 3);
        assert_eq!(level.spiders[0].direction, 1);
        assert_eq!(level.spiders[2].direction, -1);
        assert_eq!(level.coins.len(), 13);
    }

    #[test]
    fn malformed_level_is_an_error() {
        let err = LevelData::from_json(r#"{ "platforms": [] }"#).expect_err("missing fields");
        assert!(err.starts_with("Invalid level data"));
        let err = LevelData::load(Path::new("does/not/exist.json")).expect_err("missing file");
        assert!(err.starts_with("Failed to read"));
    }

    #[test]
    fn walls_are_derived_from_platform_edges() {
        let platform = PlatformDef {
            x: 100.0,
            y: 200.0,
            image: "grass:2x1".to_string(),
        };
        let [left, right] = enemy_wall_placements(&platform, 80.0);
        assert_eq!(
            left,
            WallPlacement {
                x: 100.0,
                y: 200.0,
                anchor: Vec2::new(1.0, 1.0)
            }
        );
        assert_eq!(
            right,
            WallPlacement {
                x: 180.0,
                y: 200.0,
                anchor: Vec2::new(0.0, 1.0)
            }
        );
    }

    #[test]
    fn spawned_walls_sit_flush_with_platform() {
        let mut world = level_world(LevelData {
            platforms: vec![PlatformDef {
                x: 100.0,
                y: 200.0,
                image: "grass:2x1".to_string(),
            }],
            hero: Point { x: 21.0, y: 525.0 },
            spiders: Vec::new(),
            coins: Vec::new(),
        });

        let mut walls: Vec<Body> = world
            .query_filtered::<&Body, With<EnemyWall>>()
            .iter(&world)
            .copied()
            .collect();
        walls.sort_by(|a, b| a.left().total_cmp(&b.left()));
        assert_eq!(walls.len(), 2);
        assert_eq!(walls[0].right(), 100.0);
        assert_eq!(walls[0].bottom(), 200.0);
        assert_eq!(walls[1].left(), 184.0);
        assert_eq!(walls[1].bottom(), 200.0);
        assert!(walls.iter().all(|w| w.immovable && !w.allow_gravity));
        assert_eq!(count::<Sprite>(&mut world), 0);
    }

    #[test]
    fn full_level_spawns_every_group() {
        let mut world = level_world(LevelData::embedded());
        assert_eq!(count::<Platform>(&mut world), 8);
        assert_eq!(count::<EnemyWall>(&mut world), 16);
        assert_eq!(count::<Spider>(&mut world), 3);
        assert_eq!(count::<Coin>(&mut world), 13);
        assert_eq!(count::<Hero>(&mut world), 1);
        assert_eq!(
            world.resource::<Gravity>(),
            &Gravity(Vec2::new(0.0, 2000.0))
        );

        let spider_speeds: Vec<f32> = world
            .query_filtered::<&Body, With<Spider>>()
            .iter(&world)
            .map(|b| b.velocity.x)
            .collect();
        assert_eq!(spider_speeds.iter().filter(|vx| **vx == 100.0).count(), 2);
        assert_eq!(spider_speeds.iter().filter(|vx| **vx == -100.0).count(), 1);

        let coins_float = world
            .query_filtered::<&Body, With<Coin>>()
            .iter(&world)
            .all(|b| !b.allow_gravity);
        assert!(coins_float);
    }

    #[test]
    fn unknown_platform_image_is_skipped() {
        let mut world = level_world(LevelData {
            platforms: vec![
                PlatformDef {
                    x: 0.0,
                    y: 546.0,
                    image: "ground".to_string(),
                },
                PlatformDef {
                    x: 10.0,
                    y: 10.0,
                    image: "lava".to_string(),
                },
            ],
            hero: Point { x: 21.0, y: 525.0 },
            spiders: Vec::new(),
            coins: Vec::new(),
        });
        assert_eq!(count::<Platform>(&mut world), 1);
        assert_eq!(count::<EnemyWall>(&mut world), 2);
    }
}
