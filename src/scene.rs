use bevy::prelude::*;

use crate::animation::AnimationController;
use crate::components::*;
use crate::events::{self, GameEventBus};
use crate::hero;
use crate::input::{VirtualInput, JUMP};
use crate::level::{spawn_level, LevelData};
use crate::physics::collide_groups;
use crate::physics_core;
use crate::spider::{self, Spider};
use crate::sprites::SpriteCatalog;

/// Order of work inside one fixed tick.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickSet {
    /// Integrate velocities, clear contact flags
    Physics,
    /// Blocking collisions between groups
    Collisions,
    /// Trigger overlaps and their reactions
    Overlaps,
    Input,
    /// Per-entity update hooks
    Entities,
    Animation,
    Cleanup,
    Restart,
}

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<RestartScene>()
            .configure_sets(
                FixedUpdate,
                (
                    TickSet::Physics,
                    TickSet::Collisions,
                    TickSet::Overlaps,
                    TickSet::Input,
                    TickSet::Entities,
                    TickSet::Animation,
                    TickSet::Cleanup,
                    TickSet::Restart,
                )
                    .chain(),
            )
            .add_systems(Startup, setup_scene)
            .add_systems(
                FixedUpdate,
                (
                    resolve_collisions.in_set(TickSet::Collisions),
                    resolve_overlaps.in_set(TickSet::Overlaps),
                    handle_input.in_set(TickSet::Input),
                    restart_scene.in_set(TickSet::Restart),
                ),
            );
    }
}

/// Per-scene state. Built by the loader, thrown away on restart.
#[derive(Resource, Clone, Debug)]
pub struct SceneContext {
    pub hero: Entity,
    pub coins_collected: u32,
    pub spiders_stomped: u32,
}

impl SceneContext {
    pub fn new(hero: Entity) -> Self {
        Self {
            hero,
            coins_collected: 0,
            spiders_stomped: 0,
        }
    }
}

/// Request to rebuild the whole scene from the level description.
#[derive(Event, Clone, Copy, Debug, Default)]
pub struct RestartScene;

/// How a hero/spider overlap resolves. Y grows downward, so a positive
/// vertical velocity means the hero is coming down on the spider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyContact {
    Stomp,
    Fatal,
}

impl EnemyContact {
    pub fn classify(hero_vy: f32) -> Self {
        if hero_vy > 0.0 {
            EnemyContact::Stomp
        } else {
            EnemyContact::Fatal
        }
    }
}

type HeroOnly = (
    With<Hero>,
    Without<Spider>,
    Without<Coin>,
    Without<Platform>,
    Without<EnemyWall>,
);
type SpiderOnly = (
    With<Spider>,
    Without<Hero>,
    Without<Coin>,
    Without<Platform>,
    Without<EnemyWall>,
);
type CoinOnly = (
    With<Coin>,
    Without<Hero>,
    Without<Spider>,
    Without<Platform>,
    Without<EnemyWall>,
);
type PlatformOnly = (With<Platform>, Without<Hero>, Without<Spider>, Without<Coin>);
type WallOnly = (With<EnemyWall>, Without<Hero>, Without<Spider>, Without<Coin>);

fn setup_scene(
    mut commands: Commands,
    level: Res<LevelData>,
    catalog: Res<SpriteCatalog>,
    config: Res<GameConfig>,
    headless: Res<HeadlessMode>,
) {
    let hero = spawn_level(&mut commands, &level, &catalog, &config, headless.0);
    commands.insert_resource(SceneContext::new(hero));
}

fn resolve_collisions(
    mut spiders: Query<&mut Body, SpiderOnly>,
    mut heroes: Query<&mut Body, HeroOnly>,
    platforms: Query<&Body, PlatformOnly>,
    walls: Query<&Body, WallOnly>,
) {
    let platforms: Vec<Body> = platforms.iter().copied().collect();
    let walls: Vec<Body> = walls.iter().copied().collect();
    collide_groups(spiders.iter_mut(), &platforms);
    collide_groups(spiders.iter_mut(), &walls);
    collide_groups(heroes.iter_mut(), &platforms);
}

/// Marks the coin as taken if the hero touches it. The coin body is disabled
/// on the spot, so the same coin can never be collected twice.
pub fn collect_coin(hero: &Body, coin: &mut Body) -> bool {
    if !physics_core::overlaps(hero, coin) {
        return false;
    }
    coin.enabled = false;
    true
}

#[allow(clippy::too_many_arguments)]
fn resolve_overlaps(
    mut commands: Commands,
    mut ctx: ResMut<SceneContext>,
    config: Res<GameConfig>,
    mut bus: ResMut<GameEventBus>,
    mut restart: EventWriter<RestartScene>,
    mut heroes: Query<&mut Body, HeroOnly>,
    mut coins: Query<(Entity, &mut Body), CoinOnly>,
    mut spiders: Query<(&mut Spider, &mut Body, &mut AnimationController), SpiderOnly>,
) {
    let Ok(mut hero) = heroes.get_mut(ctx.hero) else {
        return;
    };

    for (entity, mut coin) in coins.iter_mut() {
        if !collect_coin(&hero, &mut coin) {
            continue;
        }
        ctx.coins_collected += 1;
        let at = coin.center();
        bus.emit(
            events::COIN_COLLECTED,
            serde_json::json!({ "x": at.x, "y": at.y, "total": ctx.coins_collected }),
        );
        commands.entity(entity).despawn();
    }

    for (mut spider, mut body, mut anim) in spiders.iter_mut() {
        if !physics_core::overlaps(&hero, &body) {
            continue;
        }
        match EnemyContact::classify(hero.velocity.y) {
            EnemyContact::Stomp => {
                hero::bounce(&mut hero, config.hero_bounce_speed);
                if spider::die(&mut spider, &mut body, &mut anim) {
                    ctx.spiders_stomped += 1;
                    let at = body.center();
                    bus.emit(
                        events::SPIDER_STOMPED,
                        serde_json::json!({ "x": at.x, "y": at.y }),
                    );
                }
            }
            EnemyContact::Fatal => {
                info!(
                    "[Platformer] Hero hit a spider after {} coins, restarting",
                    ctx.coins_collected
                );
                restart.send(RestartScene);
                return;
            }
        }
    }
}

fn handle_input(
    ctx: Res<SceneContext>,
    config: Res<GameConfig>,
    input: Res<VirtualInput>,
    mut bus: ResMut<GameEventBus>,
    mut heroes: Query<&mut Body, HeroOnly>,
) {
    let Ok(mut hero) = heroes.get_mut(ctx.hero) else {
        return;
    };
    if input.just_pressed(JUMP) && hero::jump(&mut hero, config.hero_jump_speed) {
        bus.emit(events::HERO_JUMPED, serde_json::json!({}));
    }
    hero::move_hero(&mut hero, input.horizontal(), config.hero_speed);
}

#[allow(clippy::too_many_arguments)]
fn restart_scene(
    mut commands: Commands,
    mut requests: EventReader<RestartScene>,
    mut bus: ResMut<GameEventBus>,
    entities: Query<Entity, With<SceneEntity>>,
    level: Res<LevelData>,
    catalog: Res<SpriteCatalog>,
    config: Res<GameConfig>,
    headless: Res<HeadlessMode>,
) {
    if requests.is_empty() {
        return;
    }
    requests.clear();

    for entity in entities.iter() {
        commands.entity(entity).despawn();
    }
    let hero = spawn_level(&mut commands, &level, &catalog, &config, headless.0);
    commands.insert_resource(SceneContext::new(hero));
    bus.emit(events::SCENE_RESTARTED, serde_json::json!({}));
}
