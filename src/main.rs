mod animation;
mod audio;
mod components;
mod events;
mod hero;
mod input;
mod level;
mod physics;
mod physics_core;
mod render;
mod scene;
mod spider;
mod sprites;

use std::path::PathBuf;

use bevy::prelude::*;
use components::{GameConfig, HeadlessMode};
use level::LevelData;
use sprites::SpriteCatalog;

#[derive(serde::Deserialize, Default)]
struct StartupConfig {
    window_title: Option<String>,
    window_width: Option<f32>,
    window_height: Option<f32>,
    background_color: Option<[f32; 3]>,
    assets_dir: Option<String>,
    /// Level file, relative to the assets dir
    level: Option<String>,
    master_volume: Option<f32>,
    sfx_volume: Option<f32>,
    #[serde(default)]
    tuning: GameConfig,
}

fn load_startup_config() -> StartupConfig {
    let path = std::env::var("PLATFORMER_GAME_CONFIG")
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "game.json".to_string());
    match std::fs::read_to_string(&path) {
        Ok(contents) => match serde_json::from_str::<StartupConfig>(&contents) {
            Ok(cfg) => {
                println!("[Platformer] Loaded startup config from {}", path);
                cfg
            }
            Err(e) => {
                eprintln!("[Platformer] Failed to parse {}: {}", path, e);
                StartupConfig::default()
            }
        },
        Err(_) => StartupConfig::default(),
    }
}

fn env_or(key: &str, fallback: Option<String>, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|s| !s.is_empty())
        .or(fallback)
        .unwrap_or_else(|| default.to_string())
}

fn load_level(path: &std::path::Path) -> LevelData {
    match LevelData::load(path) {
        Ok(level) => {
            println!("[Platformer] Loaded level from {}", path.display());
            level
        }
        Err(e) => {
            eprintln!("[Platformer] {e}; using the bundled level");
            LevelData::embedded()
        }
    }
}

/// Parses `--frames=N`.
fn frame_limit(args: &[String]) -> Option<u64> {
    args.iter()
        .find_map(|a| a.strip_prefix("--frames="))
        .and_then(|n| n.parse().ok())
}

/// Stop after this many fixed ticks (headless runs)
#[derive(Resource)]
struct FrameLimit(u64);

fn exit_after_frames(
    limit: Res<FrameLimit>,
    bus: Res<events::GameEventBus>,
    ctx: Option<Res<scene::SceneContext>>,
    mut exit: EventWriter<AppExit>,
) {
    if bus.frame < limit.0 {
        return;
    }
    let (coins, stomps) = ctx.map_or((0, 0), |c| (c.coins_collected, c.spiders_stomped));
    info!(
        "[Platformer] Ran {} ticks: {} coins, {} spiders stomped, {} restarts, {} events dropped",
        bus.frame,
        coins,
        stomps,
        bus.count(events::SCENE_RESTARTED),
        bus.dropped_events
    );
    exit.send(AppExit::Success);
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let headless = args.iter().any(|a| a == "--headless");

    let startup_config = load_startup_config();
    let assets_dir = env_or("PLATFORMER_ASSETS_DIR", startup_config.assets_dir, "assets");
    let level_file = env_or("PLATFORMER_LEVEL", startup_config.level, "data/level01.json");
    let level = load_level(&PathBuf::from(&assets_dir).join(&level_file));

    let mut app = App::new();
    app.insert_resource(HeadlessMode(headless));

    if headless {
        app.add_plugins(MinimalPlugins)
            .add_plugins(bevy::log::LogPlugin::default());
        if let Some(limit) = frame_limit(&args) {
            app.insert_resource(FrameLimit(limit))
                .add_systems(Update, exit_after_frames);
        }
        println!("[Platformer] Starting in HEADLESS mode");
    } else {
        if assets_dir != "assets" {
            println!("[Platformer] Using game assets dir: {}", assets_dir);
        }
        let tuning = &startup_config.tuning;
        let window_title = startup_config
            .window_title
            .unwrap_or_else(|| "Platformer".to_string());
        let window_width = startup_config.window_width.unwrap_or(tuning.world_width);
        let window_height = startup_config.window_height.unwrap_or(tuning.world_height);

        app.add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: window_title,
                        resolution: (window_width, window_height).into(),
                        present_mode: bevy::window::PresentMode::AutoVsync,
                        ..default()
                    }),
                    ..default()
                })
                .set(bevy::asset::AssetPlugin {
                    file_path: assets_dir.clone(),
                    ..default()
                }),
        );
        let bg = startup_config.background_color.unwrap_or([0.0, 0.0, 0.0]);
        app.insert_resource(ClearColor(Color::srgb(bg[0], bg[1], bg[2])));
        app.add_plugins(sprites::SpritePlugin);
        app.add_plugins(render::RenderPlugin);
        println!("[Platformer] Starting in WINDOWED mode");
    }

    app.insert_resource(startup_config.tuning)
        .insert_resource(level)
        .insert_resource(SpriteCatalog::with_assets_dir(&assets_dir))
        .insert_resource(Time::<Fixed>::from_hz(60.0))
        .add_plugins(scene::ScenePlugin)
        .add_plugins(events::GameEventsPlugin)
        .add_plugins(input::InputPlugin)
        .add_plugins(physics::PhysicsPlugin)
        .add_plugins(animation::AnimationPlugin)
        .add_plugins(hero::HeroPlugin)
        .add_plugins(spider::SpiderPlugin)
        .add_plugins(audio::AudioPlugin);

    {
        let mut manager = app.world_mut().resource_mut::<audio::AudioManager>();
        let volumes = [
            ("master", startup_config.master_volume),
            ("sfx", startup_config.sfx_volume),
        ];
        for (channel, value) in volumes {
            let Some(value) = value else { continue };
            if let Err(e) = manager.set_volume(channel, value, 0) {
                eprintln!("[Platformer] {e}");
            }
        }
    }

    app.run();
}
