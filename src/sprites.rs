use std::collections::HashMap;
use std::path::PathBuf;

use bevy::prelude::*;
use bevy::sprite::Anchor;

pub struct SpritePlugin;

impl Plugin for SpritePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PreStartup, load_sprite_assets);
    }
}

/// One image (or uniform sprite sheet) the level can reference by name.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SpriteDef {
    pub path: String,
    /// Size of one frame; for plain images the whole image
    pub frame_size: UVec2,
    #[serde(default = "default_columns")]
    pub columns: u32,
    /// Placeholder colour used when the image file is missing
    pub color: [f32; 3],
}

fn default_columns() -> u32 {
    1
}

#[derive(Clone)]
struct LoadedSprite {
    image: Handle<Image>,
    layout: Option<Handle<TextureAtlasLayout>>,
}

/// Holds every image the level uses, keyed by the name level data refers to.
/// Frame sizes double as physics body sizes, so the catalog is needed even
/// when nothing is rendered.
#[derive(Resource, Clone)]
pub struct SpriteCatalog {
    pub defs: HashMap<String, SpriteDef>,
    pub assets_dir: PathBuf,
    loaded: HashMap<String, LoadedSprite>,
}

impl SpriteCatalog {
    pub fn with_assets_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            assets_dir: dir.into(),
            ..Self::default()
        }
    }

    pub fn size(&self, name: &str) -> Option<Vec2> {
        self.defs.get(name).map(|d| d.frame_size.as_vec2())
    }

    /// Sprite anchored at its top-left corner, matching `Body::position`.
    pub fn make_sprite(&self, name: &str) -> Option<Sprite> {
        let def = self.defs.get(name)?;
        let mut sprite = match self.loaded.get(name) {
            Some(LoadedSprite {
                image,
                layout: Some(layout),
            }) => Sprite::from_atlas_image(
                image.clone(),
                TextureAtlas {
                    layout: layout.clone(),
                    index: 0,
                },
            ),
            Some(LoadedSprite { image, layout: None }) => Sprite::from_image(image.clone()),
            None => Sprite::from_color(
                Color::srgb(def.color[0], def.color[1], def.color[2]),
                def.frame_size.as_vec2(),
            ),
        };
        sprite.anchor = Anchor::TopLeft;
        Some(sprite)
    }
}

impl Default for SpriteCatalog {
    fn default() -> Self {
        let image = |path: &str, w: u32, h: u32, color: [f32; 3]| SpriteDef {
            path: path.to_string(),
            frame_size: UVec2::new(w, h),
            columns: 1,
            color,
        };
        let sheet = |path: &str, w: u32, h: u32, columns: u32, color: [f32; 3]| SpriteDef {
            columns,
            ..image(path, w, h, color)
        };
        let grass = [0.36, 0.62, 0.25];
        let defs = HashMap::from([
            ("background".to_string(), image("images/background.png", 960, 600, [0.55, 0.78, 0.93])),
            ("ground".to_string(), image("images/ground.png", 960, 54, [0.45, 0.32, 0.2])),
            ("grass:8x1".to_string(), image("images/grass_8x1.png", 336, 42, grass)),
            ("grass:6x1".to_string(), image("images/grass_6x1.png", 252, 42, grass)),
            ("grass:4x1".to_string(), image("images/grass_4x1.png", 168, 42, grass)),
            ("grass:2x1".to_string(), image("images/grass_2x1.png", 84, 42, grass)),
            ("grass:1x1".to_string(), image("images/grass_1x1.png", 42, 42, grass)),
            ("invisible-wall".to_string(), image("images/invisible_wall.png", 8, 32, [1.0, 0.0, 1.0])),
            ("hero".to_string(), sheet("images/hero.png", 36, 42, 5, [0.2, 0.4, 0.9])),
            ("coin".to_string(), sheet("images/coin_animated.png", 22, 22, 4, [1.0, 0.84, 0.0])),
            ("spider".to_string(), sheet("images/spider.png", 42, 32, 5, [0.35, 0.1, 0.4])),
        ]);
        Self {
            defs,
            assets_dir: PathBuf::from("assets"),
            loaded: HashMap::new(),
        }
    }
}

/// Loads images that exist under the assets dir; the rest keep their
/// coloured placeholder.
fn load_sprite_assets(
    asset_server: Res<AssetServer>,
    mut layouts: ResMut<Assets<TextureAtlasLayout>>,
    mut catalog: ResMut<SpriteCatalog>,
) {
    let mut loaded = HashMap::new();
    let mut missing = Vec::new();
    for (name, def) in &catalog.defs {
        if !catalog.assets_dir.join(&def.path).exists() {
            missing.push(name.as_str());
            continue;
        }
        let layout = (def.columns > 1).then(|| {
            layouts.add(TextureAtlasLayout::from_grid(
                def.frame_size,
                def.columns,
                1,
                None,
                None,
            ))
        });
        loaded.insert(
            name.clone(),
            LoadedSprite {
                image: asset_server.load(def.path.clone()),
                layout,
            },
        );
    }
    if !missing.is_empty() {
        missing.sort_unstable();
        warn!(
            "[Platformer sprites] Missing images, using placeholders: {}",
            missing.join(", ")
        );
    }
    info!("[Platformer sprites] Loaded {} images", loaded.len());
    catalog.loaded = loaded;
}
