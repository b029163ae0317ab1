use bevy::prelude::*;

/// Marks the player-controlled hero
#[derive(Component)]
pub struct Hero;

/// Static platform the hero and spiders stand on
#[derive(Component)]
pub struct Platform;

/// Invisible wall at a platform edge; only spiders collide with it
#[derive(Component)]
pub struct EnemyWall;

/// Collectible coin
#[derive(Component)]
pub struct Coin;

/// Everything spawned by the level loader. Despawned wholesale on restart.
#[derive(Component)]
pub struct SceneEntity;

#[derive(Resource, Clone, Copy, Default)]
pub struct HeadlessMode(pub bool);

/// Contact flags for the four sides of a body, reset every tick.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct Sides {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

/// Arcade physics body. Positions are world units with y growing downward;
/// `position` is the top-left corner of the box.
#[derive(Component, Clone, Copy, Debug)]
pub struct Body {
    pub position: Vec2,
    pub prev: Vec2,
    pub size: Vec2,
    pub velocity: Vec2,
    pub enabled: bool,
    pub allow_gravity: bool,
    pub immovable: bool,
    pub collide_world_bounds: bool,
    /// Contact with another body resolved this tick
    pub touching: Sides,
    /// Contact with the world bounds this tick
    pub blocked: Sides,
}

impl Body {
    /// Body placed so that `anchor` (0..1 on each axis, relative to its own
    /// size) sits on the point `(x, y)`.
    pub fn anchored(x: f32, y: f32, size: Vec2, anchor: Vec2) -> Self {
        let position = Vec2::new(x, y) - anchor * size;
        Self {
            position,
            prev: position,
            size,
            velocity: Vec2::ZERO,
            enabled: true,
            allow_gravity: true,
            immovable: false,
            collide_world_bounds: false,
            touching: Sides::default(),
            blocked: Sides::default(),
        }
    }

    /// Immovable, gravity-free body
    pub fn fixed(x: f32, y: f32, size: Vec2, anchor: Vec2) -> Self {
        Self {
            allow_gravity: false,
            immovable: true,
            ..Self::anchored(x, y, size, anchor)
        }
    }

    pub fn left(&self) -> f32 {
        self.position.x
    }

    pub fn right(&self) -> f32 {
        self.position.x + self.size.x
    }

    pub fn top(&self) -> f32 {
        self.position.y
    }

    pub fn bottom(&self) -> f32 {
        self.position.y + self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    /// Distance moved during the current tick
    pub fn delta(&self) -> Vec2 {
        self.position - self.prev
    }
}

/// Gameplay tuning (as a resource so it can be overridden from game.json)
#[derive(Resource, Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub hero_speed: f32,
    pub hero_jump_speed: f32,
    pub hero_bounce_speed: f32,
    pub spider_speed: f32,
    pub gravity: f32,
    pub world_width: f32,
    pub world_height: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            hero_speed: 300.0,
            hero_jump_speed: 1000.0,
            hero_bounce_speed: 600.0,
            spider_speed: 100.0,
            gravity: 2000.0,
            world_width: 960.0,
            world_height: 600.0,
        }
    }
}
