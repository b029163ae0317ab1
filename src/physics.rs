use bevy::prelude::*;

use crate::components::*;
use crate::physics_core;
use crate::scene::TickSet;

pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Gravity::default())
            .add_systems(FixedUpdate, step_bodies.in_set(TickSet::Physics));
    }
}

/// World gravity in units/s^2 (y grows downward). Zero until a level is loaded.
#[derive(Resource, Clone, Copy, Default, Debug, PartialEq)]
pub struct Gravity(pub Vec2);

/// Integrates every enabled body and keeps bounded bodies inside the world.
/// Contact flags are cleared first so the collision pass can set them fresh.
pub fn step_bodies(
    time: Res<Time<Fixed>>,
    gravity: Res<Gravity>,
    config: Res<GameConfig>,
    mut bodies: Query<&mut Body>,
) {
    let dt = time.delta_secs();
    let bounds = Vec2::new(config.world_width, config.world_height);
    for mut body in bodies.iter_mut() {
        if !body.enabled || body.immovable {
            continue;
        }
        physics_core::begin_tick(&mut body);
        physics_core::integrate(&mut body, gravity.0, dt);
        if body.collide_world_bounds {
            physics_core::clamp_to_bounds(&mut body, bounds);
        }
    }
}

/// Blocking collision of every body in `movers` against every body in `solids`.
pub fn collide_groups<'a>(
    movers: impl Iterator<Item = Mut<'a, Body>>,
    solids: &[Body],
) -> usize {
    let mut hits = 0;
    for mut body in movers {
        for solid in solids {
            if physics_core::separate(&mut body, solid) {
                hits += 1;
            }
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;
    use std::time::Duration;

    fn physics_world() -> World {
        let mut world = World::new();
        world.insert_resource(Time::<Fixed>::from_hz(60.0));
        world.insert_resource(Gravity(Vec2::new(0.0, 2000.0)));
        world.insert_resource(GameConfig::default());
        world
    }

    fn tick(world: &mut World) {
        world
            .resource_mut::<Time<Fixed>>()
            .advance_by(Duration::from_secs_f32(1.0 / 60.0));
        world.run_system_once(step_bodies).expect("step bodies");
    }

    #[test]
    fn gravity_pulls_dynamic_bodies_only() {
        let mut world = physics_world();
        let falling = world
            .spawn(Body::anchored(100.0, 100.0, Vec2::splat(10.0), Vec2::ZERO))
            .id();
        let platform = world
            .spawn(Body::fixed(0.0, 300.0, Vec2::new(100.0, 20.0), Vec2::ZERO))
            .id();
        tick(&mut world);

        let body = world.get::<Body>(falling).expect("falling body");
        assert!(body.velocity.y > 0.0);
        assert!(body.position.y > 100.0);
        assert_eq!(body.prev.y, 100.0);
        let body = world.get::<Body>(platform).expect("platform body");
        assert_eq!(body.position, Vec2::new(0.0, 300.0));
    }

    #[test]
    fn disabled_body_is_frozen() {
        let mut world = physics_world();
        let mut body = Body::anchored(100.0, 100.0, Vec2::splat(10.0), Vec2::ZERO);
        body.enabled = false;
        body.velocity.x = 50.0;
        let id = world.spawn(body).id();
        tick(&mut world);
        let body = world.get::<Body>(id).expect("body");
        assert_eq!(body.position, Vec2::new(100.0, 100.0));
    }

    #[test]
    fn bounded_body_stops_at_world_floor() {
        let mut world = physics_world();
        let mut body = Body::anchored(10.0, 595.0, Vec2::splat(10.0), Vec2::ZERO);
        body.collide_world_bounds = true;
        let id = world.spawn(body).id();
        tick(&mut world);
        let body = world.get::<Body>(id).expect("body");
        assert!(body.blocked.down);
        assert_eq!(body.bottom(), 600.0);
        assert!(!body.touching.down);
    }
}
