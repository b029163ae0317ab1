use crate::animation::{AnimationController, AnimationLibrary};
use crate::components::*;
use bevy::prelude::*;

pub struct RenderPlugin;

impl Plugin for RenderPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera).add_systems(
            Update,
            (sync_body_to_transform, sync_animation_frames),
        );
    }
}

#[derive(Component)]
pub struct MainCamera;

/// Fixed camera looking at the middle of the world.
fn spawn_camera(mut commands: Commands, config: Res<GameConfig>) {
    commands.spawn((
        MainCamera,
        Camera2d,
        Transform::from_xyz(config.world_width / 2.0, -config.world_height / 2.0, 100.0),
    ));
}

/// Body space has y pointing down; screen space has it pointing up.
pub fn body_translation(body: &Body, z: f32) -> Vec3 {
    Vec3::new(body.position.x, -body.position.y, z)
}

fn sync_body_to_transform(mut query: Query<(&Body, &mut Transform), Changed<Body>>) {
    for (body, mut transform) in query.iter_mut() {
        transform.translation = body_translation(body, transform.translation.z);
    }
}

fn sync_animation_frames(
    library: Res<AnimationLibrary>,
    mut query: Query<(&AnimationController, &mut Sprite), Changed<AnimationController>>,
) {
    for (anim, mut sprite) in query.iter_mut() {
        let frame = anim.frame(&library);
        if let Some(atlas) = sprite.texture_atlas.as_mut() {
            atlas.index = frame;
        }
    }
}
