use bevy::prelude::*;

use crate::animation::AnimationController;
use crate::components::{Body, Hero};
use crate::scene::TickSet;

pub struct HeroPlugin;

impl Plugin for HeroPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, update_hero_animation.in_set(TickSet::Entities));
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeroAnimation {
    Stop,
    Run,
    Jump,
    Fall,
}

impl HeroAnimation {
    pub fn as_str(self) -> &'static str {
        match self {
            HeroAnimation::Stop => "stop",
            HeroAnimation::Run => "run",
            HeroAnimation::Jump => "jump",
            HeroAnimation::Fall => "fall",
        }
    }
}

/// Sets horizontal velocity; `direction` is -1, 0 or 1. No input is 0.
pub fn move_hero(body: &mut Body, direction: i8, speed: f32) {
    body.velocity.x = f32::from(direction.clamp(-1, 1)) * speed;
}

/// Jumps only while standing on something. Returns whether it jumped.
pub fn jump(body: &mut Body, jump_speed: f32) -> bool {
    let can_jump = body.touching.down;
    if can_jump {
        body.velocity.y = -jump_speed;
    }
    can_jump
}

/// Smaller upward kick given after stomping an enemy.
pub fn bounce(body: &mut Body, bounce_speed: f32) {
    body.velocity.y = -bounce_speed;
}

/// Airborne states win over running, so moving sideways mid-air never shows
/// the run cycle.
pub fn animation_name(body: &Body) -> HeroAnimation {
    let on_ground = body.touching.down;
    if body.velocity.y < 0.0 {
        HeroAnimation::Jump
    } else if !on_ground {
        HeroAnimation::Fall
    } else if body.velocity.x != 0.0 {
        HeroAnimation::Run
    } else {
        HeroAnimation::Stop
    }
}

fn update_hero_animation(mut query: Query<(&Body, &mut AnimationController), With<Hero>>) {
    for (body, mut anim) in query.iter_mut() {
        let name = animation_name(body).as_str();
        // Compare first so change detection only fires on a real switch
        if anim.clip != name {
            anim.play(name);
        }
    }
}
