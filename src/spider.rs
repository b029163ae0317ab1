use bevy::prelude::*;

use crate::animation::{AnimationController, AnimationFinished};
use crate::components::{Body, GameConfig};
use crate::events::{self, GameEventBus};
use crate::scene::TickSet;

pub struct SpiderPlugin;

impl Plugin for SpiderPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, patrol_spiders.in_set(TickSet::Entities))
            .add_systems(FixedUpdate, remove_dead_spiders.in_set(TickSet::Cleanup));
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SpiderState {
    #[default]
    Patrolling,
    /// Body disabled, death clip playing
    Dying,
    Removed,
}

/// Patrolling enemy
#[derive(Component, Default, Debug)]
pub struct Spider {
    pub state: SpiderState,
}

/// Turns around on contact with a wall or the world edge; otherwise keeps
/// walking in the current direction.
pub fn patrol(body: &mut Body, speed: f32) {
    if body.touching.right || body.blocked.right {
        body.velocity.x = -speed;
    } else if body.touching.left || body.blocked.left {
        body.velocity.x = speed;
    }
}

/// Starts the death sequence. The entity stays alive until its `die` clip
/// has played out; see `remove_dead_spiders`. Returns false if the spider
/// was not patrolling.
pub fn die(spider: &mut Spider, body: &mut Body, anim: &mut AnimationController) -> bool {
    if spider.state != SpiderState::Patrolling {
        return false;
    }
    spider.state = SpiderState::Dying;
    body.enabled = false;
    anim.play("die");
    true
}

fn patrol_spiders(config: Res<GameConfig>, mut query: Query<(&Spider, &mut Body)>) {
    for (spider, mut body) in query.iter_mut() {
        if spider.state == SpiderState::Patrolling {
            patrol(&mut body, config.spider_speed);
        }
    }
}

fn remove_dead_spiders(
    mut commands: Commands,
    mut finished: EventReader<AnimationFinished>,
    mut bus: ResMut<GameEventBus>,
    mut spiders: Query<(&mut Spider, &Body)>,
) {
    for ev in finished.read() {
        if ev.clip != "die" {
            continue;
        }
        let Ok((mut spider, body)) = spiders.get_mut(ev.entity) else {
            continue;
        };
        if spider.state != SpiderState::Dying {
            continue;
        }
        spider.state = SpiderState::Removed;
        let at = body.center();
        bus.emit(events::SPIDER_REMOVED, serde_json::json!({ "x": at.x, "y": at.y }));
        debug!("[Platformer] Spider removed at ({:.0}, {:.0})", at.x, at.y);
        commands.entity(ev.entity).despawn();
    }
}
