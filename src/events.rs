use std::collections::VecDeque;

use bevy::prelude::*;
use serde::Serialize;

use crate::scene::TickSet;

const MAX_EVENTS: usize = 500;

pub const HERO_JUMPED: &str = "hero_jumped";
pub const COIN_COLLECTED: &str = "coin_collected";
pub const SPIDER_STOMPED: &str = "spider_stomped";
pub const SPIDER_REMOVED: &str = "spider_removed";
pub const SCENE_RESTARTED: &str = "scene_restarted";

#[derive(Serialize, Clone, Debug)]
pub struct GameEvent {
    pub name: String,
    pub data: serde_json::Value,
    pub frame: u64,
    /// Monotonic across the whole run; consumers keep a cursor on it.
    pub seq: u64,
}

/// Bounded log of gameplay events. Survives scene restarts.
#[derive(Resource, Default)]
pub struct GameEventBus {
    pub recent: VecDeque<GameEvent>,
    pub frame: u64,
    pub dropped_events: u64,
    next_seq: u64,
    last_overflow_log_frame: u64,
}

impl GameEventBus {
    pub fn emit(&mut self, name: impl Into<String>, data: serde_json::Value) {
        self.next_seq = self.next_seq.saturating_add(1);
        self.recent.push_back(GameEvent {
            name: name.into(),
            data,
            frame: self.frame,
            seq: self.next_seq,
        });
        if self.recent.len() > MAX_EVENTS {
            let excess = self.recent.len() - MAX_EVENTS;
            for _ in 0..excess {
                self.recent.pop_front();
            }
            self.dropped_events = self.dropped_events.saturating_add(excess as u64);
            if self.frame.saturating_sub(self.last_overflow_log_frame) >= 60 {
                self.last_overflow_log_frame = self.frame;
                warn!(
                    "[Platformer events] Dropped {} buffered events (total dropped: {})",
                    excess, self.dropped_events
                );
            }
        }
    }

    /// Events emitted after `seq`, oldest first.
    pub fn since(&self, seq: u64) -> impl Iterator<Item = &GameEvent> {
        self.recent.iter().filter(move |ev| ev.seq > seq)
    }

    pub fn count(&self, name: &str) -> usize {
        self.recent.iter().filter(|ev| ev.name == name).count()
    }
}

pub struct GameEventsPlugin;

impl Plugin for GameEventsPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(GameEventBus::default())
            .add_systems(FixedUpdate, tick_event_frame.before(TickSet::Physics));
    }
}

fn tick_event_frame(mut bus: ResMut<GameEventBus>) {
    bus.frame = bus.frame.saturating_add(1);
}
