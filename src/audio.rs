use std::collections::HashMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::events::{self, GameEventBus};

const MAX_AUDIO_EVENTS: usize = 256;

fn default_volume() -> f32 {
    1.0
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SfxDefinition {
    pub path: String,
    #[serde(default = "default_volume")]
    pub volume: f32,
}

impl SfxDefinition {
    fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            volume: default_volume(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct AudioEventLog {
    pub frame: u64,
    #[serde(rename = "type")]
    pub event_type: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_event: Option<String>,
}

/// A play request waiting for the output system.
#[derive(Clone, Debug)]
pub struct PendingSfx {
    pub path: String,
    pub volume: f32,
}

#[derive(Resource)]
pub struct AudioManager {
    pub sfx: HashMap<String, SfxDefinition>,
    /// Gameplay event name -> sfx name
    pub triggers: HashMap<String, String>,
    pub master_volume: f32,
    pub sfx_volume: f32,
    pub recent_events: Vec<AudioEventLog>,
    pub pending: Vec<PendingSfx>,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self {
            sfx: HashMap::from([
                ("jump".to_string(), SfxDefinition::new("audio/jump.wav")),
                ("coin".to_string(), SfxDefinition::new("audio/coin.wav")),
                ("stomp".to_string(), SfxDefinition::new("audio/stomp.wav")),
            ]),
            triggers: HashMap::from([
                (events::HERO_JUMPED.to_string(), "jump".to_string()),
                (events::COIN_COLLECTED.to_string(), "coin".to_string()),
                (events::SPIDER_STOMPED.to_string(), "stomp".to_string()),
            ]),
            master_volume: 1.0,
            sfx_volume: 1.0,
            recent_events: Vec::new(),
            pending: Vec::new(),
        }
    }
}

impl AudioManager {
    pub fn set_volume(&mut self, channel: &str, value: f32, frame: u64) -> Result<(), String> {
        let v = value.clamp(0.0, 2.0);
        match channel {
            "master" => self.master_volume = v,
            "sfx" => self.sfx_volume = v,
            _ => return Err(format!("Unknown volume channel: {channel}")),
        }
        self.push_event(AudioEventLog {
            frame,
            event_type: "volume".to_string(),
            name: channel.to_string(),
            volume: Some(v),
            source_event: None,
        });
        Ok(())
    }

    pub fn play_sfx(
        &mut self,
        name: &str,
        frame: u64,
        source_event: Option<String>,
    ) -> Result<(), String> {
        let Some(def) = self.sfx.get(name) else {
            return Err(format!("Unknown sfx: {name}"));
        };
        let volume = def.volume * self.sfx_volume * self.master_volume;
        self.pending.push(PendingSfx {
            path: def.path.clone(),
            volume,
        });
        self.push_event(AudioEventLog {
            frame,
            event_type: "sfx".to_string(),
            name: name.to_string(),
            volume: Some(volume),
            source_event,
        });
        Ok(())
    }

    fn push_event(&mut self, event: AudioEventLog) {
        self.recent_events.push(event);
        if self.recent_events.len() > MAX_AUDIO_EVENTS {
            let excess = self.recent_events.len() - MAX_AUDIO_EVENTS;
            self.recent_events.drain(0..excess);
        }
    }
}

#[derive(Resource, Default)]
struct AudioEventCursor {
    last_seq: u64,
}

pub struct AudioPlugin;

impl Plugin for AudioPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(AudioManager::default())
            .insert_resource(AudioEventCursor::default())
            .add_systems(Update, (auto_audio_from_events, play_pending_sfx).chain());
    }
}

fn auto_audio_from_events(
    mut audio: ResMut<AudioManager>,
    bus: Res<GameEventBus>,
    mut cursor: ResMut<AudioEventCursor>,
) {
    for ev in bus.since(cursor.last_seq) {
        cursor.last_seq = ev.seq;
        let Some(mapped) = audio.triggers.get(&ev.name).cloned() else {
            continue;
        };
        if let Err(err) = audio.play_sfx(&mapped, ev.frame, Some(ev.name.clone())) {
            warn!("[Platformer audio] {err}");
        }
    }
}

/// Hands queued cues to Bevy's audio output. Without an asset server
/// (headless) the queue is simply drained.
fn play_pending_sfx(
    mut commands: Commands,
    mut audio: ResMut<AudioManager>,
    asset_server: Option<Res<AssetServer>>,
) {
    let pending = std::mem::take(&mut audio.pending);
    let Some(asset_server) = asset_server else {
        return;
    };
    for sfx in pending {
        commands.spawn((
            AudioPlayer::new(asset_server.load::<AudioSource>(sfx.path)),
            PlaybackSettings::DESPAWN.with_volume(bevy::audio::Volume::new(sfx.volume)),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    #[test]
    fn play_sfx_records_event() {
        let mut audio = AudioManager::default();
        audio.master_volume = 0.8;
        audio.sfx_volume = 0.5;

        audio
            .play_sfx("jump", 10, Some("test".to_string()))
            .expect("sfx should play");

        assert_eq!(audio.recent_events.len(), 1);
        let ev = &audio.recent_events[0];
        assert_eq!(ev.event_type, "sfx");
        assert_eq!(ev.name, "jump");
        assert_eq!(ev.frame, 10);
        assert_eq!(ev.volume, Some(0.4));
        assert_eq!(audio.pending.len(), 1);
        assert_eq!(audio.pending[0].path, "audio/jump.wav");
    }

    #[test]
    fn invalid_channel_rejected() {
        let mut audio = AudioManager::default();
        let err = audio
            .set_volume("music", 1.0, 0)
            .expect_err("invalid channel should fail");
        assert!(err.contains("Unknown volume channel"));
    }

    #[test]
    fn unknown_sfx_rejected() {
        let mut audio = AudioManager::default();
        let err = audio.play_sfx("explosion", 0, None).expect_err("unknown sfx");
        assert!(err.contains("Unknown sfx"));
        assert!(audio.pending.is_empty());
    }

    #[test]
    fn gameplay_events_trigger_each_cue_once() {
        let mut world = World::new();
        world.insert_resource(AudioManager::default());
        world.insert_resource(AudioEventCursor::default());
        world.insert_resource(GameEventBus::default());
        {
            let mut bus = world.resource_mut::<GameEventBus>();
            bus.emit(events::COIN_COLLECTED, serde_json::json!({}));
            bus.emit(events::SCENE_RESTARTED, serde_json::json!({}));
            bus.emit(events::SPIDER_STOMPED, serde_json::json!({}));
        }
        world
            .run_system_once(auto_audio_from_events)
            .expect("audio triggers");
        world
            .run_system_once(auto_audio_from_events)
            .expect("audio triggers again");

        let audio = world.resource::<AudioManager>();
        let names: Vec<&str> = audio.recent_events.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["coin", "stomp"]);
        assert_eq!(
            audio.recent_events[0].source_event.as_deref(),
            Some(events::COIN_COLLECTED)
        );

        world.run_system_once(play_pending_sfx).expect("drain queue");
        assert!(world.resource::<AudioManager>().pending.is_empty());
    }
}
