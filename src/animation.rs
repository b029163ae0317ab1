use std::collections::HashMap;

use bevy::prelude::*;

use crate::scene::TickSet;

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct AnimationClipDef {
    /// Sprite-sheet frame indices, played in order
    pub frames: Vec<usize>,
    pub fps: f32,
    #[serde(default)]
    pub looping: bool,
}

impl AnimationClipDef {
    fn new(frames: &[usize], fps: f32, looping: bool) -> Self {
        Self {
            frames: frames.to_vec(),
            fps,
            looping,
        }
    }
}

/// Clips registered per sprite sheet: sheet name -> clip name -> clip.
#[derive(Resource, Clone, serde::Serialize, serde::Deserialize)]
pub struct AnimationLibrary {
    pub sheets: HashMap<String, HashMap<String, AnimationClipDef>>,
}

impl AnimationLibrary {
    pub fn clip(&self, sheet: &str, clip: &str) -> Option<&AnimationClipDef> {
        self.sheets.get(sheet).and_then(|clips| clips.get(clip))
    }
}

/// Default frame rate for clips registered without one.
const DEFAULT_FPS: f32 = 60.0;

impl Default for AnimationLibrary {
    fn default() -> Self {
        let hero = HashMap::from([
            ("stop".to_string(), AnimationClipDef::new(&[0], DEFAULT_FPS, false)),
            ("run".to_string(), AnimationClipDef::new(&[1, 2], 8.0, true)),
            ("jump".to_string(), AnimationClipDef::new(&[3], DEFAULT_FPS, false)),
            ("fall".to_string(), AnimationClipDef::new(&[4], DEFAULT_FPS, false)),
        ]);
        let spider = HashMap::from([
            ("crawl".to_string(), AnimationClipDef::new(&[0, 1, 2], 8.0, true)),
            (
                "die".to_string(),
                AnimationClipDef::new(&[0, 4, 0, 4, 0, 4, 3, 3, 3, 3, 3, 3], 12.0, false),
            ),
        ]);
        let coin = HashMap::from([(
            "rotate".to_string(),
            AnimationClipDef::new(&[0, 1, 2, 1], 6.0, true),
        )]);
        Self {
            sheets: HashMap::from([
                ("hero".to_string(), hero),
                ("spider".to_string(), spider),
                ("coin".to_string(), coin),
            ]),
        }
    }
}

/// Playback state of one entity's animation.
#[derive(Component, Clone, Debug)]
pub struct AnimationController {
    pub sheet: String,
    pub clip: String,
    /// Position inside the clip's frame list
    pub cursor: usize,
    pub timer: f32,
    pub playing: bool,
}

impl AnimationController {
    pub fn new(sheet: &str, clip: &str) -> Self {
        Self {
            sheet: sheet.to_string(),
            clip: clip.to_string(),
            cursor: 0,
            timer: 0.0,
            playing: true,
        }
    }

    /// Restarts playback from the first frame of `clip`.
    pub fn play(&mut self, clip: &str) {
        self.clip = clip.to_string();
        self.cursor = 0;
        self.timer = 0.0;
        self.playing = true;
    }

    /// Sprite-sheet frame currently shown
    pub fn frame(&self, library: &AnimationLibrary) -> usize {
        library
            .clip(&self.sheet, &self.clip)
            .and_then(|clip| clip.frames.get(self.cursor).copied())
            .unwrap_or(0)
    }
}

/// Fired once when a non-looping clip plays its last frame out.
#[derive(Event, Clone, Debug, PartialEq)]
pub struct AnimationFinished {
    pub entity: Entity,
    pub sheet: String,
    pub clip: String,
}

pub struct AnimationPlugin;

impl Plugin for AnimationPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(AnimationLibrary::default())
            .add_event::<AnimationFinished>()
            .add_systems(
                FixedUpdate,
                advance_animation_frames.in_set(TickSet::Animation),
            );
    }
}

pub fn advance_animation_frames(
    time: Res<Time<Fixed>>,
    library: Res<AnimationLibrary>,
    mut finished: EventWriter<AnimationFinished>,
    mut query: Query<(Entity, &mut AnimationController)>,
) {
    let dt = time.delta_secs();
    for (entity, mut anim) in query.iter_mut() {
        if !anim.playing {
            continue;
        }
        let Some(clip) = library.clip(&anim.sheet, &anim.clip) else {
            continue;
        };
        if clip.fps <= 0.001 || clip.frames.is_empty() {
            continue;
        }

        anim.timer += dt;
        let frame_time = 1.0 / clip.fps;
        while anim.timer >= frame_time {
            anim.timer -= frame_time;
            if anim.cursor + 1 < clip.frames.len() {
                anim.cursor += 1;
            } else if clip.looping {
                anim.cursor = 0;
            } else {
                anim.playing = false;
                finished.send(AnimationFinished {
                    entity,
                    sheet: anim.sheet.clone(),
                    clip: anim.clip.clone(),
                });
                break;
            }
        }
    }
}
