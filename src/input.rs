use bevy::prelude::*;
use std::collections::HashSet;

pub const LEFT: &str = "left";
pub const RIGHT: &str = "right";
pub const JUMP: &str = "jump";

/// Abstraction layer between raw input and game systems.
/// Keyboard (windowed) and tests write to this; the play scene reads it.
///
/// `active` is rebuilt every render frame. `just_pressed` accumulates until a
/// fixed tick consumes it, so a press is neither lost when a frame runs no
/// fixed tick nor seen twice when a frame runs several.
#[derive(Resource, Default, Clone)]
pub struct VirtualInput {
    pub active: HashSet<String>,
    pub just_pressed: HashSet<String>,
}

impl VirtualInput {
    pub fn pressed(&self, action: &str) -> bool {
        self.active.contains(action)
    }

    pub fn just_pressed(&self, action: &str) -> bool {
        self.just_pressed.contains(action)
    }

    pub fn press(&mut self, action: &str) {
        if self.active.insert(action.to_string()) {
            self.just_pressed.insert(action.to_string());
        }
    }

    pub fn release(&mut self, action: &str) {
        self.active.remove(action);
    }

    /// Horizontal direction for this tick. Left wins when both are held.
    pub fn horizontal(&self) -> i8 {
        if self.pressed(LEFT) {
            -1
        } else if self.pressed(RIGHT) {
            1
        } else {
            0
        }
    }

    pub fn consume_presses(&mut self) {
        self.just_pressed.clear();
    }
}

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(VirtualInput::default())
            .add_systems(
                PreUpdate,
                keyboard_to_virtual.run_if(resource_exists::<ButtonInput<KeyCode>>),
            )
            .add_systems(FixedPostUpdate, consume_virtual_presses);
    }
}

/// Translate keyboard input to VirtualInput action names
fn keyboard_to_virtual(keyboard: Res<ButtonInput<KeyCode>>, mut vinput: ResMut<VirtualInput>) {
    vinput.active.clear();

    let bindings: [(&str, &[KeyCode]); 3] = [
        (LEFT, &[KeyCode::ArrowLeft, KeyCode::KeyA]),
        (RIGHT, &[KeyCode::ArrowRight, KeyCode::KeyD]),
        (JUMP, &[KeyCode::ArrowUp, KeyCode::KeyW, KeyCode::Space]),
    ];
    for (action, keys) in bindings {
        if keyboard.any_pressed(keys.iter().copied()) {
            vinput.active.insert(action.into());
        }
        if keyboard.any_just_pressed(keys.iter().copied()) {
            vinput.just_pressed.insert(action.into());
        }
    }
}

fn consume_virtual_presses(mut vinput: ResMut<VirtualInput>) {
    vinput.consume_presses();
}
