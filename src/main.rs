// Main
mod ambient;
mod cake;
mod confetti;
mod content;
mod decor;
mod delay;
mod memories;
mod message;
mod playback;
mod screens;
mod transition;
mod ui;
mod video;

use bevy::prelude::*;
use ambient::AmbientPlugin;
use cake::CakePlugin;
use confetti::ConfettiPlugin;
use content::ContentPlugin;
use decor::DecorPlugin;
use memories::MemoriesPlugin;
use message::MessagePlugin;
use playback::PlaybackPlugin;
use screens::{Screens, SequencerPlugin};
use transition::TransitionPlugin;
use ui::{BACKGROUND, WidgetsPlugin};
use video::VideoPlugin;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        .insert_resource(ClearColor(BACKGROUND))
        .add_plugins((SurprisePlugin, PlaybackPlugin))
        .add_systems(Startup, spawn_camera)
        .run();
}

/// Every screen plus the layers that outlive them. Audio output is left to
/// `PlaybackPlugin` so this runs without a sound device.
struct SurprisePlugin;

impl Plugin for SurprisePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<Screens>().add_plugins((
            ContentPlugin,
            SequencerPlugin,
            TransitionPlugin,
            WidgetsPlugin,
            AmbientPlugin,
            ConfettiPlugin,
            DecorPlugin,
            CakePlugin,
            MemoriesPlugin,
            MessagePlugin,
            VideoPlugin,
        ));
    }
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}
