// Bevy audio output for the background track.

use std::time::Duration;

use bevy::asset::LoadState;
use bevy::audio::{AudioSinkPlayback, PlaybackMode};
use bevy::prelude::*;

use crate::ambient::{AmbientAudio, AmbientPhase, PlaybackRequest};
use crate::content::TRACK_PATH;

pub struct PlaybackPlugin;

impl Plugin for PlaybackPlugin {
    fn build(&self, app: &mut App) {
        let track = app
            .world()
            .resource::<AssetServer>()
            .load::<AudioSource>(TRACK_PATH);
        app.insert_resource(AmbientTrack(track))
            .add_message::<PlaybackRequest>()
            .add_systems(
                Update,
                (apply_requests, restart_on_end, watch_rejection).chain(),
            );
    }
}

/// Handle to the background track, loaded once for the whole app.
#[derive(Resource)]
pub struct AmbientTrack(pub Handle<AudioSource>);

#[derive(Component)]
struct AmbientSpeaker;

fn spawn_speaker(commands: &mut Commands, track: &AmbientTrack, offset: Duration) {
    commands.spawn((
        AmbientSpeaker,
        AudioPlayer::new(track.0.clone()),
        PlaybackSettings {
            mode: PlaybackMode::Once,
            start_position: Some(offset),
            ..default()
        },
    ));
}

fn apply_requests(
    mut commands: Commands,
    mut requests: MessageReader<PlaybackRequest>,
    track: Res<AmbientTrack>,
    speakers: Query<Entity, With<AmbientSpeaker>>,
    sinks: Query<&AudioSink, With<AmbientSpeaker>>,
) {
    for request in requests.read() {
        match *request {
            PlaybackRequest::Start { offset } | PlaybackRequest::Restart { offset } => {
                for entity in &speakers {
                    commands.entity(entity).despawn();
                }
                spawn_speaker(&mut commands, &track, offset);
            }
            PlaybackRequest::Pause => {
                for sink in &sinks {
                    sink.pause();
                }
            }
            PlaybackRequest::Resume => {
                for sink in &sinks {
                    sink.play();
                }
            }
        }
    }
}

fn restart_on_end(
    mut commands: Commands,
    mut ambient: ResMut<AmbientAudio>,
    mut requests: MessageWriter<PlaybackRequest>,
    speakers: Query<(Entity, &AudioSink), With<AmbientSpeaker>>,
) {
    for (entity, sink) in &speakers {
        if !sink.empty() {
            continue;
        }
        commands.entity(entity).despawn();
        if let Some(request) = ambient.track_ended() {
            debug!("background track ended, looping");
            requests.write(request);
        }
    }
}

fn watch_rejection(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    track: Res<AmbientTrack>,
    mut ambient: ResMut<AmbientAudio>,
    speakers: Query<Entity, With<AmbientSpeaker>>,
) {
    if !matches!(ambient.phase(), AmbientPhase::Playing | AmbientPhase::Paused) {
        return;
    }
    if !matches!(asset_server.load_state(&track.0), LoadState::Failed(_)) {
        return;
    }

    warn!("background track could not be played, hiding the control");
    ambient.playback_rejected();
    for entity in &speakers {
        commands.entity(entity).despawn();
    }
}
