// Background track that unlocks on the first gesture and plays over every
// screen.

use std::time::Duration;

use bevy::picking::Pickable;
use bevy::prelude::*;

pub struct AmbientPlugin;

impl Plugin for AmbientPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<PlaybackRequest>()
            .add_systems(Startup, mount_ambient)
            .add_systems(
                Update,
                (
                    arm_on_first_gesture.run_if(resource_exists::<FirstGestureListener>),
                    toggle_control,
                    sync_control,
                )
                    .chain(),
            );
    }
}

/// Where playback starts after the first gesture and after every loop.
pub const TRACK_OFFSET: Duration = Duration::from_secs(10);

const PLAYING_COLOR: Color = Color::srgb(0.96, 0.45, 0.71);
const PAUSED_COLOR: Color = Color::srgb(0.64, 0.64, 0.64);
const CONTROL_SIZE: f32 = 56.0;
const CONTROL_MARGIN: f32 = 24.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AmbientPhase {
    #[default]
    Idle,
    Armed,
    Playing,
    Paused,
}

/// What the audio output should do next.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackRequest {
    Start { offset: Duration },
    Restart { offset: Duration },
    Pause,
    Resume,
}

/// State of the background track. Owned by the app root; nothing about the
/// current screen flows into it.
#[derive(Resource, Debug, Default)]
pub struct AmbientAudio {
    phase: AmbientPhase,
    has_user_interacted: bool,
}

impl AmbientAudio {
    pub fn phase(&self) -> AmbientPhase {
        self.phase
    }

    pub fn has_user_interacted(&self) -> bool {
        self.has_user_interacted
    }

    pub fn is_playing(&self) -> bool {
        self.phase == AmbientPhase::Playing
    }

    /// The play/pause control only exists once playback actually began.
    pub fn shows_control(&self) -> bool {
        matches!(self.phase, AmbientPhase::Playing | AmbientPhase::Paused)
    }

    /// First user gesture. Only the first call does anything.
    pub fn arm(&mut self) -> Option<PlaybackRequest> {
        if self.has_user_interacted() {
            return None;
        }
        self.has_user_interacted = true;
        self.phase = AmbientPhase::Armed;
        Some(PlaybackRequest::Start {
            offset: TRACK_OFFSET,
        })
    }

    pub fn playback_started(&mut self) {
        if self.phase == AmbientPhase::Armed {
            self.phase = AmbientPhase::Playing;
        }
    }

    /// The output could not play the track. The gesture still counts.
    pub fn playback_rejected(&mut self) {
        self.phase = AmbientPhase::Idle;
    }

    pub fn toggle(&mut self) -> Option<PlaybackRequest> {
        match self.phase {
            AmbientPhase::Playing => {
                self.phase = AmbientPhase::Paused;
                Some(PlaybackRequest::Pause)
            }
            AmbientPhase::Paused => {
                self.phase = AmbientPhase::Playing;
                Some(PlaybackRequest::Resume)
            }
            AmbientPhase::Idle | AmbientPhase::Armed => None,
        }
    }

    /// Natural end of the track: jump back to the offset and keep going.
    pub fn track_ended(&mut self) -> Option<PlaybackRequest> {
        (self.phase == AmbientPhase::Playing).then_some(PlaybackRequest::Restart {
            offset: TRACK_OFFSET,
        })
    }
}

/// Present while the app still waits for its first gesture.
#[derive(Resource)]
pub struct FirstGestureListener;

#[derive(Component)]
pub struct AmbientControl;

#[derive(Component)]
struct AmbientControlLabel;

fn mount_ambient(mut commands: Commands) {
    commands.insert_resource(AmbientAudio::default());
    commands.insert_resource(FirstGestureListener);

    commands
        .spawn((
            AmbientControl,
            Button,
            Node {
                width: Val::Px(CONTROL_SIZE),
                height: Val::Px(CONTROL_SIZE),
                position_type: PositionType::Absolute,
                right: Val::Px(CONTROL_MARGIN),
                bottom: Val::Px(CONTROL_MARGIN),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                display: Display::None,
                ..default()
            },
            BackgroundColor(PAUSED_COLOR),
            GlobalZIndex(1000),
        ))
        .with_children(|control| {
            control.spawn((
                AmbientControlLabel,
                Text::new("Play"),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::WHITE),
                Pickable::IGNORE,
            ));
        });
}

fn arm_on_first_gesture(
    mut commands: Commands,
    keys: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    touches: Option<Res<Touches>>,
    mut ambient: ResMut<AmbientAudio>,
    mut requests: MessageWriter<PlaybackRequest>,
) {
    let gestured = keys.get_just_pressed().next().is_some()
        || mouse.get_just_pressed().next().is_some()
        || touches.is_some_and(|touches| touches.any_just_pressed());
    if !gestured {
        return;
    }

    // Whichever gesture came first, the listener goes away.
    commands.remove_resource::<FirstGestureListener>();

    let Some(request) = ambient.arm() else {
        return;
    };
    info!("first gesture, starting background track at {:?}", TRACK_OFFSET);
    requests.write(request);
    ambient.playback_started();
}

fn toggle_control(
    query: Query<&Interaction, (Changed<Interaction>, With<AmbientControl>)>,
    mut ambient: ResMut<AmbientAudio>,
    mut requests: MessageWriter<PlaybackRequest>,
) {
    for interaction in &query {
        if *interaction != Interaction::Pressed {
            continue;
        }
        if let Some(request) = ambient.toggle() {
            debug!("background track {:?}", ambient.phase());
            requests.write(request);
        }
    }
}

fn sync_control(
    ambient: Res<AmbientAudio>,
    mut control: Query<(&mut Node, &mut BackgroundColor), With<AmbientControl>>,
    mut label: Query<&mut Text, With<AmbientControlLabel>>,
) {
    if !ambient.is_changed() {
        return;
    }
    let Ok((mut node, mut bg)) = control.single_mut() else {
        return;
    };

    node.display = if ambient.shows_control() {
        Display::Flex
    } else {
        Display::None
    };
    bg.0 = if ambient.is_playing() {
        PLAYING_COLOR
    } else {
        PAUSED_COLOR
    };

    if let Ok(mut text) = label.single_mut() {
        **text = if ambient.is_playing() { "Pause" } else { "Play" }.to_string();
    }
}

#[cfg(test)]
mod tests {
    use bevy::state::app::StatesPlugin;

    use super::*;

    #[test]
    fn starts_idle_without_control() {
        let ambient = AmbientAudio::default();
        assert_eq!(ambient.phase(), AmbientPhase::Idle);
        assert!(!ambient.has_user_interacted());
        assert!(!ambient.is_playing());
        assert!(!ambient.shows_control());
    }

    #[test]
    fn first_gesture_starts_at_the_offset() {
        let mut ambient = AmbientAudio::default();

        assert_eq!(
            ambient.arm(),
            Some(PlaybackRequest::Start {
                offset: Duration::from_secs(10)
            })
        );
        assert_eq!(ambient.phase(), AmbientPhase::Armed);
        ambient.playback_started();
        assert!(ambient.is_playing());
        assert!(ambient.has_user_interacted());

        assert_eq!(ambient.arm(), None);
    }

    #[test]
    fn toggle_moves_between_playing_and_paused() {
        let mut ambient = AmbientAudio::default();
        assert_eq!(ambient.toggle(), None);

        ambient.arm();
        ambient.playback_started();
        assert_eq!(ambient.toggle(), Some(PlaybackRequest::Pause));
        assert_eq!(ambient.phase(), AmbientPhase::Paused);
        assert!(ambient.shows_control());
        assert_eq!(ambient.toggle(), Some(PlaybackRequest::Resume));
        assert!(ambient.is_playing());
    }

    #[test]
    fn end_of_track_loops_from_the_offset_only_while_playing() {
        let mut ambient = AmbientAudio::default();
        ambient.arm();
        ambient.playback_started();
        assert_eq!(
            ambient.track_ended(),
            Some(PlaybackRequest::Restart {
                offset: TRACK_OFFSET
            })
        );
        assert!(ambient.is_playing());

        ambient.toggle();
        assert_eq!(ambient.track_ended(), None);
    }

    #[test]
    fn rejection_hides_control_but_keeps_the_gesture() {
        let mut ambient = AmbientAudio::default();
        ambient.arm();
        ambient.playback_started();
        ambient.playback_rejected();

        assert_eq!(ambient.phase(), AmbientPhase::Idle);
        assert!(!ambient.shows_control());
        assert!(ambient.has_user_interacted());
        assert_eq!(ambient.arm(), None);
        assert_eq!(ambient.toggle(), None);
    }

    #[derive(Resource, Default)]
    struct Requests(Vec<PlaybackRequest>);

    fn record(mut reader: MessageReader<PlaybackRequest>, mut log: ResMut<Requests>) {
        log.0.extend(reader.read().copied());
    }

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin, AmbientPlugin))
            .init_resource::<ButtonInput<KeyCode>>()
            .init_resource::<ButtonInput<MouseButton>>()
            .init_resource::<Requests>()
            .add_systems(PostUpdate, record);
        app.update();
        app
    }

    fn control_display(app: &mut App) -> Display {
        let mut query = app
            .world_mut()
            .query_filtered::<&Node, With<AmbientControl>>();
        query.single(app.world()).unwrap().display
    }

    #[test]
    fn keydown_arms_once_and_shows_control() {
        let mut app = app();
        assert!(!app.world().resource::<AmbientAudio>().has_user_interacted());
        assert_eq!(control_display(&mut app), Display::None);

        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::Space);
        app.update();

        let ambient = app.world().resource::<AmbientAudio>();
        assert!(ambient.has_user_interacted());
        assert!(ambient.is_playing());
        assert!(!app.world().contains_resource::<FirstGestureListener>());
        assert_eq!(control_display(&mut app), Display::Flex);

        // A later pointer press must not restart anything.
        app.world_mut()
            .resource_mut::<ButtonInput<MouseButton>>()
            .press(MouseButton::Left);
        app.update();

        assert_eq!(
            app.world().resource::<Requests>().0,
            vec![PlaybackRequest::Start {
                offset: TRACK_OFFSET
            }]
        );
    }

    #[test]
    fn pressing_the_control_pauses() {
        let mut app = app();
        app.world_mut()
            .resource_mut::<ButtonInput<MouseButton>>()
            .press(MouseButton::Left);
        app.update();

        let mut query = app
            .world_mut()
            .query_filtered::<&mut Interaction, With<AmbientControl>>();
        *query.single_mut(app.world_mut()).unwrap() = Interaction::Pressed;
        app.update();

        assert_eq!(
            app.world().resource::<AmbientAudio>().phase(),
            AmbientPhase::Paused
        );
        assert_eq!(
            app.world().resource::<Requests>().0.last(),
            Some(&PlaybackRequest::Pause)
        );
    }
}
