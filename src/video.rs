// Video surprise: a framed embed reference and the replay button.

use bevy::prelude::*;

use crate::content::VIDEO_EMBED;
use crate::screens::{ScreenCompleted, Screens, Sequencer};
use crate::ui::{CARD, PINK, PURPLE, SOFT_PINK, spawn_button, spawn_heading, spawn_screen_root};

pub struct VideoPlugin;

impl Plugin for VideoPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<ScreenCompleted>()
            .add_systems(OnEnter(Screens::Video), setup_video)
            .add_systems(OnExit(Screens::Video), exit_video)
            .add_systems(Update, video_buttons.run_if(in_state(Screens::Video)));
    }
}

/// Seconds before "Replay Experience" shows up.
pub const REPLAY_DELAY: f32 = 1.2;

/// Generation the video screen was mounted under.
#[derive(Resource, Debug)]
struct VideoScreen {
    generation: u64,
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoButton {
    Replay,
}

fn setup_video(mut commands: Commands, sequencer: Res<Sequencer>) {
    commands.insert_resource(VideoScreen {
        generation: sequencer.generation(),
    });

    let root = spawn_screen_root(&mut commands, Screens::Video);
    commands.entity(root).with_children(|parent| {
        spawn_heading(parent, "Special Video Surprise!");

        // No player here, the embed is shown as a reference.
        parent
            .spawn((
                Node {
                    width: Val::Px(640.0),
                    max_width: Val::Percent(100.0),
                    aspect_ratio: Some(16.0 / 9.0),
                    flex_direction: FlexDirection::Column,
                    justify_content: JustifyContent::Center,
                    align_items: AlignItems::Center,
                    row_gap: Val::Px(12.0),
                    padding: UiRect::all(Val::Px(16.0)),
                    border: UiRect::all(Val::Px(4.0)),
                    ..default()
                },
                BackgroundColor(CARD),
                BorderColor::all(PURPLE),
            ))
            .with_children(|frame| {
                frame.spawn((
                    Text::new(">"),
                    TextFont {
                        font_size: 64.0,
                        ..default()
                    },
                    TextColor(PINK),
                ));
                frame.spawn((
                    Text::new(VIDEO_EMBED),
                    TextFont {
                        font_size: 13.0,
                        ..default()
                    },
                    TextColor(SOFT_PINK.with_alpha(0.7)),
                ));
            });

        spawn_button(parent, "Replay Experience", VideoButton::Replay, REPLAY_DELAY);
    });
}

fn exit_video(mut commands: Commands) {
    commands.remove_resource::<VideoScreen>();
}

fn video_buttons(
    query: Query<(&Interaction, &VideoButton), Changed<Interaction>>,
    screen: Res<VideoScreen>,
    mut completed: MessageWriter<ScreenCompleted>,
) {
    for (interaction, button) in &query {
        if *interaction != Interaction::Pressed {
            continue;
        }
        match button {
            VideoButton::Replay => {
                info!("replaying from the start");
                completed.write(ScreenCompleted {
                    generation: screen.generation,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bevy::state::app::StatesPlugin;
    use bevy::time::TimeUpdateStrategy;

    use super::*;
    use crate::cake::{CakePlugin, CakeState};
    use crate::screens::SequencerPlugin;
    use crate::transition::TransitionPlugin;

    #[test]
    fn replay_loops_back_to_the_cake() {
        let mut sequencer = Sequencer::default();
        for _ in 0..3 {
            sequencer.advance();
        }
        assert_eq!(sequencer.current().screen, Screens::Video);
        let generation = sequencer.generation();

        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin))
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)))
            .insert_resource(sequencer)
            .insert_state(Screens::Video)
            .add_plugins((SequencerPlugin, TransitionPlugin, VideoPlugin, CakePlugin));
        app.update();

        let mut query = app.world_mut().query::<&mut Interaction>();
        for mut interaction in query.iter_mut(app.world_mut()) {
            *interaction = Interaction::Pressed;
        }
        app.update();

        let sequencer = app.world().resource::<Sequencer>();
        assert_eq!(sequencer.current().screen, Screens::Cake);
        assert_eq!(sequencer.generation(), generation + 1);

        // The curtain fades the video out, then the cake mounts afresh.
        for _ in 0..10 {
            app.update();
        }
        assert_eq!(*app.world().resource::<State<Screens>>().get(), Screens::Cake);
        assert!(!app.world().contains_resource::<VideoScreen>());
        assert_eq!(
            app.world().resource::<CakeState>().generation(),
            generation + 1
        );
    }
}
