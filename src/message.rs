// Birthday card: tap the closed card to flip it open and read the message.

use bevy::prelude::*;

use crate::content::MESSAGE;
use crate::screens::{ScreenCompleted, Screens, Sequencer};
use crate::transition::Tween;
use crate::ui::{CARD, Entrance, PINK, SOFT_PINK, set_shown, spawn_button, spawn_screen_root};

pub struct MessagePlugin;

impl Plugin for MessagePlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<ScreenCompleted>()
            .add_systems(OnEnter(Screens::Message), setup_message)
            .add_systems(OnExit(Screens::Message), exit_message)
            .add_systems(
                Update,
                (
                    message_buttons.run_if(in_state(Screens::Message)),
                    sync_message,
                    flip_card,
                )
                    .chain(),
            );
    }
}

/// Seconds after opening before "One More Surprise" shows up.
pub const CONTINUE_DELAY: f32 = 0.5;

/// Horizontal squash standing in for a quarter turn about the vertical axis.
const CLOSE_FLIP: Tween = Tween::new(1.0, 0.0, 0.3);
const OPEN_FLIP: Tween = Tween::new(0.0, 1.0, 0.3);

/// One mounted message card.
#[derive(Resource, Debug)]
pub struct MessageCard {
    opened: bool,
    flip_elapsed: f32,
    generation: u64,
}

impl MessageCard {
    pub fn new(generation: u64) -> Self {
        Self {
            opened: false,
            flip_elapsed: 0.0,
            generation,
        }
    }

    pub fn is_open(&self) -> bool {
        self.opened
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns `false` if the card was already open.
    pub fn open(&mut self) -> bool {
        if self.opened {
            return false;
        }
        self.opened = true;
        self.flip_elapsed = 0.0;
        true
    }

    /// Horizontal scale of the closed and open faces. The closed face folds
    /// away first, then the open face unfolds.
    pub fn face_scales(&self) -> (f32, f32) {
        if !self.opened {
            return (1.0, 0.0);
        }
        let closed = CLOSE_FLIP.sample(self.flip_elapsed);
        let open = OPEN_FLIP.sample(self.flip_elapsed - CLOSE_FLIP.duration);
        (closed, open)
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageButton {
    OpenCard,
    Continue,
}

#[derive(Component)]
struct ClosedFace;

#[derive(Component)]
struct OpenFace;

fn setup_message(mut commands: Commands, sequencer: Res<Sequencer>) {
    commands.insert_resource(MessageCard::new(sequencer.generation()));

    let root = spawn_screen_root(&mut commands, Screens::Message);
    commands.entity(root).with_children(|parent| {
        parent
            .spawn((
                ClosedFace,
                MessageButton::OpenCard,
                Button,
                Node {
                    width: Val::Px(320.0),
                    height: Val::Px(420.0),
                    flex_direction: FlexDirection::Column,
                    justify_content: JustifyContent::Center,
                    align_items: AlignItems::Center,
                    row_gap: Val::Px(16.0),
                    border: UiRect::all(Val::Px(2.0)),
                    ..default()
                },
                BackgroundColor(PINK),
                BorderColor::all(SOFT_PINK),
            ))
            .with_children(|face| {
                face.spawn((
                    Text::new("Happy Birthday!"),
                    TextFont {
                        font_size: 36.0,
                        ..default()
                    },
                    TextColor(Color::WHITE),
                ));
                face.spawn((
                    Text::new("Tap to open your card"),
                    TextFont {
                        font_size: 18.0,
                        ..default()
                    },
                    TextColor(Color::WHITE.with_alpha(0.8)),
                ));
            });

        parent
            .spawn((
                OpenFace,
                Node {
                    max_width: Val::Px(640.0),
                    flex_direction: FlexDirection::Column,
                    align_items: AlignItems::Center,
                    row_gap: Val::Px(16.0),
                    padding: UiRect::all(Val::Px(24.0)),
                    border: UiRect::all(Val::Px(1.0)),
                    display: Display::None,
                    ..default()
                },
                BackgroundColor(CARD),
                BorderColor::all(PINK.with_alpha(0.3)),
                UiTransform {
                    scale: Vec2::new(0.0, 1.0),
                    ..default()
                },
            ))
            .with_children(|face| {
                face.spawn((
                    Text::new("For You"),
                    TextFont {
                        font_size: 28.0,
                        ..default()
                    },
                    TextColor(PINK),
                ));
                face.spawn((
                    Text::new(MESSAGE),
                    TextFont {
                        font_size: 15.0,
                        ..default()
                    },
                    TextColor(SOFT_PINK),
                ));
            });

        spawn_button(
            parent,
            "One More Surprise",
            MessageButton::Continue,
            CONTINUE_DELAY,
        );
    });
}

fn exit_message(mut commands: Commands) {
    commands.remove_resource::<MessageCard>();
}

fn message_buttons(
    query: Query<(&Interaction, &MessageButton), Changed<Interaction>>,
    mut card: ResMut<MessageCard>,
    mut completed: MessageWriter<ScreenCompleted>,
) {
    for (interaction, button) in &query {
        if *interaction != Interaction::Pressed {
            continue;
        }
        match button {
            MessageButton::OpenCard => {
                if card.open() {
                    info!("message card opened");
                }
            }
            MessageButton::Continue => {
                if card.is_open() {
                    completed.write(ScreenCompleted {
                        generation: card.generation(),
                    });
                }
            }
        }
    }
}

fn sync_message(
    card: Option<Res<MessageCard>>,
    mut buttons: Query<(&MessageButton, &mut Node, &mut Entrance)>,
    mut open_face: Query<&mut Node, (With<OpenFace>, Without<MessageButton>)>,
) {
    let Some(card) = card else {
        return;
    };
    if !card.is_changed() {
        return;
    }
    let opened = card.is_open();

    for (button, mut node, mut entrance) in &mut buttons {
        if *button == MessageButton::Continue {
            set_shown(&mut node, Some(&mut entrance), opened);
        }
    }
    for mut node in &mut open_face {
        set_shown(&mut node, None, opened);
    }
}

fn flip_card(
    time: Res<Time>,
    card: Option<ResMut<MessageCard>>,
    mut closed: Query<(&mut Node, &mut UiTransform), (With<ClosedFace>, Without<OpenFace>)>,
    mut open: Query<&mut UiTransform, With<OpenFace>>,
) {
    let Some(mut card) = card else {
        return;
    };
    if !card.is_open() {
        return;
    }
    card.bypass_change_detection().flip_elapsed += time.delta_secs();
    let (closed_x, open_x) = card.face_scales();

    for (mut node, mut transform) in &mut closed {
        transform.scale.x = closed_x;
        // Fully folded away, stop taking space and taps.
        if closed_x <= 0.0 {
            set_shown(&mut node, None, false);
        }
    }
    for mut transform in &mut open {
        transform.scale.x = open_x;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bevy::state::app::StatesPlugin;
    use bevy::time::TimeUpdateStrategy;

    use super::*;
    use crate::screens::SequencerPlugin;

    #[test]
    fn card_opens_once() {
        let mut card = MessageCard::new(2);
        assert_eq!(card.face_scales(), (1.0, 0.0));
        assert!(card.open());
        assert!(!card.open());
        assert!(card.is_open());
    }

    #[test]
    fn closed_face_folds_before_open_face_unfolds() {
        let mut card = MessageCard::new(0);
        card.open();

        card.flip_elapsed = 0.15;
        let (closed, open) = card.face_scales();
        assert!(closed > 0.0 && closed < 1.0);
        assert_eq!(open, 0.0);

        card.flip_elapsed = 1.0;
        assert_eq!(card.face_scales(), (0.0, 1.0));
    }

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin))
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)))
            .insert_state(Screens::Message)
            .add_plugins((SequencerPlugin, MessagePlugin));
        app.update();
        app
    }

    fn press(app: &mut App, target: MessageButton) {
        let mut query = app
            .world_mut()
            .query::<(&MessageButton, &mut Interaction)>();
        for (button, mut interaction) in query.iter_mut(app.world_mut()) {
            *interaction = if *button == target {
                Interaction::Pressed
            } else {
                Interaction::None
            };
        }
        app.update();
    }

    fn continue_display(app: &mut App) -> Display {
        let mut query = app.world_mut().query::<(&MessageButton, &Node)>();
        query
            .iter(app.world())
            .find(|(button, _)| **button == MessageButton::Continue)
            .map(|(_, node)| node.display)
            .unwrap()
    }

    #[test]
    fn continue_needs_an_open_card() {
        let mut app = app();
        assert_eq!(continue_display(&mut app), Display::None);

        press(&mut app, MessageButton::Continue);
        app.update();
        assert_eq!(app.world().resource::<Sequencer>().current_index(), 0);

        press(&mut app, MessageButton::OpenCard);
        assert!(app.world().resource::<MessageCard>().is_open());
        assert_eq!(continue_display(&mut app), Display::Flex);

        for _ in 0..8 {
            app.update();
        }
        let mut faces = app
            .world_mut()
            .query_filtered::<&UiTransform, With<OpenFace>>();
        assert_eq!(faces.single(app.world()).unwrap().scale.x, 1.0);

        press(&mut app, MessageButton::Continue);
        app.update();
        assert_eq!(app.world().resource::<Sequencer>().current_index(), 1);
    }
}
