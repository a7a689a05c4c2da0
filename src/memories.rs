// Memory cards: swipe the top card away until the deck is done.

use std::ops::Range;

use bevy::picking::Pickable;
use bevy::prelude::*;

use crate::content::{MEMORIES, ScreenAssets};
use crate::delay::DelayedTasks;
use crate::screens::{ScreenCompleted, Screens, Sequencer};
use crate::ui::{
    CARD, Entrance, PINK, SOFT_PINK, set_shown, spawn_button, spawn_heading, spawn_screen_root,
};

pub struct MemoriesPlugin;

impl Plugin for MemoriesPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DelayedTasks<DeckCue>>()
            .init_resource::<DeckDrag>()
            .add_message::<CardReleased>()
            .add_message::<ScreenCompleted>()
            .add_systems(OnEnter(Screens::Memories), setup_memories)
            .add_systems(OnExit(Screens::Memories), exit_memories)
            .add_systems(
                Update,
                (
                    deck_cues,
                    release_cards.run_if(in_state(Screens::Memories)),
                    memories_buttons.run_if(in_state(Screens::Memories)),
                    render_deck,
                    sync_memories,
                    pose_cards,
                )
                    .chain(),
            );
    }
}

/// Horizontal release distance a swipe must exceed to throw the card.
pub const SWIPE_THRESHOLD: f32 = 100.0;
/// Where a thrown card flies to, in pixels from rest.
pub const EXIT_DISTANCE: f32 = 300.0;
/// Seconds the thrown card animates before the deck moves on.
pub const EXIT_DELAY: f32 = 0.3;

const VISIBLE_CARDS: usize = 3;
const EXIT_ROTATION: f32 = 20.0;
const DEPTH_SCALE: f32 = 0.05;
const DEPTH_OFFSET: f32 = 10.0;
const DEPTH_ROTATION: f32 = 2.0;
/// Higher settles faster.
const SPRING: f32 = 18.0;

const CARD_WIDTH: f32 = 288.0;
const CARD_HEIGHT: f32 = 480.0;
const PHOTO_SIZE: f32 = 208.0;
const DOT_SIZE: f32 = 12.0;
const DOT_EMPTY: Color = Color::srgb(0.3, 0.22, 0.38);

/// Swipe progress through a deck of `len` cards.
///
/// `visible_index == len` is the terminal state: the deck shows its
/// completion view and ignores further releases.
#[derive(Resource, Debug)]
pub struct SwipeDeck {
    len: usize,
    visible_index: usize,
    exit_offset: f32,
    generation: u64,
}

impl SwipeDeck {
    pub fn new(len: usize, generation: u64) -> Self {
        Self {
            len,
            visible_index: 0,
            exit_offset: 0.0,
            generation,
        }
    }

    pub fn visible_index(&self) -> usize {
        self.visible_index
    }

    pub fn exit_offset(&self) -> f32 {
        self.exit_offset
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_complete(&self) -> bool {
        self.visible_index >= self.len
    }

    pub fn is_exiting(&self) -> bool {
        self.exit_offset != 0.0
    }

    /// Cards drawn on the stack, top card first.
    pub fn visible_range(&self) -> Range<usize> {
        self.visible_index..(self.visible_index + VISIBLE_CARDS).min(self.len)
    }

    /// Top card let go `offset_x` pixels from rest. Returns the exit offset
    /// when the release throws the card.
    pub fn release(&mut self, offset_x: f32) -> Option<f32> {
        if self.is_complete() || self.is_exiting() || offset_x.abs() <= SWIPE_THRESHOLD {
            return None;
        }
        self.exit_offset = EXIT_DISTANCE.copysign(offset_x);
        Some(self.exit_offset)
    }

    /// The thrown card is gone; reveal the next one.
    pub fn commit_exit(&mut self) {
        if !self.is_exiting() {
            return;
        }
        self.visible_index = (self.visible_index + 1).min(self.len);
        self.exit_offset = 0.0;
    }
}

/// Where a card sits on the stack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardPose {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub rotation: f32,
    pub opacity: f32,
}

impl CardPose {
    fn lerp(self, target: Self, t: f32) -> Self {
        let mix = |a: f32, b: f32| a + (b - a) * t;
        Self {
            x: mix(self.x, target.x),
            y: mix(self.y, target.y),
            scale: mix(self.scale, target.scale),
            rotation: mix(self.rotation, target.rotation),
            opacity: mix(self.opacity, target.opacity),
        }
    }
}

/// Target pose for a card `depth` below the top. Only the top card follows
/// the drag and flies out.
pub fn card_pose(depth: usize, exit_offset: f32, drag_x: f32) -> CardPose {
    if depth > 0 {
        let depth = depth as f32;
        return CardPose {
            x: 0.0,
            y: depth * DEPTH_OFFSET,
            scale: 1.0 - depth * DEPTH_SCALE,
            rotation: depth * DEPTH_ROTATION,
            opacity: 1.0,
        };
    }

    if exit_offset != 0.0 {
        CardPose {
            x: exit_offset,
            y: 0.0,
            scale: 1.0,
            rotation: EXIT_ROTATION.copysign(exit_offset),
            opacity: 0.0,
        }
    } else {
        CardPose {
            x: drag_x,
            y: 0.0,
            scale: 1.0,
            rotation: 0.0,
            opacity: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckCue {
    CommitExit,
}

/// Drag release reported by picking on the top card.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct CardReleased {
    pub offset: Vec2,
}

/// Live drag of the top card, if any.
#[derive(Resource, Default, Debug)]
struct DeckDrag {
    offset: Vec2,
    active: bool,
}

#[derive(Component)]
struct DeckStack {
    rendered: Option<usize>,
}

#[derive(Component)]
struct DeckCard {
    depth: usize,
    pose: CardPose,
}

#[derive(Component)]
struct CompletionView;

#[derive(Component)]
struct ProgressDot(usize);

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoriesButton {
    OpenMessage,
}

fn setup_memories(mut commands: Commands, sequencer: Res<Sequencer>) {
    commands.insert_resource(SwipeDeck::new(MEMORIES.len(), sequencer.generation()));
    commands.insert_resource(DeckDrag::default());

    let root = spawn_screen_root(&mut commands, Screens::Memories);
    commands.entity(root).with_children(|parent| {
        spawn_heading(parent, "Swipe Through Memories");

        parent
            .spawn((
                DeckStack { rendered: None },
                Node {
                    width: Val::Px(CARD_WIDTH),
                    height: Val::Px(CARD_HEIGHT),
                    ..default()
                },
            ))
            .with_children(|stack| {
                stack
                    .spawn((
                        CompletionView,
                        Node {
                            width: Val::Percent(100.0),
                            height: Val::Percent(100.0),
                            position_type: PositionType::Absolute,
                            flex_direction: FlexDirection::Column,
                            justify_content: JustifyContent::Center,
                            align_items: AlignItems::Center,
                            display: Display::None,
                            ..default()
                        },
                    ))
                    .with_children(|view| {
                        view.spawn((
                            Text::new("You've seen them all!"),
                            TextFont {
                                font_size: 28.0,
                                ..default()
                            },
                            TextColor(SOFT_PINK),
                        ));
                    });
            });

        parent
            .spawn(Node {
                column_gap: Val::Px(8.0),
                ..default()
            })
            .with_children(|dots| {
                for i in 0..MEMORIES.len() {
                    dots.spawn((
                        ProgressDot(i),
                        Node {
                            width: Val::Px(DOT_SIZE),
                            height: Val::Px(DOT_SIZE),
                            ..default()
                        },
                        BackgroundColor(DOT_EMPTY),
                    ));
                }
            });

        spawn_button(parent, "Open My Message", MemoriesButton::OpenMessage, 0.0);
    });
}

fn exit_memories(mut commands: Commands) {
    commands.remove_resource::<SwipeDeck>();
}

fn drag_card(drag: On<Pointer<Drag>>, mut deck_drag: ResMut<DeckDrag>) {
    deck_drag.offset = drag.distance;
    deck_drag.active = true;
}

fn release_card(
    release: On<Pointer<DragEnd>>,
    mut deck_drag: ResMut<DeckDrag>,
    mut released: MessageWriter<CardReleased>,
) {
    deck_drag.offset = Vec2::ZERO;
    deck_drag.active = false;
    released.write(CardReleased {
        offset: release.distance,
    });
}

fn release_cards(
    mut released: MessageReader<CardReleased>,
    mut deck: ResMut<SwipeDeck>,
    mut tasks: ResMut<DelayedTasks<DeckCue>>,
) {
    for release in released.read() {
        let Some(exit) = deck.release(release.offset.x) else {
            continue;
        };
        debug!("card {} thrown to {exit}", deck.visible_index());
        let generation = deck.generation();
        tasks.schedule(generation, EXIT_DELAY, DeckCue::CommitExit);
    }
}

fn deck_cues(
    time: Res<Time>,
    sequencer: Res<Sequencer>,
    mut tasks: ResMut<DelayedTasks<DeckCue>>,
    mut deck: Option<ResMut<SwipeDeck>>,
) {
    if tasks.is_empty() {
        return;
    }
    for cue in tasks.tick(time.delta_secs(), sequencer.generation()) {
        let Some(deck) = deck.as_mut() else {
            continue;
        };
        match cue {
            DeckCue::CommitExit => {
                deck.commit_exit();
                if deck.is_complete() {
                    info!("all memories seen");
                }
            }
        }
    }
}

fn memories_buttons(
    query: Query<(&Interaction, &MemoriesButton), Changed<Interaction>>,
    deck: Res<SwipeDeck>,
    mut completed: MessageWriter<ScreenCompleted>,
) {
    for (interaction, button) in &query {
        if *interaction != Interaction::Pressed {
            continue;
        }
        match button {
            MemoriesButton::OpenMessage => {
                if deck.is_complete() {
                    completed.write(ScreenCompleted {
                        generation: deck.generation(),
                    });
                }
            }
        }
    }
}

fn render_deck(
    mut commands: Commands,
    deck: Option<Res<SwipeDeck>>,
    assets: Res<ScreenAssets>,
    mut stacks: Query<(Entity, &mut DeckStack)>,
    cards: Query<Entity, With<DeckCard>>,
) {
    let Some(deck) = deck else {
        return;
    };
    let Ok((stack_entity, mut stack)) = stacks.single_mut() else {
        return;
    };
    if stack.rendered == Some(deck.visible_index()) {
        return;
    }
    stack.rendered = Some(deck.visible_index());

    for entity in &cards {
        commands.entity(entity).despawn();
    }

    commands.entity(stack_entity).with_children(|parent| {
        // Bottom card first so the top card draws last.
        for index in deck.visible_range().rev() {
            let depth = index - deck.visible_index();
            // Start one slot deeper and spring forward.
            let pose = card_pose(depth + 1, 0.0, 0.0);
            let mut card = parent.spawn((
                DeckCard { depth, pose },
                Node {
                    width: Val::Percent(100.0),
                    height: Val::Percent(100.0),
                    position_type: PositionType::Absolute,
                    flex_direction: FlexDirection::Column,
                    align_items: AlignItems::Center,
                    padding: UiRect::all(Val::Px(24.0)),
                    row_gap: Val::Px(16.0),
                    border: UiRect::all(Val::Px(1.0)),
                    ..default()
                },
                BackgroundColor(CARD),
                BorderColor::all(PINK.with_alpha(0.3)),
            ));
            card.with_children(|card| {
                card.spawn((
                    ImageNode::new(assets.photo(index)),
                    Node {
                        width: Val::Px(PHOTO_SIZE),
                        height: Val::Px(PHOTO_SIZE),
                        ..default()
                    },
                    Pickable::IGNORE,
                ));
                card.spawn((
                    Text::new(MEMORIES[index].text),
                    TextFont {
                        font_size: 24.0,
                        ..default()
                    },
                    TextColor(SOFT_PINK),
                    Pickable::IGNORE,
                ));
                if depth == 0 {
                    card.spawn((
                        Text::new("<- Swipe to continue ->"),
                        TextFont {
                            font_size: 14.0,
                            ..default()
                        },
                        TextColor(SOFT_PINK.with_alpha(0.6)),
                        Pickable::IGNORE,
                    ));
                }
            });
            if depth == 0 {
                card.observe(drag_card).observe(release_card);
            }
        }
    });
}

fn sync_memories(
    deck: Option<Res<SwipeDeck>>,
    mut completion: Query<&mut Node, (With<CompletionView>, Without<MemoriesButton>)>,
    mut buttons: Query<(&mut Node, &mut Entrance), With<MemoriesButton>>,
    mut dots: Query<(&ProgressDot, &mut BackgroundColor)>,
) {
    let Some(deck) = deck else {
        return;
    };
    if !deck.is_changed() {
        return;
    }
    let complete = deck.is_complete();

    for mut node in &mut completion {
        set_shown(&mut node, None, complete);
    }
    for (mut node, mut entrance) in &mut buttons {
        set_shown(&mut node, Some(&mut entrance), complete);
    }
    for (dot, mut bg) in &mut dots {
        bg.0 = if dot.0 < deck.visible_index() {
            PINK
        } else {
            DOT_EMPTY
        };
    }
}

fn pose_cards(
    time: Res<Time>,
    deck: Option<Res<SwipeDeck>>,
    drag: Res<DeckDrag>,
    mut cards: Query<(
        &mut DeckCard,
        &mut UiTransform,
        &mut BackgroundColor,
    )>,
) {
    let Some(deck) = deck else {
        return;
    };
    let drag_x = if drag.active { drag.offset.x } else { 0.0 };
    let t = 1.0 - (-SPRING * time.delta_secs()).exp();

    for (mut card, mut transform, mut bg) in &mut cards {
        let target = card_pose(card.depth, deck.exit_offset(), drag_x);
        // The finger leads while dragging; everything else springs.
        let follow = if card.depth == 0 && drag.active && !deck.is_exiting() {
            1.0
        } else {
            t
        };
        card.pose = card.pose.lerp(target, follow);

        transform.translation = Val2::px(card.pose.x, card.pose.y);
        transform.scale = Vec2::splat(card.pose.scale);
        transform.rotation = Rot2::degrees(card.pose.rotation);
        bg.0.set_alpha(card.pose.opacity);
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
    fn releases_at_or_below_threshold_snap_back() {
        let mut deck = SwipeDeck::new(4, 0);
        assert_eq!(deck.release(40.0), None);
        assert_eq!(deck.release(-100.0), None);
        assert_eq!(deck.release(100.0), None);
        assert_eq!(deck.visible_index(), 0);
        assert!(!deck.is_exiting());
    }

    #[test]
    fn throw_goes_in_the_release_direction() {
        let mut deck = SwipeDeck::new(4, 0);
        assert_eq!(deck.release(150.0), Some(EXIT_DISTANCE));
        // The card is already leaving.
        assert_eq!(deck.release(-150.0), None);
        deck.commit_exit();
        assert_eq!(deck.visible_index(), 1);
        assert_eq!(deck.exit_offset(), 0.0);

        assert_eq!(deck.release(-101.0), Some(-EXIT_DISTANCE));
        deck.commit_exit();
        assert_eq!(deck.visible_index(), 2);
    }

    #[test]
    fn complete_deck_ignores_releases() {
        let mut deck = SwipeDeck::new(2, 0);
        for offset in [150.0, -150.0] {
            deck.release(offset);
            deck.commit_exit();
        }
        assert!(deck.is_complete());
        assert_eq!(deck.visible_index(), 2);
        assert!(deck.visible_range().is_empty());

        assert_eq!(deck.release(500.0), None);
        deck.commit_exit();
        assert_eq!(deck.visible_index(), 2);
    }

    #[test]
    fn at_most_three_cards_are_stacked() {
        let mut deck = SwipeDeck::new(4, 0);
        assert_eq!(deck.visible_range(), 0..3);
        deck.release(200.0);
        deck.commit_exit();
        deck.release(200.0);
        deck.commit_exit();
        assert_eq!(deck.visible_range(), 2..4);
    }

    #[test]
    fn poses_fan_out_below_the_top_card() {
        let top = card_pose(0, 0.0, 42.0);
        assert_eq!(top.x, 42.0);
        assert_eq!(top.scale, 1.0);

        let second = card_pose(1, 300.0, 42.0);
        assert_eq!(second.x, 0.0);
        assert_eq!(second.y, 10.0);
        assert!((second.scale - 0.95).abs() < 1e-6);
        assert_eq!(second.rotation, 2.0);

        let thrown = card_pose(0, -300.0, 0.0);
        assert_eq!(thrown.x, -300.0);
        assert_eq!(thrown.rotation, -20.0);
        assert_eq!(thrown.opacity, 0.0);
    }

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin))
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)))
            .init_resource::<ScreenAssets>()
            .insert_state(Screens::Memories)
            .add_plugins((SequencerPlugin, MemoriesPlugin));
        app.update();
        app
    }

    fn swipe(app: &mut App, offset_x: f32) {
        app.world_mut().write_message(CardReleased {
            offset: Vec2::new(offset_x, 0.0),
        });
        for _ in 0..6 {
            app.update();
        }
    }

    fn open_button_display(app: &mut App) -> Display {
        let mut query = app
            .world_mut()
            .query_filtered::<&Node, With<MemoriesButton>>();
        query.single(app.world()).unwrap().display
    }

    #[test]
    fn swipes_advance_the_deck_after_the_exit_delay() {
        let mut app = app();

        app.world_mut().write_message(CardReleased {
            offset: Vec2::new(150.0, 0.0),
        });
        app.update();
        let deck = app.world().resource::<SwipeDeck>();
        assert_eq!(deck.visible_index(), 0);
        assert_eq!(deck.exit_offset(), EXIT_DISTANCE);

        // 0.2 s after the release the card is still on its way out.
        app.update();
        app.update();
        assert_eq!(app.world().resource::<SwipeDeck>().visible_index(), 0);

        for _ in 0..3 {
            app.update();
        }
        assert_eq!(app.world().resource::<SwipeDeck>().visible_index(), 1);

        swipe(&mut app, 60.0);
        assert_eq!(app.world().resource::<SwipeDeck>().visible_index(), 1);
    }

    #[test]
    fn finishing_the_deck_offers_the_message() {
        let mut app = app();
        assert_eq!(open_button_display(&mut app), Display::None);

        for offset in [150.0, -150.0, 150.0, -150.0] {
            swipe(&mut app, offset);
        }
        assert!(app.world().resource::<SwipeDeck>().is_complete());
        assert_eq!(open_button_display(&mut app), Display::Flex);

        let mut cards = app.world_mut().query::<&DeckCard>();
        assert_eq!(cards.iter(app.world()).count(), 0);

        let mut completion = app
            .world_mut()
            .query_filtered::<&Node, With<CompletionView>>();
        assert_eq!(
            completion.single(app.world()).unwrap().display,
            Display::Flex
        );

        swipe(&mut app, 150.0);
        assert_eq!(app.world().resource::<SwipeDeck>().visible_index(), 4);
    }
}
