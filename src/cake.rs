// Cake screen: decorate, light the candle, roast.

use bevy::prelude::*;

use crate::confetti::ConfettiBurst;
use crate::decor::Floating;
use crate::delay::DelayedTasks;
use crate::screens::{ScreenCompleted, Screens, Sequencer};
use crate::transition::Tween;
use crate::ui::{Entrance, set_shown, spawn_button, spawn_screen_root};

pub struct CakePlugin;

impl Plugin for CakePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DelayedTasks<CakeStep>>()
            .add_message::<ConfettiBurst>()
            .add_message::<ScreenCompleted>()
            .add_systems(OnEnter(Screens::Cake), setup_cake)
            .add_systems(OnExit(Screens::Cake), exit_cake)
            .add_systems(
                Update,
                (
                    // Cues tick before new tasks are scheduled, so a fresh
                    // task never counts the frame it was scheduled in.
                    cake_cues,
                    cake_buttons.run_if(in_state(Screens::Cake)),
                    sync_cake,
                    animate_cake,
                )
                    .chain(),
            );
    }
}

/// Seconds between lighting the candle and the final step.
pub const CANDLE_DELAY: f32 = 1.5;

pub const CAKE_BURST: ConfettiBurst = ConfettiBurst {
    particle_count: 200,
    spread: 120.0,
    origin: Vec2::new(0.5, 0.6),
    colors: &[
        Color::srgb(1.0, 0.42, 0.616),
        Color::srgb(0.659, 0.333, 0.969),
        Color::srgb(1.0, 0.843, 0.0),
        Color::srgb(0.0, 1.0, 1.0),
        Color::srgb(1.0, 0.0, 0.0),
    ],
};

/// Pixels per unit of the 200x220 cake drawing.
const SCALE: f32 = 1.6;
const CAKE_WIDTH: f32 = 200.0;
const CAKE_HEIGHT: f32 = 220.0;

const PLATE: Color = Color::srgb(0.176, 0.106, 0.306);
const BOTTOM_LAYER: Color = Color::srgb(0.486, 0.227, 0.929);
const MIDDLE_LAYER: Color = Color::srgb(0.659, 0.333, 0.969);
const TOP_LAYER: Color = Color::srgb(1.0, 0.42, 0.616);
const BANNER: Color = Color::srgb(1.0, 0.09, 0.267);
const STICK: Color = Color::srgb(0.42, 0.259, 0.149);
const TOPPING: Color = Color::srgb(0.48, 0.29, 0.12);
const FLAME: Color = Color::srgb(1.0, 0.65, 0.0);

/// Rows of toppings as (x positions, y, stagger between pieces).
const TOPPING_ROWS: [(&[f32], f32, f32); 3] = [
    (&[65.0, 80.0, 95.0, 110.0], 43.0, 0.1),
    (&[55.0, 75.0, 95.0, 115.0], 83.0, 0.15),
    (&[40.0, 65.0, 90.0, 115.0, 140.0], 133.0, 0.2),
];
const TOPPING_SIZE: f32 = 12.0;
const TOPPING_POP: Tween = Tween::new(0.0, 1.0, 0.3);
const CAKE_RISE: Tween = Tween::new(200.0, 0.0, 0.8);
const FLAME_PULSE: f32 = 0.4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CakeStep {
    #[default]
    Appear,
    Decorate,
    Candle,
    Complete,
}

/// Local state of one mounted cake screen.
#[derive(Resource, Debug)]
pub struct CakeState {
    step: CakeStep,
    generation: u64,
}

impl CakeState {
    pub fn new(generation: u64) -> Self {
        Self {
            step: CakeStep::Appear,
            generation,
        }
    }

    pub fn step(&self) -> CakeStep {
        self.step
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn decorate(&mut self) -> bool {
        self.advance_from(CakeStep::Appear, CakeStep::Decorate)
    }

    pub fn light_candle(&mut self) -> bool {
        self.advance_from(CakeStep::Decorate, CakeStep::Candle)
    }

    pub fn finish(&mut self) -> bool {
        self.advance_from(CakeStep::Candle, CakeStep::Complete)
    }

    fn advance_from(&mut self, from: CakeStep, to: CakeStep) -> bool {
        if self.step != from {
            return false;
        }
        self.step = to;
        true
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CakeButton {
    Decorate,
    LightCandle,
    Continue,
}

impl CakeButton {
    fn shown_at(self) -> CakeStep {
        match self {
            CakeButton::Decorate => CakeStep::Appear,
            CakeButton::LightCandle => CakeStep::Decorate,
            CakeButton::Continue => CakeStep::Complete,
        }
    }
}

#[derive(Component)]
struct CakeBody {
    elapsed: f32,
}

#[derive(Component)]
struct Banner;

#[derive(Component)]
struct Flame;

#[derive(Component)]
struct Topping {
    delay: f32,
    elapsed: f32,
}

fn drawing_node(x: f32, y: f32, width: f32, height: f32) -> Node {
    Node {
        position_type: PositionType::Absolute,
        left: Val::Px(x * SCALE),
        top: Val::Px(y * SCALE),
        width: Val::Px(width * SCALE),
        height: Val::Px(height * SCALE),
        ..default()
    }
}

fn setup_cake(mut commands: Commands, sequencer: Res<Sequencer>) {
    commands.insert_resource(CakeState::new(sequencer.generation()));

    let root = spawn_screen_root(&mut commands, Screens::Cake);
    commands.entity(root).with_children(|parent| {
        parent
            .spawn((
                CakeBody { elapsed: 0.0 },
                Node {
                    width: Val::Px(CAKE_WIDTH * SCALE),
                    height: Val::Px(CAKE_HEIGHT * SCALE),
                    ..default()
                },
            ))
            .with_children(|cake| {
                cake.spawn((drawing_node(10.0, 200.0, 180.0, 20.0), BackgroundColor(PLATE)));
                cake.spawn((
                    drawing_node(20.0, 150.0, 160.0, 60.0),
                    BackgroundColor(BOTTOM_LAYER),
                ));
                cake.spawn((
                    drawing_node(35.0, 100.0, 130.0, 55.0),
                    BackgroundColor(MIDDLE_LAYER),
                ));
                cake.spawn((
                    drawing_node(50.0, 60.0, 100.0, 45.0),
                    BackgroundColor(TOP_LAYER),
                ));

                for (xs, y, stagger) in TOPPING_ROWS {
                    for (i, x) in xs.iter().enumerate() {
                        cake.spawn((
                            Topping {
                                delay: i as f32 * stagger,
                                elapsed: 0.0,
                            },
                            drawing_node(*x, y, TOPPING_SIZE, TOPPING_SIZE),
                            BackgroundColor(TOPPING),
                            UiTransform {
                                scale: Vec2::ZERO,
                                ..default()
                            },
                        ));
                    }
                }

                // Banner on a stick, hidden until decorated.
                cake.spawn((
                    Banner,
                    drawing_node(55.0, 2.0, 90.0, 58.0),
                    Floating {
                        period: 4.0,
                        rise: 0.0,
                        swing: 1.0,
                    },
                ))
                .with_children(|banner| {
                    banner.spawn((drawing_node(43.0, 23.0, 4.0, 35.0), BackgroundColor(STICK)));
                    banner
                        .spawn((
                            Node {
                                width: Val::Percent(100.0),
                                height: Val::Px(40.0 * SCALE),
                                flex_direction: FlexDirection::Column,
                                justify_content: JustifyContent::Center,
                                align_items: AlignItems::Center,
                                border: UiRect::all(Val::Px(2.0)),
                                ..default()
                            },
                            BackgroundColor(BANNER),
                            BorderColor::all(Color::WHITE),
                        ))
                        .with_children(|text| {
                            for line in ["SHIT!", "YOU ARE OLD"] {
                                text.spawn((
                                    Text::new(line),
                                    TextFont {
                                        font_size: 14.0,
                                        ..default()
                                    },
                                    TextColor(Color::WHITE),
                                ));
                            }
                        });
                });

                cake.spawn((drawing_node(95.0, 35.0, 10.0, 30.0), BackgroundColor(Color::WHITE)));
                cake.spawn((
                    Flame,
                    drawing_node(92.0, 22.0, 16.0, 16.0),
                    BackgroundColor(FLAME),
                ));
            });

        spawn_button(parent, "Decorate The Cake", CakeButton::Decorate, 0.0);
        spawn_button(parent, "Light It & Roast", CakeButton::LightCandle, 0.0);
        spawn_button(parent, "Continue The Roast", CakeButton::Continue, 0.0);
    });
}

fn exit_cake(mut commands: Commands) {
    commands.remove_resource::<CakeState>();
}

fn cake_buttons(
    query: Query<(&Interaction, &CakeButton), Changed<Interaction>>,
    mut cake: ResMut<CakeState>,
    mut tasks: ResMut<DelayedTasks<CakeStep>>,
    mut confetti: MessageWriter<ConfettiBurst>,
    mut completed: MessageWriter<ScreenCompleted>,
) {
    for (interaction, button) in &query {
        if *interaction != Interaction::Pressed {
            continue;
        }
        match button {
            CakeButton::Decorate => {
                cake.decorate();
            }
            CakeButton::LightCandle => {
                if cake.light_candle() {
                    info!("candle lit");
                    confetti.write(CAKE_BURST);
                    let generation = cake.generation();
                    tasks.schedule(generation, CANDLE_DELAY, CakeStep::Complete);
                }
            }
            CakeButton::Continue => {
                if cake.step() == CakeStep::Complete {
                    completed.write(ScreenCompleted {
                        generation: cake.generation(),
                    });
                }
            }
        }
    }
}

fn cake_cues(
    time: Res<Time>,
    sequencer: Res<Sequencer>,
    mut tasks: ResMut<DelayedTasks<CakeStep>>,
    mut cake: Option<ResMut<CakeState>>,
) {
    if tasks.is_empty() {
        return;
    }
    for step in tasks.tick(time.delta_secs(), sequencer.generation()) {
        let Some(cake) = cake.as_mut() else {
            continue;
        };
        if step == CakeStep::Complete && cake.finish() {
            debug!("cake complete");
        }
    }
}

fn sync_cake(
    cake: Option<Res<CakeState>>,
    mut buttons: Query<(&CakeButton, &mut Node, &mut Entrance)>,
    mut banner: Query<&mut Node, (With<Banner>, Without<CakeButton>)>,
    mut flame: Query<&mut Node, (With<Flame>, Without<Banner>, Without<CakeButton>)>,
) {
    let Some(cake) = cake else {
        return;
    };
    if !cake.is_changed() {
        return;
    }
    let step = cake.step();

    for (button, mut node, mut entrance) in &mut buttons {
        set_shown(&mut node, Some(&mut entrance), button.shown_at() == step);
    }
    for mut node in &mut banner {
        set_shown(&mut node, None, step != CakeStep::Appear);
    }
    for mut node in &mut flame {
        set_shown(
            &mut node,
            None,
            matches!(step, CakeStep::Candle | CakeStep::Complete),
        );
    }
}

fn animate_cake(
    time: Res<Time>,
    cake: Option<Res<CakeState>>,
    mut body: Query<(&mut CakeBody, &mut UiTransform), (Without<Topping>, Without<Flame>)>,
    mut toppings: Query<(&mut Topping, &mut UiTransform), Without<Flame>>,
    mut flame: Query<&mut UiTransform, With<Flame>>,
) {
    let Some(cake) = cake else {
        return;
    };
    let dt = time.delta_secs();

    for (mut body, mut transform) in &mut body {
        body.elapsed += dt;
        transform.translation = Val2::px(0.0, CAKE_RISE.sample(body.elapsed));
    }

    if cake.step() != CakeStep::Appear {
        for (mut topping, mut transform) in &mut toppings {
            topping.elapsed += dt;
            let scale = TOPPING_POP.sample(topping.elapsed - topping.delay);
            transform.scale = Vec2::splat(scale);
        }
    }

    let pulse = (time.elapsed_secs() / FLAME_PULSE).fract() * std::f32::consts::TAU;
    for mut transform in &mut flame {
        transform.scale = Vec2::splat(1.0 + 0.15 * (1.0 - pulse.cos()));
    }
}
