// Shared button style, entrance animation and screen scaffolding.

use bevy::picking::Pickable;
use bevy::prelude::*;

use crate::screens::Screens;

pub struct WidgetsPlugin;

impl Plugin for WidgetsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (button_visuals, animate_entrances, lift_buttons).chain());
    }
}

pub const BACKGROUND: Color = Color::srgb(0.10, 0.04, 0.16);
pub const PINK: Color = Color::srgb(1.0, 0.42, 0.62);
pub const SOFT_PINK: Color = Color::srgb(1.0, 0.75, 0.86);
pub const PURPLE: Color = Color::srgb(0.66, 0.33, 0.97);
pub const CARD: Color = Color::srgb(0.18, 0.08, 0.28);

const NORMAL_BUTTON: Color = Color::srgb(0.93, 0.28, 0.60);
const HOVERED_BUTTON: Color = Color::srgb(0.98, 0.40, 0.70);
const PRESSED_BUTTON: Color = Color::srgb(0.75, 0.20, 0.50);
const RESTING_BORDER: Color = Color::srgba(1.0, 1.0, 1.0, 0.3);

/// Scale a hovered button grows to, and a pressed one shrinks to.
const HOVER_LIFT: f32 = 1.05;
const PRESS_SQUASH: f32 = 0.95;
/// Higher settles faster.
const LIFT_RATE: f32 = 20.0;

/// Seconds a button takes to slide into place once its delay has passed.
const ENTRANCE_DURATION: f32 = 0.4;
/// Pixels a button rises from while entering.
const ENTRANCE_RISE: f32 = 30.0;

/// Shared button behaviour: colours follow the pointer and the button
/// eases towards a lifted or squashed scale.
#[derive(Component, Debug)]
pub struct MagicButton {
    scale: f32,
}

impl Default for MagicButton {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

/// How a magic button looks for one interaction state.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ButtonLook {
    fill: Color,
    border: Color,
    scale: f32,
}

fn button_look(interaction: Interaction) -> ButtonLook {
    match interaction {
        Interaction::Pressed => ButtonLook {
            fill: PRESSED_BUTTON,
            border: Color::WHITE,
            scale: PRESS_SQUASH,
        },
        Interaction::Hovered => ButtonLook {
            fill: HOVERED_BUTTON,
            border: Color::WHITE,
            scale: HOVER_LIFT,
        },
        Interaction::None => ButtonLook {
            fill: NORMAL_BUTTON,
            border: RESTING_BORDER,
            scale: 1.0,
        },
    }
}

/// Slide-and-reveal played once when an element first becomes visible.
#[derive(Component, Debug)]
pub struct Entrance {
    pub delay: f32,
    elapsed: f32,
}

impl Entrance {
    pub fn after(delay: f32) -> Self {
        Self {
            delay,
            elapsed: 0.0,
        }
    }

    /// 0.0 before the delay has passed, 1.0 once fully in place.
    pub fn progress(&self) -> f32 {
        ((self.elapsed - self.delay) / ENTRANCE_DURATION).clamp(0.0, 1.0)
    }
}

/// Full-screen column that owns every entity of one screen.
pub fn spawn_screen_root(commands: &mut Commands, screen: Screens) -> Entity {
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                row_gap: Val::Px(24.0),
                padding: UiRect::horizontal(Val::Px(24.0)),
                ..default()
            },
            DespawnOnExit(screen),
        ))
        .id()
}

pub fn spawn_heading(parent: &mut ChildSpawnerCommands, title: &str) {
    parent.spawn((
        Text::new(title),
        TextFont {
            font_size: 36.0,
            ..default()
        },
        TextColor(PINK),
    ));
}

pub fn spawn_button(
    parent: &mut ChildSpawnerCommands,
    label: &str,
    marker: impl Component,
    delay: f32,
) -> Entity {
    parent
        .spawn((
            marker,
            MagicButton::default(),
            Button,
            Entrance::after(delay),
            Node {
                min_width: Val::Px(240.0),
                height: Val::Px(56.0),
                padding: UiRect::horizontal(Val::Px(24.0)),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                border: UiRect::all(Val::Px(2.0)),
                ..default()
            },
            BorderColor::all(RESTING_BORDER),
            BackgroundColor(NORMAL_BUTTON),
            Visibility::Hidden,
        ))
        .with_children(|btn| {
            btn.spawn((
                Text::new(label),
                TextFont {
                    font_size: 24.0,
                    ..default()
                },
                TextColor(Color::WHITE),
                Pickable::IGNORE,
            ));
        })
        .id()
}

/// Shows or hides a node in layout, restarting its entrance when shown.
pub fn set_shown(node: &mut Node, entrance: Option<&mut Entrance>, shown: bool) {
    let display = if shown { Display::Flex } else { Display::None };
    if node.display == display {
        return;
    }
    node.display = display;
    if let Some(entrance) = entrance {
        entrance.elapsed = 0.0;
    }
}

fn button_visuals(
    mut query: Query<
        (&Interaction, &mut BackgroundColor, &mut BorderColor),
        (Changed<Interaction>, With<MagicButton>),
    >,
) {
    for (interaction, mut bg, mut border) in &mut query {
        let look = button_look(*interaction);
        bg.0 = look.fill;
        *border = BorderColor::all(look.border);
    }
}

fn lift_buttons(
    time: Res<Time>,
    mut query: Query<(&Interaction, &mut MagicButton, &mut UiTransform)>,
) {
    let t = 1.0 - (-LIFT_RATE * time.delta_secs()).exp();
    for (interaction, mut button, mut transform) in &mut query {
        let target = button_look(*interaction).scale;
        if button.scale == target {
            continue;
        }
        button.scale += (target - button.scale) * t;
        if (target - button.scale).abs() < 1e-3 {
            button.scale = target;
        }
        transform.scale = Vec2::splat(button.scale);
    }
}

fn animate_entrances(
    time: Res<Time>,
    mut query: Query<(&mut Entrance, &Node, &mut Visibility, &mut UiTransform)>,
) {
    for (mut entrance, node, mut visibility, mut transform) in &mut query {
        if node.display == Display::None {
            continue;
        }
        entrance.elapsed += time.delta_secs();
        let t = entrance.progress();

        *visibility = if entrance.elapsed >= entrance.delay {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        transform.translation = Val2::px(0.0, ENTRANCE_RISE * (1.0 - t));
    }
}
