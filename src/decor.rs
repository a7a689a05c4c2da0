// Floating memes and hearts behind every screen.

use std::f32::consts::TAU;

use bevy::picking::Pickable;
use bevy::prelude::*;
use fast_poisson::Poisson2D;
use strum::IntoEnumIterator;

use crate::content::{MEME_PATHS, ScreenAssets};
use crate::screens::Screens;
use crate::ui::PINK;

pub struct DecorPlugin;

impl Plugin for DecorPlugin {
    fn build(&self, app: &mut App) {
        let seed = app
            .world()
            .get_resource::<DecorSeed>()
            .copied()
            .unwrap_or_default();
        app.insert_resource(BlueNoisePoints::generate(seed.0));

        for screen in Screens::iter() {
            app.add_systems(
                OnEnter(screen),
                move |commands: Commands,
                      assets: Res<ScreenAssets>,
                      points: Res<BlueNoisePoints>| {
                    spawn_decor(commands, &assets, &points, screen)
                },
            );
        }
        app.add_systems(Update, float_decor);
    }
}

const DEFAULT_SEED: u64 = 42;
const MIN_SPACING: f32 = 0.18;
/// Placement stays inside this fraction of the window on both axes.
const PLACEMENT_EXTENT: f32 = 0.9;
const HEART_COUNT: usize = 10;
const MEME_SIZE: f32 = 96.0;
const HEART_SIZE: f32 = 18.0;
const MEME_RISE: f32 = 30.0;
const MEME_SWING: f32 = 10.0;
const HEART_RISE: f32 = 25.0;
const HEART_SWING: f32 = 15.0;

/// Seed for decoration placement. Insert before `DecorPlugin` to change it.
#[derive(Resource, Debug, Clone, Copy)]
pub struct DecorSeed(pub u64);

impl Default for DecorSeed {
    fn default() -> Self {
        Self(DEFAULT_SEED)
    }
}

/// Blue-noise positions in `[0, PLACEMENT_EXTENT]²`, in window fractions.
#[derive(Resource)]
pub struct BlueNoisePoints(Vec<[f32; 2]>);

impl BlueNoisePoints {
    pub fn generate(seed: u64) -> Self {
        let points = Poisson2D::new()
            .with_dimensions([PLACEMENT_EXTENT, PLACEMENT_EXTENT], MIN_SPACING)
            .with_seed(seed)
            .generate();
        Self(points)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Wraps around when more decorations than points are asked for.
    pub fn get(&self, index: usize) -> Vec2 {
        if self.is_empty() {
            return Vec2::ZERO;
        }
        let [x, y] = self.0[index % self.len()];
        Vec2::new(x, y)
    }
}

/// Endless bob and sway with a fixed period.
#[derive(Component, Debug)]
pub struct Floating {
    pub period: f32,
    pub rise: f32,
    pub swing: f32,
}

impl Floating {
    /// Offset in pixels (y grows downwards) and rotation in degrees at time
    /// `t`: up to `rise` and back, swinging `+swing` then `-swing`.
    pub fn pose(&self, t: f32) -> (f32, f32) {
        let phase = (t / self.period).fract() * TAU;
        let y = -self.rise * 0.5 * (1.0 - phase.cos());
        let rotation = self.swing * phase.sin();
        (y, rotation)
    }
}

fn decor_node(at: Vec2, size: f32) -> Node {
    Node {
        width: Val::Px(size),
        height: Val::Px(size),
        position_type: PositionType::Absolute,
        left: Val::Percent(at.x * 100.0),
        top: Val::Percent(at.y * 100.0),
        ..default()
    }
}

fn spawn_decor(
    mut commands: Commands,
    assets: &ScreenAssets,
    points: &BlueNoisePoints,
    screen: Screens,
) {
    for i in 0..MEME_PATHS.len() {
        let mut image = ImageNode::new(assets.meme(i));
        image.color = Color::srgba(1.0, 1.0, 1.0, 0.25);
        commands.spawn((
            image,
            decor_node(points.get(i), MEME_SIZE),
            Floating {
                period: 6.0 + i as f32,
                rise: MEME_RISE,
                swing: MEME_SWING,
            },
            GlobalZIndex(-1),
            Pickable::IGNORE,
            DespawnOnExit(screen),
        ));
    }

    for i in 0..HEART_COUNT {
        commands.spawn((
            decor_node(points.get(MEME_PATHS.len() + i), HEART_SIZE),
            BackgroundColor(PINK.with_alpha(0.2)),
            Floating {
                period: 5.0 + i as f32,
                rise: HEART_RISE,
                swing: HEART_SWING,
            },
            GlobalZIndex(-1),
            Pickable::IGNORE,
            DespawnOnExit(screen),
        ));
    }
}

fn float_decor(time: Res<Time>, mut query: Query<(&Floating, &mut UiTransform)>) {
    let t = time.elapsed_secs();
    for (floating, mut transform) in &mut query {
        let (y, rotation) = floating.pose(t);
        transform.translation = Val2::px(0.0, y);
        transform.rotation = Rot2::degrees(rotation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placement_is_reproducible_for_a_seed() {
        let a = BlueNoisePoints::generate(7);
        let b = BlueNoisePoints::generate(7);
        assert!(!a.0.is_empty());
        assert_eq!(a.0, b.0);
    }

    #[test]
    fn inserted_seed_drives_placement() {
        let mut app = App::new();
        app.insert_resource(DecorSeed(7)).add_plugins(DecorPlugin);
        assert_eq!(
            app.world().resource::<BlueNoisePoints>().0,
            BlueNoisePoints::generate(7).0
        );

        let mut app = App::new();
        app.add_plugins(DecorPlugin);
        assert_eq!(
            app.world().resource::<BlueNoisePoints>().0,
            BlueNoisePoints::generate(DEFAULT_SEED).0
        );
    }

    #[test]
    fn placement_stays_on_screen() {
        let points = BlueNoisePoints::generate(DEFAULT_SEED);
        for i in 0..points.len() {
            let at = points.get(i);
            assert!((0.0..=PLACEMENT_EXTENT).contains(&at.x));
            assert!((0.0..=PLACEMENT_EXTENT).contains(&at.y));
        }
        assert_eq!(points.get(points.len()), points.get(0));
    }

    #[test]
    fn floating_returns_to_rest_each_period() {
        let floating = Floating {
            period: 6.0,
            rise: 30.0,
            swing: 10.0,
        };
        let (y, rotation) = floating.pose(0.0);
        assert_eq!(y, 0.0);
        assert_eq!(rotation, 0.0);

        let (y, _) = floating.pose(3.0);
        assert!((y + 30.0).abs() < 1e-3);

        let (_, rotation) = floating.pose(1.5);
        assert!((rotation - 10.0).abs() < 1e-3);
    }
}
