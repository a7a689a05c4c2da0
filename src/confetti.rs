// One-shot confetti bursts drawn as small UI quads.

use bevy::picking::Pickable;
use bevy::prelude::*;
use rand::Rng;

pub struct ConfettiPlugin;

impl Plugin for ConfettiPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<ConfettiBurst>()
            .add_systems(Update, (spawn_bursts, animate_confetti).chain());
    }
}

const GRAVITY: f32 = 900.0;
const DRAG: f32 = 0.9;
const MIN_SPEED: f32 = 450.0;
const MAX_SPEED: f32 = 1100.0;
const LIFETIME: f32 = 3.0;
const PIECE_SIZE: f32 = 10.0;

/// A burst of `particle_count` pieces fired upwards from `origin` (fractions
/// of the window), fanned out over `spread` degrees.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct ConfettiBurst {
    pub particle_count: u32,
    pub spread: f32,
    pub origin: Vec2,
    pub colors: &'static [Color],
}

#[derive(Component)]
struct ConfettiPiece {
    velocity: Vec2,
    offset: Vec2,
    spin: f32,
    angle: f32,
    age: f32,
}

fn spawn_bursts(mut commands: Commands, mut bursts: MessageReader<ConfettiBurst>) {
    let mut rng = rand::rng();
    for burst in bursts.read() {
        if burst.colors.is_empty() {
            continue;
        }
        let half_spread = burst.spread.to_radians() * 0.5;
        for i in 0..burst.particle_count {
            // UI space grows downwards, so "up" is -y.
            let heading = rng.random_range(-half_spread..=half_spread);
            let speed = rng.random_range(MIN_SPEED..MAX_SPEED);
            let velocity = Vec2::new(heading.sin(), -heading.cos()) * speed;
            let color = burst.colors[i as usize % burst.colors.len()];

            commands.spawn((
                ConfettiPiece {
                    velocity,
                    offset: Vec2::ZERO,
                    spin: rng.random_range(-12.0..12.0),
                    angle: 0.0,
                    age: 0.0,
                },
                Node {
                    width: Val::Px(PIECE_SIZE),
                    height: Val::Px(PIECE_SIZE * 0.6),
                    position_type: PositionType::Absolute,
                    left: Val::Percent(burst.origin.x * 100.0),
                    top: Val::Percent(burst.origin.y * 100.0),
                    ..default()
                },
                BackgroundColor(color),
                GlobalZIndex(500),
                Pickable::IGNORE,
            ));
        }
    }
}

fn animate_confetti(
    mut commands: Commands,
    time: Res<Time>,
    mut pieces: Query<(
        Entity,
        &mut ConfettiPiece,
        &mut UiTransform,
        &mut BackgroundColor,
    )>,
) {
    let dt = time.delta_secs();
    for (entity, mut piece, mut transform, mut bg) in &mut pieces {
        piece.age += dt;
        if piece.age >= LIFETIME {
            commands.entity(entity).despawn();
            continue;
        }

        piece.velocity.y += GRAVITY * dt;
        piece.velocity *= DRAG.powf(dt);
        let step = piece.velocity * dt;
        piece.offset += step;
        piece.angle += piece.spin * dt;

        transform.translation = Val2::px(piece.offset.x, piece.offset.y);
        transform.rotation = Rot2::radians(piece.angle);
        bg.0.set_alpha(1.0 - piece.age / LIFETIME);
    }
}
