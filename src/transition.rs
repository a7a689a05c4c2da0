// Curtain that fades the outgoing screen out and the incoming one in.

use bevy::picking::Pickable;
use bevy::prelude::*;

use crate::screens::{ScreenChanged, Screens};
use crate::ui::BACKGROUND;

pub struct TransitionPlugin;

impl Plugin for TransitionPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<ScreenChanged>()
            .add_systems(Update, (start_curtain, run_curtain).chain());
    }
}

const SCREEN_FADE: f32 = 0.3;
const VIDEO_FADE: f32 = 0.5;

/// Interpolation of one visual property over a bounded duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub from: f32,
    pub to: f32,
    pub duration: f32,
}

impl Tween {
    pub const fn new(from: f32, to: f32, duration: f32) -> Self {
        Self { from, to, duration }
    }

    /// Value after `elapsed` seconds, eased out and held at `to` afterwards.
    pub fn sample(&self, elapsed: f32) -> f32 {
        let t = if self.duration <= 0.0 {
            1.0
        } else {
            (elapsed / self.duration).clamp(0.0, 1.0)
        };
        let eased = 1.0 - (1.0 - t) * (1.0 - t);
        self.from + (self.to - self.from) * eased
    }

    pub fn is_done(&self, elapsed: f32) -> bool {
        elapsed >= self.duration
    }
}

/// Opacity of a screen while it enters and while it leaves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualTransitionSpec {
    pub enter: Tween,
    pub exit: Tween,
}

pub fn screen_transition(screen: Screens) -> VisualTransitionSpec {
    let duration = match screen {
        Screens::Video => VIDEO_FADE,
        _ => SCREEN_FADE,
    };
    VisualTransitionSpec {
        enter: Tween::new(0.0, 1.0, duration),
        exit: Tween::new(1.0, 0.0, duration),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CurtainPhase {
    Exit,
    Enter,
}

#[derive(Resource, Debug)]
struct Curtain {
    from: Screens,
    to: Screens,
    phase: CurtainPhase,
    elapsed: f32,
}

#[derive(Component)]
struct CurtainRoot;

fn start_curtain(
    mut commands: Commands,
    mut changes: MessageReader<ScreenChanged>,
    roots: Query<Entity, With<CurtainRoot>>,
) {
    // Only the latest change matters if several land in one frame.
    let Some(change) = changes.read().last() else {
        return;
    };

    commands.insert_resource(Curtain {
        from: change.from,
        to: change.to,
        phase: CurtainPhase::Exit,
        elapsed: 0.0,
    });

    if roots.is_empty() {
        commands.spawn((
            CurtainRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                position_type: PositionType::Absolute,
                ..default()
            },
            BackgroundColor(BACKGROUND.with_alpha(0.0)),
            GlobalZIndex(100),
            Pickable::IGNORE,
        ));
    }
}

fn run_curtain(
    mut commands: Commands,
    time: Res<Time>,
    mut curtain: Option<ResMut<Curtain>>,
    mut next_screen: ResMut<NextState<Screens>>,
    mut roots: Query<(Entity, &mut BackgroundColor), With<CurtainRoot>>,
) {
    let Some(curtain) = curtain.as_mut() else {
        return;
    };

    curtain.elapsed += time.delta_secs();

    // The curtain is opaque exactly when the screen underneath is invisible.
    let opacity = match curtain.phase {
        CurtainPhase::Exit => {
            let exit = screen_transition(curtain.from).exit;
            let opacity = exit.sample(curtain.elapsed);
            if exit.is_done(curtain.elapsed) {
                next_screen.set(curtain.to);
                curtain.phase = CurtainPhase::Enter;
                curtain.elapsed = 0.0;
            }
            opacity
        }
        CurtainPhase::Enter => {
            let enter = screen_transition(curtain.to).enter;
            if enter.is_done(curtain.elapsed) {
                for (entity, _) in &roots {
                    commands.entity(entity).despawn();
                }
                commands.remove_resource::<Curtain>();
                return;
            }
            enter.sample(curtain.elapsed)
        }
    };

    for (_, mut bg) in &mut roots {
        bg.0 = BACKGROUND.with_alpha(1.0 - opacity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tween_is_bounded() {
        let tween = Tween::new(1.0, 0.0, 0.3);
        assert_eq!(tween.sample(0.0), 1.0);
        assert_eq!(tween.sample(0.3), 0.0);
        assert_eq!(tween.sample(100.0), 0.0);
        assert!(tween.is_done(0.3));
        assert!(!tween.is_done(0.1));
    }

    #[test]
    fn zero_duration_jumps_to_the_end() {
        let tween = Tween::new(0.0, 1.0, 0.0);
        assert_eq!(tween.sample(0.0), 1.0);
        assert!(tween.is_done(0.0));
    }

    #[test]
    fn every_screen_fades_in_and_out() {
        for screen in [
            Screens::Cake,
            Screens::Memories,
            Screens::Message,
            Screens::Video,
        ] {
            let spec = screen_transition(screen);
            assert_eq!(spec.enter.from, 0.0);
            assert_eq!(spec.enter.to, 1.0);
            assert_eq!(spec.exit.to, 0.0);
            assert!(spec.enter.duration > 0.0 && spec.enter.duration <= 1.0);
        }
        assert_eq!(screen_transition(Screens::Video).enter.duration, VIDEO_FADE);
    }
}
