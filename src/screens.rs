// Screen order and the sequencer that walks it.
use bevy::prelude::*;
use strum::{Display, EnumIter, IntoEnumIterator};

/// Full-screen experiences, declared in narrative order.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States, EnumIter, Display)]
pub enum Screens {
    #[default]
    Cake,
    Memories,
    Message,
    Video,
}

impl Screens {
    /// What completing this screen does to the sequence.
    pub fn on_complete(self) -> OnComplete {
        match self {
            Screens::Video => OnComplete::Loop,
            _ => OnComplete::Next,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnComplete {
    /// Move to the following screen, staying put on the last one.
    Next,
    /// Replay from the first screen.
    Loop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenDescriptor {
    pub id: usize,
    pub screen: Screens,
    pub on_complete: OnComplete,
}

/// Sent by the mounted screen when its interaction is done. The generation
/// must match the sequencer's, otherwise the signal came from a screen that
/// is no longer mounted.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenCompleted {
    pub generation: u64,
}

/// Sent whenever the sequencer moves to another screen instance.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenChanged {
    pub from: Screens,
    pub to: Screens,
}

/// Ordered screens plus the index of the one currently mounted.
///
/// Every change of index starts a new screen instance with a fresh
/// generation. Screens tag their completion signal and delayed tasks with the
/// generation they were mounted under, so late signals are dropped.
#[derive(Resource, Debug)]
pub struct Sequencer {
    descriptors: Vec<ScreenDescriptor>,
    current: usize,
    generation: u64,
    completed: bool,
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new(Screens::iter().map(|screen| (screen, screen.on_complete())))
    }
}

impl Sequencer {
    /// Builds the sequence from screens in order. The list is fixed at
    /// startup and must not be empty.
    pub fn new(screens: impl IntoIterator<Item = (Screens, OnComplete)>) -> Self {
        let descriptors: Vec<_> = screens
            .into_iter()
            .enumerate()
            .map(|(id, (screen, on_complete))| ScreenDescriptor {
                id,
                screen,
                on_complete,
            })
            .collect();
        assert!(!descriptors.is_empty(), "sequencer needs at least one screen");

        Self {
            descriptors,
            current: 0,
            generation: 0,
            completed: false,
        }
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Position of the mounted screen; descriptor ids are their positions.
    pub fn current_index(&self) -> usize {
        self.current().id
    }

    pub fn current(&self) -> &ScreenDescriptor {
        &self.descriptors[self.current]
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Moves past the current screen according to its `OnComplete` policy
    /// and returns the new index.
    pub fn advance(&mut self) -> usize {
        let last = self.len() - 1;
        let on_complete = self.current().on_complete;
        let next = match on_complete {
            OnComplete::Next => (self.current + 1).min(last),
            OnComplete::Loop => 0,
        };

        // Clamping on the last screen keeps the same instance mounted.
        if next != self.current || on_complete == OnComplete::Loop {
            self.current = next;
            self.generation += 1;
            self.completed = false;
        }
        self.current
    }

    /// Accepts one completion signal per screen instance. Returns the new
    /// index, or `None` when the signal is stale or a duplicate.
    pub fn complete(&mut self, generation: u64) -> Option<usize> {
        if generation != self.generation || self.completed {
            return None;
        }
        self.completed = true;
        Some(self.advance())
    }
}

pub struct SequencerPlugin;

impl Plugin for SequencerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Sequencer>()
            .add_message::<ScreenCompleted>()
            .add_message::<ScreenChanged>()
            .add_systems(PostUpdate, advance_sequencer);
    }
}

fn advance_sequencer(
    mut completions: MessageReader<ScreenCompleted>,
    mut sequencer: ResMut<Sequencer>,
    mut changes: MessageWriter<ScreenChanged>,
) {
    for completed in completions.read() {
        let from = sequencer.current().screen;
        let before = sequencer.generation();
        if sequencer.complete(completed.generation).is_none() {
            debug!(
                "ignoring completion from generation {} (current {})",
                completed.generation,
                sequencer.generation()
            );
            continue;
        }

        if sequencer.generation() == before {
            debug!("{from} is the last screen, staying");
            continue;
        }

        let to = sequencer.current().screen;
        info!("screen {from} -> {to} (index {})", sequencer.current_index());
        changes.write(ScreenChanged { from, to });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screens_are_declared_in_narrative_order() {
        let order: Vec<_> = Screens::iter().collect();
        assert_eq!(
            order,
            [
                Screens::Cake,
                Screens::Memories,
                Screens::Message,
                Screens::Video
            ]
        );
        let sequencer = Sequencer::default();
        assert!(!sequencer.is_empty());
        assert_eq!(sequencer.current().screen, Screens::Cake);
    }

    #[test]
    fn advancing_reaches_the_last_screen_then_wraps() {
        let mut sequencer = Sequencer::default();
        let n = sequencer.len();

        for _ in 0..n - 1 {
            sequencer.advance();
        }
        assert_eq!(sequencer.current_index(), n - 1);
        assert_eq!(sequencer.current().screen, Screens::Video);

        assert_eq!(sequencer.advance(), 0);
        assert_eq!(sequencer.current().screen, Screens::Cake);
    }

    #[test]
    fn next_on_the_last_screen_clamps() {
        let mut sequencer = Sequencer::new([
            (Screens::Cake, OnComplete::Next),
            (Screens::Message, OnComplete::Next),
        ]);
        sequencer.advance();
        let generation = sequencer.generation();

        assert_eq!(sequencer.advance(), 1);
        assert_eq!(sequencer.generation(), generation);
    }

    #[test]
    fn index_stays_in_range() {
        let mut sequencer = Sequencer::default();
        for _ in 0..50 {
            let index = sequencer.advance();
            assert!(index < sequencer.len());
        }
    }

    #[test]
    fn completion_is_accepted_once_per_instance() {
        let mut sequencer = Sequencer::default();
        let generation = sequencer.generation();

        assert_eq!(sequencer.complete(generation), Some(1));
        // Same instance again, now stale.
        assert_eq!(sequencer.complete(generation), None);
        assert_eq!(sequencer.current_index(), 1);

        assert_eq!(sequencer.complete(sequencer.generation()), Some(2));
    }

    #[test]
    fn clamped_screen_completes_only_once() {
        let mut sequencer = Sequencer::new([(Screens::Message, OnComplete::Next)]);
        let generation = sequencer.generation();

        assert_eq!(sequencer.complete(generation), Some(0));
        assert_eq!(sequencer.complete(generation), None);
    }

    #[test]
    fn single_looping_screen_remounts() {
        let mut sequencer = Sequencer::new([(Screens::Video, OnComplete::Loop)]);
        let generation = sequencer.generation();

        assert_eq!(sequencer.complete(generation), Some(0));
        assert_eq!(sequencer.generation(), generation + 1);
    }
}
