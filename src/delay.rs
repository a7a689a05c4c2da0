// Fixed-delay callbacks owned by a screen instance.

use bevy::prelude::*;

struct DelayedTask<T> {
    generation: u64,
    remaining: f32,
    payload: T,
}

/// Pending payloads that fire after a fixed delay, each tagged with the
/// generation of the screen instance that scheduled it. A task whose screen
/// has since unmounted fires as a no-op.
#[derive(Resource)]
pub struct DelayedTasks<T: Send + Sync + 'static> {
    pending: Vec<DelayedTask<T>>,
}

impl<T: Send + Sync + 'static> Default for DelayedTasks<T> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<T: Send + Sync + 'static> DelayedTasks<T> {
    pub fn schedule(&mut self, generation: u64, delay: f32, payload: T) {
        self.pending.push(DelayedTask {
            generation,
            remaining: delay,
            payload,
        });
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Advances every task by `delta` seconds and returns the payloads that
    /// came due for the `current` generation, in scheduling order.
    pub fn tick(&mut self, delta: f32, current: u64) -> Vec<T> {
        let mut due = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            self.pending[i].remaining -= delta;
            if self.pending[i].remaining > 0.0 {
                i += 1;
                continue;
            }

            let task = self.pending.remove(i);
            if task.generation == current {
                due.push(task.payload);
            } else {
                debug!(
                    "dropping delayed task from generation {} (current {current})",
                    task.generation
                );
            }
        }
        due
    }
}
