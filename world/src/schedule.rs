//! Simulated clock and epoch-stamped deferred work.

use std::{cmp::Reverse, collections::BinaryHeap, time::Duration};

use grand_chase_core::Epoch;

/// Work the world defers until the clock reaches a due time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Task {
    /// Give the adversary its next turn.
    AdversaryMove,
    /// Load the level that follows a cleared one.
    AdvanceLevel,
    /// Leave the intro for the start menu.
    DismissIntro,
}

/// A task that came due, together with the epoch it was scheduled under.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct DueTask {
    pub(crate) task: Task,
    pub(crate) epoch: Epoch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Entry {
    due: Duration,
    sequence: u64,
    task: Task,
    epoch: Epoch,
}

/// Priority queue of tasks keyed by due time, ties broken by insertion order.
///
/// Nothing is ever cancelled. Each task carries the epoch current at
/// scheduling time and the world discards tasks whose epoch is stale.
#[derive(Debug, Default)]
pub(crate) struct TickScheduler {
    now: Duration,
    sequence: u64,
    queue: BinaryHeap<Reverse<Entry>>,
}

impl TickScheduler {
    pub(crate) const fn now(&self) -> Duration {
        self.now
    }

    pub(crate) fn schedule(&mut self, delay: Duration, task: Task, epoch: Epoch) {
        let entry = Entry {
            due: self.now.saturating_add(delay),
            sequence: self.sequence,
            task,
            epoch,
        };
        self.sequence = self.sequence.wrapping_add(1);
        self.queue.push(Reverse(entry));
    }

    pub(crate) fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }

    /// Removes the earliest task whose due time has been reached.
    pub(crate) fn pop_due(&mut self) -> Option<DueTask> {
        let Reverse(head) = self.queue.peek()?;
        if head.due > self.now {
            return None;
        }

        self.queue.pop().map(|Reverse(entry)| DueTask {
            task: entry.task,
            epoch: entry.epoch,
        })
    }
}
