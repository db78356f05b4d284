//! Timed adversary slow effect.

use std::time::Duration;

/// Countdown for the powerup that halts the adversary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct SlowEffect {
    remaining: Option<Duration>,
}

impl SlowEffect {
    pub(crate) const fn is_active(&self) -> bool {
        self.remaining.is_some()
    }

    pub(crate) fn remaining(&self) -> Duration {
        self.remaining.unwrap_or_default()
    }

    /// Starts (or restarts) the countdown and returns the interval to use
    /// while it lasts: never faster than `floor`.
    pub(crate) fn activate(
        &mut self,
        duration: Duration,
        current_interval: Duration,
        floor: Duration,
    ) -> Duration {
        self.remaining = Some(duration);
        current_interval.max(floor)
    }

    /// Ages the countdown. Returns `true` exactly once, on the tick it expires.
    pub(crate) fn tick(&mut self, dt: Duration) -> bool {
        let Some(remaining) = self.remaining else {
            return false;
        };

        let left = remaining.saturating_sub(dt);
        if left.is_zero() {
            self.remaining = None;
            true
        } else {
            self.remaining = Some(left);
            false
        }
    }

    pub(crate) fn clear(&mut self) {
        self.remaining = None;
    }
}
