#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Progress-driven adversary speed curve.
//!
//! The adversary's tick interval shrinks as the player collects cheese. The
//! curve is concave: `delay = min + (initial - min) * (1 - sqrt(fraction))`,
//! so the first pickups buy the largest speed-ups and the last ones the
//! smallest. The world recomputes it on every pickup and whenever a slow
//! effect expires, never per tick.

use std::time::Duration;

use grand_chase_core::Rules;

/// Maps collection progress onto an adversary tick interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Difficulty {
    initial_delay: Duration,
    min_delay: Duration,
}

impl Difficulty {
    /// Creates a curve spanning `initial_delay` (no progress) to `min_delay` (done).
    #[must_use]
    pub const fn new(initial_delay: Duration, min_delay: Duration) -> Self {
        Self {
            initial_delay,
            min_delay,
        }
    }

    /// Builds the curve described by the session rules.
    #[must_use]
    pub fn from_rules(rules: &Rules) -> Self {
        Self::new(rules.initial_delay, rules.min_delay)
    }

    /// Interval used before any cheese has been collected.
    #[must_use]
    pub const fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    /// Adversary tick interval for the provided collected fraction.
    ///
    /// Fractions outside `[0, 1]` are clamped and `NaN` counts as no progress.
    /// The scaled span is truncated to whole milliseconds before the result
    /// is clamped below at the minimum delay.
    #[must_use]
    pub fn delay_for(&self, collected_fraction: f64) -> Duration {
        let fraction = if collected_fraction.is_nan() {
            0.0
        } else {
            collected_fraction.clamp(0.0, 1.0)
        };

        let span = self.initial_delay.saturating_sub(self.min_delay);
        let span_millis = span.as_millis() as f64;
        let scaled_millis = (span_millis * (1.0 - fraction.sqrt())) as u64;

        self.min_delay
            .saturating_add(Duration::from_millis(scaled_millis))
            .max(self.min_delay)
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::from_rules(&Rules::default())
    }
}

/// Share of the level's cheese collected so far, `0.0` when none was placed.
#[must_use]
pub fn collected_fraction(level_score: u32, initial_cheese: usize) -> f64 {
    if initial_cheese == 0 {
        return 0.0;
    }
    f64::from(level_score) / initial_cheese as f64
}
