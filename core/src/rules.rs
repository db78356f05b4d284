//! Gameplay tunables shared by the world and its systems.

use std::time::Duration;

use thiserror::Error;

/// Adjustable parameters that shape a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rules {
    /// Cheese the populator tries to place on every level.
    pub cheese_per_level: u32,
    /// Powerups the populator tries to place on every level.
    pub powerups_per_level: u32,
    /// Adversary tick interval with no collection progress.
    pub initial_delay: Duration,
    /// Fastest adversary tick interval, reached when every cheese is collected.
    pub min_delay: Duration,
    /// Amount added to `initial_delay` to form the slow-effect floor.
    pub slow_bonus: Duration,
    /// Length of the adversary slow effect.
    pub slow_duration: Duration,
    /// Pause between clearing a level and loading the next one.
    pub level_advance_delay: Duration,
    /// Time after which the intro dismisses itself.
    pub intro_duration: Duration,
    /// Whether a reset is accepted after the final level was cleared.
    pub replay_after_final_win: bool,
}

impl Rules {
    /// Slowest adversary tick interval the slow effect enforces.
    #[must_use]
    pub fn slow_floor(&self) -> Duration {
        self.initial_delay.saturating_add(self.slow_bonus)
    }

    /// Checks that the tunables describe a playable session.
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.min_delay.is_zero() {
            return Err(RulesError::ZeroMinimumDelay);
        }
        if self.min_delay > self.initial_delay {
            return Err(RulesError::DelayRangeInverted {
                min: self.min_delay,
                initial: self.initial_delay,
            });
        }
        Ok(())
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            cheese_per_level: 12,
            powerups_per_level: 1,
            initial_delay: Duration::from_millis(350),
            min_delay: Duration::from_millis(150),
            slow_bonus: Duration::from_millis(100),
            slow_duration: Duration::from_millis(5_000),
            level_advance_delay: Duration::from_millis(2_000),
            intro_duration: Duration::from_millis(3_500),
            replay_after_final_win: false,
        }
    }
}

/// Reasons a set of [`Rules`] is rejected.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RulesError {
    /// The adversary would tick continuously.
    #[error("minimum adversary delay must be positive")]
    ZeroMinimumDelay,
    /// The difficulty curve would slow the adversary down as cheese is collected.
    #[error("minimum adversary delay {min:?} exceeds the initial delay {initial:?}")]
    DelayRangeInverted {
        /// Configured minimum delay.
        min: Duration,
        /// Configured initial delay.
        initial: Duration,
    },
}
