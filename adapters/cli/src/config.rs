//! TOML configuration layered over the default gameplay tunables.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use grand_chase_core::{Rules, RulesError};
use serde::Deserialize;
use thiserror::Error;

/// Frame rate used when neither the file nor the flags name one.
const DEFAULT_FRAMES_PER_SECOND: u32 = 60;

/// Contents of a configuration file. Missing keys keep their defaults.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ConfigFile {
    pub(crate) cheese_per_level: u32,
    pub(crate) powerups_per_level: u32,
    pub(crate) initial_delay_ms: u64,
    pub(crate) min_delay_ms: u64,
    pub(crate) slow_bonus_ms: u64,
    pub(crate) slow_duration_ms: u64,
    pub(crate) level_advance_delay_ms: u64,
    pub(crate) intro_duration_ms: u64,
    pub(crate) replay_after_final_win: bool,
    pub(crate) frames_per_second: u32,
}

impl Default for ConfigFile {
    fn default() -> Self {
        let rules = Rules::default();
        Self {
            cheese_per_level: rules.cheese_per_level,
            powerups_per_level: rules.powerups_per_level,
            initial_delay_ms: millis(rules.initial_delay),
            min_delay_ms: millis(rules.min_delay),
            slow_bonus_ms: millis(rules.slow_bonus),
            slow_duration_ms: millis(rules.slow_duration),
            level_advance_delay_ms: millis(rules.level_advance_delay),
            intro_duration_ms: millis(rules.intro_duration),
            replay_after_final_win: rules.replay_after_final_win,
            frames_per_second: DEFAULT_FRAMES_PER_SECOND,
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl ConfigFile {
    /// Reads and parses the file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub(crate) fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Checks the values and converts them into runtime settings.
    pub(crate) fn into_settings(self) -> Result<Settings, ConfigError> {
        if self.frames_per_second == 0 {
            return Err(ConfigError::ZeroFrameRate);
        }

        let rules = Rules {
            cheese_per_level: self.cheese_per_level,
            powerups_per_level: self.powerups_per_level,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            min_delay: Duration::from_millis(self.min_delay_ms),
            slow_bonus: Duration::from_millis(self.slow_bonus_ms),
            slow_duration: Duration::from_millis(self.slow_duration_ms),
            level_advance_delay: Duration::from_millis(self.level_advance_delay_ms),
            intro_duration: Duration::from_millis(self.intro_duration_ms),
            replay_after_final_win: self.replay_after_final_win,
        };
        rules.validate()?;

        Ok(Settings {
            rules,
            frames_per_second: self.frames_per_second,
        })
    }
}

/// Validated settings the session runs with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Settings {
    pub(crate) rules: Rules,
    pub(crate) frames_per_second: u32,
}

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {}", path.display())]
    Io {
        /// File that was requested.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// The file is not valid TOML for this schema.
    #[error("malformed configuration")]
    Parse(#[from] toml::de::Error),
    /// The tunables are inconsistent.
    #[error("invalid gameplay rules")]
    Invalid(#[from] RulesError),
    /// Frames would never be presented.
    #[error("frame rate must be positive")]
    ZeroFrameRate,
}
