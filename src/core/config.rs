//! Match configuration.
//!
//! `MatchConfig` holds every tunable rule constant. It can be built in code
//! with the `with_*` builder methods, or loaded from TOML with environment
//! overrides layered on top:
//!
//! ```
//! use duel_rules::core::MatchConfig;
//!
//! let config = MatchConfig::from_toml_str("starting_life = 30\nseed = 9").unwrap();
//! assert_eq!(config.starting_life, 30);
//! assert_eq!(config.max_hand_size, 7);
//!
//! let config = MatchConfig::default().with_turn_limit(Some(12));
//! assert_eq!(config.turn_limit, Some(12));
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Errors raised while loading or validating a [`MatchConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The file was not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value is outside its allowed range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Rule constants for one match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Life each player starts with.
    pub starting_life: i32,
    /// Cards drawn into the opening hand.
    pub starting_hand_size: usize,
    /// Hand size enforced during the cleanup step.
    pub max_hand_size: usize,
    /// Poison counters at which a player loses.
    pub poison_threshold: u32,
    /// Turn after which the match ends as a draw. `None` runs unbounded.
    pub turn_limit: Option<u32>,
    /// Root seed for library shuffles.
    pub seed: u64,
    /// The starting player skips the draw on the first turn.
    pub skip_first_draw: bool,
    /// How often a rejected attack/block declaration is re-requested.
    pub max_declaration_attempts: u32,
    /// How often a holder whose action was rejected is asked again before
    /// the rejection counts as a pass.
    pub max_action_attempts: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            starting_life: 20,
            starting_hand_size: 7,
            max_hand_size: 7,
            poison_threshold: 10,
            turn_limit: Some(100),
            seed: 0,
            skip_first_draw: true,
            max_declaration_attempts: 3,
            max_action_attempts: 3,
        }
    }
}

macro_rules! env_override {
    ($config:expr, $field:ident, $key:expr) => {
        if let Some(v) = std::env::var($key).ok().and_then(|s| s.parse().ok()) {
            debug!(key = $key, "applying environment override");
            $config.$field = v;
        }
    };
    ($config:expr, $field:ident, $key:expr, optional) => {
        if let Some(v) = std::env::var($key).ok().and_then(|s| s.parse().ok()) {
            debug!(key = $key, "applying environment override");
            $config.$field = Some(v);
        }
    };
}

impl MatchConfig {
    /// Set the starting life total.
    #[must_use]
    pub fn with_starting_life(mut self, life: i32) -> Self {
        self.starting_life = life;
        self
    }

    /// Set the opening hand size.
    #[must_use]
    pub fn with_starting_hand_size(mut self, size: usize) -> Self {
        self.starting_hand_size = size;
        self
    }

    /// Set the cleanup-step hand size.
    #[must_use]
    pub fn with_max_hand_size(mut self, size: usize) -> Self {
        self.max_hand_size = size;
        self
    }

    /// Set the poison threshold.
    #[must_use]
    pub fn with_poison_threshold(mut self, threshold: u32) -> Self {
        self.poison_threshold = threshold;
        self
    }

    /// Set or clear the turn limit.
    #[must_use]
    pub fn with_turn_limit(mut self, limit: Option<u32>) -> Self {
        self.turn_limit = limit;
        self
    }

    /// Set the shuffle seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Choose whether the starting player draws on turn one.
    #[must_use]
    pub fn with_skip_first_draw(mut self, skip: bool) -> Self {
        self.skip_first_draw = skip;
        self
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: MatchConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file, then apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        info!(path = %path.display(), "loading match config");
        let config = Self::from_toml_str(&text)?.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply `DUEL_*` environment variable overrides.
    #[must_use]
    pub fn apply_env_overrides(mut self) -> Self {
        env_override!(self, seed, "DUEL_SEED");
        env_override!(self, turn_limit, "DUEL_TURN_LIMIT", optional);
        env_override!(self, starting_life, "DUEL_STARTING_LIFE");
        env_override!(self, max_hand_size, "DUEL_MAX_HAND_SIZE");
        self
    }

    /// Reject values no match can be played with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.starting_life <= 0 {
            return Err(ConfigError::Invalid(format!(
                "starting_life must be positive, got {}",
                self.starting_life
            )));
        }
        if self.poison_threshold == 0 {
            return Err(ConfigError::Invalid("poison_threshold must be positive".into()));
        }
        if self.max_hand_size == 0 {
            return Err(ConfigError::Invalid("max_hand_size must be positive".into()));
        }
        if self.turn_limit == Some(0) {
            return Err(ConfigError::Invalid("turn_limit of zero never starts a turn".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MatchConfig::default();
        assert_eq!(config.starting_life, 20);
        assert_eq!(config.poison_threshold, 10);
        assert!(config.skip_first_draw);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = MatchConfig::from_toml_str("turn_limit = 40\nskip_first_draw = false").unwrap();
        assert_eq!(config.turn_limit, Some(40));
        assert!(!config.skip_first_draw);
        assert_eq!(config.starting_hand_size, 7);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = MatchConfig::from_toml_str("starting_life = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = MatchConfig::from_toml_str("poison_threshold = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_parse_error() {
        let err = MatchConfig::from_toml_str("starting_life = \"lots\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = MatchConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_builder() {
        let config = MatchConfig::default()
            .with_starting_life(8)
            .with_seed(77)
            .with_max_hand_size(5)
            .with_starting_hand_size(3)
            .with_poison_threshold(3)
            .with_skip_first_draw(false);
        assert_eq!(config.starting_life, 8);
        assert_eq!(config.seed, 77);
        assert_eq!(config.max_hand_size, 5);
        assert_eq!(config.starting_hand_size, 3);
        assert_eq!(config.poison_threshold, 3);
    }
}
