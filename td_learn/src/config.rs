use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ALPHA: f64 = 0.99;
pub const EPSILON: f64 = 0.01;
pub const TRAINING_LOSS_VALUE: f64 = -1.0;
pub const NUM_EPISODES: usize = 100_000;
pub const EVAL_INTERVAL: usize = 20_000;
pub const EVAL_GAMES: usize = 100;

/// Learning parameters of a single agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentConfig {
    pub alpha: f64,
    pub epsilon: f64,
    pub loss_value: f64,
    pub learning: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            alpha: ALPHA,
            epsilon: EPSILON,
            loss_value: 0.0,
            learning: true,
        }
    }
}

impl AgentConfig {
    /// Uniformly random, never learns.
    pub fn random() -> Self {
        AgentConfig {
            epsilon: 1.0,
            learning: false,
            ..Self::default()
        }
    }
}

/// Training run settings, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub episodes: usize,
    pub eval_interval: usize,
    pub eval_games: usize,
    pub alpha: f64,
    pub epsilon: f64,
    pub loss_value: f64,
    /// Also play a random X against the O learner every episode.
    pub train_against_random: bool,
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            episodes: NUM_EPISODES,
            eval_interval: EVAL_INTERVAL,
            eval_games: EVAL_GAMES,
            alpha: ALPHA,
            epsilon: EPSILON,
            loss_value: TRAINING_LOSS_VALUE,
            train_against_random: true,
            seed: None,
        }
    }
}

impl TrainingConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: TrainingConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Falls back to defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            log::warn!("config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(ConfigError::Validation("alpha must be in (0, 1]".into()));
        }
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(ConfigError::Validation("epsilon must be in [0, 1]".into()));
        }
        if !self.loss_value.is_finite() {
            return Err(ConfigError::Validation("loss_value must be finite".into()));
        }
        if self.episodes == 0 {
            return Err(ConfigError::Validation("episodes must be > 0".into()));
        }
        if self.eval_interval == 0 {
            return Err(ConfigError::Validation("eval_interval must be > 0".into()));
        }
        if self.eval_games == 0 {
            return Err(ConfigError::Validation("eval_games must be > 0".into()));
        }
        Ok(())
    }

    pub fn learner(&self) -> AgentConfig {
        AgentConfig {
            alpha: self.alpha,
            epsilon: self.epsilon,
            loss_value: self.loss_value,
            learning: true,
        }
    }

    /// Seed for the agent in `slot`, if the run is seeded.
    pub fn seed_for(&self, slot: u64) -> Option<u64> {
        self.seed.map(|seed| seed.wrapping_add(slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn is_default_config_valid() {
        let config = TrainingConfig::default();
        config.validate().unwrap();
        assert_eq!(config.episodes, 100_000);
        assert_eq!(config.eval_interval, 20_000);
        assert_eq!(config.learner().loss_value, -1.0);
        assert_eq!(AgentConfig::default().loss_value, 0.0);
    }

    #[test]
    fn is_validation_rejecting_bad_values() {
        let config = TrainingConfig {
            alpha: 0.0,
            ..TrainingConfig::default()
        };
        assert!(config.validate().is_err());
        let config = TrainingConfig {
            epsilon: 1.5,
            ..TrainingConfig::default()
        };
        assert!(config.validate().is_err());
        let config = TrainingConfig {
            eval_games: 0,
            ..TrainingConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn is_partial_toml_filled_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "episodes = 500\nepsilon = 0.1\nseed = 7").unwrap();
        let config = TrainingConfig::load(file.path()).unwrap();
        assert_eq!(config.episodes, 500);
        assert_eq!(config.epsilon, 0.1);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.eval_games, EVAL_GAMES);
        assert_eq!(config.seed_for(2), Some(9));
    }

    #[test]
    fn is_missing_file_falling_back() {
        let dir = tempfile::tempdir().unwrap();
        let config = TrainingConfig::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, TrainingConfig::default());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "alpha = 2.0").unwrap();
        assert!(matches!(
            TrainingConfig::load(file.path()),
            Err(ConfigError::Validation(_))
        ));
    }
}
