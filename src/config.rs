// Application configuration loaded from a JSON file

use crate::error::{Result, SteadyEmotionError};
use crate::feedback::DEFAULT_TINT_ALPHA;
use crate::stabilizer::StabilizerConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub schema_version: u32,

    // Smoothing
    pub window_capacity: usize,
    pub cooldown_secs: f64,

    // Feedback
    pub feedback_seed: Option<u64>,
    pub tint_alpha: f32,

    /// Frames buffered between the label reader and the session loop
    pub channel_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        let stabilizer = StabilizerConfig::default();
        Self {
            schema_version: 1,
            window_capacity: stabilizer.window_capacity,
            cooldown_secs: stabilizer.cooldown_secs,
            feedback_seed: None,
            tint_alpha: DEFAULT_TINT_ALPHA,
            channel_capacity: 32,
        }
    }
}

impl Config {
    /// Load config from file, or defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.stabilizer().validate()?;
        if !(0.0..=1.0).contains(&self.tint_alpha) {
            return Err(SteadyEmotionError::Config(format!(
                "tint_alpha must be within [0, 1], got {}",
                self.tint_alpha
            )));
        }
        if self.channel_capacity == 0 {
            return Err(SteadyEmotionError::Config(
                "channel_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn stabilizer(&self) -> StabilizerConfig {
        StabilizerConfig {
            window_capacity: self.window_capacity,
            cooldown_secs: self.cooldown_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.schema_version, 1);
        assert_eq!(config.window_capacity, 10);
        assert_eq!(config.cooldown_secs, 5.0);
        assert_eq!(config.tint_alpha, 0.3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = Config {
            window_capacity: 4,
            cooldown_secs: 2.5,
            feedback_seed: Some(9),
            ..Config::default()
        };
        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "cooldown_secs": 1.0 }"#).unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.cooldown_secs, 1.0);
        assert_eq!(config.window_capacity, 10);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "window_capacity": 0 }"#).unwrap();
        assert!(matches!(
            Config::load(&path),
            Err(SteadyEmotionError::Config(_))
        ));

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(Config::load(&path), Err(SteadyEmotionError::Json(_))));
    }
}
