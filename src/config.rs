use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::classifier::ClassifierConfig;
use crate::detector::{DetectorConfig, MAX_HANDS};
use crate::error::ConfigError;
use crate::render::RenderOptions;

pub const DEFAULT_TARGET_FPS: u32 = 60;
pub const MAX_TARGET_FPS: u32 = 240;
pub const DEFAULT_READY_TIMEOUT_MS: u64 = 5000;

/// What the loop does when a tick fails after start-up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TickErrorPolicy {
    /// Log, report to the sink and keep ticking.
    #[default]
    Continue,
    /// End the loop and surface the error from the handle.
    Abort,
}

/// Pipeline configuration, stored as camelCase JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
    pub detector: DetectorConfig,
    pub classifier: ClassifierConfig,
    pub render: RenderOptions,
    pub target_fps: u32,
    pub ready_timeout_ms: u64,
    pub on_tick_error: TickErrorPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            detector: DetectorConfig::default(),
            classifier: ClassifierConfig::default(),
            render: RenderOptions::default(),
            target_fps: DEFAULT_TARGET_FPS,
            ready_timeout_ms: DEFAULT_READY_TIMEOUT_MS,
            on_tick_error: TickErrorPolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Load and validate a config file, returning defaults on missing file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save to disk atomically (write .tmp then rename).
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &json)?;
        std::fs::rename(&tmp_path, path)?;

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_HANDS).contains(&self.detector.max_hands) {
            return Err(ConfigError::Invalid(format!(
                "maxHands must be between 1 and {MAX_HANDS}, got {}",
                self.detector.max_hands
            )));
        }
        if self.detector.solution_path.trim().is_empty() {
            return Err(ConfigError::Invalid("solutionPath is empty".to_string()));
        }
        if self.classifier.model_url.trim().is_empty() {
            return Err(ConfigError::Invalid("modelUrl is empty".to_string()));
        }
        if !(1..=MAX_TARGET_FPS).contains(&self.target_fps) {
            return Err(ConfigError::Invalid(format!(
                "targetFps must be between 1 and {MAX_TARGET_FPS}, got {}",
                self.target_fps
            )));
        }
        if self.ready_timeout_ms == 0 {
            return Err(ConfigError::Invalid("readyTimeoutMs must be positive".to_string()));
        }
        Ok(())
    }

    /// Period of the frame clock.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.target_fps.max(1)))
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::ModelType;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_capture_settings() {
        let config = PipelineConfig::default();
        assert_eq!(config.target_fps, 60);
        assert_eq!(config.ready_timeout_ms, 5000);
        assert_eq!(config.on_tick_error, TickErrorPolicy::Continue);
        assert!(!config.render.show_labels);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_returns_default_when_file_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nonexistent.json");
        let config = PipelineConfig::load(&path).unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn load_parses_partial_json_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("libras.json");
        let json = r#"{"targetFps":30,"onTickError":"abort","detector":{"modelType":"full"},"render":{"showLabels":true}}"#;
        std::fs::write(&path, json).unwrap();

        let config = PipelineConfig::load(&path).unwrap();
        assert_eq!(config.target_fps, 30);
        assert_eq!(config.on_tick_error, TickErrorPolicy::Abort);
        assert_eq!(config.detector.model_type, ModelType::Full);
        assert_eq!(config.detector.max_hands, 2);
        assert!(config.render.show_labels);
        assert_eq!(config.ready_timeout_ms, 5000);
    }

    #[test]
    fn load_returns_error_for_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("libras.json");
        std::fs::write(&path, "not valid json!!!").unwrap();

        let result = PipelineConfig::load(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn load_rejects_out_of_range_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("libras.json");
        std::fs::write(&path, r#"{"targetFps":0}"#).unwrap();

        let result = PipelineConfig::load(&path);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn save_then_load_preserves_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("libras.json");
        let config = PipelineConfig {
            target_fps: 24,
            on_tick_error: TickErrorPolicy::Abort,
            ..PipelineConfig::default()
        };

        config.save(&path).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(PipelineConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn saved_file_uses_camelcase_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("libras.json");
        PipelineConfig::default().save(&path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["targetFps"], 60);
        assert_eq!(json["readyTimeoutMs"], 5000);
        assert_eq!(json["onTickError"], "continue");
        assert_eq!(json["classifier"]["modelUrl"], crate::classifier::DEFAULT_MODEL_URL);
    }

    #[test]
    fn validate_rejects_three_hands() {
        let mut config = PipelineConfig::default();
        config.detector.max_hands = 3;
        assert!(config.validate().is_err());
        config.detector.max_hands = 0;
        assert!(config.validate().is_err());
        config.detector.max_hands = 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_model_locations() {
        let mut config = PipelineConfig::default();
        config.classifier.model_url = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.detector.solution_path.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_ready_timeout() {
        let config = PipelineConfig {
            ready_timeout_ms: 0,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn frame_interval_follows_target_fps() {
        let config = PipelineConfig {
            target_fps: 50,
            ..PipelineConfig::default()
        };
        assert_eq!(config.frame_interval(), Duration::from_millis(20));
        assert_eq!(config.ready_timeout(), Duration::from_secs(5));
    }
}
