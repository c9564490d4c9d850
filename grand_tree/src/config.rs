//! Application configuration.
//!
//! Everything has a default, so the app runs with no file at all.  A YAML
//! file passed with `--config` may override any subset of fields:
//!
//! ```yaml
//! scene:
//!   foliage_count: 8000
//!   seed: 42
//!   camera:
//!     orbit_radius: 30.0
//! observation:
//!   interval_ms: 800
//!   classifier: remote
//!   remote:
//!     frame_path: /tmp/webcam.jpg
//! window:
//!   width: 1280
//!   height: 720
//! ```
//!
//! The API key is never read from the file; it comes from
//! `GRAND_TREE_API_KEY` or, failing that, `GEMINI_API_KEY`.
//! `GRAND_TREE_CLASSIFIER_URL` overrides the endpoint.

use std::path::{Path, PathBuf};

use formation_core::SceneConfig;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path:   PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scene:       SceneConfig,
    pub observation: ObservationConfig,
    pub window:      WindowConfig,
}

impl AppConfig {
    /// Load from a YAML file, then apply environment overrides.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yaml::from_str(yaml)?;
        config.observation.remote.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.observation.remote.apply_env_overrides();
        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.observation.interval_ms == 0 {
            return Err(ConfigError::Invalid("observation.interval_ms must be at least 1".to_owned()));
        }
        if self.window.width < 64 || self.window.height < 64 {
            return Err(ConfigError::Invalid("window must be at least 64×64".to_owned()));
        }
        if !(self.scene.tree.height > 0.0) || !(self.scene.tree.radius > 0.0) {
            return Err(ConfigError::Invalid("scene.tree height and radius must be positive".to_owned()));
        }
        if !(self.scene.progress_rate > 0.0) {
            return Err(ConfigError::Invalid("scene.progress_rate must be positive".to_owned()));
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Observation
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    /// Keyboard + mouse in the viewer window.
    #[default]
    Sim,
    /// Vision API over HTTP (feature `remote`).
    Remote,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ObservationConfig {
    /// Nominal polling period.  Ticks that land while a request is
    /// outstanding are skipped.
    pub interval_ms: u64,
    pub classifier:  ClassifierKind,
    pub remote:      RemoteConfig,
}

impl Default for ObservationConfig {
    fn default() -> Self {
        ObservationConfig {
            interval_ms: 800,
            classifier:  ClassifierKind::Sim,
            remote:      RemoteConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub endpoint:   String,
    pub model:      String,
    #[serde(skip)]
    pub api_key:    Option<String>,
    pub timeout_ms: u64,
    /// Image file re-read on every poll.
    pub frame_path: PathBuf,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            endpoint:   "https://generativelanguage.googleapis.com/v1beta".to_owned(),
            model:      "gemini-2.5-flash".to_owned(),
            api_key:    None,
            timeout_ms: 5_000,
            frame_path: PathBuf::from("frame.jpg"),
        }
    }
}

impl RemoteConfig {
    fn apply_env_overrides(&mut self) {
        self.api_key = std::env::var("GRAND_TREE_API_KEY")
            .or_else(|_| std::env::var("GEMINI_API_KEY"))
            .ok()
            .filter(|k| !k.trim().is_empty());
        if let Ok(url) = std::env::var("GRAND_TREE_CLASSIFIER_URL") {
            if !url.trim().is_empty() {
                self.endpoint = url;
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Window
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width:  usize,
    pub height: usize,
    /// Frame-rate cap.
    pub fps:    u32,
    /// Film grain + vignette.
    pub postfx: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig { width: 1200, height: 800, fps: 60, postfx: true }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_is_all_defaults() {
        let cfg = AppConfig::parse("{}").unwrap();
        assert_eq!(cfg.scene, SceneConfig::default());
        assert_eq!(cfg.observation.interval_ms, 800);
        assert_eq!(cfg.observation.classifier, ClassifierKind::Sim);
        assert_eq!(cfg.window.width, 1200);
    }

    #[test]
    fn partial_override() {
        let cfg = AppConfig::parse(
            "scene:\n  ornament_count: 12\n  seed: 3\n  camera:\n    orbit_radius: 30.0\n\
             observation:\n  classifier: remote\n  remote:\n    frame_path: /tmp/cam.jpg\n",
        ).unwrap();
        assert_eq!(cfg.scene.ornament_count, 12);
        assert_eq!(cfg.scene.foliage_count, 15_000);
        assert_eq!(cfg.scene.seed, Some(3));
        assert_eq!(cfg.scene.camera.orbit_radius, 30.0);
        assert_eq!(cfg.scene.camera.orbit_rate, 0.2);
        assert_eq!(cfg.observation.classifier, ClassifierKind::Remote);
        assert_eq!(cfg.observation.remote.frame_path, PathBuf::from("/tmp/cam.jpg"));
        assert_eq!(cfg.observation.remote.model, "gemini-2.5-flash");
    }

    #[test]
    fn rejects_zero_interval() {
        let err = AppConfig::parse("observation:\n  interval_ms: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_degenerate_tree() {
        let err = AppConfig::parse("scene:\n  tree:\n    height: 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn bad_yaml_is_reported() {
        assert!(matches!(AppConfig::parse("scene: [1, 2"), Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = AppConfig::from_file(Path::new("/nonexistent/grand_tree.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
