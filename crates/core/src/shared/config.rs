use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::detection::domain::face_eye_detector::FaceInput;
use crate::detection::infrastructure::cascade_classifier::DetectionParams;
use crate::detection::infrastructure::detector_factory::DetectorSettings;
use crate::pipeline::live_detection_use_case::{EscapeAction, LoopSettings};
use crate::shared::constants::{
    DEFAULT_DEVICE_INDEX, DEFAULT_DISPLAY_HEIGHT, DEFAULT_DISPLAY_WIDTH, DEFAULT_KEY_POLL_MS,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Settings for one capture session. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Face cascade file; resolved from cache or downloaded when unset.
    pub face_cascade: Option<PathBuf>,
    pub eye_cascade: Option<PathBuf>,
    /// Directory searched for cascades by file name before downloading.
    pub cascade_dir: Option<PathBuf>,
    pub device_index: i32,
    pub display_width: i32,
    pub display_height: i32,
    pub key_poll_ms: i32,
    pub escape_action: EscapeAction,
    pub face_input: FaceInput,
    pub face_params: DetectionParams,
    pub eye_params: DetectionParams,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            face_cascade: None,
            eye_cascade: None,
            cascade_dir: None,
            device_index: DEFAULT_DEVICE_INDEX,
            display_width: DEFAULT_DISPLAY_WIDTH,
            display_height: DEFAULT_DISPLAY_HEIGHT,
            key_poll_ms: DEFAULT_KEY_POLL_MS,
            escape_action: EscapeAction::default(),
            face_input: FaceInput::default(),
            face_params: DetectionParams::default(),
            eye_params: DetectionParams::default(),
        }
    }
}

impl AppConfig {
    /// `<config_dir>/FaceCam/config.json`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("FaceCam").join("config.json"))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `path` if given (it must exist). Otherwise loads the default
    /// location when a file is there, and falls back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(default) if default.is_file() => {
                log::debug!("Loading config from {}", default.display());
                Self::load(&default)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device_index < 0 {
            return Err(ConfigError::Invalid(format!(
                "device index must be non-negative, got {}",
                self.device_index
            )));
        }
        if self.display_width <= 0 || self.display_height <= 0 {
            return Err(ConfigError::Invalid(format!(
                "display size must be positive, got {}x{}",
                self.display_width, self.display_height
            )));
        }
        if self.key_poll_ms <= 0 {
            return Err(ConfigError::Invalid(format!(
                "key poll timeout must be positive, got {}ms",
                self.key_poll_ms
            )));
        }
        self.face_params
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("face_params: {e}")))?;
        self.eye_params
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("eye_params: {e}")))?;
        Ok(())
    }

    pub fn detector_settings(&self) -> DetectorSettings {
        DetectorSettings {
            face_params: self.face_params,
            eye_params: self.eye_params,
            face_input: self.face_input,
        }
    }

    pub fn loop_settings(&self) -> LoopSettings {
        LoopSettings {
            display_width: self.display_width,
            display_height: self.display_height,
            key_poll_ms: self.key_poll_ms,
            escape_action: self.escape_action,
        }
    }
}
