//! Detector configuration.
//!
//! Configuration comes from an optional JSON file named by
//! `ADLA_DETECT_CONFIG`, with environment-variable overrides applied
//! on top and validation last. Programmatic construction through
//! [`DetectorConfig::new`] is the normal path for embedding hosts.

use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_MODEL_HEIGHT: u32 = 320;
const DEFAULT_MODEL_WIDTH: u32 = 320;
const DEFAULT_MODEL_CHANNELS: u32 = 3;
const DEFAULT_SCORE_THRESHOLD: f32 = 0.4;

#[derive(Debug, Deserialize, Default)]
struct DetectorConfigFile {
    model: Option<ModelConfigFile>,
    score_threshold: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
struct ModelConfigFile {
    path: Option<PathBuf>,
    height: Option<u32>,
    width: Option<u32>,
    channels: Option<u32>,
}

/// Resolved detector configuration.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Filesystem path to the compiled model artifact.
    pub model_path: PathBuf,
    /// Model input height in pixels.
    pub height: u32,
    /// Model input width in pixels.
    pub width: u32,
    /// Model input channels. The backend consumes dense HWC bytes.
    pub channels: u32,
    /// Decoding stops at the first record scoring below this.
    pub score_threshold: f32,
}

impl DetectorConfig {
    /// Configuration with defaults for channels and score threshold.
    pub fn new(model_path: impl Into<PathBuf>, height: u32, width: u32) -> Self {
        Self {
            model_path: model_path.into(),
            height,
            width,
            channels: DEFAULT_MODEL_CHANNELS,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
        }
    }

    pub fn with_score_threshold(mut self, threshold: f32) -> Self {
        self.score_threshold = threshold;
        self
    }

    /// Load from the file named by `ADLA_DETECT_CONFIG` (if set), then
    /// apply environment overrides, then validate.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("ADLA_DETECT_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default())?;
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Expected input tensor size in bytes.
    pub fn tensor_len(&self) -> usize {
        self.height as usize * self.width as usize * self.channels as usize
    }

    fn from_file(file: DetectorConfigFile) -> Result<Self> {
        let model = file.model.unwrap_or_default();
        let model_path = model
            .path
            .ok_or_else(|| anyhow!("no model path provided"))?;
        Ok(Self {
            model_path,
            height: model.height.unwrap_or(DEFAULT_MODEL_HEIGHT),
            width: model.width.unwrap_or(DEFAULT_MODEL_WIDTH),
            channels: model.channels.unwrap_or(DEFAULT_MODEL_CHANNELS),
            score_threshold: file.score_threshold.unwrap_or(DEFAULT_SCORE_THRESHOLD),
        })
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(path) = std::env::var("ADLA_MODEL_PATH") {
            if !path.trim().is_empty() {
                self.model_path = PathBuf::from(path);
            }
        }
        if let Ok(height) = std::env::var("ADLA_MODEL_HEIGHT") {
            self.height = height
                .parse()
                .map_err(|_| anyhow!("ADLA_MODEL_HEIGHT must be an integer"))?;
        }
        if let Ok(width) = std::env::var("ADLA_MODEL_WIDTH") {
            self.width = width
                .parse()
                .map_err(|_| anyhow!("ADLA_MODEL_WIDTH must be an integer"))?;
        }
        if let Ok(threshold) = std::env::var("ADLA_SCORE_THRESHOLD") {
            self.score_threshold = threshold
                .parse()
                .map_err(|_| anyhow!("ADLA_SCORE_THRESHOLD must be a number"))?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.height == 0 || self.width == 0 || self.channels == 0 {
            return Err(anyhow!("model dimensions must be greater than zero"));
        }
        if !(0.0..=1.0).contains(&self.score_threshold) {
            return Err(anyhow!("score threshold must be within 0.0..=1.0"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<DetectorConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}
