use crate::ease::{get_easing, EasingStyle};
use crate::generator::{GeneratorOptions, WaveInput};
use crate::platform::{CanvasTarget, Platform};
use crate::wave::{generate_random_config_with, validate_config, WaveConfig, WaveError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A single wave in a scene file. Every field is optional, as in [`WaveConfig`].
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct WaveEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amplitude: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wavelength: Option<f64>,

    /// Stroke color, the generator's gradient is used when missing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_style: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment_length: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing: Option<EasingStyle>,

    /// Rotation in degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate: Option<f64>,
}

impl From<WaveEntry> for WaveConfig {
    fn from(entry: WaveEntry) -> Self {
        Self {
            phase: entry.phase,
            speed: entry.speed,
            amplitude: entry.amplitude,
            wavelength: entry.wavelength,
            stroke_style: entry.stroke_style.map(Some),
            segment_length: entry.segment_length,
            easing: entry.easing.map(|style| Some(get_easing(style))),
            rotate: entry.rotate,
        }
    }
}

impl From<WaveEntry> for WaveInput {
    fn from(entry: WaveEntry) -> Self {
        Self::Config(entry.into())
    }
}

impl WaveInput {
    /// Interpret an untyped JSON value as a wave configuration.
    ///
    /// Anything other than an object is [`WaveInput::Missing`], so adding it to a generator fails
    /// the same way a missing configuration does.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        if !value.is_object() {
            return Ok(Self::Missing);
        }
        let entry: WaveEntry = serde_json::from_value(value)?;
        Ok(entry.into())
    }
}

/// A scene: generator options plus the waves it starts with
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct SceneConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixel_ratio: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pixel_ratio: Option<f64>,

    /// Follow viewport resizes
    #[serde(default = "default_auto_resize")]
    pub auto_resize: bool,

    #[serde(default)]
    pub waves: Vec<WaveEntry>,
}

fn default_auto_resize() -> bool {
    true
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self { pixel_ratio: None, max_pixel_ratio: None, auto_resize: default_auto_resize(), waves: Vec::new() }
    }
}

impl SceneConfig {
    /// Load a scene, picking the format from the file extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default().to_lowercase();
        let scene = match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml(&contents)?,
            "json" => Self::from_json(&contents)?,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };
        Ok(scene)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let scene: Self = serde_yaml::from_str(contents)?;
        scene.validate()?;
        Ok(scene)
    }

    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let scene: Self = serde_json::from_str(contents)?;
        scene.validate()?;
        Ok(scene)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check every wave up front so a bad scene is reported with its position
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (index, entry) in self.waves.iter().enumerate() {
            let config = WaveConfig::from(entry.clone());
            validate_config(&config).map_err(|source| ConfigError::InvalidWave { index, source })?;
        }
        Ok(())
    }

    /// A scene with `count` random waves
    pub fn random(count: usize, rng: &mut fastrand::Rng) -> Self {
        let waves = (0..count)
            .map(|_| {
                let config = generate_random_config_with(rng);
                WaveEntry {
                    phase: config.phase,
                    speed: config.speed,
                    amplitude: config.amplitude,
                    wavelength: config.wavelength,
                    stroke_style: config.stroke_style.flatten(),
                    segment_length: config.segment_length,
                    easing: Some(EasingStyle::SineInOut),
                    rotate: config.rotate,
                }
            })
            .collect();
        Self { waves, ..Default::default() }
    }

    /// JSON schema of scene files
    #[cfg(feature = "json-schema")]
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(SceneConfig)
    }

    /// Generator options drawing on `target`
    pub fn into_options<P: Platform>(self, target: CanvasTarget<P>) -> GeneratorOptions<P> {
        let mut options = GeneratorOptions::new(target).waves(self.waves).auto_resize(self.auto_resize);
        options.pixel_ratio = self.pixel_ratio;
        options.max_pixel_ratio = self.max_pixel_ratio;
        options
    }
}

/// Errors that can occur when loading a scene
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid YAML scene: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON scene: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported scene format: {0}")]
    UnsupportedFormat(String),

    #[error("wave {index}: {source}")]
    InvalidWave { index: usize, source: WaveError },
}
