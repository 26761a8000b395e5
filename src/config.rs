//! Conditioner configuration
//!
//! Two layers:
//!
//! - [`ConditionerSettings`] is what lives on disk as TOML. Every field is
//!   optional and falls back to the defaults of [`ConditionerConfig`].
//! - [`ConditionerConfig`] is the validated, immutable result. It is built once
//!   at startup and only read afterwards.
//!
//! ```toml
//! deadzone_mode = "rescaled"
//! deadzone_radius = 0.25
//! trigger_threshold = 0.2
//! edge_detection = true
//! poll_interval_ms = 16
//! ```

use crate::conditioner::deadzone::DeadzoneMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_DEADZONE_RADIUS: f32 = 0.25;
pub const DEFAULT_TRIGGER_THRESHOLD: f32 = 0.2;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 16;

/// Errors raised while building or loading a configuration
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Deadzone radius {0} is outside [0, 1)")]
    RadiusOutOfRange(f32),

    #[error("Trigger threshold {0} is outside [0, 1)")]
    ThresholdOutOfRange(f32),

    #[error("Poll interval must be at least 1ms")]
    InvalidPollInterval,

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Validated conditioner configuration
///
/// Fields are private so an out-of-range radius or threshold can never reach
/// the per-cycle math.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConditionerConfig {
    mode: DeadzoneMode,
    radius: f32,
    trigger_threshold: f32,
    edge_detection: bool,
}

impl ConditionerConfig {
    /// Builds a configuration, rejecting radius or threshold outside `[0, 1)`
    ///
    /// # Errors
    ///
    /// * [`ConfigurationError::RadiusOutOfRange`] - `radius` is NaN, negative or `>= 1`
    /// * [`ConfigurationError::ThresholdOutOfRange`] - same for `trigger_threshold`
    pub fn new(
        mode: DeadzoneMode,
        radius: f32,
        trigger_threshold: f32,
        edge_detection: bool,
    ) -> Result<Self, ConfigurationError> {
        if !in_unit_range(radius) {
            return Err(ConfigurationError::RadiusOutOfRange(radius));
        }
        if !in_unit_range(trigger_threshold) {
            return Err(ConfigurationError::ThresholdOutOfRange(trigger_threshold));
        }

        Ok(Self {
            mode,
            radius,
            trigger_threshold,
            edge_detection,
        })
    }

    pub fn mode(&self) -> DeadzoneMode {
        self.mode
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn trigger_threshold(&self) -> f32 {
        self.trigger_threshold
    }

    /// Whether `just_pressed`/`just_released` are tracked at all
    pub fn edge_detection(&self) -> bool {
        self.edge_detection
    }
}

impl Default for ConditionerConfig {
    fn default() -> Self {
        Self {
            mode: DeadzoneMode::CircularClip,
            radius: DEFAULT_DEADZONE_RADIUS,
            trigger_threshold: DEFAULT_TRIGGER_THRESHOLD,
            edge_detection: true,
        }
    }
}

fn in_unit_range(value: f32) -> bool {
    // NaN fails both comparisons
    value >= 0.0 && value < 1.0
}

/// On-disk shape of the configuration
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ConditionerSettings {
    pub deadzone_mode: DeadzoneMode,
    pub deadzone_radius: f32,
    pub trigger_threshold: f32,
    pub edge_detection: bool,
    /// Pause between two polling cycles of the driver
    pub poll_interval_ms: u64,
}

impl Default for ConditionerSettings {
    fn default() -> Self {
        let config = ConditionerConfig::default();
        Self {
            deadzone_mode: config.mode,
            deadzone_radius: config.radius,
            trigger_threshold: config.trigger_threshold,
            edge_detection: config.edge_detection,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl ConditionerSettings {
    /// `<config dir>/axis-conditioner/config.toml`, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("axis-conditioner").join("config.toml"))
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigurationError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        debug!("Loading conditioner settings from {}", path.display());
        let content = fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigurationError> {
        if !path.exists() {
            info!(
                "No configuration at {}, using default settings",
                path.display()
            );
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn poll_interval(&self) -> Result<Duration, ConfigurationError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigurationError::InvalidPollInterval);
        }
        Ok(Duration::from_millis(self.poll_interval_ms))
    }
}

impl TryFrom<&ConditionerSettings> for ConditionerConfig {
    type Error = ConfigurationError;

    fn try_from(settings: &ConditionerSettings) -> Result<Self, Self::Error> {
        ConditionerConfig::new(
            settings.deadzone_mode,
            settings.deadzone_radius,
            settings.trigger_threshold,
            settings.edge_detection,
        )
    }
}

impl TryFrom<ConditionerSettings> for ConditionerConfig {
    type Error = ConfigurationError;

    fn try_from(settings: ConditionerSettings) -> Result<Self, Self::Error> {
        ConditionerConfig::try_from(&settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_documented_values() {
        let config = ConditionerConfig::default();
        assert_eq!(config.mode(), DeadzoneMode::CircularClip);
        assert_eq!(config.radius(), 0.25);
        assert_eq!(config.trigger_threshold(), 0.2);
        assert!(config.edge_detection());
    }

    #[test]
    fn rejects_out_of_range_radius() {
        for radius in [-0.1, 1.0, 1.5, f32::NAN, f32::INFINITY] {
            let result = ConditionerConfig::new(DeadzoneMode::Rescaled, radius, 0.2, true);
            assert!(matches!(result, Err(ConfigurationError::RadiusOutOfRange(_))));
        }
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let result = ConditionerConfig::new(DeadzoneMode::Rescaled, 0.1, 1.0, true);
        assert!(matches!(
            result,
            Err(ConfigurationError::ThresholdOutOfRange(t)) if t == 1.0
        ));
    }

    #[test]
    fn accepts_zero_and_just_below_one() {
        assert!(ConditionerConfig::new(DeadzoneMode::Off, 0.0, 0.0, false).is_ok());
        assert!(ConditionerConfig::new(DeadzoneMode::Off, 0.99, 0.99, false).is_ok());
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let settings = ConditionerSettings::from_toml(
            r#"
            deadzone_mode = "axial_clip"
            deadzone_radius = 0.1
            "#,
        )
        .unwrap();

        assert_eq!(settings.deadzone_mode, DeadzoneMode::AxialClip);
        assert_eq!(settings.deadzone_radius, 0.1);
        assert_eq!(settings.trigger_threshold, DEFAULT_TRIGGER_THRESHOLD);
        assert_eq!(settings.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
    }

    #[test]
    fn unknown_mode_is_a_parse_error() {
        let result = ConditionerSettings::from_toml(r#"deadzone_mode = "hexagonal""#);
        assert!(matches!(result, Err(ConfigurationError::Parse(_))));
    }

    #[test]
    fn invalid_file_values_fail_conversion() {
        let settings = ConditionerSettings::from_toml("deadzone_radius = 1.2").unwrap();
        assert!(matches!(
            ConditionerConfig::try_from(&settings),
            Err(ConfigurationError::RadiusOutOfRange(_))
        ));
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let settings = ConditionerSettings {
            poll_interval_ms: 0,
            ..Default::default()
        };
        assert!(matches!(
            settings.poll_interval(),
            Err(ConfigurationError::InvalidPollInterval)
        ));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "deadzone_mode = \"rescaled\"\ntrigger_threshold = 0.3").unwrap();

        let settings = ConditionerSettings::load(file.path()).unwrap();
        let config = ConditionerConfig::try_from(settings).unwrap();
        assert_eq!(config.mode(), DeadzoneMode::Rescaled);
        assert_eq!(config.trigger_threshold(), 0.3);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        assert_eq!(
            ConditionerSettings::load_or_default(&path).unwrap(),
            ConditionerSettings::default()
        );
        assert!(matches!(
            ConditionerSettings::load(&path),
            Err(ConfigurationError::Io { .. })
        ));
    }
}
