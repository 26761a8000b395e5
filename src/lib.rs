//! Dead-zone correction and button edge detection for gamepad input
//!
//! - [`conditioner`] - Pure per-cycle math and per-player button state
//! - [`config`] - Validated configuration and its TOML file format
//! - [`driver`] - gilrs-backed polling loop feeding the conditioner

pub mod conditioner;
pub mod config;
pub mod driver;

pub use conditioner::{
    apply_deadzone, apply_trigger_threshold, AxisConditioner, AxisSample, ButtonEdge, ButtonId,
    DeadzoneMode, PlayerFrame, PlayerId, RawPlayerInput,
};
pub use config::{ConditionerConfig, ConditionerSettings, ConfigurationError};
