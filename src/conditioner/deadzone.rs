//! Deadzone math for analog sticks and triggers
//!
//! Raw stick readings never rest at exactly `(0, 0)`. Worn potentiometers drift
//! a few percent around the center, and that noise would otherwise reach the
//! game as intentional input. The functions here suppress it.
//!
//! # Modes
//!
//! ```text
//! Off           sample passes through untouched
//! AxialClip     square dead zone, each axis clipped on its own, no rescale
//! CircularClip  round dead zone, no rescale
//! Rescaled      round dead zone, [radius, 1] mapped linearly onto [0, 1]
//! ```
//!
//! `CircularClip` keeps the magnitude jump at the dead-zone boundary. Only
//! `Rescaled` gives a continuous response right outside the dead zone.
//!
//! Applying `Rescaled` to its own output is not a no-op: the second pass
//! applies the dead zone again to an already shrunk vector.

use serde::{Deserialize, Serialize};

/// One analog reading of a stick or D-pad, each component nominally in `[-1, 1]`
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisSample {
    pub x: f32,
    pub y: f32,
}

impl AxisSample {
    pub const ZERO: AxisSample = AxisSample { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean length of the sample
    pub fn magnitude(&self) -> f32 {
        self.x.hypot(self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    fn scaled(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

impl From<(f32, f32)> for AxisSample {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

/// How small-magnitude noise near the rest position is suppressed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadzoneMode {
    Off,
    AxialClip,
    #[default]
    CircularClip,
    Rescaled,
}

/// Applies a dead zone of the given `radius` to a stick sample
///
/// `radius` is expected in `[0, 1)`; [`ConditionerConfig`](crate::config::ConditionerConfig)
/// guarantees that for configured values. Non-finite samples always come back
/// as [`AxisSample::ZERO`], whatever the mode.
///
/// # Examples
///
/// ```rust
/// use axis_conditioner::conditioner::deadzone::{apply_deadzone, AxisSample, DeadzoneMode};
///
/// let out = apply_deadzone(AxisSample::new(0.5, 0.0), DeadzoneMode::Rescaled, 0.25);
/// assert!((out.x - 1.0 / 3.0).abs() < 1e-6);
/// assert_eq!(out.y, 0.0);
/// ```
pub fn apply_deadzone(sample: AxisSample, mode: DeadzoneMode, radius: f32) -> AxisSample {
    if !sample.is_finite() {
        return AxisSample::ZERO;
    }

    match mode {
        DeadzoneMode::Off => sample,
        DeadzoneMode::AxialClip => AxisSample::new(
            clip_component(sample.x, radius),
            clip_component(sample.y, radius),
        ),
        DeadzoneMode::CircularClip => {
            if sample.magnitude() < radius {
                AxisSample::ZERO
            } else {
                sample
            }
        }
        DeadzoneMode::Rescaled => rescale(sample, radius),
    }
}

fn clip_component(value: f32, radius: f32) -> f32 {
    if value.abs() < radius {
        0.0
    } else {
        value
    }
}

fn rescale(sample: AxisSample, radius: f32) -> AxisSample {
    let magnitude = sample.magnitude();
    // magnitude 0 only survives the radius check when radius is 0
    if magnitude < radius || magnitude == 0.0 {
        return AxisSample::ZERO;
    }

    let new_magnitude = ((magnitude - radius) / (1.0 - radius)).min(1.0);
    sample.scaled(new_magnitude / magnitude)
}

/// Zeroes a trigger value below `threshold`, passes it through otherwise
///
/// Triggers are consumed as a continuous value above the threshold, so there
/// is no rescaling. Non-finite values read as `0.0`.
pub fn apply_trigger_threshold(value: f32, threshold: f32) -> f32 {
    if !value.is_finite() || value < threshold {
        0.0
    } else {
        value
    }
}
