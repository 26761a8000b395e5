//! Axis conditioning and button edge detection
//!
//! Turns raw per-cycle controller readings into game-ready values:
//!
//! 1. [`deadzone`] - Dead-zone suppression for sticks and threshold for triggers
//! 2. [`button_state`] - Per (player, button) press/release edge tracking
//! 3. [`frame`] - Raw and conditioned per-player bundles
//!
//! # Architecture
//!
//! ```text
//! RawPlayerInput ──► AxisConditioner ──► PlayerFrame
//!                    (config + ButtonTable)
//! ```
//!
//! The conditioner is single-writer: one polling driver calls it once per
//! cycle per player. Everything is synchronous and returns immediately.

pub mod button_state;
pub mod deadzone;
pub mod frame;

pub use button_state::{ButtonEdge, ButtonId, ButtonState, ButtonTable, PlayerId, MAX_PLAYERS};
pub use deadzone::{apply_deadzone, apply_trigger_threshold, AxisSample, DeadzoneMode};
pub use frame::{PlayerFrame, RawPlayerInput};

use crate::config::ConditionerConfig;
use tracing::{debug, info};

/// Applies the configured dead zone, trigger threshold and edge detection
#[derive(Debug, Default)]
pub struct AxisConditioner {
    config: ConditionerConfig,
    buttons: ButtonTable,
}

impl AxisConditioner {
    pub fn new(config: ConditionerConfig) -> Self {
        info!(
            "Creating AxisConditioner: mode={:?}, radius={}, trigger_threshold={}, edge_detection={}",
            config.mode(),
            config.radius(),
            config.trigger_threshold(),
            config.edge_detection()
        );
        Self {
            config,
            buttons: ButtonTable::new(),
        }
    }

    pub fn config(&self) -> &ConditionerConfig {
        &self.config
    }

    /// Dead zone with the configured mode and radius
    pub fn apply_deadzone(&self, sample: AxisSample) -> AxisSample {
        apply_deadzone(sample, self.config.mode(), self.config.radius())
    }

    pub fn apply_trigger_threshold(&self, value: f32) -> f32 {
        apply_trigger_threshold(value, self.config.trigger_threshold())
    }

    /// See [`ButtonTable::poll_button`]. Works regardless of `edge_detection`.
    pub fn poll_button(&mut self, player: PlayerId, button: ButtonId, raw_is_down: bool) -> ButtonEdge {
        self.buttons.poll_button(player, button, raw_is_down)
    }

    pub fn button_state(&self, player: PlayerId, button: ButtonId) -> ButtonState {
        self.buttons.state(player, button)
    }

    /// Drops the stored button states of a disconnected player
    pub fn reset_player(&mut self, player: PlayerId) {
        let dropped = self.buttons.reset_player(player);
        debug!("Reset {}: dropped {} button records", player, dropped);
    }

    /// Conditions one cycle of raw input for `player`
    ///
    /// Sticks and D-pad go through the dead zone, triggers through the
    /// threshold. A trigger button counts as down when its digital input is
    /// down or its conditioned value is above zero. With edge detection off,
    /// only `is_down` is reported and no button state is stored.
    pub fn condition(&mut self, player: PlayerId, raw: &RawPlayerInput) -> PlayerFrame {
        let left_trigger = self.apply_trigger_threshold(raw.left_trigger);
        let right_trigger = self.apply_trigger_threshold(raw.right_trigger);

        let buttons = ButtonId::ALL
            .iter()
            .map(|&button| {
                let raw_is_down = match button {
                    ButtonId::LeftTrigger => raw.is_down(button) || left_trigger > 0.0,
                    ButtonId::RightTrigger => raw.is_down(button) || right_trigger > 0.0,
                    _ => raw.is_down(button),
                };
                let edge = if self.config.edge_detection() {
                    self.poll_button(player, button, raw_is_down)
                } else {
                    ButtonEdge::level(raw_is_down)
                };
                (button, edge)
            })
            .collect();

        PlayerFrame {
            player,
            left_stick: self.apply_deadzone(raw.left_stick),
            right_stick: self.apply_deadzone(raw.right_stick),
            dpad: self.apply_deadzone(raw.dpad),
            left_trigger,
            right_trigger,
            buttons,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rescaled() -> AxisConditioner {
        AxisConditioner::new(ConditionerConfig::new(DeadzoneMode::Rescaled, 0.25, 0.2, true).unwrap())
    }

    #[test]
    fn uses_configured_mode_and_radius() {
        let conditioner = rescaled();
        let out = conditioner.apply_deadzone(AxisSample::new(0.0, -0.5));
        assert!((out.y + 1.0 / 3.0).abs() < 1e-6);
        assert!(conditioner.apply_deadzone(AxisSample::new(0.1, 0.1)).is_zero());
    }

    #[test]
    fn uses_configured_trigger_threshold() {
        let conditioner = rescaled();
        assert_eq!(conditioner.apply_trigger_threshold(0.15), 0.0);
        assert_eq!(conditioner.apply_trigger_threshold(0.3), 0.3);
    }

    #[test]
    fn condition_conditions_every_channel() {
        let mut conditioner = rescaled();
        let raw = RawPlayerInput {
            left_stick: AxisSample::new(0.1, 0.0),
            right_stick: AxisSample::new(1.0, 0.0),
            dpad: AxisSample::new(0.0, 1.0),
            left_trigger: 0.1,
            right_trigger: 0.8,
            ..Default::default()
        }
        .with_button(ButtonId::A, true);

        let frame = conditioner.condition(PlayerId::P1, &raw);
        assert_eq!(frame.player, PlayerId::P1);
        assert!(frame.left_stick.is_zero());
        assert!((frame.right_stick.x - 1.0).abs() < 1e-6);
        assert!((frame.dpad.y - 1.0).abs() < 1e-6);
        assert_eq!(frame.left_trigger, 0.0);
        assert_eq!(frame.right_trigger, 0.8);
        assert!(frame.just_pressed(ButtonId::A));
        assert!(!frame.is_down(ButtonId::B));
        assert_eq!(frame.buttons.len(), ButtonId::ALL.len());
    }

    #[test]
    fn trigger_past_threshold_presses_trigger_button() {
        let mut conditioner = rescaled();
        let mut raw = RawPlayerInput {
            right_trigger: 0.5,
            ..Default::default()
        };

        let frame = conditioner.condition(PlayerId::P1, &raw);
        assert!(frame.just_pressed(ButtonId::RightTrigger));
        assert!(!frame.is_down(ButtonId::LeftTrigger));

        raw.right_trigger = 0.1;
        let frame = conditioner.condition(PlayerId::P1, &raw);
        assert!(frame.just_released(ButtonId::RightTrigger));
    }

    #[test]
    fn disabled_edge_detection_reports_level_only() {
        let config = ConditionerConfig::new(DeadzoneMode::Off, 0.0, 0.0, false).unwrap();
        let mut conditioner = AxisConditioner::new(config);
        let raw = RawPlayerInput::new().with_button(ButtonId::Start, true);

        let frame = conditioner.condition(PlayerId::P2, &raw);
        assert!(frame.is_down(ButtonId::Start));
        assert!(!frame.just_pressed(ButtonId::Start));
        assert_eq!(
            conditioner.button_state(PlayerId::P2, ButtonId::Start),
            ButtonState::default()
        );
    }

    #[test]
    fn reset_player_prevents_phantom_release() {
        let mut conditioner = rescaled();
        conditioner.poll_button(PlayerId::P1, ButtonId::Y, true);
        conditioner.reset_player(PlayerId::P1);

        let edge = conditioner.poll_button(PlayerId::P1, ButtonId::Y, false);
        assert!(!edge.just_released);
    }
}
