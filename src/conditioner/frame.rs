use super::button_state::{ButtonEdge, ButtonId, PlayerId};
use super::deadzone::AxisSample;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Raw readings of one player for one polling cycle
///
/// Buttons that were never set read as up.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawPlayerInput {
    pub left_stick: AxisSample,
    pub right_stick: AxisSample,
    pub dpad: AxisSample,
    pub left_trigger: f32,
    pub right_trigger: f32,
    pub buttons: HashMap<ButtonId, bool>,
}

impl RawPlayerInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_button(&mut self, button: ButtonId, is_down: bool) {
        self.buttons.insert(button, is_down);
    }

    pub fn with_button(mut self, button: ButtonId, is_down: bool) -> Self {
        self.set_button(button, is_down);
        self
    }

    pub fn is_down(&self, button: ButtonId) -> bool {
        self.buttons.get(&button).copied().unwrap_or(false)
    }
}

/// Conditioned readings of one player for one polling cycle
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerFrame {
    pub player: PlayerId,
    pub left_stick: AxisSample,
    pub right_stick: AxisSample,
    pub dpad: AxisSample,
    pub left_trigger: f32,
    pub right_trigger: f32,
    /// One entry per [`ButtonId::ALL`], in that order
    pub buttons: Vec<(ButtonId, ButtonEdge)>,
}

impl PlayerFrame {
    pub fn button(&self, button: ButtonId) -> ButtonEdge {
        self.buttons
            .iter()
            .find(|(id, _)| *id == button)
            .map(|(_, edge)| *edge)
            .unwrap_or_default()
    }

    pub fn is_down(&self, button: ButtonId) -> bool {
        self.button(button).is_down
    }

    pub fn just_pressed(&self, button: ButtonId) -> bool {
        self.button(button).just_pressed
    }

    pub fn just_released(&self, button: ButtonId) -> bool {
        self.button(button).just_released
    }

    /// Buttons with a press or release edge this cycle
    pub fn edges(&self) -> impl Iterator<Item = &(ButtonId, ButtonEdge)> {
        self.buttons.iter().filter(|(_, edge)| edge.has_edge())
    }
}
