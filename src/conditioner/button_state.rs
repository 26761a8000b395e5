//! Button edge detection across polling cycles
//!
//! Every (player, button) pair owns a [`ButtonState`] that moves only along
//! `Up -> Down -> Up`. Polling it once per cycle turns the raw level into a
//! [`ButtonEdge`], where `just_pressed` and `just_released` each hold for
//! exactly one cycle per physical press or release.
//!
//! Polling the same pair twice within a cycle makes the second poll see the
//! first one as the previous frame, so the caller must poll at most once per cycle.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Number of logical controller slots
pub const MAX_PLAYERS: u8 = 4;

/// One of the logical controller slots `1..=MAX_PLAYERS`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(u8);

impl PlayerId {
    pub const P1: PlayerId = PlayerId(1);
    pub const P2: PlayerId = PlayerId(2);
    pub const P3: PlayerId = PlayerId(3);
    pub const P4: PlayerId = PlayerId(4);

    /// Returns `None` outside `1..=MAX_PLAYERS`
    pub fn new(slot: u8) -> Option<Self> {
        (1..=MAX_PLAYERS).contains(&slot).then_some(Self(slot))
    }

    pub fn slot(&self) -> u8 {
        self.0
    }

    /// All slots in ascending order
    pub fn all() -> impl Iterator<Item = PlayerId> {
        (1..=MAX_PLAYERS).map(PlayerId)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{:02}", self.0)
    }
}

// Digital inputs of a gamepad
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ButtonId {
    A,
    B,
    X,
    Y,
    LeftBumper,
    RightBumper,
    LeftStick,
    RightStick,
    LeftTrigger,
    RightTrigger,
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
    Start,
    Select,
    System,
}

impl ButtonId {
    pub const ALL: [ButtonId; 17] = [
        ButtonId::A,
        ButtonId::B,
        ButtonId::X,
        ButtonId::Y,
        ButtonId::LeftBumper,
        ButtonId::RightBumper,
        ButtonId::LeftStick,
        ButtonId::RightStick,
        ButtonId::LeftTrigger,
        ButtonId::RightTrigger,
        ButtonId::DPadUp,
        ButtonId::DPadDown,
        ButtonId::DPadLeft,
        ButtonId::DPadRight,
        ButtonId::Start,
        ButtonId::Select,
        ButtonId::System,
    ];
}

/// Stored level of one (player, button) pair
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ButtonState {
    pub is_down: bool,
    pub was_down_last_frame: bool,
}

impl ButtonState {
    fn advance(&mut self, raw_is_down: bool) -> ButtonEdge {
        self.was_down_last_frame = self.is_down;
        self.is_down = raw_is_down;
        ButtonEdge {
            is_down: self.is_down,
            just_pressed: self.is_down && !self.was_down_last_frame,
            just_released: !self.is_down && self.was_down_last_frame,
        }
    }
}

/// Result of polling a button for one cycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonEdge {
    pub is_down: bool,
    pub just_pressed: bool,
    pub just_released: bool,
}

impl ButtonEdge {
    /// Level-only edge, used when edge detection is switched off
    pub fn level(is_down: bool) -> Self {
        Self {
            is_down,
            ..Self::default()
        }
    }

    pub fn has_edge(&self) -> bool {
        self.just_pressed || self.just_released
    }
}

/// Lazily populated table of button states for all players
#[derive(Debug, Default)]
pub struct ButtonTable {
    states: HashMap<(PlayerId, ButtonId), ButtonState>,
}

impl ButtonTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the state machine of one (player, button) pair by one cycle
    ///
    /// A pair never seen before starts out `Up`.
    pub fn poll_button(&mut self, player: PlayerId, button: ButtonId, raw_is_down: bool) -> ButtonEdge {
        let edge = self
            .states
            .entry((player, button))
            .or_default()
            .advance(raw_is_down);

        if edge.has_edge() {
            debug!(
                "{} {:?}: pressed={} released={}",
                player, button, edge.just_pressed, edge.just_released
            );
        }
        edge
    }

    /// Stored state without advancing it
    pub fn state(&self, player: PlayerId, button: ButtonId) -> ButtonState {
        self.states
            .get(&(player, button))
            .copied()
            .unwrap_or_default()
    }

    /// Forgets every record of `player`, returns how many were dropped
    pub fn reset_player(&mut self, player: PlayerId) -> usize {
        let before = self.states.len();
        self.states.retain(|(owner, _), _| *owner != player);
        before - self.states.len()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
