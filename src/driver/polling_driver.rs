use chrono::Local;
use gilrs::{Axis, Button, Event, EventType, Gamepad, GamepadId, Gilrs};
use statum::{machine, state};
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::player_slots::PlayerSlots;
use super::{CycleReport, DriverError};
use crate::conditioner::{AxisConditioner, AxisSample, ButtonId, PlayerFrame, RawPlayerInput};
use crate::config::ConditionerConfig;

// Define driver states using statum's state macro
#[state]
#[derive(Debug, Clone)]
pub enum DriverState {
    Initializing,
    Polling,
}

#[machine]
#[derive(Debug)]
pub struct PollingDriver<S: DriverState> {
    // Gilrs context
    gilrs: Gilrs,

    // Deadzone, thresholds and button state table
    conditioner: AxisConditioner,

    // Gamepad to player slot assignment
    slots: PlayerSlots<GamepadId>,

    // Pause between two cycles
    poll_interval: Duration,

    // Channel for sending conditioned frames to the consumer
    report_sender: mpsc::Sender<CycleReport>,

    // Stops the polling loop
    cancel: CancellationToken,

    // Number of completed cycles
    cycle: u64,
}

impl<S: DriverState> PollingDriver<S> {
    pub fn conditioner(&self) -> &AxisConditioner {
        &self.conditioner
    }

    // Put a gamepad into the next free player slot
    fn attach(&mut self, id: GamepadId) {
        let name = self.gilrs.gamepad(id).name().to_string();
        match self.slots.assign(id) {
            Some(player) => info!("Gamepad {} ({}) assigned to {}", name, id, player),
            None => warn!("No free player slot for gamepad {} ({})", name, id),
        }
    }

    // Free the slot of a gamepad and forget its button states
    fn detach(&mut self, id: GamepadId) {
        match self.slots.release(id) {
            Some(player) => {
                self.conditioner.reset_player(player);
                info!("Gamepad {} disconnected, {} is free", id, player);
            }
            None => debug!("Unassigned gamepad {} disconnected", id),
        }
    }
}

impl PollingDriver<Initializing> {
    pub fn create(
        config: ConditionerConfig,
        poll_interval: Duration,
        report_sender: mpsc::Sender<CycleReport>,
        cancel: CancellationToken,
    ) -> Result<Self, DriverError> {
        debug!(
            "Creating PollingDriver with config: {:?}, interval: {:?}",
            config, poll_interval
        );

        info!("Initializing gilrs controller interface");
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                info!("Successfully initialized gilrs");
                g
            }
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                return Err(DriverError::InitializationError(e.to_string()));
            }
        };

        Ok(Self::new(
            gilrs,
            AxisConditioner::new(config),
            PlayerSlots::new(),
            poll_interval,
            report_sender,
            cancel,
            0,
        ))
    }

    // Assign already connected gamepads and transition to Polling state
    pub fn initialize(mut self) -> PollingDriver<Polling> {
        let connected: Vec<GamepadId> = self.gilrs.gamepads().map(|(id, _)| id).collect();

        if connected.is_empty() {
            warn!("No gamepad connected, waiting for connections");
        } else {
            info!("Found {} gamepads", connected.len());
            for id in connected {
                self.attach(id);
            }
        }

        info!("PollingDriver initialized, transitioning to Polling state");
        self.transition()
    }
}

impl PollingDriver<Polling> {
    /// Runs one polling cycle and returns a frame per assigned player
    pub fn poll_cycle(&mut self) -> Vec<PlayerFrame> {
        // Drain gilrs events so gamepad state is current
        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            match event {
                EventType::Connected => self.attach(id),
                EventType::Disconnected => self.detach(id),
                _ => {}
            }
        }

        let mut frames = Vec::new();
        for (id, player) in self.slots.assigned() {
            let Some(gamepad) = self.gilrs.connected_gamepad(id) else {
                debug!("Gamepad {} of {} not connected, skipping", id, player);
                continue;
            };
            let raw = read_raw_input(&gamepad);
            frames.push(self.conditioner.condition(player, &raw));
        }
        frames
    }

    // Run the driver until cancelled or the receiver is dropped
    pub fn run_polling_loop(&mut self) -> Result<(), DriverError> {
        info!("Starting polling loop every {:?}", self.poll_interval);

        // For performance monitoring
        let mut frame_count = 0;
        let mut last_log_time = Local::now();
        let log_interval = chrono::Duration::seconds(10);

        while !self.cancel.is_cancelled() {
            let frames = self.poll_cycle();
            self.cycle += 1;

            if !frames.is_empty() {
                frame_count += frames.len();
                let report = CycleReport {
                    cycle: self.cycle,
                    polled_at: Local::now(),
                    frames,
                };
                match self.report_sender.try_send(report) {
                    Ok(()) => {}
                    Err(TrySendError::Full(report)) => {
                        warn!("Report channel full, dropping cycle {}", report.cycle);
                    }
                    Err(TrySendError::Closed(_)) => {
                        info!("Report receiver dropped, stopping polling loop");
                        return Ok(());
                    }
                }
            }

            let now = Local::now();
            if now - last_log_time > log_interval {
                info!(
                    "PollingDriver stats: {} frames in last {} seconds (avg {:.2}/sec), cycle {}",
                    frame_count,
                    log_interval.num_seconds(),
                    frame_count as f64 / log_interval.num_seconds() as f64,
                    self.cycle
                );
                frame_count = 0;
                last_log_time = now;
            }

            std::thread::sleep(self.poll_interval);
        }

        info!("Polling loop cancelled after {} cycles", self.cycle);
        Ok(())
    }
}

// Gamepad button for each ButtonId
pub(crate) fn map_button(button: ButtonId) -> Button {
    match button {
        ButtonId::A => Button::South,
        ButtonId::B => Button::East,
        ButtonId::X => Button::West,
        ButtonId::Y => Button::North,
        ButtonId::LeftBumper => Button::LeftTrigger,
        ButtonId::RightBumper => Button::RightTrigger,
        ButtonId::LeftStick => Button::LeftThumb,
        ButtonId::RightStick => Button::RightThumb,
        ButtonId::LeftTrigger => Button::LeftTrigger2,
        ButtonId::RightTrigger => Button::RightTrigger2,
        ButtonId::DPadUp => Button::DPadUp,
        ButtonId::DPadDown => Button::DPadDown,
        ButtonId::DPadLeft => Button::DPadLeft,
        ButtonId::DPadRight => Button::DPadRight,
        ButtonId::Start => Button::Start,
        ButtonId::Select => Button::Select,
        ButtonId::System => Button::Mode,
    }
}

/// D-pad buttons as a stick sample, up and right positive
pub(crate) fn dpad_sample(up: bool, down: bool, left: bool, right: bool) -> AxisSample {
    let axis = |positive: bool, negative: bool| f32::from(positive as u8) - f32::from(negative as u8);
    AxisSample::new(axis(right, left), axis(up, down))
}

fn trigger_value(gamepad: &Gamepad<'_>, button: Button) -> f32 {
    gamepad
        .button_data(button)
        .map(|data| data.value())
        .unwrap_or(0.0)
}

fn read_raw_input(gamepad: &Gamepad<'_>) -> RawPlayerInput {
    let mut raw = RawPlayerInput {
        left_stick: AxisSample::new(
            gamepad.value(Axis::LeftStickX),
            gamepad.value(Axis::LeftStickY),
        ),
        right_stick: AxisSample::new(
            gamepad.value(Axis::RightStickX),
            gamepad.value(Axis::RightStickY),
        ),
        left_trigger: trigger_value(gamepad, Button::LeftTrigger2),
        right_trigger: trigger_value(gamepad, Button::RightTrigger2),
        ..Default::default()
    };

    for button in ButtonId::ALL {
        raw.set_button(button, gamepad.is_pressed(map_button(button)));
    }

    raw.dpad = dpad_sample(
        raw.is_down(ButtonId::DPadUp),
        raw.is_down(ButtonId::DPadDown),
        raw.is_down(ButtonId::DPadLeft),
        raw.is_down(ButtonId::DPadRight),
    );
    // Some pads report the D-pad as a hat axis instead of buttons
    if raw.dpad.is_zero() {
        raw.dpad = AxisSample::new(gamepad.value(Axis::DPadX), gamepad.value(Axis::DPadY));
    }

    raw
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_button_maps_to_a_distinct_gamepad_button() {
        let mapped: HashSet<Button> = ButtonId::ALL.iter().map(|b| map_button(*b)).collect();
        assert_eq!(mapped.len(), ButtonId::ALL.len());
    }

    #[test]
    fn triggers_map_to_analog_buttons() {
        assert_eq!(map_button(ButtonId::LeftTrigger), Button::LeftTrigger2);
        assert_eq!(map_button(ButtonId::RightBumper), Button::RightTrigger);
    }

    #[test]
    fn dpad_buttons_form_a_sample() {
        assert_eq!(dpad_sample(false, false, false, false), AxisSample::ZERO);
        assert_eq!(dpad_sample(true, false, false, true), AxisSample::new(1.0, 1.0));
        assert_eq!(dpad_sample(false, true, true, false), AxisSample::new(-1.0, -1.0));
        assert_eq!(dpad_sample(true, true, false, false), AxisSample::ZERO);
    }
}
