//! Polling driver for physical gamepads
//!
//! Reads every connected gamepad once per cycle through gilrs, runs the raw
//! readings through the [`AxisConditioner`](crate::conditioner::AxisConditioner)
//! and hands the conditioned frames to the application.
//!
//! # Architecture
//!
//! ```text
//! Gamepads ──► PollingDriver ──[CycleReport]──► Application
//!              (blocking thread)  (mpsc)
//! ```
//!
//! The driver is the only writer of the button state table, which keeps the
//! once-per-cycle polling discipline intact.

pub mod player_slots;
pub mod polling_driver;

pub use player_slots::PlayerSlots;
pub use polling_driver::{DriverState, Initializing, Polling, PollingDriver};

use crate::conditioner::PlayerFrame;
use crate::config::{ConditionerConfig, ConditionerSettings, ConfigurationError};
use chrono::{DateTime, Local};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Conditioned frames of all assigned players for one cycle
#[derive(Clone, Debug)]
pub struct CycleReport {
    pub cycle: u64,
    pub polled_at: DateTime<Local>,
    pub frames: Vec<PlayerFrame>,
}

/// Errors that can occur while starting or stopping the driver
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// Gamepad backend could not be opened
    #[error("Initialization error: {0}")]
    InitializationError(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// The polling thread panicked or was aborted
    #[error("Driver task failed: {0}")]
    TaskFailed(String),
}

/// Handle for the running polling driver
///
/// Dropping the handle leaves the driver running until the report receiver is
/// dropped. Use [`shutdown`](Self::shutdown) to stop it explicitly.
pub struct DriverHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl DriverHandle {
    /// Validates `settings` and starts the driver on a blocking thread
    ///
    /// # Errors
    ///
    /// * [`DriverError::Configuration`] - radius, threshold or poll interval out of range
    ///
    /// Failures of the gamepad backend happen on the driver thread; they are
    /// logged and close the report channel.
    pub fn spawn(
        settings: &ConditionerSettings,
        sender: mpsc::Sender<CycleReport>,
    ) -> Result<Self, DriverError> {
        info!("Spawning PollingDriver with settings: {:?}", settings);

        let config = ConditionerConfig::try_from(settings)?;
        let poll_interval = settings.poll_interval()?;
        let cancel = CancellationToken::new();
        let driver_cancel = cancel.clone();

        let task = tokio::task::spawn_blocking(move || {
            let driver = match PollingDriver::create(config, poll_interval, sender, driver_cancel) {
                Ok(driver) => driver,
                Err(e) => {
                    error!("Failed to create PollingDriver: {}", e);
                    return;
                }
            };

            let mut polling = driver.initialize();
            if let Err(e) = polling.run_polling_loop() {
                error!("PollingDriver terminated with error: {}", e);
            } else {
                info!("PollingDriver finished");
            }
        });

        debug!("Blocking task spawned with handle: {:?}", task);
        Ok(Self { cancel, task })
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stops the polling loop and waits for the driver thread
    pub async fn shutdown(self) -> Result<(), DriverError> {
        info!("Shutting down PollingDriver");
        self.cancel.cancel();
        self.task
            .await
            .map_err(|e| DriverError::TaskFailed(e.to_string()))
    }
}
