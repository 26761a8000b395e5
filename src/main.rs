use axis_conditioner::config::ConditionerSettings;
use axis_conditioner::driver::{CycleReport, DriverHandle};
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let settings = load_settings()?;
    info!("Starting axis-conditioner with settings: {:?}", settings);

    let (report_sender, mut report_receiver) = mpsc::channel(64);
    let driver = DriverHandle::spawn(&settings, report_sender)
        .map_err(|e| eyre!("Failed to spawn driver: {}", e))?;

    loop {
        tokio::select! {
            report = report_receiver.recv() => match report {
                Some(report) => log_report(&report),
                None => {
                    warn!("Driver stopped sending reports");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl-C received");
                break;
            }
        }
    }

    driver.shutdown().await?;
    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}

// First argument overrides the default config location
fn load_settings() -> Result<ConditionerSettings> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(ConditionerSettings::default_path);

    match path {
        Some(path) => Ok(ConditionerSettings::load_or_default(&path)?),
        None => {
            warn!("No config directory available, using default settings");
            Ok(ConditionerSettings::default())
        }
    }
}

fn log_report(report: &CycleReport) {
    for frame in &report.frames {
        for (button, edge) in frame.edges() {
            info!(
                "{} {:?} {} at {}",
                frame.player,
                button,
                if edge.just_pressed { "pressed" } else { "released" },
                report.polled_at.format("%H:%M:%S.%3f")
            );
        }
        debug!(
            "cycle {} {}: left={:?} right={:?} dpad={:?} lt={:.3} rt={:.3}",
            report.cycle,
            frame.player,
            frame.left_stick,
            frame.right_stick,
            frame.dpad,
            frame.left_trigger,
            frame.right_trigger
        );
    }
}
