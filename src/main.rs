//! Simulated session entry point
//!
//! Runs the three workflows back to back against the scripted host, driven
//! through the same frame loop a live integration uses.

use std::error::Error;

use beast_sorter::app::{OperationSequencer, OperationStatus};
use beast_sorter::config::Settings;
use beast_sorter::input::Signals;
use beast_sorter::testing::{FrameClock, SimulatedHost};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Upper bound on frames per workflow
const MAX_FRAMES: usize = 10_000;

fn main() -> Result<(), Box<dyn Error>> {
    let settings = Settings::from_env()?;
    setup_logging(&settings);

    let mut host = SimulatedHost::new();
    host.add_item("Bestiary Orb", 0, 0, 3);
    host.add_sized_item("Astramentis", 1, 0, 2, 2, 1);
    host.add_item("Imprinted Bestiary Orb", 3, 0, 1);
    for name in [
        "Vivid Vulture",
        "Craicic Chimeral",
        "Wild Bristle Matron",
        "Fenumal Plagued Arachnid",
        "Black Mórrigan",
    ] {
        host.add_target(name);
    }

    let mut sequencer = OperationSequencer::new(settings);
    let mut clock = FrameClock::new();

    for signal in [
        Signals::START_SORT,
        Signals::START_USE_ALL,
        Signals::START_RELEASE_FILTERED,
    ] {
        let status = run_session(&mut sequencer, &mut host, &mut clock, signal);
        info!(?status, "session finished");
    }

    info!(
        items = host.slots().len(),
        targets = host.targets().len(),
        inputs = host.events().len(),
        "simulation complete"
    );
    Ok(())
}

/// Presses the start key for one frame, then runs until the operation stops
fn run_session(
    sequencer: &mut OperationSequencer,
    host: &mut SimulatedHost,
    clock: &mut FrameClock,
    start: Signals,
) -> OperationStatus {
    let mut status = sequencer.on_frame(host, start, clock.next());
    for _ in 0..MAX_FRAMES {
        if !matches!(status, OperationStatus::Running(_)) {
            return status;
        }
        status = sequencer.on_frame(host, Signals::empty(), clock.next());
    }
    warn!(?status, "frame budget exhausted, cancelling");
    sequencer.request_cancel();
    sequencer.on_frame(host, Signals::empty(), clock.next())
}

/// Installs the stderr subscriber; `RUST_LOG` overrides the default level
fn setup_logging(settings: &Settings) {
    let default_level = if settings.show_debug_info { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
