//! Capture replay handler.

use std::path::Path;

use anyhow::Result;
use c64_matrix::{Dispatched, KeyEventDispatcher, MatrixSwitchController, TracingLines};
use irkey_protocol::FrameValidator;
use tracing::info;

use irkey_c64::{Config, FrameOutcome, LoggingJoystickSink, Pipeline, ReplayReceiver};

/// Run a capture through decode and dispatch against simulated lines
pub fn run(config: &Config, capture: &Path, dump: bool) -> Result<()> {
    let receiver = ReplayReceiver::open(capture)?;
    info!("Replaying {} frames from {}", receiver.total(), receiver.source().display());

    let controller =
        MatrixSwitchController::new(TracingLines::new(), config.hardware.variant).into_shared();
    let mut pipeline = Pipeline::new(
        receiver,
        FrameValidator::new(config.timing()),
        KeyEventDispatcher::new(config.load_keymap()?),
        controller.clone(),
        LoggingJoystickSink::default(),
    )
    .with_joystick_forwarding(config.joystick.forward);

    while let Some(outcome) = pipeline.poll() {
        match outcome {
            FrameOutcome::Dispatched(Dispatched::Applied {
                output,
                pressed,
                auto_shift,
            }) => {
                println!(
                    "{:<16} {}{}",
                    output.to_string(),
                    if pressed { "down" } else { "up" },
                    if auto_shift { " (auto-shift)" } else { "" }
                );
                if dump {
                    print!("{}", controller.lock().dump());
                }
            }
            FrameOutcome::Rejected(e) => println!("rejected: {e}"),
            FrameOutcome::Unmapped(e) => println!("unmapped: {e}"),
            _ => {}
        }
    }

    let stats = pipeline.stats();
    let writes = controller.lock().lines().writes();
    println!();
    println!("Frames:           {}", stats.frames);
    println!("Keys applied:     {}", stats.keys);
    println!("Joystick events:  {}", stats.joystick);
    println!("Malformed:        {}", stats.malformed);
    println!("Checksum errors:  {}", stats.checksum_failures);
    println!("Unmapped keys:    {}", stats.unmapped);
    println!("Line writes:      {writes}");

    if !dump {
        print!("{}", controller.lock().dump());
    }
    Ok(())
}
