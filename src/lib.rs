//! IR keyboard/joystick to C64 keyboard matrix bridge
//!
//! - [`capture`]: capture file replay receiver
//! - [`config`]: TOML configuration and keymap files
//! - [`pipeline`]: receive, decode, dispatch, rearm

pub mod capture;
pub mod config;
pub mod pipeline;

pub use capture::{CaptureError, ReplayReceiver};
pub use config::Config;
pub use pipeline::{
    FrameOutcome, JoystickSink, JoystickState, LoggingJoystickSink, Pipeline, PipelineStats,
};
