//! IR keyboard and IR joystick protocol decoding
//!
//! This crate turns the pulse durations captured by an IR receiver into
//! normalized key events:
//!
//! - [`keyboard`]: 28-bit keyboard frames with a 4-bit checksum nibble
//! - [`joystick`]: 16-bit Manchester-style joystick frames (no checksum)
//! - [`validator`]: protocol discrimination, checksum check, unpacking
//!
//! Capture itself is external; see [`IrReceiver`].

pub mod error;
pub mod joystick;
pub mod keyboard;
pub mod protocol;
pub mod receiver;
pub mod types;
pub mod validator;

pub use error::{FrameFault, ParseFrameError, ProtocolError};
pub use protocol::{hid, Timing, DEFAULT_TOLERANCE};
pub use receiver::{IrReceiver, QueueReceiver};
pub use types::{
    DecodedFrame, JoystickPayload, KeyEvent, KeyboardPayload, PulseDuration, RawFrame,
};
pub use validator::{unpack_joystick, validate_keyboard, FrameValidator};
