//! C64 keyboard matrix emulation
//!
//! Key events are translated to C64 matrix codes and applied to an MT88xx
//! analog crosspoint switch wired across the keyboard connector. The
//! [`MatrixSwitchController`] keeps the shift and caps-lock latches
//! consistent with the switches it closes.

pub mod codes;
pub mod controller;
pub mod dispatcher;
pub mod error;
pub mod keymap;
pub mod lines;

pub use codes::{code_from_name, code_name, MatrixCode, OutputKey};
pub use controller::{MatrixSwitchController, SharedController, SwitchMatrixState};
pub use dispatcher::{Dispatched, KeyEventDispatcher};
pub use error::MatrixError;
pub use keymap::{KeyTranslationEntry, KeyTranslationTable, KeymapFile, ShiftPolicy};
pub use lines::{Line, LineOp, RecordingLines, RestoreLine, SwitchLines, TracingLines, Variant};
