//! Matrix controller error types

use thiserror::Error;

/// Errors from translation and matrix operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    /// Input key has no translation table entry for this shift state
    #[error("Unknown input key 0x{code:02X} (shift {})", if *shifted { "down" } else { "up" })]
    UnknownInputKey { code: u8, shifted: bool },

    /// Output code is neither a matrix code nor a reserved code
    #[error("Invalid output code 0x{0:02X}")]
    InvalidOutputCode(u8),

    /// Shift/caps-lock bits disagree with the latches (controller bug)
    #[error("Invariant violation on {key}: matrix bit {actual}, latches say {expected}")]
    InvariantViolation {
        key: &'static str,
        expected: bool,
        actual: bool,
    },
}
