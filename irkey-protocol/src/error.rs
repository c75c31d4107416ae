//! Protocol error types

use thiserror::Error;

use crate::types::PulseDuration;

/// Why a pulse train was rejected before producing any payload
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFault {
    #[error("frame too short: {len} pulses, need at least {min}")]
    TooShort { len: usize, min: usize },

    #[error("header mismatch at pulse {index}: {duration}us")]
    Header {
        index: usize,
        duration: PulseDuration,
    },

    #[error("bit mark mismatch at pulse {index}: {duration}us")]
    BitMark {
        index: usize,
        duration: PulseDuration,
    },

    #[error("unclassifiable duration at pulse {index}: {duration}us")]
    Unclassified {
        index: usize,
        duration: PulseDuration,
    },

    #[error("frame exhausted after {bits} of {needed} bits")]
    Exhausted { bits: usize, needed: usize },
}

/// Errors produced while turning a raw frame into a key event
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// Pulse count, header, or a duration did not fit the protocol.
    #[error("Malformed frame: {0}")]
    MalformedFrame(#[from] FrameFault),

    /// Keyboard payload decoded structurally but failed the integrity check
    #[error("Checksum mismatch: expected 0x{expected:X}, got 0x{actual:X}")]
    ChecksumMismatch { expected: u8, actual: u8 },
}

impl ProtocolError {
    pub fn is_malformed(&self) -> bool {
        matches!(self, ProtocolError::MalformedFrame(_))
    }
}

/// Error parsing a textual pulse capture line
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseFrameError {
    #[error("invalid pulse duration \"{0}\"")]
    InvalidDuration(String),

    #[error("empty frame")]
    Empty,
}
