//! Frame discrimination, checksum verification, and event unpacking
//!
//! Turns a raw pulse train into one normalized [`KeyEvent`]. A frame is
//! offered to the keyboard decoder first and to the joystick decoder if the
//! keyboard decoder found it malformed or its checksum does not match. The
//! two header windows touch at 1100µs, so a joystick frame can decode
//! structurally as a keyboard frame.

use tracing::{debug, warn};

use crate::error::{FrameFault, ProtocolError};
use crate::protocol::Timing;
use crate::types::{DecodedFrame, JoystickPayload, KeyEvent, KeyboardPayload, RawFrame};
use crate::{joystick, keyboard};

/// Verify the checksum nibble and unpack a keyboard payload
pub fn validate_keyboard(payload: KeyboardPayload) -> Result<KeyEvent, ProtocolError> {
    if !payload.checksum_ok() {
        return Err(ProtocolError::ChecksumMismatch {
            expected: payload.expected_checksum(),
            actual: payload.checksum(),
        });
    }

    if payload.is_key() {
        Ok(KeyEvent::Key {
            modifier: payload.modifier(),
            code: payload.code(),
            released: payload.released(),
            repeated: payload.repeated(),
        })
    } else {
        Ok(KeyEvent::Joystick {
            x: payload.joy_x(),
            y: payload.joy_y(),
            button1: payload.button1(),
            button2: payload.button2(),
        })
    }
}

/// Unpack a joystick protocol payload; there is no checksum to verify
pub fn unpack_joystick(payload: JoystickPayload) -> KeyEvent {
    KeyEvent::Joystick {
        x: payload.x(),
        y: payload.y(),
        button1: payload.button1(),
        button2: payload.button2(),
    }
}

/// Decodes frames with a fixed timing tolerance
#[derive(Debug, Clone, Default)]
pub struct FrameValidator {
    timing: Timing,
}

impl FrameValidator {
    pub fn new(timing: Timing) -> Self {
        Self { timing }
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Recognize which protocol produced `frame` and decode it
    ///
    /// A keyboard payload is only accepted with a matching checksum. When
    /// both decoders reject the frame, the error comes from the decoder whose
    /// header matched, or from the keyboard decoder if neither did.
    pub fn decode_frame(&self, frame: &RawFrame) -> Result<DecodedFrame, ProtocolError> {
        let kb_err = match keyboard::decode(frame, &self.timing) {
            Ok(payload) if payload.checksum_ok() => return Ok(DecodedFrame::Keyboard(payload)),
            Ok(payload) => ProtocolError::ChecksumMismatch {
                expected: payload.expected_checksum(),
                actual: payload.checksum(),
            },
            Err(e) => e,
        };
        match joystick::decode(frame, &self.timing) {
            Ok(payload) => Ok(DecodedFrame::Joystick(payload)),
            Err(js_err) => {
                let header_missed = matches!(
                    kb_err,
                    ProtocolError::MalformedFrame(
                        FrameFault::Header { .. } | FrameFault::TooShort { .. }
                    )
                );
                if header_missed {
                    Err(js_err)
                } else {
                    Err(kb_err)
                }
            }
        }
    }

    /// Validate a decoded frame into an event
    pub fn validate(&self, decoded: DecodedFrame) -> Result<KeyEvent, ProtocolError> {
        match decoded {
            DecodedFrame::Keyboard(payload) => validate_keyboard(payload),
            DecodedFrame::Joystick(payload) => Ok(unpack_joystick(payload)),
        }
    }

    /// Decode and validate in one step
    pub fn decode(&self, frame: &RawFrame) -> Result<KeyEvent, ProtocolError> {
        self.validate(self.decode_frame(frame)?)
    }

    /// Decode a frame, collapsing every failure into [`KeyEvent::Invalid`]
    pub fn read_event(&self, frame: &RawFrame) -> KeyEvent {
        match self.decode(frame) {
            Ok(event) => event,
            Err(e @ ProtocolError::ChecksumMismatch { .. }) => {
                warn!("Discarding keyboard frame: {}", e);
                KeyEvent::Invalid
            }
            Err(e) => {
                debug!("Discarding frame of {} pulses: {}", frame.len(), e);
                KeyEvent::Invalid
            }
        }
    }
}
