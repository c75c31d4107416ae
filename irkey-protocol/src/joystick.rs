//! Joystick protocol decoder
//!
//! After a header mark, each bit is carried either by one long pulse or by a
//! pair of short pulses. The bit value is the level (mark = 1, space = 0) of
//! the pulse that completes it.

use tracing::debug;

use crate::error::{FrameFault, ProtocolError};
use crate::protocol::{joystick, Timing};
use crate::types::{JoystickPayload, RawFrame};

/// Decode a joystick frame into its 16-bit payload
pub fn decode(frame: &RawFrame, timing: &Timing) -> Result<JoystickPayload, ProtocolError> {
    if frame.len() < joystick::MIN_PULSES {
        return Err(FrameFault::TooShort {
            len: frame.len(),
            min: joystick::MIN_PULSES,
        }
        .into());
    }

    let header = frame.get(0).unwrap_or_default();
    if !timing.matches(header, joystick::HDR_MARK) {
        return Err(FrameFault::Header {
            index: 0,
            duration: header,
        }
        .into());
    }

    let mut data: u16 = 0;
    let mut bits = 0;
    let mut skip = true;
    let mut index = 1;

    while bits < joystick::BITS {
        let Some(duration) = frame.get(index) else {
            debug!("Joystick decode: exhausted at {} after {} bits", index, bits);
            return Err(FrameFault::Exhausted {
                bits,
                needed: joystick::BITS,
            }
            .into());
        };
        let level = RawFrame::is_mark(index) as u16;

        if timing.matches_half_open(duration, joystick::T1) {
            if skip {
                skip = false;
            } else {
                data = (data << 1) | level;
                bits += 1;
                skip = true;
            }
        } else if timing.matches_half_open(duration, joystick::T2) {
            data = (data << 1) | level;
            bits += 1;
            skip = true;
        } else {
            debug!("Joystick decode: error at {}, {}us", index, duration);
            return Err(FrameFault::Unclassified { index, duration }.into());
        }
        index += 1;
    }

    Ok(JoystickPayload(data))
}

/// Build a pulse train that decodes to `payload`
///
/// A bit whose level matches the next pulse is sent as one long pulse;
/// otherwise a short pulse flips the level and a second short completes it.
pub fn encode(payload: JoystickPayload) -> RawFrame {
    let mut pulses = vec![joystick::HDR_MARK];
    for bit in (0..joystick::BITS).rev() {
        let want_mark = (payload.raw() >> bit) & 1 == 1;
        if RawFrame::is_mark(pulses.len()) == want_mark {
            pulses.push(joystick::T2);
        } else {
            pulses.push(joystick::T1);
            pulses.push(joystick::T1);
        }
    }
    RawFrame::new(pulses)
}
