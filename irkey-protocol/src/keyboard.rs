//! Keyboard protocol decoder
//!
//! Frame: header mark, header space, then 14 (mark, space) pairs. Every mark
//! is a fixed bit mark; the space length selects one of four 2-bit groups.
//! Pairs shift in from the top of a 32-bit register, so after the final
//! `>> 4` the first pair received sits in payload bits 0..1 and the last in
//! bits 26..27 (the upper half of the checksum nibble).

use tracing::debug;

use crate::error::{FrameFault, ProtocolError};
use crate::protocol::{keyboard, Timing};
use crate::types::{KeyboardPayload, PulseDuration, RawFrame};

/// Decode a keyboard frame into its raw payload (checksum not yet verified)
pub fn decode(frame: &RawFrame, timing: &Timing) -> Result<KeyboardPayload, ProtocolError> {
    if frame.len() < keyboard::MIN_PULSES {
        return Err(FrameFault::TooShort {
            len: frame.len(),
            min: keyboard::MIN_PULSES,
        }
        .into());
    }

    let mut offset = 0;
    for nominal in [keyboard::HDR_MARK, keyboard::HDR_SPACE] {
        let duration = pulse(frame, offset, 0)?;
        if !timing.matches(duration, nominal) {
            return Err(FrameFault::Header {
                index: offset,
                duration,
            }
            .into());
        }
        offset += 1;
    }

    let mut data: u32 = 0;
    for pair in 0..keyboard::PAIRS {
        let mark = pulse(frame, offset, pair * 2)?;
        if !timing.matches(mark, keyboard::BIT_MARK) {
            debug!("Keyboard decode: bit mark error at {}, {}us", offset, mark);
            return Err(FrameFault::BitMark {
                index: offset,
                duration: mark,
            }
            .into());
        }
        offset += 1;

        let space = pulse(frame, offset, pair * 2)?;
        let group = classify_space(space, timing).ok_or_else(|| {
            debug!("Keyboard decode: space error at {}, {}us", offset, space);
            FrameFault::Unclassified {
                index: offset,
                duration: space,
            }
        })?;
        data = (data >> 2) | (group << 30);
        offset += 1;
    }

    Ok(KeyboardPayload(data >> 4))
}

/// Map a space duration onto its 2-bit group; bands are tested in order
fn classify_space(duration: PulseDuration, timing: &Timing) -> Option<u32> {
    keyboard::PAIR_SPACES
        .iter()
        .position(|&nominal| timing.matches(duration, nominal))
        .map(|group| group as u32)
}

fn pulse(frame: &RawFrame, index: usize, bits: usize) -> Result<PulseDuration, FrameFault> {
    frame.get(index).ok_or(FrameFault::Exhausted {
        bits,
        needed: keyboard::BITS,
    })
}

/// Build the pulse train a transmitter would send for `payload`
///
/// Uses nominal durations and appends a closing bit mark so the last space
/// is bounded.
pub fn encode(payload: KeyboardPayload) -> RawFrame {
    let mut pulses = Vec::with_capacity(keyboard::FRAME_PULSES + 1);
    pulses.push(keyboard::HDR_MARK);
    pulses.push(keyboard::HDR_SPACE);
    for pair in 0..keyboard::PAIRS {
        let group = (payload.raw() >> (pair * 2)) & 0b11;
        pulses.push(keyboard::BIT_MARK);
        pulses.push(keyboard::PAIR_SPACES[group as usize]);
    }
    pulses.push(keyboard::BIT_MARK);
    RawFrame::new(pulses)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with_spaces(spaces: &[u32]) -> RawFrame {
        let mut pulses = vec![keyboard::HDR_MARK, keyboard::HDR_SPACE];
        for &s in spaces {
            pulses.push(keyboard::BIT_MARK);
            pulses.push(s);
        }
        pulses.push(keyboard::BIT_MARK);
        RawFrame::new(pulses)
    }

    #[test]
    fn test_worked_example_bit_order() {
        // Key-down 'A' (HID 0x04), no modifiers: 0x0004_0002 with checksum 4
        // gives 0x0404_0002. The first pair received carries bits 0..1.
        let spaces = [
            900, 450, 450, 450, // header 0x02
            450, 450, 450, 450, // modifier 0x00
            450, 650, 450, 450, // code 0x04
            450, 650, // checksum nibble 0x4
        ];
        let payload = decode(&frame_with_spaces(&spaces), &Timing::default()).unwrap();
        assert_eq!(payload.raw(), 0x0404_0002);
        assert_eq!(payload.header(), 0x02);
        assert_eq!(payload.code(), 0x04);
        assert_eq!(payload.checksum(), 4);
        assert!(payload.checksum_ok());
    }

    #[test]
    fn test_encode_matches_worked_example() {
        let frame = encode(KeyboardPayload(0x0404_0002));
        assert_eq!(frame.len(), keyboard::FRAME_PULSES + 1);
        assert_eq!(frame.get(2), Some(keyboard::BIT_MARK));
        assert_eq!(frame.get(3), Some(900));
        assert_eq!(frame.get(21), Some(650));
        assert_eq!(frame.get(29), Some(650));
    }

    #[test]
    fn test_decode_tolerates_jitter() {
        let p = KeyboardPayload::key(0x02, 0x01, 0x1D);
        let jittered: Vec<u32> = encode(p)
            .pulses()
            .iter()
            .enumerate()
            .map(|(i, &d)| if i % 3 == 0 { d + 90 } else { d - 90 })
            .collect();
        assert_eq!(decode(&RawFrame::new(jittered), &Timing::default()), Ok(p));
    }

    #[test]
    fn test_touching_bands_prefer_lower_group() {
        // 550 is inside both the 00 and 01 windows
        assert_eq!(classify_space(550, &Timing::default()), Some(0));
        assert_eq!(classify_space(551, &Timing::default()), Some(1));
        assert_eq!(classify_space(775, &Timing::default()), None);
    }

    #[test]
    fn test_too_short() {
        let frame = RawFrame::new(vec![1000; keyboard::MIN_PULSES - 1]);
        assert_eq!(
            decode(&frame, &Timing::default()),
            Err(ProtocolError::MalformedFrame(FrameFault::TooShort {
                len: 16,
                min: 17
            }))
        );
    }

    #[test]
    fn test_header_space_mismatch() {
        let mut pulses = encode(KeyboardPayload(0)).pulses().to_vec();
        pulses[1] = 800;
        assert_eq!(
            decode(&RawFrame::new(pulses), &Timing::default()),
            Err(ProtocolError::MalformedFrame(FrameFault::Header {
                index: 1,
                duration: 800
            }))
        );
    }

    #[test]
    fn test_bit_mark_mismatch() {
        let mut pulses = encode(KeyboardPayload(0)).pulses().to_vec();
        pulses[6] = 700;
        assert!(matches!(
            decode(&RawFrame::new(pulses), &Timing::default()),
            Err(ProtocolError::MalformedFrame(FrameFault::BitMark { index: 6, .. }))
        ));
    }

    #[test]
    fn test_unclassifiable_space_rejects_whole_frame() {
        let mut pulses = encode(KeyboardPayload(0)).pulses().to_vec();
        pulses[27] = 2000;
        assert!(matches!(
            decode(&RawFrame::new(pulses), &Timing::default()),
            Err(ProtocolError::MalformedFrame(FrameFault::Unclassified { index: 27, .. }))
        ));
    }

    #[test]
    fn test_truncated_frame_is_exhausted() {
        let pulses = encode(KeyboardPayload(0)).pulses()[..20].to_vec();
        assert!(matches!(
            decode(&RawFrame::new(pulses), &Timing::default()),
            Err(ProtocolError::MalformedFrame(FrameFault::Exhausted { .. }))
        ));
    }
}
