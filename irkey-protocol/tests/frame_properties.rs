//! Property tests for the IR frame decoders and checksum.

use irkey_protocol::{
    joystick, keyboard, validate_keyboard, FrameValidator, JoystickPayload, KeyEvent,
    KeyboardPayload, ProtocolError, RawFrame,
};
use proptest::prelude::*;

/// Low-24-bit bodies whose checksum fits the 4-bit nibble
fn checksummable_body() -> impl Strategy<Value = u32> {
    (0u32..0x0100_0000).prop_filter("popcount must fit the nibble", |b| b.count_ones() <= 13)
}

proptest! {
    #[test]
    fn valid_checksum_is_accepted(body in checksummable_body()) {
        let payload = KeyboardPayload::with_checksum(body);
        prop_assert!(validate_keyboard(payload).is_ok());
    }

    #[test]
    fn any_single_bit_flip_breaks_checksum(body in checksummable_body(), bit in 0u32..24) {
        let payload = KeyboardPayload::with_checksum(body);
        let flipped = KeyboardPayload(payload.raw() ^ (1 << bit));
        let is_mismatch = matches!(
            validate_keyboard(flipped),
            Err(ProtocolError::ChecksumMismatch { .. })
        );
        prop_assert!(is_mismatch);
    }

    #[test]
    fn keyboard_frames_survive_the_wire(body in checksummable_body()) {
        let payload = KeyboardPayload::with_checksum(body);
        let v = FrameValidator::default();
        match v.decode(&keyboard::encode(payload)).unwrap() {
            KeyEvent::Key { modifier, code, .. } => {
                prop_assert!(payload.is_key());
                prop_assert_eq!(modifier, payload.modifier());
                prop_assert_eq!(code, payload.code());
            }
            KeyEvent::Joystick { x, y, .. } => {
                prop_assert!(!payload.is_key());
                prop_assert_eq!(x, payload.joy_x());
                prop_assert_eq!(y, payload.joy_y());
            }
            KeyEvent::Invalid => prop_assert!(false, "valid frame collapsed to Invalid"),
        }
    }

    #[test]
    fn joystick_frames_survive_the_wire(raw in any::<u16>()) {
        let v = FrameValidator::default();
        let event = v.decode(&joystick::encode(JoystickPayload(raw))).unwrap();
        let is_joystick = matches!(event, KeyEvent::Joystick { .. });
        prop_assert!(is_joystick);
    }

    #[test]
    fn arbitrary_pulses_never_panic(pulses in proptest::collection::vec(0u32..3000, 0..64)) {
        let v = FrameValidator::default();
        let _ = v.read_event(&RawFrame::new(pulses));
    }
}

#[test]
fn malformed_frame_yields_no_event() {
    let mut pulses = keyboard::encode(KeyboardPayload::key(0x02, 0, 0x04))
        .pulses()
        .to_vec();
    pulses.truncate(25);
    let v = FrameValidator::default();
    assert!(matches!(
        v.decode(&RawFrame::new(pulses.clone())),
        Err(e) if e.is_malformed()
    ));
    assert_eq!(v.read_event(&RawFrame::new(pulses)), KeyEvent::Invalid);
}
