//! Property and scenario tests for the matrix controller.

use c64_matrix::codes::{ckm, reserved};
use c64_matrix::{
    KeyEventDispatcher, KeyTranslationTable, MatrixCode, MatrixSwitchController, OutputKey,
    RecordingLines, SwitchMatrixState, Variant,
};
use irkey_protocol::protocol::joystick;
use irkey_protocol::{FrameValidator, KeyboardPayload, RawFrame};
use proptest::prelude::*;

fn output_key() -> impl Strategy<Value = OutputKey> {
    prop_oneof![
        8 => (0u8..0x40).prop_map(|c| OutputKey::try_from(c).unwrap()),
        1 => Just(OutputKey::Matrix(MatrixCode::L_SHIFT)),
        1 => Just(OutputKey::Matrix(MatrixCode::R_SHIFT)),
        1 => Just(OutputKey::CapsLock),
        1 => Just(OutputKey::Restore),
        1 => Just(OutputKey::Ignore),
    ]
}

fn edge() -> impl Strategy<Value = (OutputKey, bool, bool)> {
    (output_key(), any::<bool>(), any::<bool>())
}

fn variant() -> impl Strategy<Value = Variant> {
    prop_oneof![Just(Variant::Mt8808), Just(Variant::Mt8812)]
}

fn controller(variant: Variant) -> MatrixSwitchController<RecordingLines> {
    MatrixSwitchController::new(RecordingLines::new(), variant)
}

proptest! {
    #[test]
    fn shift_invariant_holds_after_any_sequence(
        v in variant(),
        edges in prop::collection::vec(edge(), 0..64),
    ) {
        let mut c = controller(v);
        for (key, pressed, auto) in edges {
            c.apply(key, pressed, auto);
            prop_assert!(c.verify().is_ok(), "{:?}", c.verify());

            let s = c.state();
            prop_assert_eq!(
                c.is_closed(MatrixCode::L_SHIFT),
                s.left_shift_held || s.caps_lock_engaged
            );
            if !s.auto_shift_engaged {
                prop_assert_eq!(c.is_closed(MatrixCode::R_SHIFT), s.right_shift_held);
            }
        }
    }

    #[test]
    fn right_shift_follows_held_once_keys_released(
        v in variant(),
        edges in prop::collection::vec(edge(), 0..64),
        release_auto in prop::collection::vec(any::<bool>(), 64),
    ) {
        let mut c = controller(v);
        for (key, pressed, auto) in edges {
            c.apply(key, pressed, auto);
        }
        let held: Vec<MatrixCode> = c
            .state()
            .closed()
            .into_iter()
            .filter(|&code| code != MatrixCode::L_SHIFT && code != MatrixCode::R_SHIFT)
            .collect();
        for (code, auto) in held.into_iter().zip(release_auto) {
            c.apply(OutputKey::Matrix(code), false, auto);
        }

        let s = c.state();
        prop_assert!(!s.auto_shift_engaged);
        prop_assert_eq!(s.auto_shift_key, None);
        prop_assert_eq!(c.is_closed(MatrixCode::R_SHIFT), s.right_shift_held);
        prop_assert!(c.verify().is_ok(), "{:?}", c.verify());
    }

    #[test]
    fn repeated_press_is_idempotent(
        edges in prop::collection::vec(edge(), 0..16),
        code in 0u8..0x40,
        auto in any::<bool>(),
    ) {
        let mut c = controller(Variant::Mt8812);
        for (key, pressed, a) in edges {
            c.apply(key, pressed, a);
        }
        let key = OutputKey::try_from(code).unwrap();
        c.apply(key, true, auto);
        let once = *c.state();
        c.apply(key, true, auto);
        prop_assert_eq!(*c.state(), once);
    }

    #[test]
    fn caps_lock_release_never_toggles(edges in prop::collection::vec(edge(), 0..32)) {
        let mut c = controller(Variant::Mt8812);
        for (key, pressed, auto) in edges {
            c.apply(key, pressed, auto);
        }
        let before = *c.state();
        c.apply(OutputKey::CapsLock, false, false);
        prop_assert_eq!(*c.state(), before);
    }

    #[test]
    fn reset_matches_fresh_controller(
        v in variant(),
        edges in prop::collection::vec(edge(), 0..64),
    ) {
        let mut c = controller(v);
        for (key, pressed, auto) in edges {
            c.apply(key, pressed, auto);
        }
        c.reset();
        prop_assert_eq!(*c.state(), *controller(v).state());
        prop_assert_eq!(*c.state(), SwitchMatrixState::default());
    }
}

#[test]
fn checksummed_key_frame_sets_exactly_one_bit() {
    let validator = FrameValidator::default();
    let mut dispatcher = KeyEventDispatcher::new(KeyTranslationTable::builtin());
    let mut c = controller(Variant::Mt8812);

    // HID "W" -> C64 W
    let payload = KeyboardPayload::key(0x02, 0x00, 0x1A);
    let frame = irkey_protocol::keyboard::encode(payload);
    let event = validator.decode(&frame).unwrap();
    dispatcher.dispatch(&event, &mut c).unwrap();

    assert_eq!(c.state().closed(), vec![MatrixCode::new(ckm::W).unwrap()]);
}

#[test]
fn bad_joystick_frame_leaves_matrix_unchanged() {
    let validator = FrameValidator::default();
    let mut dispatcher = KeyEventDispatcher::new(KeyTranslationTable::builtin());
    let mut c = controller(Variant::Mt8812);
    c.apply(OutputKey::try_from(ckm::A).unwrap(), true, false);
    let before = *c.state();

    // Joystick header, then a pulse at index 3 outside both bands
    let mut pulses = vec![joystick::HDR_MARK, joystick::T1, joystick::T1, 900];
    pulses.resize(20, joystick::T1);
    let frame = RawFrame::new(pulses);
    let event = validator.read_event(&frame);
    assert!(!event.is_valid());
    dispatcher.dispatch(&event, &mut c).unwrap();
    assert_eq!(*c.state(), before);
}

#[test]
fn auto_shift_reverts_to_held_right_shift() {
    let mut c = controller(Variant::Mt8812);
    let up = OutputKey::try_from(ckm::CRSR_DOWN).unwrap();

    c.apply(up, true, true);
    assert!(!c.state().right_shift_held);
    assert!(c.is_closed(MatrixCode::R_SHIFT));

    // Right shift pressed and held while the auto-shifted key is down
    c.apply(OutputKey::Matrix(MatrixCode::R_SHIFT), true, false);
    c.apply(up, false, true);
    assert!(c.is_closed(MatrixCode::R_SHIFT));

    c.apply(OutputKey::Matrix(MatrixCode::R_SHIFT), false, false);
    c.apply(up, true, true);
    c.apply(up, false, true);
    assert!(!c.is_closed(MatrixCode::R_SHIFT));
}

#[test]
fn reserved_codes_resolve() {
    assert_eq!(OutputKey::try_from(reserved::RESET).unwrap(), OutputKey::Reset);
    assert_eq!(OutputKey::try_from(reserved::IGNORE).unwrap(), OutputKey::Ignore);
    assert!(OutputKey::try_from(0xAE).is_err());
}
