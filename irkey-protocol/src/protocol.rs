//! IR keyboard / IR joystick protocol definitions
//!
//! Nominal durations are in microseconds, as delivered by the capture driver.

use crate::types::PulseDuration;

/// Keyboard protocol (38kHz carrier, 2 bits per mark/space pair)
pub mod keyboard {
    /// Payload bits carried by the pulse train (14 pairs)
    pub const BITS: usize = 28;
    /// Number of (mark, space) pairs after the header
    pub const PAIRS: usize = BITS / 2;
    /// Minimum pulse count accepted before attempting a decode
    pub const MIN_PULSES: usize = PAIRS + 3;
    /// Pulses actually consumed: header mark + header space + one mark/space per pair
    pub const FRAME_PULSES: usize = 2 + PAIRS * 2;

    pub const HDR_MARK: u32 = 1000;
    pub const HDR_SPACE: u32 = 500;
    pub const BIT_MARK: u32 = 500;

    /// Space durations selecting the 2-bit groups 00, 01, 10, 11 (in test order)
    pub const PAIR_SPACES: [u32; 4] = [450, 650, 900, 1150];

    /// Checksum bias: `checksum = popcount(low 24 bits) + CHECKSUM_BASE`
    pub const CHECKSUM_BASE: u8 = 2;
    /// Payload bits covered by the checksum
    pub const CHECKSUM_COVERAGE: u32 = 0x00FF_FFFF;
    pub const CHECKSUM_SHIFT: u32 = 24;

    /// Header byte flags
    pub mod header {
        /// Key event (clear = joystick-as-keyboard event)
        pub const KEY: u8 = 0x02;
        /// Joystick button 1 (joystick-as-keyboard only)
        pub const BUTTON1: u8 = 0x20;
        /// Repeat (key) / joystick button 2
        pub const REPEAT: u8 = 0x40;
        pub const BUTTON2: u8 = REPEAT;
        pub const RELEASE: u8 = 0x80;
    }

    /// Modifier byte flags
    pub mod modifier {
        pub const SHIFT: u8 = 0x01;
        pub const ALT: u8 = 0x02;
        pub const CTRL: u8 = 0x04;
        pub const GUI: u8 = 0x08;
    }
}

/// Joystick protocol (Manchester-style, 16 bits, no checksum)
pub mod joystick {
    pub const BITS: usize = 16;
    pub const MIN_PULSES: usize = BITS + 1;

    pub const HDR_MARK: u32 = 1200;
    /// One unit; a long pulse is two units
    pub const T1: u32 = 600;
    pub const T2: u32 = T1 * 2;

    pub const AXIS_MASK: u16 = 0x7f;
    pub const X_SHIFT: u32 = 0;
    pub const Y_SHIFT: u32 = 8;
    pub const BUTTON1: u16 = 0x0080;
    pub const BUTTON2: u16 = 0x8000;
}

/// Default match window around each nominal duration
pub const DEFAULT_TOLERANCE: u32 = 100;

/// Timing tolerance shared by both decoders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Accepted deviation (±) from each nominal duration
    pub tolerance: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl Timing {
    pub fn new(tolerance: u32) -> Self {
        Self { tolerance }
    }

    /// Inclusive window `[nominal - tol, nominal + tol]`
    pub fn matches(&self, duration: PulseDuration, nominal: u32) -> bool {
        duration >= nominal.saturating_sub(self.tolerance)
            && duration <= nominal.saturating_add(self.tolerance)
    }

    /// Half-open window `[nominal - tol, nominal + tol)`
    pub fn matches_half_open(&self, duration: PulseDuration, nominal: u32) -> bool {
        duration >= nominal.saturating_sub(self.tolerance)
            && duration < nominal.saturating_add(self.tolerance)
    }
}

/// HID keyboard usage codes, as sent by the IR keyboard
pub mod hid {
    #[rustfmt::skip]
    const NAMES: &[(u8, &str)] = &[
        (0x04, "A"), (0x05, "B"), (0x06, "C"), (0x07, "D"),
        (0x08, "E"), (0x09, "F"), (0x0A, "G"), (0x0B, "H"),
        (0x0C, "I"), (0x0D, "J"), (0x0E, "K"), (0x0F, "L"),
        (0x10, "M"), (0x11, "N"), (0x12, "O"), (0x13, "P"),
        (0x14, "Q"), (0x15, "R"), (0x16, "S"), (0x17, "T"),
        (0x18, "U"), (0x19, "V"), (0x1A, "W"), (0x1B, "X"),
        (0x1C, "Y"), (0x1D, "Z"),
        (0x1E, "1"), (0x1F, "2"), (0x20, "3"), (0x21, "4"),
        (0x22, "5"), (0x23, "6"), (0x24, "7"), (0x25, "8"),
        (0x26, "9"), (0x27, "0"),
        (0x28, "Enter"), (0x29, "Escape"), (0x2A, "Backspace"),
        (0x2B, "Tab"), (0x2C, "Space"), (0x2D, "-"), (0x2E, "="),
        (0x2F, "["), (0x30, "]"), (0x31, "\\"), (0x32, "#"),
        (0x33, ";"), (0x34, "'"), (0x35, "`"), (0x36, ","),
        (0x37, "."), (0x38, "/"), (0x39, "CapsLock"),
        (0x3A, "F1"), (0x3B, "F2"), (0x3C, "F3"), (0x3D, "F4"),
        (0x3E, "F5"), (0x3F, "F6"), (0x40, "F7"), (0x41, "F8"),
        (0x42, "F9"), (0x43, "F10"), (0x44, "F11"), (0x45, "F12"),
        (0x46, "PrintScr"), (0x47, "ScrollLock"), (0x48, "Pause"),
        (0x49, "Insert"), (0x4A, "Home"), (0x4B, "PageUp"),
        (0x4C, "Delete"), (0x4D, "End"), (0x4E, "PageDown"),
        (0x4F, "Right"), (0x50, "Left"), (0x51, "Down"), (0x52, "Up"),
        (0x53, "NumLock"), (0x58, "KPEnter"),
        (0x64, "NonUS\\"), (0x65, "App"), (0x66, "Power"),
        (0xE0, "LCtrl"), (0xE1, "LShift"), (0xE2, "LAlt"), (0xE3, "LGUI"),
        (0xE4, "RCtrl"), (0xE5, "RShift"), (0xE6, "RAlt"), (0xE7, "RGUI"),
    ];

    /// Get the name of a HID keyboard usage code
    pub fn key_name(code: u8) -> &'static str {
        NAMES
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, n)| *n)
            .unwrap_or("?")
    }

    /// Look up a usage code by name (case-insensitive)
    pub fn key_code_from_name(name: &str) -> Option<u8> {
        NAMES
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|(c, _)| *c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inclusive_window_edges() {
        let t = Timing::default();
        assert!(t.matches(900, 1000));
        assert!(t.matches(1100, 1000));
        assert!(!t.matches(899, 1000));
        assert!(!t.matches(1101, 1000));
    }

    #[test]
    fn test_half_open_window_edges() {
        let t = Timing::default();
        assert!(t.matches_half_open(500, joystick::T1));
        assert!(t.matches_half_open(699, joystick::T1));
        assert!(!t.matches_half_open(700, joystick::T1));
    }

    #[test]
    fn test_window_below_zero_saturates() {
        let t = Timing::new(500);
        assert!(t.matches(0, 450));
    }

    #[test]
    fn test_hid_names() {
        assert_eq!(hid::key_name(0x04), "A");
        assert_eq!(hid::key_name(0x52), "Up");
        assert_eq!(hid::key_name(0xFF), "?");
        assert_eq!(hid::key_code_from_name("lshift"), Some(0xE1));
        assert_eq!(hid::key_code_from_name("Nope"), None);
    }
}
