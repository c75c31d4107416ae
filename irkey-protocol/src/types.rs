//! Frame, payload, and event types

use std::fmt;
use std::str::FromStr;

use crate::error::ParseFrameError;
use crate::protocol::{joystick, keyboard};

/// One mark or space duration, in microseconds
pub type PulseDuration = u32;

/// Pulse durations captured for one IR transmission
///
/// Index 0 is the first mark (the capture driver strips the leading gap),
/// so even indices are marks and odd indices are spaces.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawFrame {
    pulses: Vec<PulseDuration>,
}

impl RawFrame {
    pub fn new(pulses: Vec<PulseDuration>) -> Self {
        Self { pulses }
    }

    pub fn pulses(&self) -> &[PulseDuration] {
        &self.pulses
    }

    pub fn len(&self) -> usize {
        self.pulses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pulses.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<PulseDuration> {
        self.pulses.get(index).copied()
    }

    /// Whether the pulse at `index` is a mark (IR on)
    pub fn is_mark(index: usize) -> bool {
        index % 2 == 0
    }
}

impl From<Vec<PulseDuration>> for RawFrame {
    fn from(pulses: Vec<PulseDuration>) -> Self {
        Self::new(pulses)
    }
}

impl fmt::Display for RawFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, p) in self.pulses.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{p}")?;
        }
        Ok(())
    }
}

/// Parse a capture line: durations separated by commas and/or whitespace
impl FromStr for RawFrame {
    type Err = ParseFrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let pulses = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .map(|t| {
                t.parse::<PulseDuration>()
                    .map_err(|_| ParseFrameError::InvalidDuration(t.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if pulses.is_empty() {
            return Err(ParseFrameError::Empty);
        }
        Ok(Self { pulses })
    }
}

/// 32-bit keyboard protocol payload
///
/// Layout (bit 0 = LSB):
/// - 0..7: header (`keyboard::header` flags)
/// - 8..15: modifier, 16..23: key code (key events)
/// - 8..13: x, 14..19: y (joystick-as-keyboard events)
/// - 24..27: checksum nibble
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyboardPayload(pub u32);

impl KeyboardPayload {
    /// Build a key event payload with a correct checksum
    pub fn key(header: u8, modifier: u8, code: u8) -> Self {
        Self::with_checksum(header as u32 | (modifier as u32) << 8 | (code as u32) << 16)
    }

    /// Build a joystick-as-keyboard payload with a correct checksum.
    /// `x` and `y` are the raw 6-bit fields.
    pub fn joystick(header: u8, x: u8, y: u8) -> Self {
        let header = header & !keyboard::header::KEY;
        Self::with_checksum(
            header as u32 | ((x & 0x3f) as u32) << 8 | ((y & 0x3f) as u32) << 14,
        )
    }

    /// Replace the checksum nibble with the one computed from the low 24 bits.
    ///
    /// The nibble only holds 4 bits, so a body with more than 13 set bits
    /// can never carry a valid checksum.
    pub fn with_checksum(value: u32) -> Self {
        let body = value & keyboard::CHECKSUM_COVERAGE;
        let sum = Self(body).expected_checksum();
        Self(body | ((sum & 0xF) as u32) << keyboard::CHECKSUM_SHIFT)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn header(self) -> u8 {
        self.0 as u8
    }

    pub fn modifier(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn code(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub fn checksum(self) -> u8 {
        ((self.0 >> keyboard::CHECKSUM_SHIFT) & 0xF) as u8
    }

    /// `2 + popcount(low 24 bits)`
    pub fn expected_checksum(self) -> u8 {
        keyboard::CHECKSUM_BASE + (self.0 & keyboard::CHECKSUM_COVERAGE).count_ones() as u8
    }

    pub fn checksum_ok(self) -> bool {
        self.expected_checksum() == self.checksum()
    }

    pub fn is_key(self) -> bool {
        self.header() & keyboard::header::KEY != 0
    }

    pub fn released(self) -> bool {
        self.header() & keyboard::header::RELEASE != 0
    }

    pub fn repeated(self) -> bool {
        self.header() & keyboard::header::REPEAT != 0
    }

    pub fn button1(self) -> bool {
        self.header() & keyboard::header::BUTTON1 != 0
    }

    pub fn button2(self) -> bool {
        self.header() & keyboard::header::BUTTON2 != 0
    }

    /// Raw 6-bit x field
    pub fn joy_x_raw(self) -> u8 {
        ((self.0 >> 8) & 0x3f) as u8
    }

    /// Raw 6-bit y field
    pub fn joy_y_raw(self) -> u8 {
        ((self.0 >> 14) & 0x3f) as u8
    }

    /// x widened to signed 8 bits (the 6-bit field is the top of an i8)
    pub fn joy_x(self) -> i8 {
        (self.joy_x_raw() << 2) as i8
    }

    pub fn joy_y(self) -> i8 {
        (self.joy_y_raw() << 2) as i8
    }
}

impl fmt::Display for KeyboardPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

/// 16-bit joystick protocol payload (no checksum)
///
/// Bits 0..6 x, bit 7 button 1, bits 8..14 y, bit 15 button 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JoystickPayload(pub u16);

impl JoystickPayload {
    /// Pack axes (truncated to 7 bits) and buttons
    pub fn new(x: i8, y: i8, button1: bool, button2: bool) -> Self {
        let mut raw = ((x as u8 as u16) & joystick::AXIS_MASK) << joystick::X_SHIFT
            | ((y as u8 as u16) & joystick::AXIS_MASK) << joystick::Y_SHIFT;
        if button1 {
            raw |= joystick::BUTTON1;
        }
        if button2 {
            raw |= joystick::BUTTON2;
        }
        Self(raw)
    }

    pub fn raw(self) -> u16 {
        self.0
    }

    pub fn x(self) -> i8 {
        sign_extend_7(((self.0 >> joystick::X_SHIFT) & joystick::AXIS_MASK) as u8)
    }

    pub fn y(self) -> i8 {
        sign_extend_7(((self.0 >> joystick::Y_SHIFT) & joystick::AXIS_MASK) as u8)
    }

    pub fn button1(self) -> bool {
        self.0 & joystick::BUTTON1 != 0
    }

    pub fn button2(self) -> bool {
        self.0 & joystick::BUTTON2 != 0
    }
}

impl fmt::Display for JoystickPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

/// Interpret the low 7 bits as two's complement
fn sign_extend_7(v: u8) -> i8 {
    ((v << 1) as i8) >> 1
}

/// A structurally decoded frame, before validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodedFrame {
    Keyboard(KeyboardPayload),
    Joystick(JoystickPayload),
}

/// Normalized event handed to the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Key {
        modifier: u8,
        /// Input key identity (HID usage code)
        code: u8,
        released: bool,
        repeated: bool,
    },
    Joystick {
        x: i8,
        y: i8,
        button1: bool,
        button2: bool,
    },
    Invalid,
}

impl KeyEvent {
    /// Whether the modifier byte carries shift (key events only)
    pub fn shift(&self) -> bool {
        match self {
            KeyEvent::Key { modifier, .. } => modifier & keyboard::modifier::SHIFT != 0,
            _ => false,
        }
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self, KeyEvent::Invalid)
    }

    /// Pack into the 32-bit keyboard word, where 0 means "no event"
    ///
    /// A joystick event centred with no buttons would pack to 0, so it is
    /// replaced with the sentinel 1.
    ///
    /// Joystick axes only have 6 bits in this layout: the low 2 bits of each
    /// axis are dropped, so events from the joystick protocol do not survive
    /// the packing exactly. Joystick words carry no checksum.
    pub fn to_word(&self) -> u32 {
        match *self {
            KeyEvent::Key {
                modifier,
                code,
                released,
                repeated,
            } => {
                let mut header = keyboard::header::KEY;
                if released {
                    header |= keyboard::header::RELEASE;
                }
                if repeated {
                    header |= keyboard::header::REPEAT;
                }
                KeyboardPayload::key(header, modifier, code).raw()
            }
            KeyEvent::Joystick {
                x,
                y,
                button1,
                button2,
            } => {
                let mut word = 0u32;
                if button1 {
                    word |= keyboard::header::BUTTON1 as u32;
                }
                if button2 {
                    word |= keyboard::header::BUTTON2 as u32;
                }
                word |= (((x as u8) >> 2) as u32 & 0x3f) << 8;
                word |= (((y as u8) >> 2) as u32 & 0x3f) << 14;
                if word == 0 {
                    1
                } else {
                    word
                }
            }
            KeyEvent::Invalid => 0,
        }
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            KeyEvent::Key {
                modifier,
                code,
                released,
                repeated,
            } => {
                write!(
                    f,
                    "KEY {} (0x{code:02X}) mods:0x{modifier:02X}",
                    crate::protocol::hid::key_name(code)
                )?;
                for (bit, name) in [
                    (keyboard::modifier::SHIFT, "SHIFT"),
                    (keyboard::modifier::ALT, "ALT"),
                    (keyboard::modifier::CTRL, "CTRL"),
                    (keyboard::modifier::GUI, "GUI"),
                ] {
                    if modifier & bit != 0 {
                        write!(f, "+{name}")?;
                    }
                }
                if released {
                    f.write_str(" RELEASE")?;
                }
                if repeated {
                    f.write_str(" REPEAT")?;
                }
                Ok(())
            }
            KeyEvent::Joystick {
                x,
                y,
                button1,
                button2,
            } => {
                write!(f, "JOY x:{x} y:{y}")?;
                if button1 {
                    f.write_str(" +BUTTON1")?;
                }
                if button2 {
                    f.write_str(" +BUTTON2")?;
                }
                Ok(())
            }
            KeyEvent::Invalid => f.write_str("INVALID"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_capture_line() {
        let frame: RawFrame = "1000, 500 500,450\t500".parse().unwrap();
        assert_eq!(frame.pulses(), &[1000, 500, 500, 450, 500]);
        assert_eq!(frame.to_string(), "1000,500,500,450,500");
    }

    #[test]
    fn test_parse_capture_line_rejects_garbage() {
        assert_eq!(
            "1000,abc".parse::<RawFrame>(),
            Err(ParseFrameError::InvalidDuration("abc".into()))
        );
        assert_eq!("  ,, ".parse::<RawFrame>(), Err(ParseFrameError::Empty));
    }

    #[test]
    fn test_key_payload_fields() {
        // header 0xC2 = key + release + repeat, shift modifier, 'A'
        let p = KeyboardPayload::key(0xC2, 0x01, 0x04);
        assert_eq!(p.header(), 0xC2);
        assert_eq!(p.modifier(), 0x01);
        assert_eq!(p.code(), 0x04);
        assert!(p.is_key() && p.released() && p.repeated());
        // popcount(0x0401C2) = 1 + 1 + 3 = 5, plus 2
        assert_eq!(p.checksum(), 7);
        assert!(p.checksum_ok());
    }

    #[test]
    fn test_joystick_as_keyboard_widening() {
        // x field 0x3f is -1 in 6 bits -> -4 after widening
        let p = KeyboardPayload::joystick(0x20, 0x3f, 0x10);
        assert!(!p.is_key());
        assert!(p.button1());
        assert_eq!(p.joy_x(), -4);
        assert_eq!(p.joy_y(), 64);
    }

    #[test]
    fn test_joystick_payload_sign_extension() {
        // x = 0x7f (-1), y = 0x01, both buttons
        let p = JoystickPayload(0x8000 | 0x01 << 8 | 0x80 | 0x7f);
        assert_eq!(p.x(), -1);
        assert_eq!(p.y(), 1);
        assert!(p.button1() && p.button2());
        assert_eq!(JoystickPayload(0x0040).x(), -64);
        assert_eq!(JoystickPayload(0x3f00).y(), 63);
    }

    #[test]
    fn test_joystick_payload_pack() {
        let p = JoystickPayload::new(-1, 1, true, true);
        assert_eq!(p, JoystickPayload(0x8000 | 0x01 << 8 | 0x80 | 0x7f));
        let p = JoystickPayload::new(-64, 63, false, false);
        assert_eq!((p.x(), p.y()), (-64, 63));
    }

    #[test]
    fn test_centred_joystick_word_uses_sentinel() {
        let ev = KeyEvent::Joystick {
            x: 0,
            y: 0,
            button1: false,
            button2: false,
        };
        assert_eq!(ev.to_word(), 1);
        assert_eq!(KeyEvent::Invalid.to_word(), 0);
    }

    #[test]
    fn test_joystick_word_drops_low_axis_bits() {
        let word = |x: i8, y: i8| {
            KeyEvent::Joystick {
                x,
                y,
                button1: false,
                button2: false,
            }
            .to_word()
        };
        assert_eq!(word(5, 9), word(4, 8));
        let p = KeyboardPayload(word(-1, 63));
        assert_eq!((p.joy_x(), p.joy_y()), (-4, 60));
    }

    #[test]
    fn test_key_word_round_trips_fields() {
        let ev = KeyEvent::Key {
            modifier: 0x01,
            code: 0x52,
            released: true,
            repeated: false,
        };
        let p = KeyboardPayload(ev.to_word());
        assert!(p.checksum_ok());
        assert_eq!(p.header(), 0x82);
        assert_eq!(p.code(), 0x52);
        assert!(ev.shift());
    }
}
