//! Commodore keyboard matrix codes
//!
//! A matrix code is 6 bits: row in bits 3..5, column in bits 0..2.
//! See https://sta.c64.org/cbm64kbdcode2.html for the layout.

use std::fmt;

use crate::error::MatrixError;

/// C64 key matrix codes
pub mod ckm {
    pub const DEL: u8 = 0x00;
    pub const RETURN: u8 = 0x01;
    pub const CRSR_RIGHT: u8 = 0x02;
    pub const F7: u8 = 0x03;
    pub const F1: u8 = 0x04;
    pub const F3: u8 = 0x05;
    pub const F5: u8 = 0x06;
    pub const CRSR_DOWN: u8 = 0x07;
    pub const N3: u8 = 0x08;
    pub const W: u8 = 0x09;
    pub const A: u8 = 0x0a;
    pub const N4: u8 = 0x0b;
    pub const Z: u8 = 0x0c;
    pub const S: u8 = 0x0d;
    pub const E: u8 = 0x0e;
    pub const L_SHIFT: u8 = 0x0f;
    pub const N5: u8 = 0x10;
    pub const R: u8 = 0x11;
    pub const D: u8 = 0x12;
    pub const N6: u8 = 0x13;
    pub const C: u8 = 0x14;
    pub const F: u8 = 0x15;
    pub const T: u8 = 0x16;
    pub const X: u8 = 0x17;
    pub const N7: u8 = 0x18;
    pub const Y: u8 = 0x19;
    pub const G: u8 = 0x1a;
    pub const N8: u8 = 0x1b;
    pub const B: u8 = 0x1c;
    pub const H: u8 = 0x1d;
    pub const U: u8 = 0x1e;
    pub const V: u8 = 0x1f;
    pub const N9: u8 = 0x20;
    pub const I: u8 = 0x21;
    pub const J: u8 = 0x22;
    pub const N0: u8 = 0x23;
    pub const M: u8 = 0x24;
    pub const K: u8 = 0x25;
    pub const O: u8 = 0x26;
    pub const N: u8 = 0x27;
    pub const PLUS: u8 = 0x28;
    pub const P: u8 = 0x29;
    pub const L: u8 = 0x2a;
    pub const MINUS: u8 = 0x2b;
    pub const PERIOD: u8 = 0x2c;
    pub const COLON: u8 = 0x2d;
    pub const AT: u8 = 0x2e;
    pub const COMMA: u8 = 0x2f;
    pub const POUND: u8 = 0x30;
    pub const ASTERISK: u8 = 0x31;
    pub const SEMICOLON: u8 = 0x32;
    pub const HOME: u8 = 0x33;
    pub const R_SHIFT: u8 = 0x34;
    pub const EQUAL: u8 = 0x35;
    pub const UP_ARROW: u8 = 0x36;
    pub const SLASH: u8 = 0x37;
    pub const N1: u8 = 0x38;
    pub const LEFT_ARROW: u8 = 0x39;
    pub const CTRL: u8 = 0x3a;
    pub const N2: u8 = 0x3b;
    pub const SPACE: u8 = 0x3c;
    pub const CBM: u8 = 0x3d;
    pub const Q: u8 = 0x3e;
    pub const STOP: u8 = 0x3f;
}

/// Output codes outside the matrix
pub mod reserved {
    pub const RESET: u8 = 0xab;
    pub const RESTORE: u8 = 0xac;
    pub const CAPS_LOCK: u8 = 0xad;
    pub const IGNORE: u8 = 0xb0;
}

#[rustfmt::skip]
const NAMES: &[(u8, &str)] = &[
    (ckm::DEL, "DEL"), (ckm::RETURN, "RETURN"), (ckm::CRSR_RIGHT, "CRSR_RIGHT"),
    (ckm::F7, "F7"), (ckm::F1, "F1"), (ckm::F3, "F3"), (ckm::F5, "F5"),
    (ckm::CRSR_DOWN, "CRSR_DOWN"),
    (ckm::N3, "3"), (ckm::W, "W"), (ckm::A, "A"), (ckm::N4, "4"),
    (ckm::Z, "Z"), (ckm::S, "S"), (ckm::E, "E"), (ckm::L_SHIFT, "L_SHIFT"),
    (ckm::N5, "5"), (ckm::R, "R"), (ckm::D, "D"), (ckm::N6, "6"),
    (ckm::C, "C"), (ckm::F, "F"), (ckm::T, "T"), (ckm::X, "X"),
    (ckm::N7, "7"), (ckm::Y, "Y"), (ckm::G, "G"), (ckm::N8, "8"),
    (ckm::B, "B"), (ckm::H, "H"), (ckm::U, "U"), (ckm::V, "V"),
    (ckm::N9, "9"), (ckm::I, "I"), (ckm::J, "J"), (ckm::N0, "0"),
    (ckm::M, "M"), (ckm::K, "K"), (ckm::O, "O"), (ckm::N, "N"),
    (ckm::PLUS, "+"), (ckm::P, "P"), (ckm::L, "L"), (ckm::MINUS, "-"),
    (ckm::PERIOD, "."), (ckm::COLON, ":"), (ckm::AT, "@"), (ckm::COMMA, ","),
    (ckm::POUND, "POUND"), (ckm::ASTERISK, "*"), (ckm::SEMICOLON, ";"), (ckm::HOME, "HOME"),
    (ckm::R_SHIFT, "R_SHIFT"), (ckm::EQUAL, "="), (ckm::UP_ARROW, "UP_ARROW"), (ckm::SLASH, "/"),
    (ckm::N1, "1"), (ckm::LEFT_ARROW, "LEFT_ARROW"), (ckm::CTRL, "CTRL"), (ckm::N2, "2"),
    (ckm::SPACE, "SPACE"), (ckm::CBM, "CBM"), (ckm::Q, "Q"), (ckm::STOP, "STOP"),
    (reserved::RESET, "RESET"), (reserved::RESTORE, "RESTORE"),
    (reserved::CAPS_LOCK, "CAPS_LOCK"), (reserved::IGNORE, "IGNORE"),
];

/// Symbolic name for a matrix or reserved code ("?" if unknown)
pub fn code_name(code: u8) -> &'static str {
    NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, n)| *n)
        .unwrap_or("?")
}

/// Look up a matrix or reserved code by name (case-insensitive)
pub fn code_from_name(name: &str) -> Option<u8> {
    NAMES
        .iter()
        .find(|(_, n)| n.eq_ignore_ascii_case(name))
        .map(|(c, _)| *c)
}

/// One crosspoint of the 8x8 keyboard matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatrixCode(u8);

impl MatrixCode {
    pub const L_SHIFT: MatrixCode = MatrixCode(ckm::L_SHIFT);
    pub const R_SHIFT: MatrixCode = MatrixCode(ckm::R_SHIFT);

    /// `None` if the code does not fit in 6 bits
    pub const fn new(code: u8) -> Option<Self> {
        if code < 0x40 {
            Some(Self(code))
        } else {
            None
        }
    }

    pub const fn from_row_column(row: u8, column: u8) -> Self {
        Self(((row & 7) << 3) | (column & 7))
    }

    pub const fn code(self) -> u8 {
        self.0
    }

    pub const fn row(self) -> u8 {
        (self.0 >> 3) & 7
    }

    pub const fn column(self) -> u8 {
        self.0 & 7
    }

    /// All 64 crosspoints in code order
    pub fn all() -> impl Iterator<Item = MatrixCode> {
        (0..0x40).map(MatrixCode)
    }
}

impl fmt::Display for MatrixCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:02X})", code_name(self.0), self.0)
    }
}

/// What the controller does for one translated key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKey {
    Matrix(MatrixCode),
    /// Clear every switch and latch
    Reset,
    /// Out-of-band RESTORE (NMI) line
    Restore,
    /// Toggle the caps-lock latch on press
    CapsLock,
    /// Mapped on purpose to do nothing
    Ignore,
}

impl OutputKey {
    pub fn code(self) -> u8 {
        match self {
            OutputKey::Matrix(c) => c.code(),
            OutputKey::Reset => reserved::RESET,
            OutputKey::Restore => reserved::RESTORE,
            OutputKey::CapsLock => reserved::CAPS_LOCK,
            OutputKey::Ignore => reserved::IGNORE,
        }
    }

    pub fn name(self) -> &'static str {
        code_name(self.code())
    }
}

impl TryFrom<u8> for OutputKey {
    type Error = MatrixError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            reserved::RESET => Ok(OutputKey::Reset),
            reserved::RESTORE => Ok(OutputKey::Restore),
            reserved::CAPS_LOCK => Ok(OutputKey::CapsLock),
            reserved::IGNORE => Ok(OutputKey::Ignore),
            _ => MatrixCode::new(code)
                .map(OutputKey::Matrix)
                .ok_or(MatrixError::InvalidOutputCode(code)),
        }
    }
}

impl fmt::Display for OutputKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:02X})", self.name(), self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_column_split() {
        let rs = MatrixCode::R_SHIFT;
        assert_eq!((rs.row(), rs.column()), (6, 4));
        assert_eq!(MatrixCode::from_row_column(6, 4), rs);
        assert_eq!(MatrixCode::new(0x40), None);
    }

    #[test]
    fn test_every_matrix_code_has_a_name() {
        for code in MatrixCode::all() {
            assert_ne!(code_name(code.code()), "?", "code 0x{:02X}", code.code());
        }
    }

    #[test]
    fn test_output_key_from_code() {
        assert_eq!(OutputKey::try_from(0xad), Ok(OutputKey::CapsLock));
        assert_eq!(
            OutputKey::try_from(ckm::A),
            Ok(OutputKey::Matrix(MatrixCode(ckm::A)))
        );
        assert_eq!(
            OutputKey::try_from(0x50),
            Err(MatrixError::InvalidOutputCode(0x50))
        );
    }

    #[test]
    fn test_name_lookup() {
        assert_eq!(code_from_name("crsr_down"), Some(ckm::CRSR_DOWN));
        assert_eq!(code_from_name("Restore"), Some(reserved::RESTORE));
        assert_eq!(code_name(0x99), "?");
    }
}
