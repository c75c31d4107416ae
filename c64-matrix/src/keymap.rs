//! Input key to C64 matrix translation
//!
//! An input code may appear several times; the first entry whose
//! input-shift flags admit the current shift state wins. The output-shift
//! flags decide whether the right shift switch is forced down while the key
//! is held (keys that only exist shifted on the C64, e.g. F2 or cursor up).
//!
//! Tables can be loaded from TOML; input and output keys accept names or
//! numbers, e.g. `{ input = "F2", output = "F1", flags = "NO_SHIFT | SHIFT | OUT_NO_SHIFT | OUT_SHIFT" }`.

use bitflags::bitflags;
use irkey_protocol::hid;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::codes::{ckm, code_from_name, code_name, reserved, OutputKey};
use crate::error::MatrixError;

bitflags! {
    /// Input-shift admission and output-shift behaviour of one entry
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct ShiftPolicy: u8 {
        /// Entry applies when the input event has no shift
        const NO_SHIFT = 0x01;
        /// Entry applies when the input event carries shift
        const SHIFT = 0x02;
        /// With OUT_SHIFT: force shift even if the input had none
        const OUT_NO_SHIFT = 0x10;
        /// Pass input shift through to the right shift switch
        const OUT_SHIFT = 0x20;
    }
}

impl ShiftPolicy {
    /// Both input shift states, shift passed through
    pub const DEFAULT: ShiftPolicy = ShiftPolicy::NO_SHIFT
        .union(ShiftPolicy::SHIFT)
        .union(ShiftPolicy::OUT_SHIFT);

    /// Both input shift states, output always shifted
    pub const ALWAYS_SHIFTED: ShiftPolicy = ShiftPolicy::DEFAULT.union(ShiftPolicy::OUT_NO_SHIFT);

    /// Whether an entry with these flags applies to the given input shift state
    pub fn admits(self, shift: bool) -> bool {
        if shift {
            self.contains(ShiftPolicy::SHIFT)
        } else {
            self.contains(ShiftPolicy::NO_SHIFT)
        }
    }

    /// Whether the right shift switch is forced down for this key edge
    pub fn auto_shift(self, shift: bool) -> bool {
        self.contains(ShiftPolicy::OUT_SHIFT) && (self.contains(ShiftPolicy::OUT_NO_SHIFT) || shift)
    }
}

impl Default for ShiftPolicy {
    fn default() -> Self {
        ShiftPolicy::DEFAULT
    }
}

/// One translation rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyTranslationEntry {
    pub input: u8,
    pub output: OutputKey,
    pub flags: ShiftPolicy,
}

impl KeyTranslationEntry {
    /// Build an entry from a raw output code, rejecting codes that are
    /// neither matrix codes nor reserved codes
    pub fn new(input: u8, output: u8, flags: ShiftPolicy) -> Result<Self, MatrixError> {
        Ok(Self {
            input,
            output: OutputKey::try_from(output)?,
            flags,
        })
    }
}

/// Ordered translation table
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyTranslationTable {
    entries: Vec<KeyTranslationEntry>,
}

impl KeyTranslationTable {
    pub fn new(entries: Vec<KeyTranslationEntry>) -> Self {
        Self { entries }
    }

    /// Build from `(input, output code, flags)` triples, validating every output
    pub fn from_raw(raw: &[(u8, u8, ShiftPolicy)]) -> Result<Self, MatrixError> {
        raw.iter()
            .map(|&(input, output, flags)| KeyTranslationEntry::new(input, output, flags))
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }

    /// Build from a deserialized keymap file
    pub fn from_file(file: KeymapFile) -> Result<Self, MatrixError> {
        file.entries
            .into_iter()
            .map(|e| KeyTranslationEntry::new(e.input.0, e.output.0, e.flags))
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }

    /// Default PC keyboard layout
    pub fn builtin() -> Self {
        Self::new(
            BUILTIN
                .iter()
                .filter_map(|&(input, output, flags)| {
                    OutputKey::try_from(output)
                        .ok()
                        .map(|output| KeyTranslationEntry { input, output, flags })
                })
                .collect(),
        )
    }

    /// First entry for `input` whose flags admit the shift state
    pub fn lookup(&self, input: u8, shift: bool) -> Option<&KeyTranslationEntry> {
        self.entries
            .iter()
            .find(|e| e.input == input && e.flags.admits(shift))
    }

    /// Like [`lookup`](Self::lookup), with a missing entry as an error
    pub fn translate(&self, input: u8, shift: bool) -> Result<&KeyTranslationEntry, MatrixError> {
        self.lookup(input, shift)
            .ok_or(MatrixError::UnknownInputKey {
                code: input,
                shifted: shift,
            })
    }

    pub fn entries(&self) -> &[KeyTranslationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Keymap file schema
// ---------------------------------------------------------------------------

/// Keymap file: `[[entries]]` tables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeymapFile {
    #[serde(default)]
    pub entries: Vec<KeymapFileEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeymapFileEntry {
    pub input: InputCode,
    pub output: OutputCode,
    #[serde(default)]
    pub flags: ShiftPolicy,
}

impl From<&KeyTranslationTable> for KeymapFile {
    fn from(table: &KeyTranslationTable) -> Self {
        Self {
            entries: table
                .entries
                .iter()
                .map(|e| KeymapFileEntry {
                    input: InputCode(e.input),
                    output: OutputCode(e.output.code()),
                    flags: e.flags,
                })
                .collect(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CodeRepr {
    Number(u8),
    Name(String),
}

/// HID usage code, written as a key name (`"F2"`) or a number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputCode(pub u8);

impl Serialize for InputCode {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match hid::key_name(self.0) {
            "?" => s.serialize_u8(self.0),
            name => s.serialize_str(name),
        }
    }
}

impl<'de> Deserialize<'de> for InputCode {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        match CodeRepr::deserialize(d)? {
            CodeRepr::Number(n) => Ok(InputCode(n)),
            CodeRepr::Name(name) => hid::key_code_from_name(&name)
                .or_else(|| parse_number(&name))
                .map(InputCode)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown input key: {name}"))),
        }
    }
}

/// C64 matrix or reserved code, written as a key name (`"CRSR_DOWN"`) or a number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputCode(pub u8);

impl Serialize for OutputCode {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match code_name(self.0) {
            "?" => s.serialize_u8(self.0),
            name => s.serialize_str(name),
        }
    }
}

impl<'de> Deserialize<'de> for OutputCode {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        match CodeRepr::deserialize(d)? {
            CodeRepr::Number(n) => Ok(OutputCode(n)),
            CodeRepr::Name(name) => code_from_name(&name)
                .or_else(|| parse_number(&name))
                .map(OutputCode)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown C64 key: {name}"))),
        }
    }
}

/// Decimal or `0x` hex
fn parse_number(s: &str) -> Option<u8> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    }
}

// ---------------------------------------------------------------------------
// Built-in layout (HID usage codes)
// ---------------------------------------------------------------------------

const DEF: ShiftPolicy = ShiftPolicy::DEFAULT;
const ALWAYS: ShiftPolicy = ShiftPolicy::ALWAYS_SHIFTED;
const PLAIN: ShiftPolicy = ShiftPolicy::NO_SHIFT.union(ShiftPolicy::SHIFT);

#[rustfmt::skip]
const BUILTIN: &[(u8, u8, ShiftPolicy)] = &[
    (0xE1, ckm::L_SHIFT, DEF),
    (0xE0, ckm::CBM, DEF),
    (0xE5, ckm::R_SHIFT, DEF),
    (0x28, ckm::RETURN, DEF),

    (0x04, ckm::A, DEF), (0x05, ckm::B, DEF), (0x06, ckm::C, DEF), (0x07, ckm::D, DEF),
    (0x08, ckm::E, DEF), (0x09, ckm::F, DEF), (0x0A, ckm::G, DEF), (0x0B, ckm::H, DEF),
    (0x0C, ckm::I, DEF), (0x0D, ckm::J, DEF), (0x0E, ckm::K, DEF), (0x0F, ckm::L, DEF),
    (0x10, ckm::M, DEF), (0x11, ckm::N, DEF), (0x12, ckm::O, DEF), (0x13, ckm::P, DEF),
    (0x14, ckm::Q, DEF), (0x15, ckm::R, DEF), (0x16, ckm::S, DEF), (0x17, ckm::T, DEF),
    (0x18, ckm::U, DEF), (0x19, ckm::V, DEF), (0x1A, ckm::W, DEF), (0x1B, ckm::X, DEF),
    (0x1C, ckm::Y, DEF), (0x1D, ckm::Z, DEF),

    (0x1E, ckm::N1, DEF), (0x1F, ckm::N2, DEF), (0x20, ckm::N3, DEF), (0x21, ckm::N4, DEF),
    (0x22, ckm::N5, DEF), (0x23, ckm::N6, DEF), (0x24, ckm::N7, DEF), (0x25, ckm::N8, DEF),
    (0x26, ckm::N9, DEF), (0x27, ckm::N0, DEF),

    // F2/F4/F6/F8 are shifted F1/F3/F5/F7 on the C64
    (0x3A, ckm::F1, DEF), (0x3B, ckm::F1, ALWAYS),
    (0x3C, ckm::F3, DEF), (0x3D, ckm::F3, ALWAYS),
    (0x3E, ckm::F5, DEF), (0x3F, ckm::F5, ALWAYS),
    (0x40, ckm::F7, DEF), (0x41, ckm::F7, ALWAYS),

    (0x46, ckm::UP_ARROW, DEF),
    (0x48, ckm::POUND, DEF),
    (0x4A, ckm::HOME, DEF),
    (0x4D, reserved::RESTORE, DEF),
    (0x2D, ckm::PLUS, DEF),
    (0x2E, ckm::MINUS, DEF),
    (0x29, ckm::STOP, DEF),
    (0x2B, ckm::CTRL, DEF),
    (0x39, ckm::STOP, DEF),

    // Only down and right cursors exist; up and left are shifted
    (0x52, ckm::CRSR_DOWN, ALWAYS),
    (0x51, ckm::CRSR_DOWN, DEF),
    (0x50, ckm::CRSR_RIGHT, ALWAYS),
    (0x4F, ckm::CRSR_RIGHT, DEF),

    (0x32, ckm::EQUAL, DEF),
    (0x2F, ckm::AT, DEF),
    (0x30, ckm::ASTERISK, DEF),
    (0x33, ckm::COLON, DEF),
    (0x34, ckm::SEMICOLON, DEF),
    (0x37, ckm::PERIOD, DEF),
    (0x36, ckm::COMMA, DEF),
    (0x2A, ckm::DEL, DEF),
    (0x38, ckm::SLASH, DEF),
    (0x31, reserved::CAPS_LOCK, PLAIN),
    (0x2C, ckm::SPACE, DEF),
    (0x35, ckm::LEFT_ARROW, DEF),
    (0x58, ckm::RETURN, DEF),
    (0x66, reserved::RESET, DEF),
];
