//! Crosspoint switch control lines
//!
//! The keyboard connector is wired to an MT8808 (8x8) or MT8812/MT8816
//! (12x8 / 16x8) analog switch array. One switch is addressed by driving the
//! AX/AY select lines, setting DATA, and pulsing STROBE.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::codes::MatrixCode;

/// Digital output lines to the switch array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Line {
    Ax0,
    Ax1,
    Ax2,
    /// Only present on MT8812/MT8816
    Ax3,
    Ay0,
    Ay1,
    Ay2,
    Data,
    Strobe,
    Reset,
}

impl Line {
    pub fn name(self) -> &'static str {
        match self {
            Line::Ax0 => "AX0",
            Line::Ax1 => "AX1",
            Line::Ax2 => "AX2",
            Line::Ax3 => "AX3",
            Line::Ay0 => "AY0",
            Line::Ay1 => "AY1",
            Line::Ay2 => "AY2",
            Line::Data => "DATA",
            Line::Strobe => "STROBE",
            Line::Reset => "RESET",
        }
    }
}

/// State of the bidirectional RESTORE (NMI) line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RestoreLine {
    /// Output, driven low
    DriveLow,
    /// Input with pull-up (high impedance towards the computer)
    Released,
}

/// Hardware capability used by the matrix controller
pub trait SwitchLines {
    /// Set one output line high or low
    fn write(&mut self, line: Line, high: bool);

    /// Drive or release the RESTORE line
    fn restore(&mut self, state: RestoreLine);
}

/// Switch array part fitted to the adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// 8x8, six select lines
    Mt8808,
    /// 12x8 / 16x8, seven select lines (AX3)
    #[default]
    Mt8812,
}

impl Variant {
    pub fn select_lines(self) -> usize {
        match self {
            Variant::Mt8808 => 6,
            Variant::Mt8812 => 7,
        }
    }

    pub fn has_ax3(self) -> bool {
        matches!(self, Variant::Mt8812)
    }
}

/// Matrix row (code bits 3..5) to switch X input, per the connector wiring
const ROW_TO_X: [u8; 8] = [6, 4, 3, 2, 1, 0, 7, 5];
/// Matrix column (code bits 0..2) to switch Y input
const COLUMN_TO_Y: [u8; 8] = [4, 5, 6, 3, 0, 1, 2, 7];

/// Switch array address (X, Y) for a matrix code
///
/// The MT8812/16 address table has a hole: addresses 6 and 7 select X12
/// and X13, while X6 and X7 are reached at addresses 8 and 9.
pub fn switch_address(code: MatrixCode, variant: Variant) -> (u8, u8) {
    let mut x = ROW_TO_X[code.row() as usize];
    let y = COLUMN_TO_Y[code.column() as usize];
    if variant.has_ax3() && (x & 6) == 6 {
        x += 2;
    }
    (x, y)
}

/// Select lines for an address, in the order they are driven
pub fn select_levels(x: u8, y: u8, variant: Variant) -> Vec<(Line, bool)> {
    let mut levels = vec![
        (Line::Ay0, y & 1 != 0),
        (Line::Ay1, y & 2 != 0),
        (Line::Ay2, y & 4 != 0),
        (Line::Ax0, x & 1 != 0),
        (Line::Ax1, x & 2 != 0),
        (Line::Ax2, x & 4 != 0),
    ];
    if variant.has_ax3() {
        levels.push((Line::Ax3, x & 8 != 0));
    }
    levels
}

/// One recorded line operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOp {
    Write(Line, bool),
    Restore(RestoreLine),
}

/// Records every operation instead of touching hardware
#[derive(Debug, Default, Clone)]
pub struct RecordingLines {
    ops: Vec<LineOp>,
}

impl RecordingLines {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[LineOp] {
        &self.ops
    }

    /// Return and forget the recorded operations
    pub fn take(&mut self) -> Vec<LineOp> {
        std::mem::take(&mut self.ops)
    }
}

impl SwitchLines for RecordingLines {
    fn write(&mut self, line: Line, high: bool) {
        self.ops.push(LineOp::Write(line, high));
    }

    fn restore(&mut self, state: RestoreLine) {
        self.ops.push(LineOp::Restore(state));
    }
}

/// Logs line activity at trace level; stands in for hardware in replays
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLines {
    writes: u64,
}

impl TracingLines {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of line writes performed so far
    pub fn writes(&self) -> u64 {
        self.writes
    }
}

impl SwitchLines for TracingLines {
    fn write(&mut self, line: Line, high: bool) {
        self.writes += 1;
        trace!("{} <- {}", line.name(), if high { "HIGH" } else { "LOW" });
    }

    fn restore(&mut self, state: RestoreLine) {
        trace!("RESTORE <- {:?}", state);
    }
}
