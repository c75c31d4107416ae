//! Matrix switch state machine
//!
//! Owns the in-memory mirror of the 64 crosspoints plus the shift and
//! caps-lock latches, and is the only thing that writes to the switch lines.
//!
//! The left-shift crosspoint always reads `left_shift_held || caps_lock`;
//! the right-shift crosspoint reads `right_shift_held || auto_shift`, where
//! `auto_shift` is set while an auto-shifted key holds it down. Releasing
//! that key restores the right shift switch even if the release itself did
//! not ask for auto-shift (shift let go before the key).

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::codes::{MatrixCode, OutputKey};
use crate::error::MatrixError;
use crate::lines::{select_levels, switch_address, Line, RestoreLine, SwitchLines, Variant};

/// Controller shared between the pipeline and read-only observers
pub type SharedController<L> = Arc<Mutex<MatrixSwitchController<L>>>;

/// Snapshot of every switch and latch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct SwitchMatrixState {
    /// Closed switches, indexed by row, one bit per column
    rows: [u8; 8],
    pub left_shift_held: bool,
    pub right_shift_held: bool,
    pub caps_lock_engaged: bool,
    /// Right shift is forced down by an auto-shifted key
    pub auto_shift_engaged: bool,
    /// Key that forced right shift down, while `auto_shift_engaged`
    pub auto_shift_key: Option<MatrixCode>,
    /// RESTORE line is being driven low
    pub restore_held: bool,
}

impl SwitchMatrixState {
    pub fn is_closed(&self, code: MatrixCode) -> bool {
        self.rows[code.row() as usize] & (1 << code.column()) != 0
    }

    fn set(&mut self, code: MatrixCode, closed: bool) {
        let bit = 1 << code.column();
        let row = &mut self.rows[code.row() as usize];
        if closed {
            *row |= bit;
        } else {
            *row &= !bit;
        }
    }

    /// Row bitmaps (bit n = column n)
    pub fn rows(&self) -> [u8; 8] {
        self.rows
    }

    /// All closed crosspoints in code order
    pub fn closed(&self) -> Vec<MatrixCode> {
        MatrixCode::all().filter(|&c| self.is_closed(c)).collect()
    }

    /// Check the shift/caps-lock invariant
    pub fn verify(&self) -> Result<(), MatrixError> {
        let left = self.is_closed(MatrixCode::L_SHIFT);
        let expected_left = self.left_shift_held || self.caps_lock_engaged;
        if left != expected_left {
            return Err(MatrixError::InvariantViolation {
                key: "L_SHIFT",
                expected: expected_left,
                actual: left,
            });
        }

        let right = self.is_closed(MatrixCode::R_SHIFT);
        let expected_right = self.right_shift_held || self.auto_shift_engaged;
        if right != expected_right {
            return Err(MatrixError::InvariantViolation {
                key: "R_SHIFT",
                expected: expected_right,
                actual: right,
            });
        }
        Ok(())
    }
}

impl fmt::Display for SwitchMatrixState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "lshift:{} rshift:{} caps:{} auto:{} restore:{}",
            self.left_shift_held as u8,
            self.right_shift_held as u8,
            self.caps_lock_engaged as u8,
            self.auto_shift_engaged as u8,
            self.restore_held as u8,
        )?;
        writeln!(f, "   01234567")?;
        for (row, bits) in self.rows.iter().enumerate() {
            write!(f, "{row}  ")?;
            for col in 0..8 {
                f.write_str(if bits & (1 << col) != 0 { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Drives the crosspoint switch array and tracks shift/caps-lock state
pub struct MatrixSwitchController<L> {
    lines: L,
    variant: Variant,
    state: SwitchMatrixState,
}

impl<L: SwitchLines> MatrixSwitchController<L> {
    /// Create a controller and bring the hardware to the all-clear state
    pub fn new(lines: L, variant: Variant) -> Self {
        let mut controller = Self {
            lines,
            variant,
            state: SwitchMatrixState::default(),
        };
        controller.reset();
        controller
    }

    pub fn into_shared(self) -> SharedController<L> {
        Arc::new(Mutex::new(self))
    }

    pub fn state(&self) -> &SwitchMatrixState {
        &self.state
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn lines(&self) -> &L {
        &self.lines
    }

    pub fn lines_mut(&mut self) -> &mut L {
        &mut self.lines
    }

    pub fn is_closed(&self, code: MatrixCode) -> bool {
        self.state.is_closed(code)
    }

    pub fn verify(&self) -> Result<(), MatrixError> {
        self.state.verify()
    }

    /// Human-readable bitmap and latch dump
    pub fn dump(&self) -> String {
        self.state.to_string()
    }

    /// Pulse the switch array reset and clear every crosspoint and latch
    pub fn reset(&mut self) {
        self.lines.restore(RestoreLine::Released);
        self.lines.write(Line::Reset, true);
        self.lines.write(Line::Data, false);
        self.lines.write(Line::Strobe, false);
        self.lines.write(Line::Reset, false);

        self.state = SwitchMatrixState::default();
        for code in MatrixCode::all() {
            self.set_switch(code, false);
        }
        debug!("Matrix reset");
    }

    /// Apply one key edge
    pub fn apply(&mut self, output: OutputKey, pressed: bool, auto_shift: bool) {
        match output {
            OutputKey::Ignore => {}

            OutputKey::Reset => self.reset(),

            OutputKey::Restore => {
                self.state.restore_held = pressed;
                self.lines.restore(if pressed {
                    RestoreLine::DriveLow
                } else {
                    RestoreLine::Released
                });
            }

            OutputKey::CapsLock => {
                if pressed {
                    self.state.caps_lock_engaged = !self.state.caps_lock_engaged;
                    let closed = self.state.left_shift_held || self.state.caps_lock_engaged;
                    self.set_switch(MatrixCode::L_SHIFT, closed);
                }
            }

            OutputKey::Matrix(code) if code == MatrixCode::L_SHIFT => {
                self.state.left_shift_held = pressed;
                self.set_switch(code, pressed || self.state.caps_lock_engaged);
            }

            OutputKey::Matrix(code) if code == MatrixCode::R_SHIFT => {
                self.state.right_shift_held = pressed;
                self.state.auto_shift_engaged = false;
                self.state.auto_shift_key = None;
                self.set_switch(code, pressed);
            }

            OutputKey::Matrix(code) => {
                if pressed && auto_shift {
                    self.state.auto_shift_engaged = true;
                    self.state.auto_shift_key = Some(code);
                    self.set_switch(MatrixCode::R_SHIFT, true);
                } else if !pressed && (auto_shift || self.state.auto_shift_key == Some(code)) {
                    self.state.auto_shift_engaged = false;
                    self.state.auto_shift_key = None;
                    let closed = self.state.right_shift_held;
                    self.set_switch(MatrixCode::R_SHIFT, closed);
                }
                self.set_switch(code, pressed);
            }
        }

        debug!(
            "Applied {} {} auto:{} lshift:{} rshift:{} caps:{}",
            output,
            if pressed { "down" } else { "up" },
            auto_shift as u8,
            self.state.left_shift_held as u8,
            self.state.right_shift_held as u8,
            self.state.caps_lock_engaged as u8,
        );
        debug_assert!(self.state.verify().is_ok(), "{:?}", self.state.verify());
    }

    /// Apply a raw output code (matrix or reserved)
    pub fn apply_code(
        &mut self,
        code: u8,
        pressed: bool,
        auto_shift: bool,
    ) -> Result<(), MatrixError> {
        let output = OutputKey::try_from(code)?;
        self.apply(output, pressed, auto_shift);
        Ok(())
    }

    /// Open or close one crosspoint: select lines, then data, then strobe
    fn set_switch(&mut self, code: MatrixCode, closed: bool) {
        self.state.set(code, closed);

        let (x, y) = switch_address(code, self.variant);
        for (line, level) in select_levels(x, y, self.variant) {
            self.lines.write(line, level);
        }
        self.lines.write(Line::Data, closed);
        self.lines.write(Line::Strobe, true);
        self.lines.write(Line::Strobe, false);
    }
}
