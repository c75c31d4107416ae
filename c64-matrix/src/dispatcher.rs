//! Route decoded key events to the matrix controller

use std::collections::HashMap;

use irkey_protocol::KeyEvent;
use tracing::debug;

use crate::codes::OutputKey;
use crate::controller::MatrixSwitchController;
use crate::error::MatrixError;
use crate::keymap::KeyTranslationTable;
use crate::lines::SwitchLines;

/// What a dispatched event turned into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    /// Key edge applied to the matrix
    Applied {
        output: OutputKey,
        pressed: bool,
        auto_shift: bool,
    },
    /// Joystick state, left for the joystick sink
    Joystick {
        x: i8,
        y: i8,
        button1: bool,
        button2: bool,
    },
    /// Invalid event, nothing to do
    Skipped,
}

/// Translates key events through a table and applies them
#[derive(Debug, Clone, Default)]
pub struct KeyEventDispatcher {
    table: KeyTranslationTable,
    /// Output and auto-shift flag applied on press, per held input code
    held: HashMap<u8, (OutputKey, bool)>,
}

impl KeyEventDispatcher {
    pub fn new(table: KeyTranslationTable) -> Self {
        Self {
            table,
            held: HashMap::new(),
        }
    }

    /// Forget every held key, e.g. after the matrix was reset
    pub fn clear_held(&mut self) {
        self.held.clear();
    }

    pub fn is_held(&self, code: u8) -> bool {
        self.held.contains_key(&code)
    }

    pub fn table(&self) -> &KeyTranslationTable {
        &self.table
    }

    /// Dispatch one event. An input key with no entry for its shift state
    /// is an error and leaves the matrix untouched.
    ///
    /// A release undoes what the matching press applied, whatever the
    /// shift state has become since.
    pub fn dispatch<L: SwitchLines>(
        &mut self,
        event: &KeyEvent,
        controller: &mut MatrixSwitchController<L>,
    ) -> Result<Dispatched, MatrixError> {
        match *event {
            KeyEvent::Key { code, released, .. } => {
                let shift = event.shift();
                let pressed = !released;
                let remembered = if pressed {
                    self.held.get(&code).copied()
                } else {
                    self.held.remove(&code)
                };
                let (output, auto_shift) = match remembered {
                    Some(applied) => applied,
                    None => {
                        let entry = self.table.translate(code, shift)?;
                        (entry.output, entry.flags.auto_shift(shift))
                    }
                };
                if pressed {
                    self.held.insert(code, (output, auto_shift));
                }

                debug!(
                    "Key 0x{:02X} ({}) shift:{} -> {}",
                    code,
                    irkey_protocol::hid::key_name(code),
                    shift as u8,
                    output
                );
                controller.apply(output, pressed, auto_shift);

                Ok(Dispatched::Applied {
                    output,
                    pressed,
                    auto_shift,
                })
            }
            KeyEvent::Joystick {
                x,
                y,
                button1,
                button2,
            } => Ok(Dispatched::Joystick {
                x,
                y,
                button1,
                button2,
            }),
            KeyEvent::Invalid => Ok(Dispatched::Skipped),
        }
    }
}
