//! HID keyboard input report (report ID 1).
//!
//! Layout (9 bytes):
//! ```text
//! Byte 0: Report ID (0x01)
//! Byte 1: Modifier keys (bitfield)
//!         Bit 0 = Left Ctrl,  Bit 1 = Left Shift,
//!         Bit 2 = Left Alt,   Bit 3 = Left GUI,
//!         Bit 4 = Right Ctrl, Bit 5 = Right Shift,
//!         Bit 6 = Right Alt,  Bit 7 = Right GUI
//! Byte 2: Reserved (0x00)
//! Byte 3-8: Up to 6 simultaneous key codes (USB HID usage codes)
//! ```

use crate::config::{KEYBOARD_REPORT_ID, MAX_PRESSED_KEYS};

/// Keyboard report size in bytes, report ID included.
pub const KEYBOARD_REPORT_SIZE: usize = 3 + MAX_PRESSED_KEYS;

/// First modifier usage (Left Control).
pub const MODIFIER_FIRST: u8 = 0xE0;
/// Last modifier usage (Right GUI).
pub const MODIFIER_LAST: u8 = 0xE7;

/// Returns `true` for the eight modifier usages, which live in the
/// modifier bitmap rather than the key array.
pub const fn is_modifier(code: u8) -> bool {
    code >= MODIFIER_FIRST && code <= MODIFIER_LAST
}

/// Keyboard input report with report-ID prefix.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyboardReport {
    /// Modifier key bitfield.
    pub modifier: u8,
    /// Up to 6 pressed key codes in press order, 0 = empty slot.
    pub keycodes: [u8; MAX_PRESSED_KEYS],
}

impl KeyboardReport {
    /// Create an empty (all-keys-released) report.
    pub const fn empty() -> Self {
        Self {
            modifier: 0,
            keycodes: [0; MAX_PRESSED_KEYS],
        }
    }

    /// Apply one key transition.
    ///
    /// Modifier usages toggle their bit. Other codes occupy the first free
    /// slot on press and free their slot on release. A press with all
    /// slots taken and a release of a key that is not held are no-ops.
    ///
    /// Unlike a plain "write into the first empty slot", a press of a code
    /// that is already held is also a no-op, so one key never fills two
    /// slots and a single release always clears it.
    ///
    /// Returns `true` when the report changed.
    pub fn apply_key(&mut self, code: u8, pressed: bool) -> bool {
        let before = *self;

        if is_modifier(code) {
            let bit = 1u8 << (code - MODIFIER_FIRST);
            if pressed {
                self.modifier |= bit;
            } else {
                self.modifier &= !bit;
            }
        } else if code == 0 {
            // Usage 0 marks an empty slot; it never occupies one.
        } else if pressed {
            if !self.keycodes.contains(&code) {
                if let Some(slot) = self.keycodes.iter_mut().find(|k| **k == 0) {
                    *slot = code;
                }
            }
        } else if let Some(slot) = self.keycodes.iter_mut().find(|k| **k == code) {
            *slot = 0;
        }

        *self != before
    }

    /// Number of occupied key slots.
    pub fn pressed_count(&self) -> usize {
        self.keycodes.iter().filter(|&&k| k != 0).count()
    }

    /// Serialise into a byte slice for transmission to the host.
    /// Returns the number of bytes written (always 9), or 0 if `buf` is
    /// too short.
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        if buf.len() < KEYBOARD_REPORT_SIZE {
            return 0;
        }
        buf[0] = KEYBOARD_REPORT_ID;
        buf[1] = self.modifier;
        buf[2] = 0;
        buf[3..KEYBOARD_REPORT_SIZE].copy_from_slice(&self.keycodes);
        KEYBOARD_REPORT_SIZE
    }

    /// Parse a report in wire form, report ID included.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < KEYBOARD_REPORT_SIZE || data[0] != KEYBOARD_REPORT_ID {
            return None;
        }
        let mut keycodes = [0u8; MAX_PRESSED_KEYS];
        keycodes.copy_from_slice(&data[3..KEYBOARD_REPORT_SIZE]);
        Some(Self {
            modifier: data[1],
            keycodes,
        })
    }

    /// Returns `true` if no keys are pressed.
    pub fn is_empty(&self) -> bool {
        self.modifier == 0 && self.keycodes.iter().all(|&k| k == 0)
    }
}
