//! HID mouse input report (report ID 2).
//!
//! Layout (4 bytes):
//! ```text
//! Byte 0: Report ID (0x02)
//! Byte 1: Button bitfield
//!         Bit 0 = Left, Bit 1 = Right, Bit 2 = Middle, bits 3-7 padding
//! Byte 2: X displacement (signed, -127..127)
//! Byte 3: Y displacement (signed, -127..127)
//! ```

use crate::config::MOUSE_REPORT_ID;

/// Mouse report size in bytes, report ID included.
pub const MOUSE_REPORT_SIZE: usize = 4;

/// Bits of the button byte backed by a usage in the descriptor.
pub const MOUSE_BUTTON_MASK: u8 = 0x07;

/// Three-button relative mouse report.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MouseReport {
    /// Button bitfield (bit 0 = left, bit 1 = right, bit 2 = middle).
    pub buttons: u8,
    /// Relative X movement (signed).
    pub x: i8,
    /// Relative Y movement (signed).
    pub y: i8,
}

impl MouseReport {
    /// Create an idle (no movement, no buttons) report.
    pub const fn empty() -> Self {
        Self {
            buttons: 0,
            x: 0,
            y: 0,
        }
    }

    /// Serialise into a byte slice for transmission to the host.
    /// Returns the number of bytes written (always 4), or 0 if `buf` is
    /// too short.
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        if buf.len() < MOUSE_REPORT_SIZE {
            return 0;
        }
        buf[0] = MOUSE_REPORT_ID;
        buf[1] = self.buttons;
        buf[2] = self.x as u8;
        buf[3] = self.y as u8;
        MOUSE_REPORT_SIZE
    }

    /// Parse a report in wire form, report ID included.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < MOUSE_REPORT_SIZE || data[0] != MOUSE_REPORT_ID {
            return None;
        }
        Some(Self {
            buttons: data[1],
            x: data[2] as i8,
            y: data[3] as i8,
        })
    }

    /// Returns `true` when no buttons are pressed and there is no movement.
    pub fn is_idle(&self) -> bool {
        self.buttons == 0 && self.x == 0 && self.y == 0
    }
}
