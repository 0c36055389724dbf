//! Input events delivered over the side channel by the injecting process.
//!
//! Payloads are validated for exact size before any byte is read.

use crate::error::{ensure_exact_input, Error, Result};
use crate::hid::mouse::MOUSE_BUTTON_MASK;

/// `{KeyCode: u8, Pressed: u8}`
pub const KEY_EVENT_SIZE: usize = 2;

/// `{Buttons: u8, X: i8, Y: i8}`
pub const MOUSE_EVENT_SIZE: usize = 3;

/// One key transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyEvent {
    pub key_code: u8,
    pub pressed: bool,
}

impl KeyEvent {
    pub const fn press(key_code: u8) -> Self {
        Self {
            key_code,
            pressed: true,
        }
    }

    pub const fn release(key_code: u8) -> Self {
        Self {
            key_code,
            pressed: false,
        }
    }

    /// Decode the side-channel payload. `Pressed` must be 0 or 1.
    pub fn parse(input: &[u8]) -> Result<Self> {
        ensure_exact_input(input, KEY_EVENT_SIZE)?;
        let pressed = match input[1] {
            0 => false,
            1 => true,
            _ => return Err(Error::InvalidParameter),
        };
        Ok(Self {
            key_code: input[0],
            pressed,
        })
    }

    pub fn to_bytes(&self) -> [u8; KEY_EVENT_SIZE] {
        [self.key_code, self.pressed as u8]
    }
}

/// Absolute button state plus one relative movement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MouseEvent {
    pub buttons: u8,
    pub x: i8,
    pub y: i8,
}

impl MouseEvent {
    /// Decode the side-channel payload. Only the three declared button
    /// bits may be set.
    pub fn parse(input: &[u8]) -> Result<Self> {
        ensure_exact_input(input, MOUSE_EVENT_SIZE)?;
        if input[0] & !MOUSE_BUTTON_MASK != 0 {
            return Err(Error::InvalidParameter);
        }
        Ok(Self {
            buttons: input[0],
            x: input[1] as i8,
            y: input[2] as i8,
        })
    }

    pub fn to_bytes(&self) -> [u8; MOUSE_EVENT_SIZE] {
        [self.buttons, self.x as u8, self.y as u8]
    }
}
