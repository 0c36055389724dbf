//! Fixed UTF-16 string table served by GetString / GetIndexedString.

use crate::config::{
    DEVICE_STRING, DEVICE_STRING_INDEX, HID_STRING_ID_IMANUFACTURER, HID_STRING_ID_IPRODUCT,
    HID_STRING_ID_ISERIALNUMBER, MANUFACTURER_STRING, MAXIMUM_STRING_LENGTH, PRODUCT_STRING,
    SERIAL_NUMBER_STRING,
};
use crate::error::{Error, Result};
use heapless::Vec;

/// Encoded string: UTF-16LE code units followed by a NUL code unit.
pub type EncodedString = Vec<u8, MAXIMUM_STRING_LENGTH>;

/// String id and language id packed into one 32-bit request value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StringSelector {
    pub string_id: u16,
    /// Carried through but not used for lookup; one language is served.
    pub language_id: u16,
}

impl StringSelector {
    /// Low 16 bits hold the id, high 16 bits the language.
    pub const fn unpack(value: u32) -> Self {
        Self {
            string_id: (value & 0xFFFF) as u16,
            language_id: (value >> 16) as u16,
        }
    }

    #[cfg(test)]
    pub const fn pack(&self) -> u32 {
        ((self.language_id as u32) << 16) | self.string_id as u32
    }
}

/// Look up a standard HID string id.
pub fn lookup(string_id: u16) -> Option<&'static str> {
    match string_id {
        HID_STRING_ID_IMANUFACTURER => Some(MANUFACTURER_STRING),
        HID_STRING_ID_IPRODUCT => Some(PRODUCT_STRING),
        HID_STRING_ID_ISERIALNUMBER => Some(SERIAL_NUMBER_STRING),
        _ => None,
    }
}

/// Look up an indexed string: the device string index first, then the
/// standard ids.
pub fn lookup_indexed(index: u16) -> Option<&'static str> {
    if index == DEVICE_STRING_INDEX {
        return Some(DEVICE_STRING);
    }
    lookup(index)
}

/// Encode `s` as UTF-16LE with a terminating NUL.
pub fn encode(s: &str) -> Result<EncodedString> {
    let mut out = EncodedString::new();
    for unit in s.encode_utf16().chain(core::iter::once(0)) {
        out.extend_from_slice(&unit.to_le_bytes())
            .map_err(|_| Error::InvalidParameter)?;
    }
    Ok(out)
}
