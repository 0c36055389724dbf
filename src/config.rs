//! Device-wide constants and compile-time configuration.
//!
//! Identity values, report IDs, and the string table live here so they
//! can be tuned in one place. Everything the host sees before the first
//! report (attributes, strings) is derived from these constants.

// Identity

/// Attributes returned by GetDeviceAttributes until a SetFeature
/// request replaces them.
pub const HID_VID: u16 = 0xDEED;
pub const HID_PID: u16 = 0xFEED;
pub const HID_VERSION: u16 = 0x0101;

// Report IDs

/// Keyboard input collection.
pub const KEYBOARD_REPORT_ID: u8 = 0x01;

/// Mouse input collection.
pub const MOUSE_REPORT_ID: u8 = 0x02;

/// Vendor control collection used only by Get/Set-Feature.
///
/// Not declared in the report descriptor; the host never reads input
/// on it.
pub const CONTROL_COLLECTION_REPORT_ID: u8 = 0x03;

// Strings

/// HID string ids understood by GetString (hidport.h values).
pub const HID_STRING_ID_IMANUFACTURER: u16 = 14;
pub const HID_STRING_ID_IPRODUCT: u16 = 15;
pub const HID_STRING_ID_ISERIALNUMBER: u16 = 16;

/// Index served by GetIndexedString in addition to the ids above.
pub const DEVICE_STRING_INDEX: u16 = 5;

pub const MANUFACTURER_STRING: &str = "UMDF Virtual hidmini device Manufacturer string";
pub const PRODUCT_STRING: &str = "UMDF Virtual hidmini device Product string";
pub const SERIAL_NUMBER_STRING: &str = "UMDF Virtual hidmini device Serial Number string";
pub const DEVICE_STRING: &str = "UMDF Virtual hidmini device";

/// Upper bound for an encoded string, in bytes (126 UTF-16 code units).
pub const MAXIMUM_STRING_LENGTH: usize = 126 * 2;

// Keyboard

/// Simultaneous non-modifier keys carried by one keyboard report.
pub const MAX_PRESSED_KEYS: usize = 6;
