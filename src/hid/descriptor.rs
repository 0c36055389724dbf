//! Static descriptor set: report descriptor, HID descriptor header and
//! the device attributes block.

use crate::config;

/// HID report descriptor for the composite keyboard + mouse device.
///
/// Two application collections, each with its own report ID:
///   - Keyboard (ID 1): 8 modifier bits, 1 reserved byte, 6 key codes
///   - Mouse    (ID 2): 3 buttons + 5 padding bits, relative X and Y
pub const REPORT_DESCRIPTOR: [u8; 99] = [
    // ===== Keyboard =====
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x06, // Usage (Keyboard)
    0xA1, 0x01, // Collection (Application)
    0x85, 0x01, //   Report ID (1)
    //
    //   - Modifier keys (8 bits) -
    0x05, 0x07, //   Usage Page (Keyboard/Keypad)
    0x19, 0xE0, //   Usage Minimum (Left Control)
    0x29, 0xE7, //   Usage Maximum (Right GUI)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x08, //   Report Count (8)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    //   - Reserved byte -
    0x95, 0x01, //   Report Count (1)
    0x75, 0x08, //   Report Size (8)
    0x81, 0x01, //   Input (Constant)
    //
    //   - Key codes (6 bytes) -
    0x95, 0x06, //   Report Count (6)
    0x75, 0x08, //   Report Size (8)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x65, //   Logical Maximum (101)
    0x05, 0x07, //   Usage Page (Keyboard/Keypad)
    0x19, 0x00, //   Usage Minimum (0)
    0x29, 0x65, //   Usage Maximum (101)
    0x81, 0x00, //   Input (Data, Array)
    0xC0, // End Collection
    //
    // ===== Mouse =====
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x02, // Usage (Mouse)
    0xA1, 0x01, // Collection (Application)
    0x85, 0x02, //   Report ID (2)
    0x09, 0x01, //   Usage (Pointer)
    0xA1, 0x00, //   Collection (Physical)
    //
    //   - Buttons (3 bits + 5 padding) -
    0x05, 0x09, //     Usage Page (Buttons)
    0x19, 0x01, //     Usage Minimum (Button 1)
    0x29, 0x03, //     Usage Maximum (Button 3)
    0x15, 0x00, //     Logical Minimum (0)
    0x25, 0x01, //     Logical Maximum (1)
    0x95, 0x03, //     Report Count (3)
    0x75, 0x01, //     Report Size (1)
    0x81, 0x02, //     Input (Data, Variable, Absolute)
    0x95, 0x01, //     Report Count (1)
    0x75, 0x05, //     Report Size (5)
    0x81, 0x01, //     Input (Constant) - padding
    //
    //   - X, Y displacement -
    0x05, 0x01, //     Usage Page (Generic Desktop)
    0x09, 0x30, //     Usage (X)
    0x09, 0x31, //     Usage (Y)
    0x15, 0x81, //     Logical Minimum (-127)
    0x25, 0x7F, //     Logical Maximum (127)
    0x75, 0x08, //     Report Size (8)
    0x95, 0x02, //     Report Count (2)
    0x81, 0x06, //     Input (Data, Variable, Relative)
    0xC0, //   End Collection (Physical)
    0xC0, // End Collection (Application)
];

/// HID descriptor header size in bytes.
pub const HID_DESCRIPTOR_SIZE: usize = 9;

/// HID class descriptor type.
const HID_DESCRIPTOR_TYPE: u8 = 0x21;
/// Report descriptor type, as listed in the HID descriptor.
const REPORT_DESCRIPTOR_TYPE: u8 = 0x22;
/// HID specification release 1.00 (BCD).
const HID_SPEC_RELEASE: u16 = 0x0100;

/// 9-byte HID descriptor header pointing at [`REPORT_DESCRIPTOR`].
pub const HID_DESCRIPTOR: [u8; HID_DESCRIPTOR_SIZE] = {
    let release = HID_SPEC_RELEASE.to_le_bytes();
    let report_len = (REPORT_DESCRIPTOR.len() as u16).to_le_bytes();
    [
        HID_DESCRIPTOR_SIZE as u8, // bLength
        HID_DESCRIPTOR_TYPE,       // bDescriptorType
        release[0],                // bcdHID
        release[1],
        0x00, // bCountryCode: not specified
        0x01, // bNumDescriptors
        REPORT_DESCRIPTOR_TYPE,
        report_len[0], // wDescriptorLength
        report_len[1],
    ]
};

/// Size of the HID_DEVICE_ATTRIBUTES block returned to the host.
pub const DEVICE_ATTRIBUTES_SIZE: usize = 32;

/// Vendor / product / version triple.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceAttributes {
    pub vendor_id: u16,
    pub product_id: u16,
    pub version_number: u16,
}

impl Default for DeviceAttributes {
    fn default() -> Self {
        Self {
            vendor_id: config::HID_VID,
            product_id: config::HID_PID,
            version_number: config::HID_VERSION,
        }
    }
}

impl DeviceAttributes {
    /// Wire form: `Size: u32`, VID, PID, version (LE `u16`), then 22
    /// reserved zero bytes.
    pub fn to_bytes(&self) -> [u8; DEVICE_ATTRIBUTES_SIZE] {
        let mut out = [0u8; DEVICE_ATTRIBUTES_SIZE];
        out[0..4].copy_from_slice(&(DEVICE_ATTRIBUTES_SIZE as u32).to_le_bytes());
        out[4..6].copy_from_slice(&self.vendor_id.to_le_bytes());
        out[6..8].copy_from_slice(&self.product_id.to_le_bytes());
        out[8..10].copy_from_slice(&self.version_number.to_le_bytes());
        out
    }

    /// Compact 6-byte form used by the control collection features.
    pub fn to_feature_bytes(&self) -> [u8; 6] {
        let v = self.vendor_id.to_le_bytes();
        let p = self.product_id.to_le_bytes();
        let r = self.version_number.to_le_bytes();
        [v[0], v[1], p[0], p[1], r[0], r[1]]
    }

    /// Inverse of [`DeviceAttributes::to_feature_bytes`].
    pub fn from_feature_bytes(data: &[u8; 6]) -> Self {
        Self {
            vendor_id: u16::from_le_bytes([data[0], data[1]]),
            product_id: u16::from_le_bytes([data[2], data[3]]),
            version_number: u16::from_le_bytes([data[4], data[5]]),
        }
    }
}
