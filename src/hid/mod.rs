//! HID report types, descriptors and the string table.

pub mod descriptor;
pub mod keyboard;
pub mod mouse;
pub mod strings;


use crate::config::{KEYBOARD_REPORT_ID, MOUSE_REPORT_ID};
use crate::error::{Error, Result};
use heapless::Vec;
use keyboard::{KeyboardReport, KEYBOARD_REPORT_SIZE};
use mouse::{MouseReport, MOUSE_REPORT_SIZE};

/// Largest input report, report ID included.
pub const MAX_INPUT_REPORT_SIZE: usize = KEYBOARD_REPORT_SIZE;

/// Input collections declared by the report descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportKind {
    Keyboard,
    Mouse,
}

impl ReportKind {
    pub const fn report_id(self) -> u8 {
        match self {
            ReportKind::Keyboard => KEYBOARD_REPORT_ID,
            ReportKind::Mouse => MOUSE_REPORT_ID,
        }
    }

    /// Wire size of this report, report ID included.
    pub const fn report_size(self) -> usize {
        match self {
            ReportKind::Keyboard => KEYBOARD_REPORT_SIZE,
            ReportKind::Mouse => MOUSE_REPORT_SIZE,
        }
    }
}

impl TryFrom<u8> for ReportKind {
    type Error = Error;

    fn try_from(report_id: u8) -> Result<Self> {
        match report_id {
            KEYBOARD_REPORT_ID => Ok(ReportKind::Keyboard),
            MOUSE_REPORT_ID => Ok(ReportKind::Mouse),
            _ => Err(Error::InvalidParameter),
        }
    }
}

/// Snapshot of one input report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HidReport {
    Keyboard(KeyboardReport),
    Mouse(MouseReport),
}

impl HidReport {
    pub fn kind(&self) -> ReportKind {
        match self {
            HidReport::Keyboard(_) => ReportKind::Keyboard,
            HidReport::Mouse(_) => ReportKind::Mouse,
        }
    }

    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        match self {
            HidReport::Keyboard(k) => k.serialize(buf),
            HidReport::Mouse(m) => m.serialize(buf),
        }
    }

    /// Owned wire form, sized exactly to the report.
    pub fn to_bytes(&self) -> InputReport {
        let mut buf = [0u8; MAX_INPUT_REPORT_SIZE];
        let n = self.serialize(&mut buf);
        let mut out = InputReport::new();
        // n never exceeds the capacity: both reports fit MAX_INPUT_REPORT_SIZE.
        let _ = out.extend_from_slice(&buf[..n]);
        out
    }

    /// Parse a report from wire form, dispatching on the leading report ID.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        match data.first().copied()? {
            KEYBOARD_REPORT_ID => KeyboardReport::from_bytes(data).map(HidReport::Keyboard),
            MOUSE_REPORT_ID => MouseReport::from_bytes(data).map(HidReport::Mouse),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn is_keyboard(&self) -> bool {
        matches!(self, HidReport::Keyboard(_))
    }

    #[cfg(test)]
    pub fn is_mouse(&self) -> bool {
        matches!(self, HidReport::Mouse(_))
    }
}

/// Serialized input report as delivered to the host.
pub type InputReport = Vec<u8, MAX_INPUT_REPORT_SIZE>;
