//! Control-request dispatcher.
//!
//! Maps each I/O control code to exactly one handler. Codes are the
//! HID minidriver IOCTL values and must match the host transport bit for
//! bit. Codes the device knows but does not serve share one table arm
//! that fails [`Error::NotImplemented`], as do codes it does not know.

use log::{debug, warn};

use super::event::{KeyEvent, MouseEvent};
use super::pending::{ReadHandle, ReadOutcome};
use super::VirtualHidDevice;
use crate::config::CONTROL_COLLECTION_REPORT_ID;
use crate::error::{
    ensure_exact_input, ensure_output, Error, Result, STATUS_SUCCESS,
};
use crate::hid::descriptor::{DeviceAttributes, HID_DESCRIPTOR, REPORT_DESCRIPTOR};
use crate::hid::strings::{self, StringSelector};
use crate::hid::{ReportKind, MAX_INPUT_REPORT_SIZE};

/// Returned for a read that was parked.
pub const STATUS_PENDING: u32 = 0x0000_0103;

const FILE_DEVICE_KEYBOARD: u32 = 0x0B;
const FILE_DEVICE_UNKNOWN: u32 = 0x22;
const METHOD_BUFFERED: u32 = 0;
const METHOD_IN_DIRECT: u32 = 1;
const METHOD_OUT_DIRECT: u32 = 2;
const METHOD_NEITHER: u32 = 3;

const fn ctl_code(device_type: u32, function: u32, method: u32) -> u32 {
    // FILE_ANY_ACCESS
    (device_type << 16) | (function << 2) | method
}

const fn hid_ctl_code(id: u32) -> u32 {
    ctl_code(FILE_DEVICE_KEYBOARD, id, METHOD_NEITHER)
}

const fn hid_in_ctl_code(id: u32) -> u32 {
    ctl_code(FILE_DEVICE_KEYBOARD, id, METHOD_IN_DIRECT)
}

const fn hid_out_ctl_code(id: u32) -> u32 {
    ctl_code(FILE_DEVICE_KEYBOARD, id, METHOD_OUT_DIRECT)
}

/// Every control code the device recognises.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoControlCode {
    GetDeviceDescriptor,
    GetReportDescriptor,
    ReadReport,
    WriteReport,
    GetString,
    ActivateDevice,
    DeactivateDevice,
    GetDeviceAttributes,
    SendIdleNotificationRequest,
    SetFeature,
    GetFeature,
    SetOutputReport,
    GetPhysicalDescriptor,
    GetInputReport,
    GetIndexedString,
    /// Side channel: `{KeyCode, Pressed}` from the injecting process.
    KeyEvent,
    /// Side channel: `{Buttons, X, Y}` from the injecting process.
    MouseEvent,
}

const CONTROL_CODES: [(u32, IoControlCode); 17] = [
    (hid_ctl_code(0), IoControlCode::GetDeviceDescriptor),
    (hid_ctl_code(1), IoControlCode::GetReportDescriptor),
    (hid_ctl_code(2), IoControlCode::ReadReport),
    (hid_ctl_code(3), IoControlCode::WriteReport),
    (hid_ctl_code(4), IoControlCode::GetString),
    (hid_ctl_code(7), IoControlCode::ActivateDevice),
    (hid_ctl_code(8), IoControlCode::DeactivateDevice),
    (hid_ctl_code(9), IoControlCode::GetDeviceAttributes),
    (hid_ctl_code(10), IoControlCode::SendIdleNotificationRequest),
    (hid_in_ctl_code(100), IoControlCode::SetFeature),
    (hid_out_ctl_code(100), IoControlCode::GetFeature),
    (hid_in_ctl_code(101), IoControlCode::SetOutputReport),
    (hid_out_ctl_code(102), IoControlCode::GetPhysicalDescriptor),
    (hid_out_ctl_code(104), IoControlCode::GetInputReport),
    (hid_out_ctl_code(120), IoControlCode::GetIndexedString),
    (
        ctl_code(FILE_DEVICE_UNKNOWN, 0x800, METHOD_BUFFERED),
        IoControlCode::KeyEvent,
    ),
    (
        ctl_code(FILE_DEVICE_UNKNOWN, 0x801, METHOD_BUFFERED),
        IoControlCode::MouseEvent,
    ),
];

impl IoControlCode {
    /// Numeric IOCTL value.
    pub fn code(self) -> u32 {
        CONTROL_CODES
            .iter()
            .find(|(_, op)| *op == self)
            .map(|(code, _)| *code)
            .unwrap_or_default()
    }

    pub fn from_code(code: u32) -> Option<Self> {
        CONTROL_CODES
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, op)| *op)
    }
}

/// Control codes carried by the side-channel feature request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
enum ControlCode {
    SetAttributes = 0x00,
    Dummy1 = 0x01,
    Dummy2 = 0x02,
}

impl ControlCode {
    fn from_u8(code: u8) -> Option<Self> {
        match code {
            0x00 => Some(ControlCode::SetAttributes),
            0x01 => Some(ControlCode::Dummy1),
            0x02 => Some(ControlCode::Dummy2),
            _ => None,
        }
    }
}

/// `{ReportId, ControlCode, payload[8]}`
pub const CONTROL_INFO_SIZE: usize = 10;

/// `{ReportId, VendorID, ProductID, VersionNumber}`
pub const FEATURE_ATTRIBUTES_SIZE: usize = 7;

/// One request from the host or the injecting process.
///
/// `input` carries write-style payloads, `output` the caller's buffer.
/// `report_id` is the transfer packet's report ID for report and feature
/// requests; `value` is the packed 32-bit parameter of string requests.
#[derive(Debug)]
pub struct IoRequest<'a> {
    pub code: u32,
    pub report_id: u8,
    pub value: u32,
    pub input: &'a [u8],
    pub output: &'a mut [u8],
}

impl<'a> IoRequest<'a> {
    pub fn new(code: u32) -> Self {
        Self {
            code,
            report_id: 0,
            value: 0,
            input: &[],
            output: &mut [],
        }
    }

    pub fn op(op: IoControlCode) -> Self {
        Self::new(op.code())
    }

    pub fn with_report_id(mut self, report_id: u8) -> Self {
        self.report_id = report_id;
        self
    }

    pub fn with_value(mut self, value: u32) -> Self {
        self.value = value;
        self
    }

    pub fn with_input(mut self, input: &'a [u8]) -> Self {
        self.input = input;
        self
    }

    pub fn with_output(mut self, output: &'a mut [u8]) -> Self {
        self.output = output;
        self
    }
}

/// Successful outcome of a request.
#[derive(Debug)]
pub enum IoStatus {
    /// Completed; the number of bytes produced (or consumed, for writes).
    Complete(usize),
    /// Parked read. The handle completes with the report bytes;
    /// [`ReadHandle::wait_into`] copies them into the caller's buffer and
    /// yields the byte count.
    Pending(ReadHandle),
}

impl IoStatus {
    pub fn bytes(&self) -> Option<usize> {
        match self {
            IoStatus::Complete(n) => Some(*n),
            IoStatus::Pending(_) => None,
        }
    }
}

/// NTSTATUS for a dispatch result.
pub fn completion_status(result: &Result<IoStatus>) -> u32 {
    match result {
        Ok(IoStatus::Complete(_)) => STATUS_SUCCESS,
        Ok(IoStatus::Pending(_)) => STATUS_PENDING,
        Err(e) => e.status(),
    }
}

fn copy_out(output: &mut [u8], data: &[u8]) -> Result<IoStatus> {
    ensure_output(output, data.len())?;
    output[..data.len()].copy_from_slice(data);
    Ok(IoStatus::Complete(data.len()))
}

impl VirtualHidDevice {
    /// Route one request to its handler.
    pub fn dispatch(&self, request: IoRequest<'_>) -> Result<IoStatus> {
        let Some(op) = IoControlCode::from_code(request.code) else {
            warn!("unknown control code {:#010x}", request.code);
            return Err(Error::NotImplemented);
        };
        debug!("dispatch {:?}", op);

        let result = match op {
            IoControlCode::GetDeviceDescriptor => copy_out(request.output, &HID_DESCRIPTOR),
            IoControlCode::GetReportDescriptor => copy_out(request.output, &REPORT_DESCRIPTOR),
            IoControlCode::GetDeviceAttributes => {
                copy_out(request.output, &self.attributes().to_bytes())
            }
            IoControlCode::ReadReport => self.dispatch_read(request.output),
            IoControlCode::WriteReport | IoControlCode::SetOutputReport => {
                Self::acknowledge_output(request.report_id, request.input)
            }
            IoControlCode::GetInputReport => self.get_input_report(request.report_id, request.output),
            IoControlCode::GetFeature => self.get_feature(request.report_id, request.output),
            IoControlCode::SetFeature => self.set_feature(request.report_id, request.input),
            IoControlCode::GetString => {
                let sel = StringSelector::unpack(request.value);
                Self::copy_string(strings::lookup(sel.string_id), request.output)
            }
            IoControlCode::GetIndexedString => {
                let sel = StringSelector::unpack(request.value);
                Self::copy_string(strings::lookup_indexed(sel.string_id), request.output)
            }
            IoControlCode::KeyEvent => {
                self.inject_key(KeyEvent::parse(request.input)?);
                Ok(IoStatus::Complete(0))
            }
            IoControlCode::MouseEvent => {
                self.inject_mouse(MouseEvent::parse(request.input)?);
                Ok(IoStatus::Complete(0))
            }
            IoControlCode::ActivateDevice
            | IoControlCode::DeactivateDevice
            | IoControlCode::SendIdleNotificationRequest
            | IoControlCode::GetPhysicalDescriptor => Err(Error::NotImplemented),
        };

        if let Err(e) = &result {
            warn!("{:?} failed: {}", op, e);
        }
        result
    }

    fn dispatch_read(&self, output: &mut [u8]) -> Result<IoStatus> {
        ensure_output(output, MAX_INPUT_REPORT_SIZE)?;
        match self.read_report()? {
            ReadOutcome::Ready(report) => Ok(IoStatus::Complete(report.serialize(output))),
            ReadOutcome::Pending(handle) => Ok(IoStatus::Pending(handle)),
        }
    }

    /// Output reports are validated and acknowledged; they change nothing.
    fn acknowledge_output(report_id: u8, input: &[u8]) -> Result<IoStatus> {
        let kind = ReportKind::try_from(report_id)?;
        ensure_exact_input(input, kind.report_size())?;
        if input[0] != report_id {
            return Err(Error::InvalidParameter);
        }
        Ok(IoStatus::Complete(input.len()))
    }

    fn get_input_report(&self, report_id: u8, output: &mut [u8]) -> Result<IoStatus> {
        let kind = ReportKind::try_from(report_id)?;
        ensure_output(output, kind.report_size())?;
        let n = self.snapshot(kind).serialize(output);
        Ok(IoStatus::Complete(n))
    }

    fn get_feature(&self, report_id: u8, output: &mut [u8]) -> Result<IoStatus> {
        if report_id != CONTROL_COLLECTION_REPORT_ID {
            return Err(Error::InvalidParameter);
        }
        let mut data = [0u8; FEATURE_ATTRIBUTES_SIZE];
        data[0] = CONTROL_COLLECTION_REPORT_ID;
        data[1..].copy_from_slice(&self.attributes().to_feature_bytes());
        copy_out(output, &data)
    }

    fn set_feature(&self, report_id: u8, input: &[u8]) -> Result<IoStatus> {
        if report_id != CONTROL_COLLECTION_REPORT_ID {
            return Err(Error::InvalidParameter);
        }
        ensure_exact_input(input, CONTROL_INFO_SIZE)?;

        match ControlCode::from_u8(input[1]) {
            Some(ControlCode::SetAttributes) => {
                let mut raw = [0u8; 6];
                raw.copy_from_slice(&input[2..8]);
                self.set_attributes(DeviceAttributes::from_feature_bytes(&raw));
                Ok(IoStatus::Complete(CONTROL_INFO_SIZE))
            }
            Some(ControlCode::Dummy1) | Some(ControlCode::Dummy2) | None => {
                debug!("unsupported control code {:#04x}", input[1]);
                Err(Error::NotImplemented)
            }
        }
    }

    fn copy_string(found: Option<&'static str>, output: &mut [u8]) -> Result<IoStatus> {
        let s = found.ok_or(Error::InvalidParameter)?;
        copy_out(output, &strings::encode(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_codes_match_hid_minidriver_values() {
        use IoControlCode::*;
        let expected = [
            (GetDeviceDescriptor, 0x000B_0003),
            (GetReportDescriptor, 0x000B_0007),
            (ReadReport, 0x000B_000B),
            (WriteReport, 0x000B_000F),
            (GetString, 0x000B_0013),
            (ActivateDevice, 0x000B_001F),
            (DeactivateDevice, 0x000B_0023),
            (GetDeviceAttributes, 0x000B_0027),
            (SendIdleNotificationRequest, 0x000B_002B),
            (SetFeature, 0x000B_0191),
            (GetFeature, 0x000B_0192),
            (SetOutputReport, 0x000B_0195),
            (GetPhysicalDescriptor, 0x000B_019A),
            (GetInputReport, 0x000B_01A2),
            (GetIndexedString, 0x000B_01E2),
            (KeyEvent, 0x0022_2000),
            (MouseEvent, 0x0022_2004),
        ];
        for (op, code) in expected {
            assert_eq!(op.code(), code, "{op:?}");
            assert_eq!(IoControlCode::from_code(code), Some(op));
        }
    }

    #[test]
    fn control_code_table_has_no_duplicates() {
        for (i, (a, _)) in CONTROL_CODES.iter().enumerate() {
            for (b, _) in &CONTROL_CODES[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn unknown_code_is_not_implemented() {
        let dev = VirtualHidDevice::new();
        let result = dev.dispatch(IoRequest::new(0xDEAD_BEEF));
        assert!(matches!(result, Err(Error::NotImplemented)));
        assert_eq!(completion_status(&result), 0xC000_0002);
    }

    #[test]
    fn control_info_with_dummy_code_is_not_implemented() {
        let dev = VirtualHidDevice::new();
        let mut info = [0u8; CONTROL_INFO_SIZE];
        info[0] = CONTROL_COLLECTION_REPORT_ID;
        info[1] = ControlCode::Dummy1 as u8;
        let result = dev.dispatch(
            IoRequest::op(IoControlCode::SetFeature)
                .with_report_id(CONTROL_COLLECTION_REPORT_ID)
                .with_input(&info),
        );
        assert!(matches!(result, Err(Error::NotImplemented)));

        info[1] = 0x7F;
        let result = dev.dispatch(
            IoRequest::op(IoControlCode::SetFeature)
                .with_report_id(CONTROL_COLLECTION_REPORT_ID)
                .with_input(&info),
        );
        assert!(matches!(result, Err(Error::NotImplemented)));
    }

    #[test]
    fn pending_read_reports_status_pending() {
        let dev = VirtualHidDevice::new();
        let mut buf = [0u8; MAX_INPUT_REPORT_SIZE];
        let result = dev.dispatch(IoRequest::op(IoControlCode::ReadReport).with_output(&mut buf));
        assert_eq!(completion_status(&result), STATUS_PENDING);
        dev.close();
    }
}
