//! Software-emulated HID keyboard + mouse.
//!
//! The device is a state machine driven from two sides: the host's HID
//! stack issues control requests (descriptors, strings, attributes,
//! features, and reads that may park), and an injecting process delivers
//! key and mouse events over a side channel. Every request goes through
//! [`VirtualHidDevice::dispatch`]; the typed methods on the device are
//! the same operations without the buffer plumbing.
//!
//! Shared state sits behind `embassy-sync` blocking mutexes and parked
//! reads complete through an `embassy-sync` [`Signal`](embassy_sync::signal::Signal),
//! so producers and consumers may run on any threads.

pub mod config;
pub mod device;
pub mod error;
pub mod hid;

pub use device::control::{completion_status, STATUS_PENDING};
pub use device::event::{KeyEvent, MouseEvent};
pub use device::pending::{ReadHandle, ReadId, ReadOutcome};
pub use device::{IoControlCode, IoRequest, IoStatus, VirtualHidDevice};
pub use error::{Error, Result};
pub use hid::descriptor::DeviceAttributes;
pub use hid::keyboard::KeyboardReport;
pub use hid::mouse::MouseReport;
pub use hid::{HidReport, ReportKind};
