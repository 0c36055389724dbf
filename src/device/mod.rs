//! The virtual keyboard + mouse device.
//!
//! One [`VirtualHidDevice`] owns the report state, the pending-read slot
//! and the device attributes. Producers call [`VirtualHidDevice::inject_key`]
//! (or go through the side-channel opcodes), the host's HID stack goes
//! through [`VirtualHidDevice::dispatch`]. Both may run on any number of
//! threads at once.

pub mod control;
pub mod event;
pub mod pending;
pub mod state;

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use log::{debug, info};

use crate::error::Result;
use crate::hid::descriptor::DeviceAttributes;
use crate::hid::keyboard::KeyboardReport;
use crate::hid::mouse::MouseReport;
use crate::hid::{HidReport, ReportKind};
use event::{KeyEvent, MouseEvent};
use pending::{PendingRead, ReadId, ReadOutcome};
use state::DeviceState;

pub use control::{IoControlCode, IoRequest, IoStatus};

/// Software HID device exposing one keyboard and one mouse collection.
pub struct VirtualHidDevice {
    state: DeviceState,
    reads: PendingRead,
    attributes: Mutex<CriticalSectionRawMutex, Cell<DeviceAttributes>>,
}

impl Default for VirtualHidDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualHidDevice {
    /// Device with the default identity from [`crate::config`].
    pub fn new() -> Self {
        Self::with_attributes(DeviceAttributes::default())
    }

    pub fn with_attributes(attributes: DeviceAttributes) -> Self {
        Self {
            state: DeviceState::new(),
            reads: PendingRead::new(),
            attributes: Mutex::new(Cell::new(attributes)),
        }
    }

    pub fn attributes(&self) -> DeviceAttributes {
        self.attributes.lock(Cell::get)
    }

    pub fn set_attributes(&self, attributes: DeviceAttributes) {
        info!(
            "attributes set: vid={:#06x} pid={:#06x} version={:#06x}",
            attributes.vendor_id, attributes.product_id, attributes.version_number
        );
        self.attributes.lock(|cell| cell.set(attributes));
    }

    // Producers

    /// Apply a key transition and deliver the resulting keyboard report.
    ///
    /// Returns `false` when the event left the report unchanged (a 7th
    /// key, or a release of a key that is not held); nothing is delivered
    /// in that case.
    pub fn inject_key(&self, event: KeyEvent) -> bool {
        if !self.state.apply_key_event(event.key_code, event.pressed) {
            debug!(
                "key event {:?} left keyboard report unchanged ({} keys held)",
                event,
                self.state.keyboard().pressed_count()
            );
            return false;
        }
        self.reads.push(&self.state, ReportKind::Keyboard);
        true
    }

    /// Apply a mouse event and deliver the resulting mouse report.
    pub fn inject_mouse(&self, event: MouseEvent) -> bool {
        if !self.state.apply_mouse_event(event.buttons, event.x, event.y) {
            return false;
        }
        self.reads.push(&self.state, ReportKind::Mouse);
        true
    }

    // Consumers

    /// Issue a read: served from dirty state, or parked until the next
    /// change.
    pub fn read_report(&self) -> Result<ReadOutcome> {
        self.reads.pull(&self.state)
    }

    /// Fail the parked read `id` with [`crate::Error::Cancelled`].
    pub fn cancel_read(&self, id: ReadId) -> bool {
        self.reads.cancel(id)
    }

    /// Consumer disconnected: fail any parked read. Report state is kept.
    pub fn close(&self) {
        if self.reads.cancel_all() {
            info!("device closed with a read pending");
        }
    }

    pub fn has_pending_read(&self) -> bool {
        self.reads.is_waiting()
    }

    // Inspection

    pub fn snapshot(&self, kind: ReportKind) -> HidReport {
        self.state.snapshot(kind)
    }

    pub fn keyboard(&self) -> KeyboardReport {
        self.state.keyboard()
    }

    pub fn mouse(&self) -> MouseReport {
        self.state.mouse()
    }

    pub fn is_dirty(&self, kind: ReportKind) -> bool {
        self.state.is_dirty(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn unchanged_event_does_not_complete_parked_read() {
        let dev = VirtualHidDevice::new();
        let handle = match dev.read_report() {
            Ok(ReadOutcome::Pending(h)) => h,
            other => panic!("expected pending, got {other:?}"),
        };

        // Release of a key that was never pressed.
        assert!(!dev.inject_key(KeyEvent::release(0x04)));
        assert!(handle.try_take().is_none());
        assert!(dev.has_pending_read());

        assert!(dev.inject_key(KeyEvent::press(0x04)));
        let bytes = handle.try_take().expect("read completed").unwrap();
        assert!(matches!(
            HidReport::from_bytes(&bytes),
            Some(HidReport::Keyboard(k)) if k.keycodes[0] == 0x04
        ));
    }

    #[test]
    fn key_pressed_after_reader_went_away_is_read_next() {
        let dev = VirtualHidDevice::new();
        match dev.read_report() {
            Ok(ReadOutcome::Pending(handle)) => drop(handle),
            other => panic!("expected pending, got {other:?}"),
        }
        assert!(!dev.has_pending_read());

        assert!(dev.inject_key(KeyEvent::press(0x04)));
        assert!(dev.is_dirty(ReportKind::Keyboard));
        match dev.read_report() {
            Ok(ReadOutcome::Ready(HidReport::Keyboard(k))) => assert_eq!(k.keycodes[0], 0x04),
            other => panic!("expected ready read, got {other:?}"),
        }
    }

    #[test]
    fn close_fails_parked_read_and_keeps_state() {
        let dev = VirtualHidDevice::new();
        dev.inject_key(KeyEvent::press(0x1E));
        let _ = dev.read_report();

        let handle = match dev.read_report() {
            Ok(ReadOutcome::Pending(h)) => h,
            other => panic!("expected pending, got {other:?}"),
        };
        dev.close();
        assert_eq!(handle.try_take(), Some(Err(Error::Cancelled)));
        assert!(!dev.has_pending_read());
        assert_eq!(dev.keyboard().keycodes[0], 0x1E);
    }

    #[test]
    fn mouse_injection_marks_mouse_dirty() {
        let dev = VirtualHidDevice::new();
        assert!(dev.inject_mouse(MouseEvent {
            buttons: 0x01,
            x: 4,
            y: -4
        }));
        assert!(dev.is_dirty(ReportKind::Mouse));
        assert!(!dev.is_dirty(ReportKind::Keyboard));
    }

    #[test]
    fn attributes_can_be_replaced() {
        let dev = VirtualHidDevice::new();
        assert_eq!(dev.attributes(), DeviceAttributes::default());
        let custom = DeviceAttributes {
            vendor_id: 0x1209,
            product_id: 0x0001,
            version_number: 0x0200,
        };
        dev.set_attributes(custom);
        assert_eq!(dev.attributes(), custom);
    }
}
