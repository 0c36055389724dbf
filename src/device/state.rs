//! Device state store: the current keyboard and mouse reports plus their
//! "changed since last delivery" flags, behind one lock.
//!
//! Nothing outside this module touches the reports directly. Every
//! operation takes the lock once, so each report is always read or
//! written as a whole.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::hid::keyboard::KeyboardReport;
use crate::hid::mouse::MouseReport;
use crate::hid::{HidReport, ReportKind};

#[derive(Default)]
struct Reports {
    keyboard: KeyboardReport,
    keyboard_changed: bool,
    mouse: MouseReport,
    mouse_changed: bool,
}

impl Reports {
    fn snapshot(&self, kind: ReportKind) -> HidReport {
        match kind {
            ReportKind::Keyboard => HidReport::Keyboard(self.keyboard),
            ReportKind::Mouse => HidReport::Mouse(self.mouse),
        }
    }

    fn changed_mut(&mut self, kind: ReportKind) -> &mut bool {
        match kind {
            ReportKind::Keyboard => &mut self.keyboard_changed,
            ReportKind::Mouse => &mut self.mouse_changed,
        }
    }
}

/// Lock-guarded keyboard + mouse state.
pub struct DeviceState {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Reports>>,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceState {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Reports::default())),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut Reports) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Apply a key transition to the keyboard report.
    ///
    /// Returns `true` when the report changed. Does not touch the changed
    /// flag; delivery decides whether the change is handed off or left
    /// dirty.
    pub fn apply_key_event(&self, code: u8, pressed: bool) -> bool {
        self.with(|r| r.keyboard.apply_key(code, pressed))
    }

    /// Replace the mouse button mask and deltas.
    pub fn apply_mouse_event(&self, buttons: u8, x: i8, y: i8) -> bool {
        self.with(|r| {
            let next = MouseReport { buttons, x, y };
            let changed = r.mouse != next;
            r.mouse = next;
            changed
        })
    }

    /// Copy of the requested report.
    pub fn snapshot(&self, kind: ReportKind) -> HidReport {
        self.with(|r| r.snapshot(kind))
    }

    pub fn keyboard(&self) -> KeyboardReport {
        self.with(|r| r.keyboard)
    }

    pub fn mouse(&self) -> MouseReport {
        self.with(|r| r.mouse)
    }

    pub fn mark_dirty(&self, kind: ReportKind) {
        self.with(|r| *r.changed_mut(kind) = true);
    }

    pub fn mark_consumed(&self, kind: ReportKind) {
        self.with(|r| *r.changed_mut(kind) = false);
    }

    pub fn is_dirty(&self, kind: ReportKind) -> bool {
        self.with(|r| *r.changed_mut(kind))
    }

    /// Snapshot of the first dirty report (keyboard before mouse), clearing
    /// its flag in the same critical section.
    pub fn take_dirty(&self) -> Option<HidReport> {
        self.with(|r| {
            [ReportKind::Keyboard, ReportKind::Mouse]
                .into_iter()
                .find(|&kind| *r.changed_mut(kind))
                .map(|kind| {
                    *r.changed_mut(kind) = false;
                    r.snapshot(kind)
                })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_is_empty_and_clean() {
        let state = DeviceState::new();
        assert!(state.keyboard().is_empty());
        assert!(state.mouse().is_idle());
        assert!(!state.is_dirty(ReportKind::Keyboard));
        assert!(!state.is_dirty(ReportKind::Mouse));
        assert_eq!(state.take_dirty(), None);
    }

    #[test]
    fn apply_does_not_set_dirty() {
        let state = DeviceState::new();
        assert!(state.apply_key_event(0x04, true));
        assert!(!state.is_dirty(ReportKind::Keyboard));
        assert_eq!(state.keyboard().keycodes, [0x04, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn take_dirty_prefers_keyboard_and_clears_flag() {
        let state = DeviceState::new();
        state.apply_mouse_event(0x01, 3, -3);
        state.mark_dirty(ReportKind::Mouse);
        state.apply_key_event(0xE1, true);
        state.mark_dirty(ReportKind::Keyboard);

        match state.take_dirty() {
            Some(HidReport::Keyboard(k)) => assert_eq!(k.modifier, 0x02),
            other => panic!("expected keyboard, got {other:?}"),
        }
        assert!(!state.is_dirty(ReportKind::Keyboard));
        assert!(state.is_dirty(ReportKind::Mouse));

        match state.take_dirty() {
            Some(HidReport::Mouse(m)) => {
                assert_eq!(m.buttons, 0x01);
                assert_eq!(m.x, 3);
                assert_eq!(m.y, -3);
            }
            other => panic!("expected mouse, got {other:?}"),
        }
        assert_eq!(state.take_dirty(), None);
    }

    #[test]
    fn mark_consumed_clears_only_that_report() {
        let state = DeviceState::new();
        state.mark_dirty(ReportKind::Keyboard);
        state.mark_dirty(ReportKind::Mouse);
        state.mark_consumed(ReportKind::Keyboard);
        assert!(!state.is_dirty(ReportKind::Keyboard));
        assert!(state.is_dirty(ReportKind::Mouse));
    }

    #[test]
    fn identical_mouse_event_reports_no_change() {
        let state = DeviceState::new();
        assert!(state.apply_mouse_event(0x04, 1, 1));
        assert!(!state.apply_mouse_event(0x04, 1, 1));
    }
}
