//! Pending-read synchronizer: hands state changes to at most one parked
//! read, or leaves them dirty for the next read to pick up.
//!
//! ```text
//!   Idle --push, no waiter--> Dirty   --pull--> Idle (consumed)
//!   Idle --pull, no data----> Waiting --push--> Idle (completed)
//! ```
//!
//! The push/park decision and the dirty check both happen while the slot
//! lock is held, so a change applied between a reader's dirty check and
//! its parking is always delivered to that reader.

use core::cell::RefCell;
use std::sync::{Arc, Weak};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use log::{debug, warn};

use crate::device::state::DeviceState;
use crate::error::{ensure_output, Error, Result};
use crate::hid::{HidReport, InputReport, ReportKind};

/// Completion of a parked read, signalled exactly once with the report in
/// wire form.
pub type ReadCompletion = Signal<CriticalSectionRawMutex, Result<InputReport>>;

/// Identifies one issued read for cancellation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReadId(u64);

/// Consumer side of a parked read.
///
/// The handle owns the completion. Dropping it abandons the read: a later
/// change is left dirty for the next read instead of being handed to it.
pub struct ReadHandle {
    id: ReadId,
    completion: Arc<ReadCompletion>,
}

impl ReadHandle {
    pub fn id(&self) -> ReadId {
        self.id
    }

    /// Result if the read has completed, without waiting.
    pub fn try_take(&self) -> Option<Result<InputReport>> {
        self.completion.try_take()
    }

    /// Wait for completion.
    pub async fn wait(&self) -> Result<InputReport> {
        self.completion.wait().await
    }

    /// Park the calling thread until the read completes.
    pub fn wait_blocking(&self) -> Result<InputReport> {
        pollster::block_on(self.wait())
    }

    /// Wait for completion and copy the report into `output`, returning the
    /// number of bytes written.
    pub fn wait_into(&self, output: &mut [u8]) -> Result<usize> {
        let report = self.wait_blocking()?;
        ensure_output(output, report.len())?;
        output[..report.len()].copy_from_slice(&report);
        Ok(report.len())
    }
}

impl core::fmt::Debug for ReadHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ReadHandle").field("id", &self.id).finish()
    }
}

/// Result of issuing a read.
#[derive(Debug)]
pub enum ReadOutcome {
    /// Served immediately from dirty state.
    Ready(HidReport),
    /// Parked until the next state change.
    Pending(ReadHandle),
}

/// Producer side of a parked read. Holds the completion weakly so a
/// dropped handle is seen as gone.
struct ParkedRead {
    id: ReadId,
    completion: Weak<ReadCompletion>,
}

impl ParkedRead {
    fn is_abandoned(&self) -> bool {
        self.completion.strong_count() == 0
    }

    /// Signal the consumer. Returns `false` if its handle was dropped.
    fn complete(self, result: Result<InputReport>) -> bool {
        match self.completion.upgrade() {
            Some(completion) => {
                completion.signal(result);
                true
            }
            None => false,
        }
    }
}

#[derive(Default)]
struct Slot {
    parked: Option<ParkedRead>,
    next_id: u64,
}

/// Single-slot rendezvous between report producers and the host's reads.
pub struct PendingRead {
    slot: Mutex<CriticalSectionRawMutex, RefCell<Slot>>,
}

impl Default for PendingRead {
    fn default() -> Self {
        Self::new()
    }
}

impl PendingRead {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(RefCell::new(Slot::default())),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut Slot) -> R) -> R {
        self.slot.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Issue a read: serve dirty state if any, otherwise park.
    ///
    /// A read arriving while another is parked is rejected with
    /// [`Error::ResourceExhausted`]; the parked one is left as is.
    pub fn pull(&self, state: &DeviceState) -> Result<ReadOutcome> {
        self.with(|slot| {
            if let Some(report) = state.take_dirty() {
                debug!("read served from dirty {:?} report", report.kind());
                return Ok(ReadOutcome::Ready(report));
            }

            match &slot.parked {
                Some(parked) if parked.is_abandoned() => {
                    debug!("read {:?} abandoned, replacing", parked.id);
                }
                Some(parked) => {
                    warn!("read rejected: {:?} already pending", parked.id);
                    return Err(Error::ResourceExhausted);
                }
                None => {}
            }

            let id = ReadId(slot.next_id);
            slot.next_id = slot.next_id.wrapping_add(1);
            let completion = Arc::new(ReadCompletion::new());
            slot.parked = Some(ParkedRead {
                id,
                completion: Arc::downgrade(&completion),
            });
            debug!("read {:?} parked", id);
            Ok(ReadOutcome::Pending(ReadHandle { id, completion }))
        })
    }

    /// Deliver a change of `kind` to the parked read, or mark it dirty.
    ///
    /// The delivered report is the state at push time, so two racing
    /// producers never hand a reader an older state after a newer one.
    /// A parked read whose handle was dropped counts as no read.
    /// Returns `true` when a parked read was completed.
    pub fn push(&self, state: &DeviceState, kind: ReportKind) -> bool {
        self.with(|slot| {
            if let Some(parked) = slot.parked.take() {
                let id = parked.id;
                if parked.complete(Ok(state.snapshot(kind).to_bytes())) {
                    state.mark_consumed(kind);
                    debug!("read {:?} completed with {:?} report", id, kind);
                    return true;
                }
                debug!("read {:?} was abandoned", id);
            }
            state.mark_dirty(kind);
            false
        })
    }

    /// Fail the parked read with `id`, if it is the one parked.
    pub fn cancel(&self, id: ReadId) -> bool {
        self.with(|slot| match slot.parked.take() {
            Some(parked) if parked.id == id => {
                debug!("read {:?} cancelled", id);
                parked.complete(Err(Error::Cancelled))
            }
            other => {
                slot.parked = other;
                false
            }
        })
    }

    /// Fail whatever read is parked. Returns `true` if one was.
    pub fn cancel_all(&self) -> bool {
        self.with(|slot| match slot.parked.take() {
            Some(parked) => {
                debug!("read {:?} cancelled on close", parked.id);
                parked.complete(Err(Error::Cancelled))
            }
            None => false,
        })
    }

    pub fn is_waiting(&self) -> bool {
        self.with(|slot| slot.parked.as_ref().is_some_and(|p| !p.is_abandoned()))
    }
}
