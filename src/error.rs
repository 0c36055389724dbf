//! Unified error type for vhid.
//!
//! Every variant is local to the request that produced it; nothing here
//! represents device-wide fault state. Each variant maps to the NTSTATUS
//! value the host's HID transport expects on completion.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Top-level error type used across the device model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Dispatch
    /// Unknown opcode, or a known opcode/feature this device does not serve.
    #[error("request not implemented")]
    NotImplemented,

    /// Unknown report id or string id, or a malformed packed input value.
    #[error("invalid parameter")]
    InvalidParameter,

    // Buffers
    /// Output buffer smaller than the structure the request returns.
    #[error("output buffer too small: {actual} bytes, expected {expected}")]
    BufferTooSmall { expected: usize, actual: usize },

    /// Input buffer not exactly the size of the structure it carries.
    #[error("input size mismatch: {actual} bytes, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    // Pending reads
    /// A read is already parked; only one may be outstanding.
    #[error("too many requests: a read is already pending")]
    ResourceExhausted,

    /// The parked read was cancelled or the device was closed.
    #[error("request cancelled")]
    Cancelled,
}

// NTSTATUS values

pub const STATUS_SUCCESS: u32 = 0x0000_0000;
pub const STATUS_NOT_IMPLEMENTED: u32 = 0xC000_0002;
pub const STATUS_INFO_LENGTH_MISMATCH: u32 = 0xC000_0004;
pub const STATUS_INVALID_PARAMETER: u32 = 0xC000_000D;
pub const STATUS_INSUFFICIENT_RESOURCES: u32 = 0xC000_009A;
pub const STATUS_CANCELLED: u32 = 0xC000_0120;
pub const STATUS_INVALID_BUFFER_SIZE: u32 = 0xC000_0206;

impl Error {
    /// Completion status reported to the host for this error.
    pub const fn status(&self) -> u32 {
        match self {
            Error::NotImplemented => STATUS_NOT_IMPLEMENTED,
            Error::InvalidParameter => STATUS_INVALID_PARAMETER,
            Error::BufferTooSmall { .. } => STATUS_INVALID_BUFFER_SIZE,
            Error::SizeMismatch { .. } => STATUS_INFO_LENGTH_MISMATCH,
            Error::ResourceExhausted => STATUS_INSUFFICIENT_RESOURCES,
            Error::Cancelled => STATUS_CANCELLED,
        }
    }
}

/// Fail with [`Error::BufferTooSmall`] unless `out` can hold `needed` bytes.
pub(crate) fn ensure_output(out: &[u8], needed: usize) -> Result<()> {
    if out.len() < needed {
        return Err(Error::BufferTooSmall {
            expected: needed,
            actual: out.len(),
        });
    }
    Ok(())
}

/// Fail with [`Error::SizeMismatch`] unless `input` is exactly `expected` bytes.
pub(crate) fn ensure_exact_input(input: &[u8], expected: usize) -> Result<()> {
    if input.len() != expected {
        return Err(Error::SizeMismatch {
            expected,
            actual: input.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_are_distinct() {
        let all = [
            Error::NotImplemented,
            Error::InvalidParameter,
            Error::BufferTooSmall {
                expected: 9,
                actual: 1,
            },
            Error::SizeMismatch {
                expected: 2,
                actual: 1,
            },
            Error::ResourceExhausted,
            Error::Cancelled,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.status(), b.status(), "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn buffer_checks() {
        assert!(ensure_output(&[0u8; 9], 9).is_ok());
        assert!(ensure_output(&[0u8; 10], 9).is_ok());
        assert_eq!(
            ensure_output(&[0u8; 8], 9),
            Err(Error::BufferTooSmall {
                expected: 9,
                actual: 8
            })
        );
        assert!(ensure_exact_input(&[0u8; 2], 2).is_ok());
        assert_eq!(
            ensure_exact_input(&[0u8; 3], 2),
            Err(Error::SizeMismatch {
                expected: 2,
                actual: 3
            })
        );
    }
}
