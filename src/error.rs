//! Error types for the multiplexed input bank.
//!
//! - [`Unavailable`]: why a resource could not be acquired
//! - [`ReadError`]: failures on the read path of a bank or one of its lines
//! - [`CreateError`]: failures while constructing a bank

use core::fmt;

use embedded_hal::digital::{Error as HalError, ErrorKind};

/// Why a resource could not be acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Unavailable<E> {
    /// The dependency is not ready yet. Retrying later may succeed.
    Deferred,
    /// Hard failure reported by the provider.
    Failed(E),
}

impl<E> Unavailable<E> {
    /// Returns `true` for [`Unavailable::Deferred`].
    pub fn is_deferred(&self) -> bool {
        matches!(self, Unavailable::Deferred)
    }
}

impl<E: fmt::Debug> fmt::Display for Unavailable<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unavailable::Deferred => f.write_str("deferred"),
            Unavailable::Failed(e) => write!(f, "failed: {:?}", e),
        }
    }
}

/// Errors returned when reading a logical line.
///
/// `SE` is the select resource's error, `PE` the physical pin's error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadError<SE, PE> {
    /// Logical index is outside `0..line_count`.
    InvalidIndex,
    /// The select resource refused the requested state.
    SelectFailed(SE),
    /// The physical pin could not be sampled. The selection was released.
    ReadFailed(PE),
    /// Lines are input-only; driving or switching to output is rejected.
    Unsupported,
}

impl<SE: fmt::Debug, PE: fmt::Debug> fmt::Display for ReadError<SE, PE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadError::InvalidIndex => f.write_str("invalid line index"),
            ReadError::SelectFailed(e) => write!(f, "select failed: {:?}", e),
            ReadError::ReadFailed(e) => write!(f, "read failed: {:?}", e),
            ReadError::Unsupported => f.write_str("unsupported on input-only line"),
        }
    }
}

impl<SE: fmt::Debug, PE: HalError> HalError for ReadError<SE, PE> {
    fn kind(&self) -> ErrorKind {
        match self {
            ReadError::ReadFailed(e) => e.kind(),
            _ => ErrorKind::Other,
        }
    }
}

/// Errors returned by [`MuxedInputBank::create`](crate::bank::MuxedInputBank::create).
///
/// Every variant is returned only after the resources acquired so far have
/// been handed back to the parent context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CreateError<ME, LE, RE> {
    /// The select resource could not be acquired. Nothing was acquired.
    MuxUnavailable(Unavailable<ME>),
    /// The physical line could not be acquired. The select resource was released.
    LineUnavailable(Unavailable<LE>),
    /// The host refused the bank. Both resources were released.
    RegistrationFailed(RE),
}

impl<ME, LE, RE> CreateError<ME, LE, RE> {
    /// Returns `true` when construction may succeed if retried later.
    pub fn is_retryable(&self) -> bool {
        match self {
            CreateError::MuxUnavailable(cause) => cause.is_deferred(),
            CreateError::LineUnavailable(cause) => cause.is_deferred(),
            CreateError::RegistrationFailed(_) => false,
        }
    }
}

impl<ME: fmt::Debug, LE: fmt::Debug, RE: fmt::Debug> fmt::Display for CreateError<ME, LE, RE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreateError::MuxUnavailable(cause) => write!(f, "mux unavailable: {}", cause),
            CreateError::LineUnavailable(cause) => write!(f, "input line unavailable: {}", cause),
            CreateError::RegistrationFailed(e) => write!(f, "registration failed: {:?}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::format;

    #[derive(Debug, PartialEq)]
    struct PinFault;

    #[test]
    fn test_only_deferred_is_retryable() {
        let deferred: CreateError<u8, u8, u8> = CreateError::MuxUnavailable(Unavailable::Deferred);
        assert!(deferred.is_retryable());

        let deferred: CreateError<u8, u8, u8> = CreateError::LineUnavailable(Unavailable::Deferred);
        assert!(deferred.is_retryable());

        let hard: CreateError<u8, u8, u8> = CreateError::MuxUnavailable(Unavailable::Failed(5));
        assert!(!hard.is_retryable());

        let hard: CreateError<u8, u8, u8> = CreateError::RegistrationFailed(1);
        assert!(!hard.is_retryable());
    }

    #[test]
    fn test_display() {
        let err: ReadError<(), PinFault> = ReadError::ReadFailed(PinFault);
        assert_eq!(format!("{}", err), "read failed: PinFault");

        let err: CreateError<u8, u8, u8> = CreateError::LineUnavailable(Unavailable::Deferred);
        assert_eq!(format!("{}", err), "input line unavailable: deferred");
    }
}
