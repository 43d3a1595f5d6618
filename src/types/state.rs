//! Transfer state definitions
//!
//! The states one `transfer` call moves through. Only terminal states are
//! reported outward, as a structured `state` field on the outcome log line.

use super::error::TransferError;
use std::fmt;

/// States of a single transfer call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferState {
    Validating,
    CheckingIdempotency,
    /// Terminal: request id already admitted, nothing applied
    NoOpDone,
    AcquiringLock,
    Retrying,
    LockedComputing,
    /// Terminal: both balances written
    Committed,
    /// Terminal: request failed validation
    Rejected,
    /// Terminal: source balance would go negative
    InsufficientFundsFailed,
    /// Terminal: crediting the destination would overflow
    OverflowFailed,
    /// Terminal: a store read or write failed
    StorageFailed,
    /// Terminal: retry policy exhausted
    LockTimedOut,
    /// Terminal: caller cancelled before the critical section
    Cancelled,
}

impl TransferState {
    /// Check if this is a terminal state (no lock is held in any of them)
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransferState::NoOpDone
                | TransferState::Committed
                | TransferState::Rejected
                | TransferState::InsufficientFundsFailed
                | TransferState::OverflowFailed
                | TransferState::StorageFailed
                | TransferState::LockTimedOut
                | TransferState::Cancelled
        )
    }

    /// Terminal state for a failed call
    pub fn from_error(error: &TransferError) -> Self {
        match error {
            TransferError::InvalidRequest { .. } | TransferError::NotFound { .. } => {
                TransferState::Rejected
            }
            TransferError::InsufficientFunds { .. } => TransferState::InsufficientFundsFailed,
            TransferError::ArithmeticOverflow { .. } => TransferState::OverflowFailed,
            TransferError::StorageFailure { .. } => TransferState::StorageFailed,
            TransferError::LockTimeout { .. } => TransferState::LockTimedOut,
            TransferError::Cancelled => TransferState::Cancelled,
        }
    }

    /// Get human-readable state name
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferState::Validating => "VALIDATING",
            TransferState::CheckingIdempotency => "CHECKING_IDEMPOTENCY",
            TransferState::NoOpDone => "NOOP_DONE",
            TransferState::AcquiringLock => "ACQUIRING_LOCK",
            TransferState::Retrying => "RETRYING",
            TransferState::LockedComputing => "LOCKED_COMPUTING",
            TransferState::Committed => "COMMITTED",
            TransferState::Rejected => "REJECTED",
            TransferState::InsufficientFundsFailed => "INSUFFICIENT_FUNDS",
            TransferState::OverflowFailed => "OVERFLOW_FAILED",
            TransferState::StorageFailed => "STORAGE_FAILED",
            TransferState::LockTimedOut => "LOCK_TIMED_OUT",
            TransferState::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
