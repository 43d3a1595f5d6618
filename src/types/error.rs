//! Error types for the transfer coordinator
//!
//! Every failure of a transfer is returned as a distinct `TransferError`
//! variant so callers can branch on the kind instead of matching strings.
//!
//! # Error Categories
//!
//! - **Caller errors**: invalid request, missing account, insufficient funds.
//!   Never retried by the coordinator.
//! - **Contention**: lock timeout after the retry policy is exhausted. Safe to
//!   retry the whole call with the same request id.
//! - **Collaborator errors**: storage failures, propagated as-is.

use super::account::AccountId;
use super::transfer::AccountSide;
use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

/// Failure reported by an account store or idempotency store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct StorageError {
    /// Description of the storage failure
    pub message: String,
}

impl StorageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Why a transfer request was rejected as malformed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// Source and destination are the same account
    SameAccount,
    /// The amount is zero or negative
    NonPositiveAmount,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::SameAccount => write!(f, "same account"),
            InvalidReason::NonPositiveAmount => write!(f, "non-positive amount"),
        }
    }
}

/// Main error type for transfers
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransferError {
    /// The request is malformed
    ///
    /// Rejected before the idempotency slot is consumed.
    #[error("Invalid request: {reason}")]
    InvalidRequest {
        /// What was wrong with the request
        reason: InvalidReason,
    },

    /// One side of the transfer does not exist
    #[error("{side} account {account} not found")]
    NotFound {
        /// Which side was missing
        side: AccountSide,
        /// The missing account
        account: AccountId,
    },

    /// The source balance would go negative
    ///
    /// The balance may be driven exactly to zero; only a negative result is
    /// rejected.
    #[error("Insufficient funds in account {account}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// Source account
        account: AccountId,
        /// Balance read under the lock
        balance: Decimal,
        /// Requested transfer amount
        requested: Decimal,
    },

    /// Lock contention outlasted the retry policy
    #[error("Timed out acquiring account locks after {attempts} attempts")]
    LockTimeout {
        /// Number of acquisition attempts made
        attempts: u32,
    },

    /// A store read or write failed
    ///
    /// No compensating rollback is attempted; accounts are left in whatever
    /// state the store reports.
    #[error("Storage failure: {source}")]
    StorageFailure {
        #[from]
        source: StorageError,
    },

    /// Crediting the destination would overflow the decimal range
    #[error("Arithmetic overflow crediting account {account}")]
    ArithmeticOverflow {
        /// Destination account
        account: AccountId,
    },

    /// The caller cancelled the transfer before its critical section started
    #[error("Transfer cancelled")]
    Cancelled,
}

// Helper functions for creating common errors

impl TransferError {
    /// Create an InvalidRequest error for a same-account transfer
    pub fn same_account() -> Self {
        TransferError::InvalidRequest {
            reason: InvalidReason::SameAccount,
        }
    }

    /// Create an InvalidRequest error for a zero or negative amount
    pub fn non_positive_amount() -> Self {
        TransferError::InvalidRequest {
            reason: InvalidReason::NonPositiveAmount,
        }
    }

    /// Create a NotFound error
    pub fn not_found(side: AccountSide, account: AccountId) -> Self {
        TransferError::NotFound { side, account }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(account: AccountId, balance: Decimal, requested: Decimal) -> Self {
        TransferError::InsufficientFunds {
            account,
            balance,
            requested,
        }
    }

    /// Create a LockTimeout error
    pub fn lock_timeout(attempts: u32) -> Self {
        TransferError::LockTimeout { attempts }
    }

    /// Create a StorageFailure error from a message
    pub fn storage_failure(message: impl Into<String>) -> Self {
        TransferError::StorageFailure {
            source: StorageError::new(message),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(account: AccountId) -> Self {
        TransferError::ArithmeticOverflow { account }
    }

    /// Whether retrying the whole call with the same request id can succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransferError::LockTimeout { .. })
    }
}
