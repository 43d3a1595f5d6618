//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account state and identifiers
//! - `transfer`: Transfer requests and request identifiers
//! - `error`: Error types for the coordinator and its collaborators
//! - `state`: States of a single transfer call

pub mod account;
pub mod error;
pub mod state;
pub mod transfer;

pub use account::{Account, AccountId};
pub use error::{InvalidReason, StorageError, TransferError};
pub use state::TransferState;
pub use transfer::{AccountSide, RequestId, TransferRequest};
