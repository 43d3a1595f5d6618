//! Core traits for the coordinator's external collaborators
//!
//! The coordinator depends only on these two seams, so account storage and
//! request deduplication can be backed by anything from the in-memory stores
//! in this crate to a database.

use async_trait::async_trait;

use crate::types::{Account, AccountId, StorageError};

/// Durable mapping from account identifier to account state
///
/// No multi-key transactional update is assumed; the coordinator sequences
/// two single-key updates itself while holding both account locks.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Read an account, returning `None` if it does not exist
    async fn get(&self, id: AccountId) -> Result<Option<Account>, StorageError>;

    /// Write an account's state
    async fn update(&self, account: Account) -> Result<(), StorageError>;
}

/// Set of previously seen request identifiers
#[async_trait]
pub trait IdempotencyStore: Send + Sync {
    /// Atomically record `request_id`
    ///
    /// Returns `true` only for the first caller to record a given id, even
    /// when several callers race on it. Records never expire.
    async fn record_if_new(&self, request_id: &str) -> Result<bool, StorageError>;
}
