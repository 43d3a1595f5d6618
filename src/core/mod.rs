//! Core business logic module
//!
//! This module contains the transfer coordination components:
//! - `traits` - Seams for the account store and idempotency store
//! - `account_store` - In-memory account store
//! - `idempotency_store` - In-memory idempotency store
//! - `lock_manager` - Deadlock-free locking over sets of account ids
//! - `retry` - Lock acquisition retry policy
//! - `coordinator` - Validation, deduplication and the transfer critical section

pub mod account_store;
pub mod coordinator;
pub mod idempotency_store;
pub mod lock_manager;
pub mod retry;
pub mod traits;

pub use account_store::InMemoryAccountStore;
pub use coordinator::TransferCoordinator;
pub use idempotency_store::InMemoryIdempotencyStore;
pub use lock_manager::{AcquireCancelled, Contended, LockManager, LockTicket};
pub use retry::RetryPolicy;
pub use traits::{AccountStore, IdempotencyStore};
