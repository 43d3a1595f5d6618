//! Rust Transfer Coordinator Library
//! # Overview
//!
//! This library moves funds between two accounts exactly once per logical
//! request, even when the same request is retried or many transfers run
//! concurrently against shared accounts.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Account, TransferRequest, TransferError, etc.)
//! - [`core`] - Business logic components:
//!   - [`core::coordinator`] - Validation, deduplication and the critical section
//!   - [`core::lock_manager`] - Exclusive ownership of account sets without deadlock
//!   - [`core::traits`] - Account store and idempotency store seams
//!   - [`core::account_store`] / [`core::idempotency_store`] - In-memory stores
//! - [`io`] - CSV input and output for the batch runner
//! - [`strategy`] - Sequential and concurrent batch runners
//! - [`cli`] - CLI arguments parsing
//! - [`logging`] - Tracing subscriber setup
//!
//! # Transfer Lifecycle
//!
//! 1. **Validate**: distinct accounts, both exist, positive amount
//! 2. **Admit**: record the request id; an already-seen id is a successful no-op
//! 3. **Lock**: take both account locks in ascending id order, retrying on contention
//! 4. **Apply**: re-read both balances, debit and credit, write both back
//! 5. **Release**: give the locks back on every exit path

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod logging;
pub mod strategy;
pub mod types;

pub use core::{
    AccountStore, IdempotencyStore, InMemoryAccountStore, InMemoryIdempotencyStore, LockManager,
    LockTicket, RetryPolicy, TransferCoordinator,
};
pub use io::write_accounts_csv;
pub use types::{
    Account, AccountId, AccountSide, InvalidReason, RequestId, StorageError, TransferError,
    TransferRequest, TransferState,
};
