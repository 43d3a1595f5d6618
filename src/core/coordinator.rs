//! Transfer coordination
//!
//! This module provides the `TransferCoordinator`, the only component allowed
//! to mutate two accounts as a transfer.
//!
//! # Flow
//!
//! ```text
//! validate → record_if_new ─(seen)→ no-op
//!                 │
//!               (new)
//!                 ↓
//!        acquire {from, to} ←─ retry (bounded, suspended)
//!                 ↓
//!     re-read → compute → write from → write to → release
//! ```
//!
//! # Guarantees
//!
//! - Validation runs on every call, including replays of an admitted request
//!   id, and has no side effects.
//! - A request id is admitted at most once. Admission happens before the
//!   critical section, so a request that fails afterwards stays admitted and
//!   its replays are no-ops.
//! - Balances used for arithmetic are always read under both account locks.
//! - Once the locks are held the critical section runs on its own task.
//!   Dropping or cancelling the caller cannot stop it between the two writes,
//!   and the ticket is released whichever way the task ends.

use std::sync::Arc;

use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::lock_manager::{LockManager, LockTicket};
use super::retry::RetryPolicy;
use super::traits::{AccountStore, IdempotencyStore};
use crate::types::{Account, AccountSide, TransferError, TransferRequest, TransferState};

/// Funds-transfer coordinator
///
/// Holds no mutable state of its own. Clones share the same stores and lock
/// table, so one coordinator can be cloned into every task that needs it.
#[derive(Clone)]
pub struct TransferCoordinator {
    accounts: Arc<dyn AccountStore>,
    idempotency: Arc<dyn IdempotencyStore>,
    locks: LockManager,
    retry_policy: RetryPolicy,
}

impl TransferCoordinator {
    /// Create a coordinator with the default retry policy
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        idempotency: Arc<dyn IdempotencyStore>,
        locks: LockManager,
    ) -> Self {
        Self {
            accounts,
            idempotency,
            locks,
            retry_policy: RetryPolicy::default(),
        }
    }

    /// Replace the lock acquisition retry policy
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry_policy
    }

    /// Move `req.amount` from `req.from` to `req.to`, at most once per request id
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The transfer committed, or the request id was already
    ///   admitted and nothing was done. The two cases are deliberately
    ///   indistinguishable.
    /// * `Err(TransferError)` - See [`TransferError`] for the variants.
    pub async fn transfer(&self, req: TransferRequest) -> Result<(), TransferError> {
        self.transfer_with_cancellation(req, &CancellationToken::new())
            .await
    }

    /// Like [`transfer`](Self::transfer), abandoning the call with
    /// `TransferError::Cancelled` if `cancel` fires before the critical section
    pub async fn transfer_with_cancellation(
        &self,
        req: TransferRequest,
        cancel: &CancellationToken,
    ) -> Result<(), TransferError> {
        let request_id = req.request_id.clone();
        let (from, to) = (req.from, req.to);

        match self.run(req, cancel).await {
            Ok(state) => {
                info!(request_id = %request_id, from, to, state = %state, "Transfer finished");
                Ok(())
            }
            Err(e) => {
                warn!(
                    request_id = %request_id,
                    from,
                    to,
                    state = %TransferState::from_error(&e),
                    error = %e,
                    "Transfer failed"
                );
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        req: TransferRequest,
        cancel: &CancellationToken,
    ) -> Result<TransferState, TransferError> {
        enter_state(&req.request_id, TransferState::Validating);
        self.validate(&req).await?;

        if cancel.is_cancelled() {
            return Err(TransferError::Cancelled);
        }

        enter_state(&req.request_id, TransferState::CheckingIdempotency);
        if !self.idempotency.record_if_new(&req.request_id).await? {
            debug!(request_id = %req.request_id, "Request already admitted, skipping");
            return Ok(TransferState::NoOpDone);
        }

        enter_state(&req.request_id, TransferState::AcquiringLock);
        let ticket = self.acquire_locks(&req, cancel).await?;

        let accounts = Arc::clone(&self.accounts);
        let critical_section = tokio::spawn(async move {
            enter_state(&req.request_id, TransferState::LockedComputing);
            let result = apply_transfer(accounts.as_ref(), &req).await;
            drop(ticket);
            result
        });

        critical_section
            .await
            .map_err(|e| TransferError::storage_failure(format!("critical section aborted: {e}")))??;

        Ok(TransferState::Committed)
    }

    /// Reject malformed requests before anything is recorded
    async fn validate(&self, req: &TransferRequest) -> Result<(), TransferError> {
        if req.from == req.to {
            return Err(TransferError::same_account());
        }

        if self.accounts.get(req.from).await?.is_none() {
            return Err(TransferError::not_found(AccountSide::Source, req.from));
        }

        if self.accounts.get(req.to).await?.is_none() {
            return Err(TransferError::not_found(AccountSide::Destination, req.to));
        }

        if req.amount <= Decimal::ZERO {
            return Err(TransferError::non_positive_amount());
        }

        Ok(())
    }

    /// Take both account locks, retrying on contention per the retry policy
    async fn acquire_locks(
        &self,
        req: &TransferRequest,
        cancel: &CancellationToken,
    ) -> Result<LockTicket, TransferError> {
        let max_attempts = self.retry_policy.max_attempts;

        for attempt in 1..=max_attempts {
            if cancel.is_cancelled() {
                return Err(TransferError::Cancelled);
            }

            match self.locks.try_acquire([req.from, req.to]) {
                Ok(ticket) => return Ok(ticket),
                Err(contended) => {
                    debug!(
                        request_id = %req.request_id,
                        attempt,
                        max_attempts,
                        account = contended.account,
                        "Account locks contended"
                    );

                    if attempt < max_attempts {
                        enter_state(&req.request_id, TransferState::Retrying);
                        tokio::select! {
                            _ = cancel.cancelled() => return Err(TransferError::Cancelled),
                            _ = tokio::time::sleep(self.retry_policy.retry_delay) => {}
                        }
                    }
                }
            }
        }

        Err(TransferError::lock_timeout(max_attempts))
    }
}

fn enter_state(request_id: &str, state: TransferState) {
    debug!(request_id = %request_id, state = %state, "Transfer state");
}

/// Read-compute-write under both account locks
async fn apply_transfer(
    accounts: &dyn AccountStore,
    req: &TransferRequest,
) -> Result<(), TransferError> {
    let from = accounts
        .get(req.from)
        .await?
        .ok_or_else(|| TransferError::not_found(AccountSide::Source, req.from))?;
    let to = accounts
        .get(req.to)
        .await?
        .ok_or_else(|| TransferError::not_found(AccountSide::Destination, req.to))?;

    let insufficient = || TransferError::insufficient_funds(req.from, from.balance, req.amount);

    // Zero is a valid resulting balance
    let new_from = from.balance.checked_sub(req.amount).ok_or_else(insufficient)?;
    if new_from < Decimal::ZERO {
        return Err(insufficient());
    }

    let new_to = to
        .balance
        .checked_add(req.amount)
        .ok_or_else(|| TransferError::arithmetic_overflow(req.to))?;

    accounts
        .update(Account::with_balance(req.from, new_from))
        .await?;
    accounts.update(Account::with_balance(req.to, new_to)).await?;

    Ok(())
}

/// Test doubles for the coordinator's collaborators
#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::core::account_store::InMemoryAccountStore;
    use crate::types::{AccountId, StorageError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::Notify;

    /// Account store wrapper with injectable failures
    pub struct FaultyAccountStore {
        inner: InMemoryAccountStore,
        fail_update_for: Mutex<Option<AccountId>>,
        remove_on_get_count: Mutex<Option<(AccountId, usize)>>,
        get_count: AtomicUsize,
        update_count: AtomicUsize,
        pause_next_update: AtomicBool,
        update_paused: Notify,
        update_resumed: Notify,
    }

    impl FaultyAccountStore {
        pub fn new(inner: InMemoryAccountStore) -> Self {
            Self {
                inner,
                fail_update_for: Mutex::new(None),
                remove_on_get_count: Mutex::new(None),
                get_count: AtomicUsize::new(0),
                update_count: AtomicUsize::new(0),
                pause_next_update: AtomicBool::new(false),
                update_paused: Notify::new(),
                update_resumed: Notify::new(),
            }
        }

        /// Hold the next `update` until [`resume_update`](Self::resume_update)
        pub fn pause_next_update(&self) {
            self.pause_next_update.store(true, Ordering::SeqCst);
        }

        /// Wait until a paused `update` has been entered
        pub async fn wait_for_paused_update(&self) {
            self.update_paused.notified().await;
        }

        pub fn resume_update(&self) {
            self.update_resumed.notify_one();
        }

        /// Fail every write to `account`
        pub fn set_fail_update_for(&self, account: Option<AccountId>) {
            *self.fail_update_for.lock().unwrap() = account;
        }

        /// Report `account` as missing once `get` has been called `after` times
        pub fn set_vanish_after_gets(&self, account: AccountId, after: usize) {
            *self.remove_on_get_count.lock().unwrap() = Some((account, after));
        }

        pub fn balance(&self, id: AccountId) -> Option<Decimal> {
            self.inner.balance(id)
        }

        pub fn update_count(&self) -> usize {
            self.update_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AccountStore for FaultyAccountStore {
        async fn get(&self, id: AccountId) -> Result<Option<Account>, StorageError> {
            let seen = self.get_count.fetch_add(1, Ordering::SeqCst);
            let vanish = *self.remove_on_get_count.lock().unwrap();
            if let Some((account, after)) = vanish {
                if account == id && seen >= after {
                    return Ok(None);
                }
            }
            self.inner.get(id).await
        }

        async fn update(&self, account: Account) -> Result<(), StorageError> {
            if self.pause_next_update.swap(false, Ordering::SeqCst) {
                self.update_paused.notify_one();
                self.update_resumed.notified().await;
            }
            self.update_count.fetch_add(1, Ordering::SeqCst);
            let fail_for = *self.fail_update_for.lock().unwrap();
            if fail_for == Some(account.id) {
                return Err(StorageError::new(format!("write to {} rejected", account.id)));
            }
            self.inner.update(account).await
        }
    }

    /// Idempotency store that is always unreachable
    pub struct UnavailableIdempotencyStore;

    #[async_trait]
    impl IdempotencyStore for UnavailableIdempotencyStore {
        async fn record_if_new(&self, _request_id: &str) -> Result<bool, StorageError> {
            Err(StorageError::new("idempotency store unavailable"))
        }
    }
}
