//! Resource lock manager for account sets
//!
//! Grants exclusive ownership of a *set* of account ids as one unit.
//!
//! # Protocol
//!
//! Requested ids are de-duplicated and sorted, then taken one at a time in
//! ascending order. Each per-key step is a single atomic insert-if-absent on
//! the lock table, so two callers can never both believe they own a key.
//! Because every caller walks keys in the same order, two overlapping
//! requests can never wait on each other in a cycle.
//!
//! A probe that meets a key held by someone else gives back every key it took
//! during that probe and reports [`Contended`]. Contention is a signal for
//! the caller's retry policy, not an error.
//!
//! # Release
//!
//! Keys are released in descending order. A caller following the ascending
//! acquisition protocol that manages to take the lowest key of a releasing
//! ticket therefore never finds a higher key of that same ticket still held.
//! Release is not atomic for other observers: [`LockManager::is_locked`] and
//! [`LockManager::held_count`] may see a ticket half released.
//!
//! Only granted tickets wake waiters in [`LockManager::acquire`]. A probe that
//! gives back its partial keys does not, so a waiter suspends until a real
//! holder releases.
//!
//! # Tickets
//!
//! [`LockTicket`] is an RAII guard: dropping it releases its keys, so a
//! ticket is released on every exit path, including panics and cancelled
//! futures. Releasing twice is a no-op.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::types::AccountId;

/// Identifier of a lock ticket
pub type TicketId = u64;

/// A probe found `account` held by another ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contended {
    /// The first key found held
    pub account: AccountId,
}

/// Acquisition was abandoned because the caller cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquireCancelled;

/// Shared lock table
#[derive(Debug)]
struct LockTable {
    /// Held keys, mapped to the ticket that holds them
    slots: DashMap<AccountId, TicketId>,
    /// Woken whenever keys are given back
    released: Notify,
    next_ticket: AtomicU64,
}

impl LockTable {
    /// Give back `keys` held by `ticket`, highest key first, without waking
    /// waiters
    ///
    /// Keys held by another ticket are left alone, which makes a repeated
    /// release harmless.
    fn give_back(&self, ticket: TicketId, keys: &[AccountId]) {
        for key in keys.iter().rev() {
            self.slots.remove_if(key, |_, holder| *holder == ticket);
        }
    }

    /// Release a granted ticket and wake every waiter
    fn release(&self, ticket: TicketId, keys: &[AccountId]) {
        self.give_back(ticket, keys);
        self.released.notify_waiters();
    }
}

/// Lock manager handle
///
/// Cloning is cheap and every clone shares the same lock table, so one
/// manager is created up front and handed to whoever needs it.
#[derive(Debug, Clone)]
pub struct LockManager {
    table: Arc<LockTable>,
}

impl LockManager {
    pub fn new() -> Self {
        Self {
            table: Arc::new(LockTable {
                slots: DashMap::new(),
                released: Notify::new(),
                next_ticket: AtomicU64::new(1),
            }),
        }
    }

    /// Try to take every key in `keys` without waiting
    ///
    /// Either all keys are taken and a ticket is returned, or none are held
    /// on return and the first contended key is reported.
    pub fn try_acquire(
        &self,
        keys: impl IntoIterator<Item = AccountId>,
    ) -> Result<LockTicket, Contended> {
        let keys: BTreeSet<AccountId> = keys.into_iter().collect();
        let ticket = self.table.next_ticket.fetch_add(1, Ordering::Relaxed);
        let mut held = Vec::with_capacity(keys.len());

        for key in keys {
            // `or_insert` runs under the shard write lock: we own the key iff
            // the stored holder is our ticket afterwards.
            let owned = *self.table.slots.entry(key).or_insert(ticket) == ticket;
            if !owned {
                // Partial keys were held transiently; the granted holder of
                // `key` wakes waiters when it releases.
                self.table.give_back(ticket, &held);
                trace!(ticket, account = key, "lock probe contended");
                return Err(Contended { account: key });
            }
            held.push(key);
        }

        trace!(ticket, keys = ?held, "locks acquired");
        Ok(LockTicket {
            id: ticket,
            keys: held,
            table: Some(Arc::clone(&self.table)),
        })
    }

    /// Wait until every key in `keys` is held by the caller
    ///
    /// Suspends the task between probes instead of spinning; each release
    /// wakes waiters to probe again. Fails only if `cancel` fires first.
    pub async fn acquire(
        &self,
        keys: impl IntoIterator<Item = AccountId>,
        cancel: &CancellationToken,
    ) -> Result<LockTicket, AcquireCancelled> {
        let keys: Vec<AccountId> = keys.into_iter().collect();

        loop {
            // Register for wake-ups before probing so a release that lands
            // between the probe and the wait is not missed.
            let notified = self.table.released.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Ok(ticket) = self.try_acquire(keys.iter().copied()) {
                return Ok(ticket);
            }

            tokio::select! {
                _ = cancel.cancelled() => return Err(AcquireCancelled),
                _ = &mut notified => {}
            }
        }
    }

    /// Release a ticket
    ///
    /// Equivalent to dropping it.
    pub fn release(&self, ticket: LockTicket) {
        ticket.release();
    }

    /// Whether `account` is currently held by any ticket
    pub fn is_locked(&self, account: AccountId) -> bool {
        self.table.slots.contains_key(&account)
    }

    /// Number of keys currently held across all tickets
    pub fn held_count(&self) -> usize {
        self.table.slots.len()
    }
}

impl Default for LockManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Proof of exclusive ownership of a set of account ids
///
/// Released on drop.
#[derive(Debug)]
pub struct LockTicket {
    id: TicketId,
    /// Held keys in ascending order
    keys: Vec<AccountId>,
    table: Option<Arc<LockTable>>,
}

impl LockTicket {
    pub fn id(&self) -> TicketId {
        self.id
    }

    /// Held keys in ascending order
    pub fn keys(&self) -> &[AccountId] {
        &self.keys
    }

    /// Release all held keys
    pub fn release(mut self) {
        self.release_held();
    }

    fn release_held(&mut self) {
        if let Some(table) = self.table.take() {
            table.release(self.id, &self.keys);
            trace!(ticket = self.id, keys = ?self.keys, "locks released");
        }
    }
}

impl Drop for LockTicket {
    fn drop(&mut self) {
        self.release_held();
    }
}
