//! Thread-safe in-memory account store
//!
//! This module provides the `InMemoryAccountStore` struct, which keeps account
//! states in a concurrent map so that many transfer tasks can share it.
//!
//! # Design
//!
//! The store uses `DashMap` (a concurrent HashMap) with internal sharding.
//! Reads and writes to different accounts don't block each other; each single
//! read or write is atomic. Serializing read-compute-write sequences across
//! two accounts is the lock manager's job, not the store's.

use async_trait::async_trait;
use dashmap::DashMap;
use rust_decimal::Decimal;

use super::traits::AccountStore;
use crate::types::{Account, AccountId, StorageError};

/// Thread-safe in-memory account store
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    /// Concurrent map of account states by id
    accounts: DashMap<AccountId, Account>,
}

impl InMemoryAccountStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
        }
    }

    /// Create a store seeded with the given accounts
    ///
    /// If an id appears more than once, the last account wins.
    pub fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        let store = Self::new();
        for account in accounts {
            store.accounts.insert(account.id, account);
        }
        store
    }

    /// Insert or replace an account outside of any transfer
    ///
    /// Returns the previous state if the id was already present.
    pub fn insert(&self, account: Account) -> Option<Account> {
        self.accounts.insert(account.id, account)
    }

    /// Current balance of an account, if it exists
    pub fn balance(&self, id: AccountId) -> Option<Decimal> {
        self.accounts.get(&id).map(|entry| entry.balance)
    }

    /// Snapshot of all accounts sorted by id
    ///
    /// The snapshot is taken entry by entry; concurrent transfers may be
    /// partially reflected in it.
    pub fn accounts(&self) -> Vec<Account> {
        let mut accounts: Vec<Account> = self
            .accounts
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        accounts.sort_by_key(|account| account.id);
        accounts
    }

    /// Sum of all balances
    pub fn total_balance(&self) -> Decimal {
        self.accounts.iter().map(|entry| entry.balance).sum()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn get(&self, id: AccountId) -> Result<Option<Account>, StorageError> {
        Ok(self.accounts.get(&id).map(|entry| entry.value().clone()))
    }

    async fn update(&self, account: Account) -> Result<(), StorageError> {
        self.accounts.insert(account.id, account);
        Ok(())
    }
}
