//! Account-related types for the transfer coordinator
//!
//! This module defines the Account structure held by an account store.

use rust_decimal::Decimal;

/// Account identifier
///
/// Identifiers have a total order, which the lock manager relies on to take
/// per-account locks in a canonical sequence.
pub type AccountId = u32;

/// Account state as owned by an account store
///
/// The coordinator never caches an `Account` beyond a single transfer; every
/// arithmetic step works from a value re-read under the account lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// The account identifier
    pub id: AccountId,

    /// Current balance
    ///
    /// Never negative after a committed transfer.
    pub balance: Decimal,
}

impl Account {
    /// Create a new account with a zero balance
    pub fn new(id: AccountId) -> Self {
        Account {
            id,
            balance: Decimal::ZERO,
        }
    }

    /// Create an account with the given balance
    pub fn with_balance(id: AccountId, balance: Decimal) -> Self {
        Account { id, balance }
    }
}
