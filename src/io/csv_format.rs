//! CSV format handling for account seeds, transfer requests and account output
//!
//! This module centralizes all CSV format concerns, providing:
//! - Row structures for deserialization
//! - Conversion from CSV rows to domain types
//! - Account output serialization
//!
//! All functions are pure (no I/O) for easy testing.

use crate::types::{Account, AccountId, TransferRequest};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// A CSV row that converts into a domain value
///
/// Lets the sync and async readers stream any of the input files.
pub trait CsvRow: DeserializeOwned {
    /// Domain type produced by a valid row
    type Output;

    /// Validate and convert the row
    fn convert(self) -> Result<Self::Output, String>;
}

/// Account seed row: `account,balance`
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AccountCsvRecord {
    pub account: AccountId,
    pub balance: String,
}

/// Transfer request row: `from,to,amount,request_id`
///
/// Amounts are kept as strings so that a zero or negative amount reaches the
/// coordinator and is rejected there, like any other caller.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TransferCsvRecord {
    pub from: AccountId,
    pub to: AccountId,
    pub amount: String,
    pub request_id: String,
}

fn parse_decimal(field: &str, value: &str) -> Result<Decimal, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("Missing {}", field));
    }
    Decimal::from_str(trimmed).map_err(|_| format!("Invalid {} '{}'", field, value))
}

impl CsvRow for AccountCsvRecord {
    type Output = Account;

    /// Convert an account seed row
    ///
    /// Negative opening balances are rejected: no committed state may hold one.
    fn convert(self) -> Result<Account, String> {
        let balance = parse_decimal("balance", &self.balance)
            .map_err(|e| format!("{} for account {}", e, self.account))?;

        if balance < Decimal::ZERO {
            return Err(format!(
                "Negative balance {} for account {}",
                balance, self.account
            ));
        }

        Ok(Account::with_balance(self.account, balance))
    }
}

impl CsvRow for TransferCsvRecord {
    type Output = TransferRequest;

    fn convert(self) -> Result<TransferRequest, String> {
        let request_id = self.request_id.trim();
        if request_id.is_empty() {
            return Err(format!(
                "Transfer {} -> {} requires a request_id",
                self.from, self.to
            ));
        }

        let amount = parse_decimal("amount", &self.amount)
            .map_err(|e| format!("{} for request {}", e, request_id))?;

        Ok(TransferRequest::new(self.from, self.to, amount, request_id))
    }
}

/// Write account states to CSV format
///
/// Writes accounts in CSV format with columns: account, balance
/// Accounts are sorted by id for deterministic output.
///
/// # Arguments
///
/// * `accounts` - Slice of account states to write
/// * `output` - Mutable reference to a writer for outputting CSV
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_accounts_csv(accounts: &[Account], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["account", "balance"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    let mut sorted_accounts = accounts.to_vec();
    sorted_accounts.sort_by_key(|account| account.id);

    for account in sorted_accounts {
        writer
            .write_record(&[account.id.to_string(), format!("{:.4}", account.balance)])
            .map_err(|e| format!("Failed to write account record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}
