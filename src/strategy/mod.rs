//! Processing strategy module for batch transfer runs
//!
//! A strategy is a complete pipeline: seed the account store from one CSV
//! file, feed every request from a second CSV file through a
//! [`TransferCoordinator`], and write the final balances. Strategies differ
//! only in how many transfers they keep in flight, and are selected at runtime.

use crate::cli::StrategyType;
use crate::core::{
    AccountStore, InMemoryAccountStore, InMemoryIdempotencyStore, LockManager, RetryPolicy,
    TransferCoordinator,
};
use crate::io::{read_accounts, write_accounts_csv};
use crate::types::TransferError;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub mod concurrent;
pub mod sequential;

pub use concurrent::{BatchConfig, ConcurrentProcessingStrategy};
pub use sequential::SequentialProcessingStrategy;

/// Processing strategy trait for complete batch transfer pipelines
pub trait ProcessingStrategy: Send + Sync {
    /// Run every transfer in `transfers_path` against the accounts seeded
    /// from `accounts_path`, then write the final account states to `output`
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the run completed, even if individual transfers failed
    /// * `Err(String)` if a fatal error occurred (file not found, runtime or
    ///   output failure)
    ///
    /// Malformed rows and failed transfers are logged as warnings and the run
    /// continues with the next request.
    fn process(
        &self,
        accounts_path: &Path,
        transfers_path: &Path,
        output: &mut dyn Write,
    ) -> Result<(), String>;
}

/// Create a processing strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - Sequential or concurrent processing
/// * `config` - Optional batch configuration (ignored for sequential)
/// * `retry_policy` - Lock acquisition retry policy for the coordinator
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
    retry_policy: RetryPolicy,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sequential => Box::new(SequentialProcessingStrategy::new(retry_policy)),
        StrategyType::Concurrent => {
            let config = config.unwrap_or_default();
            Box::new(ConcurrentProcessingStrategy::new(config, retry_policy))
        }
    }
}

/// Account store and coordinator shared by one run
pub(crate) struct TransferRun {
    pub(crate) accounts: Arc<InMemoryAccountStore>,
    pub(crate) coordinator: TransferCoordinator,
}

impl TransferRun {
    /// Seed a fresh account store from `accounts_path`
    pub(crate) fn seed(accounts_path: &Path, retry_policy: RetryPolicy) -> Result<Self, String> {
        let accounts = Arc::new(InMemoryAccountStore::with_accounts(read_accounts(
            accounts_path,
        )?));
        info!(accounts = accounts.len(), "Seeded account store");

        let coordinator = TransferCoordinator::new(
            Arc::clone(&accounts) as Arc<dyn AccountStore>,
            Arc::new(InMemoryIdempotencyStore::new()),
            LockManager::new(),
        )
        .with_retry_policy(retry_policy);

        Ok(Self {
            accounts,
            coordinator,
        })
    }

    /// Write the final balances, sorted by account id
    pub(crate) fn write_accounts(&self, output: &mut dyn Write) -> Result<(), String> {
        write_accounts_csv(&self.accounts.accounts(), output)
    }
}

/// Outcome counts for one run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Transfers that committed or were no-op replays
    pub succeeded: usize,
    /// Transfers that returned an error
    pub failed: usize,
}

impl RunSummary {
    pub fn record(&mut self, result: &Result<(), TransferError>) {
        match result {
            Ok(()) => self.succeeded += 1,
            Err(_) => self.failed += 1,
        }
    }

    pub fn log(&self) {
        info!(
            succeeded = self.succeeded,
            failed = self.failed,
            "Transfer run complete"
        );
    }
}
