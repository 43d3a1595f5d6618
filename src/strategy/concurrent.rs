//! Concurrent batch processing strategy
//!
//! Transfers are read in batches and each batch is run with a bounded number
//! of transfers in flight on a multi-thread runtime. Transfers in the same
//! batch may touch the same accounts; the coordinator's locks keep them
//! serializable, so no ordering between rows is promised.
//!
//! # Architecture
//!
//! ```text
//! ConcurrentProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent)
//!     ├── AsyncReader (batch CSV reading)
//!     └── TransferCoordinator (cloned into one task per request)
//!         ├── InMemoryAccountStore
//!         ├── InMemoryIdempotencyStore
//!         └── LockManager
//! ```

use crate::core::RetryPolicy;
use crate::io::async_reader::AsyncReader;
use crate::io::csv_format::TransferCsvRecord;
use crate::strategy::{ProcessingStrategy, RunSummary, TransferRun};
use crate::types::TransferError;
use futures::stream::{self, StreamExt};
use std::io::Write;
use std::path::Path;
use tracing::{debug, warn};

/// Configuration for batch processing
///
/// Controls how many rows are read per batch and how many transfers of a
/// batch may be in flight at once.
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Number of transfer rows per batch
    pub batch_size: usize,
    /// Maximum number of transfers in flight
    pub max_concurrent: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig with custom values
    ///
    /// Zero values fall back to the defaults with a warning.
    pub fn new(batch_size: usize, max_concurrent: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                batch_size,
                default = default.batch_size,
                "Invalid batch_size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent = if max_concurrent == 0 {
            warn!(
                max_concurrent,
                default = default.max_concurrent,
                "Invalid max_concurrent, using default"
            );
            default.max_concurrent
        } else {
            max_concurrent
        };

        Self {
            batch_size,
            max_concurrent,
        }
    }
}

/// Concurrent batch processing strategy
///
/// # Configuration
///
/// - `batch_size`: Number of transfer rows per batch (default: 1000)
/// - `max_concurrent`: Transfers in flight and runtime worker threads
///   (default: CPU cores)
#[derive(Debug, Clone)]
pub struct ConcurrentProcessingStrategy {
    config: BatchConfig,
    retry_policy: RetryPolicy,
}

impl ConcurrentProcessingStrategy {
    pub fn new(config: BatchConfig, retry_policy: RetryPolicy) -> Self {
        Self {
            config,
            retry_policy,
        }
    }
}

impl ProcessingStrategy for ConcurrentProcessingStrategy {
    /// Process transfers in concurrent batches
    ///
    /// 1. Seeds the account store from the accounts file
    /// 2. Creates a multi-thread runtime sized by `max_concurrent`
    /// 3. Reads transfer rows in batches with `AsyncReader`
    /// 4. Spawns one task per request, at most `max_concurrent` at a time
    /// 5. Waits for the whole batch before reading the next one
    /// 6. Writes the final account states
    fn process(
        &self,
        accounts_path: &Path,
        transfers_path: &Path,
        output: &mut dyn Write,
    ) -> Result<(), String> {
        let run = TransferRun::seed(accounts_path, self.retry_policy)?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent)
            .enable_all()
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        let summary = runtime.block_on(async {
            let file = tokio::fs::File::open(transfers_path).await.map_err(|e| {
                format!(
                    "Failed to open file '{}': {}",
                    transfers_path.display(),
                    e
                )
            })?;

            // Wrap tokio file in a compatibility layer for csv-async
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::<_, TransferCsvRecord>::new(compat_file);

            let mut summary = RunSummary::default();
            let mut batch_num = 0usize;

            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }

                batch_num += 1;
                debug!(batch = batch_num, size = batch.len(), "Running transfer batch");

                let outcomes: Vec<Result<(), TransferError>> = stream::iter(batch)
                    .map(|request| {
                        let coordinator = run.coordinator.clone();
                        async move {
                            tokio::spawn(async move { coordinator.transfer(request).await })
                                .await
                                .unwrap_or_else(|e| {
                                    Err(TransferError::storage_failure(format!(
                                        "transfer task aborted: {e}"
                                    )))
                                })
                        }
                    })
                    .buffer_unordered(self.config.max_concurrent)
                    .collect()
                    .await;

                for outcome in &outcomes {
                    summary.record(outcome);
                }
            }

            Ok::<_, String>(summary)
        })?;

        summary.log();
        run.write_accounts(output)
    }
}
