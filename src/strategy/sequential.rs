//! Sequential processing strategy
//!
//! Runs one transfer at a time, in file order, on a current-thread runtime.
//! Outcomes therefore match a reader's by-hand replay of the transfers file,
//! which makes this strategy the reference for the concurrent one.
//!
//! # Design
//!
//! The SequentialProcessingStrategy focuses on orchestration, delegating:
//! - CSV parsing to `SyncReader` (iterator interface)
//! - Transfer semantics to `TransferCoordinator`
//! - CSV output to `csv_format::write_accounts_csv`
//!
//! Requests are streamed one row at a time, so memory use is
//! O(accounts + request ids), not O(rows).

use crate::core::RetryPolicy;
use crate::io::csv_format::TransferCsvRecord;
use crate::io::sync_reader::SyncReader;
use crate::strategy::{ProcessingStrategy, RunSummary, TransferRun};
use std::io::Write;
use std::path::Path;
use tracing::warn;

/// Sequential processing strategy
///
/// # Examples
///
/// ```no_run
/// use rust_transfer_coordinator::strategy::{ProcessingStrategy, SequentialProcessingStrategy};
/// use rust_transfer_coordinator::RetryPolicy;
/// use std::path::Path;
/// use std::io;
///
/// let strategy = SequentialProcessingStrategy::new(RetryPolicy::default());
/// let mut output = io::stdout();
///
/// strategy
///     .process(Path::new("accounts.csv"), Path::new("transfers.csv"), &mut output)
///     .expect("Processing failed");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialProcessingStrategy {
    retry_policy: RetryPolicy,
}

impl SequentialProcessingStrategy {
    pub fn new(retry_policy: RetryPolicy) -> Self {
        Self { retry_policy }
    }
}

impl ProcessingStrategy for SequentialProcessingStrategy {
    /// Process transfers in file order
    ///
    /// 1. Seeds the account store from the accounts file
    /// 2. Streams transfer requests with `SyncReader`
    /// 3. Awaits each transfer before reading the next row
    /// 4. Writes the final account states
    fn process(
        &self,
        accounts_path: &Path,
        transfers_path: &Path,
        output: &mut dyn Write,
    ) -> Result<(), String> {
        let run = TransferRun::seed(accounts_path, self.retry_policy)?;
        let reader = SyncReader::<TransferCsvRecord>::new(transfers_path)?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        let summary = runtime.block_on(async {
            let mut summary = RunSummary::default();

            for result in reader {
                match result {
                    Ok(request) => {
                        let outcome = run.coordinator.transfer(request).await;
                        summary.record(&outcome);
                    }
                    Err(e) => warn!(error = %e, "Skipping transfer row"),
                }
            }

            summary
        });

        summary.log();
        run.write_accounts(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper function to create a temporary CSV file for testing
    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    fn run(accounts: &str, transfers: &str) -> Result<String, String> {
        let accounts = create_temp_csv(accounts);
        let transfers = create_temp_csv(transfers);
        let mut output = Vec::new();

        SequentialProcessingStrategy::default().process(
            accounts.path(),
            transfers.path(),
            &mut output,
        )?;

        Ok(String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_sequential_strategy_applies_transfer() {
        let output = run(
            "account,balance\n1,100\n2,0\n",
            "from,to,amount,request_id\n1,2,30,r1\n",
        )
        .unwrap();

        assert_eq!(output, "account,balance\n1,70.0000\n2,30.0000\n");
    }

    #[test]
    fn test_sequential_strategy_applies_each_request_id_once() {
        let output = run(
            "account,balance\n1,100\n2,0\n",
            "from,to,amount,request_id\n1,2,30,r1\n1,2,30,r1\n1,2,20,r2\n",
        )
        .unwrap();

        assert_eq!(output, "account,balance\n1,50.0000\n2,50.0000\n");
    }

    #[test]
    fn test_sequential_strategy_follows_file_order() {
        // r2 only succeeds because r1 funded account 2 first
        let output = run(
            "account,balance\n1,10\n2,0\n3,0\n",
            "from,to,amount,request_id\n1,2,10,r1\n2,3,10,r2\n",
        )
        .unwrap();

        assert_eq!(output, "account,balance\n1,0.0000\n2,0.0000\n3,10.0000\n");
    }

    #[test]
    fn test_sequential_strategy_continues_after_failures() {
        let output = run(
            "account,balance\n1,5\n2,0\n",
            "from,to,amount,request_id\n\
             1,2,50,r1\n\
             1,1,1,r2\n\
             1,2,bad,r3\n\
             1,9,1,r4\n\
             1,2,5,r5\n",
        )
        .unwrap();

        assert_eq!(output, "account,balance\n1,0.0000\n2,5.0000\n");
    }

    #[test]
    fn test_sequential_strategy_handles_missing_transfers_file() {
        let accounts = create_temp_csv("account,balance\n1,1\n");
        let mut output = Vec::new();

        let result = SequentialProcessingStrategy::default().process(
            accounts.path(),
            Path::new("nonexistent.csv"),
            &mut output,
        );

        assert!(result.unwrap_err().contains("Failed to open file"));
        assert!(output.is_empty());
    }

    #[test]
    fn test_sequential_strategy_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SequentialProcessingStrategy>();
    }
}
