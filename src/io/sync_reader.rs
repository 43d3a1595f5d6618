//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over converted rows of a CSV file.
//! Delegates CSV format concerns to the csv_format module.
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Individual row parsing errors are yielded as Err variants in the iterator
//! - Line numbers are included in error messages for debugging

use crate::io::csv_format::{AccountCsvRecord, CsvRow};
use crate::types::{Account, AccountId};
use csv::{ReaderBuilder, Trim};
use std::collections::hash_map::{Entry, HashMap};
use std::fs::File;
use std::marker::PhantomData;
use std::path::Path;
use tracing::warn;

/// Synchronous CSV reader
///
/// Yields one converted row at a time, so memory use does not grow with the
/// file size.
///
/// # Examples
///
/// ```no_run
/// use rust_transfer_coordinator::io::csv_format::TransferCsvRecord;
/// use rust_transfer_coordinator::io::sync_reader::SyncReader;
/// use std::path::Path;
///
/// let reader = SyncReader::<TransferCsvRecord>::new(Path::new("transfers.csv")).unwrap();
/// let requests: Vec<_> = reader.filter_map(Result::ok).collect();
/// println!("Successfully parsed {} requests", requests.len());
/// ```
#[derive(Debug)]
pub struct SyncReader<Row> {
    reader: csv::Reader<File>,
    line_num: usize,
    _row: PhantomData<Row>,
}

impl<Row: CsvRow> SyncReader<Row> {
    /// Open a CSV file for streaming
    ///
    /// The CSV reader is configured to:
    /// - Trim whitespace from all fields
    /// - Allow flexible field counts (short rows surface as row errors)
    /// - Use an 8KB buffer for efficient I/O
    pub fn new(path: &Path) -> Result<Self, String> {
        let file = File::open(path)
            .map_err(|e| format!("Failed to open file '{}': {}", path.display(), e))?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        Ok(Self {
            reader,
            line_num: 0,
            _row: PhantomData,
        })
    }
}

impl<Row: CsvRow> Iterator for SyncReader<Row> {
    type Item = Result<Row::Output, String>;

    /// Get the next converted row
    ///
    /// # Returns
    ///
    /// * `Some(Ok(_))` - Successfully parsed row
    /// * `Some(Err(String))` - Parse or conversion error with line number
    /// * `None` - End of file reached
    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<Row>();
        let next = deserializer.next()?;

        self.line_num += 1;
        // Data rows start on line 2, after the header
        let line = self.line_num + 1;

        Some(match next {
            Ok(row) => row.convert().map_err(|e| format!("Line {}: {}", line, e)),
            Err(e) => Err(format!("Line {}: CSV parse error: {}", line, e)),
        })
    }
}

/// Load every valid account from a seed file
///
/// Malformed rows are logged and skipped. Duplicate ids are logged and the
/// last row wins.
pub fn read_accounts(path: &Path) -> Result<Vec<Account>, String> {
    let reader = SyncReader::<AccountCsvRecord>::new(path)?;
    let mut accounts: Vec<Account> = Vec::new();
    // Position of each id in `accounts`
    let mut positions: HashMap<AccountId, usize> = HashMap::new();

    for result in reader {
        match result {
            Ok(account) => match positions.entry(account.id) {
                Entry::Occupied(slot) => {
                    warn!(account = account.id, "Duplicate account row, keeping the last one");
                    accounts[*slot.get()] = account;
                }
                Entry::Vacant(slot) => {
                    slot.insert(accounts.len());
                    accounts.push(account);
                }
            },
            Err(e) => warn!(error = %e, "Skipping account row"),
        }
    }

    Ok(accounts)
}
