//! Asynchronous CSV reader with batch interface
//!
//! Reads converted rows from a CSV source in batches, so the concurrent
//! runner can hand each batch to a bounded pool of transfer tasks.
//!
//! # Architecture
//!
//! ```text
//! CSV Reader → AsyncReader → Batches of converted rows
//!                  ↓
//!           csv_format module
//!           (CsvRow implementations)
//! ```

use crate::io::csv_format::CsvRow;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use std::marker::PhantomData;
use tracing::warn;

/// Asynchronous CSV reader
///
/// Memory use is bounded by the batch size, not the file size.
pub struct AsyncReader<R: AsyncRead + Unpin, Row> {
    csv_reader: csv_async::AsyncDeserializer<R>,
    _row: PhantomData<Row>,
}

impl<R, Row> AsyncReader<R, Row>
where
    R: AsyncRead + Unpin + Send + 'static,
    Row: CsvRow + 'static,
{
    /// Create a new AsyncReader from an async reader
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self {
            csv_reader,
            _row: PhantomData,
        }
    }

    /// Read up to `batch_size` converted rows
    ///
    /// Rows that fail to parse or convert are logged and skipped. Returns an
    /// empty vector once the source is exhausted.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<Row::Output> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut records = self.csv_reader.deserialize::<Row>();

        while batch.len() < batch_size {
            match records.next().await {
                Some(Ok(row)) => match row.convert() {
                    Ok(value) => batch.push(value),
                    Err(e) => warn!(error = %e, "Record conversion error"),
                },
                Some(Err(e)) => warn!(error = %e, "CSV parse error"),
                None => break,
            }
        }

        batch
    }
}
