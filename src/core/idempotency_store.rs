//! Thread-safe in-memory idempotency store
//!
//! Records are inserted with a single `DashMap::insert`, which holds the
//! owning shard's write lock for the whole test-and-set. At most one of any
//! number of concurrent callers sees "first time" for a given request id.

use async_trait::async_trait;
use dashmap::DashMap;

use super::traits::IdempotencyStore;
use crate::types::{RequestId, StorageError};

/// In-memory set of admitted request ids
#[derive(Debug, Default)]
pub struct InMemoryIdempotencyStore {
    seen: DashMap<RequestId, ()>,
}

impl InMemoryIdempotencyStore {
    pub fn new() -> Self {
        Self {
            seen: DashMap::new(),
        }
    }

    /// Whether a request id has been admitted
    pub fn contains(&self, request_id: &str) -> bool {
        self.seen.contains_key(request_id)
    }

    /// Number of admitted request ids
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[async_trait]
impl IdempotencyStore for InMemoryIdempotencyStore {
    async fn record_if_new(&self, request_id: &str) -> Result<bool, StorageError> {
        Ok(self.seen.insert(request_id.to_string(), ()).is_none())
    }
}
