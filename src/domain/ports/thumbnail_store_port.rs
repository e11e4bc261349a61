//! Port definition for the durable thumbnail store.

use async_trait::async_trait;

use crate::domain::entities::CacheEntry;
use crate::domain::errors::StoreResult;

/// Lightweight view of a record used while scanning for eviction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvictionCandidate {
    /// Primary key.
    pub url: String,
    /// Estimated stored size.
    pub estimated_byte_size: u64,
    /// Write time in epoch milliseconds.
    pub timestamp: i64,
}

/// Persistent key-value store of [`CacheEntry`] records keyed by URL,
/// with a secondary index on write time.
///
/// Every operation is atomic on its own; no ordering is guaranteed across
/// operations.
#[async_trait]
pub trait ThumbnailStorePort: Send + Sync {
    /// Reads the record for `url`. Expiry is not applied here.
    async fn get(&self, url: &str) -> StoreResult<Option<CacheEntry>>;

    /// Replaces any record with the same URL.
    async fn put(&self, entry: CacheEntry) -> StoreResult<()>;

    /// Removes one record. Missing keys are not an error.
    async fn delete(&self, url: &str) -> StoreResult<()>;

    /// Removes a set of records in a single transaction.
    async fn delete_many(&self, urls: &[String]) -> StoreResult<()>;

    /// Removes every record.
    async fn clear(&self) -> StoreResult<()>;

    /// Sum of `estimated_byte_size` over all records.
    async fn total_size(&self) -> StoreResult<u64>;

    /// Number of records.
    async fn len(&self) -> StoreResult<usize>;

    /// All records, oldest write first.
    async fn oldest_first(&self) -> StoreResult<Vec<EvictionCandidate>>;
}
