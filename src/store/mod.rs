//! Key-Value Store Module
//!
//! The command surface the cache proxy and the check-in tracker need from the
//! backing store, with a Redis implementation and an in-process one.

mod entry;
mod memory;
mod redis_store;

use async_trait::async_trait;

use crate::error::Result;

pub use redis_store::RedisStore;
pub(crate) use entry::{StoreEntry, StoredValue};
pub use memory::MemoryStore;

// == Key Value Store ==
/// Commands issued against the backing key-value store.
///
/// Handles are cheap to clone and shared: every clone talks to the same data.
/// Transport errors are returned unchanged; implementations do not retry.
#[async_trait]
pub trait KeyValueStore: Clone + Send + Sync + 'static {
    // -- strings --

    /// GET. `None` when the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// SET, with `EX ttl_secs` when a TTL is given. Callers pass `None` for no expiry.
    async fn set(&self, key: &str, value: &str, ttl_secs: Option<u64>) -> Result<()>;

    async fn exists(&self, key: &str) -> Result<bool>;

    /// DEL. Returns true when a key was removed.
    async fn del(&self, key: &str) -> Result<bool>;

    async fn mset(&self, pairs: &[(String, String)]) -> Result<()>;

    /// MGET. One slot per requested key, in request order.
    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>>;

    /// INCRBY. Negative deltas decrement. Returns the new value.
    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64>;

    // -- hashes --

    /// HSET of a single field. Returns true when the field is new.
    async fn hset(&self, name: &str, field: &str, value: &str) -> Result<bool>;

    async fn hget(&self, name: &str, field: &str) -> Result<Option<String>>;

    /// HSET of several fields at once.
    async fn hset_multiple(&self, name: &str, pairs: &[(String, String)]) -> Result<()>;

    // -- sorted sets --

    /// ZADD. Returns the number of members newly added.
    async fn zadd(&self, name: &str, members: &[(String, f64)]) -> Result<usize>;

    async fn zrem(&self, name: &str, member: &str) -> Result<bool>;

    /// ZINCRBY. Returns the member's new score.
    async fn zincrby(&self, name: &str, member: &str, delta: f64) -> Result<f64>;

    async fn zrevrank(&self, name: &str, member: &str) -> Result<Option<usize>>;

    async fn zscore(&self, name: &str, member: &str) -> Result<Option<f64>>;

    /// ZRANGE by index, `rev` selects descending order.
    async fn zrange(&self, name: &str, start: isize, stop: isize, rev: bool)
        -> Result<Vec<String>>;

    async fn zrange_withscores(
        &self,
        name: &str,
        start: isize,
        stop: isize,
        rev: bool,
    ) -> Result<Vec<(String, f64)>>;

    // -- bitmaps --

    /// SETBIT. Returns the bit's previous value.
    async fn setbit(&self, key: &str, offset: u32, bit: bool) -> Result<u8>;

    async fn getbit(&self, key: &str, offset: u32) -> Result<u8>;

    /// GETBIT for every `(key, offset)` in one non-transactional round trip.
    /// Results come back in request order.
    async fn getbit_batch(&self, reads: &[(String, u32)]) -> Result<Vec<u8>>;
}
