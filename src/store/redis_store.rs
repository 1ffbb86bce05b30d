//! Redis Store
//!
//! [`KeyValueStore`] over a shared `redis::aio::ConnectionManager`.

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client, IntoConnectionInfo};
use tracing::{debug, info};

use super::KeyValueStore;
use crate::error::Result;

// == Redis Store ==
/// Handle to a Redis server. Clones share one multiplexed connection.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Opens a managed connection to the server described by `info`.
    ///
    /// # Arguments
    /// * `info` - A URL such as `redis://127.0.0.1:6379/1`, or a built `ConnectionInfo`
    pub async fn connect<T: IntoConnectionInfo>(info: T) -> Result<Self> {
        let client = Client::open(info)?;
        let conn = client.get_connection_manager().await?;
        info!("Connected to redis");
        Ok(Self { conn })
    }

    /// Wraps an existing connection manager.
    pub fn from_manager(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    fn conn(&self) -> ConnectionManager {
        self.conn.clone()
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = self.conn().get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: Option<u64>) -> Result<()> {
        let mut conn = self.conn();
        match ttl_secs {
            Some(ttl) => {
                let _: () = conn.set_ex(key, value, ttl).await?;
            }
            None => {
                let _: () = conn.set(key, value).await?;
            }
        }
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let found: bool = self.conn().exists(key).await?;
        Ok(found)
    }

    async fn del(&self, key: &str) -> Result<bool> {
        let removed: usize = self.conn().del(key).await?;
        Ok(removed > 0)
    }

    async fn mset(&self, pairs: &[(String, String)]) -> Result<()> {
        if pairs.is_empty() {
            return Ok(());
        }
        let _: () = self.conn().mset(pairs).await?;
        Ok(())
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        // Explicit MGET: the helper sends GET for a single key, which
        // does not come back as a one-slot array.
        let mut cmd = redis::cmd("MGET");
        for key in keys {
            cmd.arg(key);
        }
        let values: Vec<Option<String>> = cmd.query_async(&mut self.conn()).await?;
        Ok(values)
    }

    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64> {
        let value: i64 = self.conn().incr(key, delta).await?;
        Ok(value)
    }

    async fn hset(&self, name: &str, field: &str, value: &str) -> Result<bool> {
        let added: usize = self.conn().hset(name, field, value).await?;
        Ok(added > 0)
    }

    async fn hget(&self, name: &str, field: &str) -> Result<Option<String>> {
        let value: Option<String> = self.conn().hget(name, field).await?;
        Ok(value)
    }

    async fn hset_multiple(&self, name: &str, pairs: &[(String, String)]) -> Result<()> {
        if pairs.is_empty() {
            return Ok(());
        }
        let _: () = self.conn().hset_multiple(name, pairs).await?;
        Ok(())
    }

    async fn zadd(&self, name: &str, members: &[(String, f64)]) -> Result<usize> {
        if members.is_empty() {
            return Ok(0);
        }
        let items: Vec<(f64, &str)> = members
            .iter()
            .map(|(member, score)| (*score, member.as_str()))
            .collect();
        let added: usize = self.conn().zadd_multiple(name, items.as_slice()).await?;
        Ok(added)
    }

    async fn zrem(&self, name: &str, member: &str) -> Result<bool> {
        let removed: usize = self.conn().zrem(name, member).await?;
        Ok(removed > 0)
    }

    async fn zincrby(&self, name: &str, member: &str, delta: f64) -> Result<f64> {
        let score: f64 = self.conn().zincr(name, member, delta).await?;
        Ok(score)
    }

    async fn zrevrank(&self, name: &str, member: &str) -> Result<Option<usize>> {
        let rank: Option<usize> = self.conn().zrevrank(name, member).await?;
        Ok(rank)
    }

    async fn zscore(&self, name: &str, member: &str) -> Result<Option<f64>> {
        let score: Option<f64> = self.conn().zscore(name, member).await?;
        Ok(score)
    }

    async fn zrange(
        &self,
        name: &str,
        start: isize,
        stop: isize,
        rev: bool,
    ) -> Result<Vec<String>> {
        let mut conn = self.conn();
        let members: Vec<String> = if rev {
            conn.zrevrange(name, start, stop).await?
        } else {
            conn.zrange(name, start, stop).await?
        };
        Ok(members)
    }

    async fn zrange_withscores(
        &self,
        name: &str,
        start: isize,
        stop: isize,
        rev: bool,
    ) -> Result<Vec<(String, f64)>> {
        let mut conn = self.conn();
        let members: Vec<(String, f64)> = if rev {
            conn.zrevrange_withscores(name, start, stop).await?
        } else {
            conn.zrange_withscores(name, start, stop).await?
        };
        Ok(members)
    }

    async fn setbit(&self, key: &str, offset: u32, bit: bool) -> Result<u8> {
        let previous: u8 = self.conn().setbit(key, offset as usize, bit).await?;
        Ok(previous)
    }

    async fn getbit(&self, key: &str, offset: u32) -> Result<u8> {
        let bit: u8 = self.conn().getbit(key, offset as usize).await?;
        Ok(bit)
    }

    async fn getbit_batch(&self, reads: &[(String, u32)]) -> Result<Vec<u8>> {
        if reads.is_empty() {
            return Ok(Vec::new());
        }
        // Plain pipeline, no MULTI/EXEC.
        let mut pipe = redis::pipe();
        for (key, offset) in reads {
            pipe.getbit(key, *offset as usize);
        }
        let bits: Vec<u8> = pipe.query_async(&mut self.conn()).await?;
        debug!(reads = reads.len(), "pipelined getbit batch");
        Ok(bits)
    }
}
