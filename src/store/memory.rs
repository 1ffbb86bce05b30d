//! Memory Store
//!
//! In-process [`KeyValueStore`] with Redis-compatible semantics for the
//! commands this crate issues. Backs tests and single-process deployments.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{KeyValueStore, StoreEntry, StoredValue};
use crate::error::{CacheError, Result};

type Entries = HashMap<String, StoreEntry>;

// == Memory Store ==
/// Shared in-memory key space. Clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<Entries>>,
}

impl MemoryStore {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Cleanup Expired ==
    /// Removes all expired entries. Returns the number removed.
    pub async fn cleanup_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        before - entries.len()
    }

    /// Number of keys currently held, expired ones included until cleanup.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Remaining TTL of a key in whole seconds, None when absent or persistent.
    pub async fn ttl(&self, key: &str) -> Option<u64> {
        let entries = self.entries.read().await;
        live(&entries, key).and_then(StoreEntry::ttl_remaining)
    }
}

// == Entry Helpers ==
fn live<'a>(entries: &'a Entries, key: &str) -> Option<&'a StoreEntry> {
    entries.get(key).filter(|entry| !entry.is_expired())
}

fn purge_if_expired(entries: &mut Entries, key: &str) {
    if entries.get(key).is_some_and(StoreEntry::is_expired) {
        entries.remove(key);
    }
}

fn wrong_type(key: &str, found: &StoredValue) -> CacheError {
    CacheError::WrongType(format!("{} holds a {}", key, found.type_name()))
}

fn read_str<'a>(entries: &'a Entries, key: &str) -> Result<Option<&'a Vec<u8>>> {
    match live(entries, key).map(|entry| &entry.value) {
        None => Ok(None),
        Some(StoredValue::Str(bytes)) => Ok(Some(bytes)),
        Some(other) => Err(wrong_type(key, other)),
    }
}

fn read_hash<'a>(entries: &'a Entries, key: &str) -> Result<Option<&'a HashMap<String, String>>> {
    match live(entries, key).map(|entry| &entry.value) {
        None => Ok(None),
        Some(StoredValue::Hash(map)) => Ok(Some(map)),
        Some(other) => Err(wrong_type(key, other)),
    }
}

fn read_zset<'a>(entries: &'a Entries, key: &str) -> Result<Option<&'a HashMap<String, f64>>> {
    match live(entries, key).map(|entry| &entry.value) {
        None => Ok(None),
        Some(StoredValue::ZSet(map)) => Ok(Some(map)),
        Some(other) => Err(wrong_type(key, other)),
    }
}

/// Mutable access to a value of the expected kind, created empty when absent.
fn write_slot<'a>(
    entries: &'a mut Entries,
    key: &str,
    empty: fn() -> StoredValue,
) -> Result<&'a mut StoredValue> {
    purge_if_expired(entries, key);
    let entry = entries
        .entry(key.to_string())
        .or_insert_with(|| StoreEntry::persistent(empty()));
    if std::mem::discriminant(&entry.value) != std::mem::discriminant(&empty()) {
        return Err(wrong_type(key, &entry.value));
    }
    Ok(&mut entry.value)
}

fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

// == Sorted Set Helpers ==
/// Members ordered by score, ties broken by member bytes.
fn ordered(zset: &HashMap<String, f64>, rev: bool) -> Vec<(String, f64)> {
    let mut members: Vec<(String, f64)> =
        zset.iter().map(|(m, s)| (m.clone(), *s)).collect();
    members.sort_by(|a, b| match a.1.total_cmp(&b.1) {
        Ordering::Equal => a.0.cmp(&b.0),
        other => other,
    });
    if rev {
        members.reverse();
    }
    members
}

/// Resolves Redis-style inclusive, possibly negative, indexes.
fn index_range(len: usize, start: isize, stop: isize) -> Option<(usize, usize)> {
    let len = len as isize;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
    if len == 0 || start > stop || start >= len || stop < 0 {
        return None;
    }
    Some((start as usize, stop as usize))
}

fn slice_range(members: Vec<(String, f64)>, start: isize, stop: isize) -> Vec<(String, f64)> {
    match index_range(members.len(), start, stop) {
        Some((from, to)) => members.into_iter().skip(from).take(to - from + 1).collect(),
        None => Vec::new(),
    }
}

// == Bit Helpers ==
/// Bit 0 is the most significant bit of the first byte.
fn bit_at(bytes: &[u8], offset: u32) -> u8 {
    let byte = (offset / 8) as usize;
    let mask = 0x80u8 >> (offset % 8);
    match bytes.get(byte) {
        Some(b) if b & mask != 0 => 1,
        _ => 0,
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().await;
        Ok(read_str(&entries, key)?.map(|bytes| text(bytes)))
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: Option<u64>) -> Result<()> {
        let mut entries = self.entries.write().await;
        let entry = StoreEntry::new(StoredValue::Str(value.as_bytes().to_vec()), ttl_secs);
        entries.insert(key.to_string(), entry);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let entries = self.entries.read().await;
        Ok(live(&entries, key).is_some())
    }

    async fn del(&self, key: &str) -> Result<bool> {
        let mut entries = self.entries.write().await;
        purge_if_expired(&mut entries, key);
        Ok(entries.remove(key).is_some())
    }

    async fn mset(&self, pairs: &[(String, String)]) -> Result<()> {
        let mut entries = self.entries.write().await;
        for (key, value) in pairs {
            let entry = StoreEntry::persistent(StoredValue::Str(value.as_bytes().to_vec()));
            entries.insert(key.clone(), entry);
        }
        Ok(())
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        let entries = self.entries.read().await;
        // Keys of other types read as nil, like MGET.
        Ok(keys
            .iter()
            .map(|key| match live(&entries, key).map(|entry| &entry.value) {
                Some(StoredValue::Str(bytes)) => Some(text(bytes)),
                _ => None,
            })
            .collect())
    }

    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64> {
        let mut entries = self.entries.write().await;
        let slot = write_slot(&mut entries, key, || StoredValue::Str(Vec::new()))?;
        let StoredValue::Str(bytes) = slot else {
            return Err(CacheError::WrongType(key.to_string()));
        };
        let current: i64 = if bytes.is_empty() {
            0
        } else {
            std::str::from_utf8(bytes)
                .ok()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| CacheError::NotAnInteger(key.to_string()))?
        };
        let next = current
            .checked_add(delta)
            .ok_or_else(|| CacheError::NotAnInteger(key.to_string()))?;
        *bytes = next.to_string().into_bytes();
        Ok(next)
    }

    async fn hset(&self, name: &str, field: &str, value: &str) -> Result<bool> {
        let mut entries = self.entries.write().await;
        let slot = write_slot(&mut entries, name, || StoredValue::Hash(HashMap::new()))?;
        let StoredValue::Hash(map) = slot else {
            return Err(CacheError::WrongType(name.to_string()));
        };
        Ok(map.insert(field.to_string(), value.to_string()).is_none())
    }

    async fn hget(&self, name: &str, field: &str) -> Result<Option<String>> {
        let entries = self.entries.read().await;
        Ok(read_hash(&entries, name)?.and_then(|map| map.get(field).cloned()))
    }

    async fn hset_multiple(&self, name: &str, pairs: &[(String, String)]) -> Result<()> {
        if pairs.is_empty() {
            return Ok(());
        }
        let mut entries = self.entries.write().await;
        let slot = write_slot(&mut entries, name, || StoredValue::Hash(HashMap::new()))?;
        let StoredValue::Hash(map) = slot else {
            return Err(CacheError::WrongType(name.to_string()));
        };
        for (field, value) in pairs {
            map.insert(field.clone(), value.clone());
        }
        Ok(())
    }

    async fn zadd(&self, name: &str, members: &[(String, f64)]) -> Result<usize> {
        if members.is_empty() {
            return Ok(0);
        }
        let mut entries = self.entries.write().await;
        let slot = write_slot(&mut entries, name, || StoredValue::ZSet(HashMap::new()))?;
        let StoredValue::ZSet(zset) = slot else {
            return Err(CacheError::WrongType(name.to_string()));
        };
        let mut added = 0;
        for (member, score) in members {
            if zset.insert(member.clone(), *score).is_none() {
                added += 1;
            }
        }
        Ok(added)
    }

    async fn zrem(&self, name: &str, member: &str) -> Result<bool> {
        let mut entries = self.entries.write().await;
        if read_zset(&entries, name)?.is_none() {
            return Ok(false);
        }
        let slot = write_slot(&mut entries, name, || StoredValue::ZSet(HashMap::new()))?;
        let StoredValue::ZSet(zset) = slot else {
            return Err(CacheError::WrongType(name.to_string()));
        };
        let removed = zset.remove(member).is_some();
        if zset.is_empty() {
            entries.remove(name);
        }
        Ok(removed)
    }

    async fn zincrby(&self, name: &str, member: &str, delta: f64) -> Result<f64> {
        let mut entries = self.entries.write().await;
        let slot = write_slot(&mut entries, name, || StoredValue::ZSet(HashMap::new()))?;
        let StoredValue::ZSet(zset) = slot else {
            return Err(CacheError::WrongType(name.to_string()));
        };
        let score = zset.entry(member.to_string()).or_insert(0.0);
        *score += delta;
        Ok(*score)
    }

    async fn zrevrank(&self, name: &str, member: &str) -> Result<Option<usize>> {
        let entries = self.entries.read().await;
        Ok(read_zset(&entries, name)?.and_then(|zset| {
            ordered(zset, true).iter().position(|(m, _)| m == member)
        }))
    }

    async fn zscore(&self, name: &str, member: &str) -> Result<Option<f64>> {
        let entries = self.entries.read().await;
        Ok(read_zset(&entries, name)?.and_then(|zset| zset.get(member).copied()))
    }

    async fn zrange(
        &self,
        name: &str,
        start: isize,
        stop: isize,
        rev: bool,
    ) -> Result<Vec<String>> {
        let members = self.zrange_withscores(name, start, stop, rev).await?;
        Ok(members.into_iter().map(|(member, _)| member).collect())
    }

    async fn zrange_withscores(
        &self,
        name: &str,
        start: isize,
        stop: isize,
        rev: bool,
    ) -> Result<Vec<(String, f64)>> {
        let entries = self.entries.read().await;
        Ok(match read_zset(&entries, name)? {
            Some(zset) => slice_range(ordered(zset, rev), start, stop),
            None => Vec::new(),
        })
    }

    async fn setbit(&self, key: &str, offset: u32, bit: bool) -> Result<u8> {
        let mut entries = self.entries.write().await;
        let slot = write_slot(&mut entries, key, || StoredValue::Str(Vec::new()))?;
        let StoredValue::Str(bytes) = slot else {
            return Err(CacheError::WrongType(key.to_string()));
        };
        let byte = (offset / 8) as usize;
        if bytes.len() <= byte {
            bytes.resize(byte + 1, 0);
        }
        let previous = bit_at(bytes, offset);
        let mask = 0x80u8 >> (offset % 8);
        if bit {
            bytes[byte] |= mask;
        } else {
            bytes[byte] &= !mask;
        }
        Ok(previous)
    }

    async fn getbit(&self, key: &str, offset: u32) -> Result<u8> {
        let entries = self.entries.read().await;
        Ok(read_str(&entries, key)?.map_or(0, |bytes| bit_at(bytes, offset)))
    }

    async fn getbit_batch(&self, reads: &[(String, u32)]) -> Result<Vec<u8>> {
        let entries = self.entries.read().await;
        reads
            .iter()
            .map(|(key, offset)| -> Result<u8> {
                Ok(read_str(&entries, key)?.map_or(0, |bytes| bit_at(bytes, *offset)))
            })
            .collect()
    }
}
