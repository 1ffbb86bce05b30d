//! Cache Proxy Module
//!
//! Alias-bound command surface over a [`KeyValueStore`].
//!
//! Every string key is stored as `alias ++ key` with no separator; hash and
//! sorted-set commands use the alias itself as the hash/set name. Values go
//! through the codec on the way in and, for the `*_decoded` reads, on the way
//! out.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::codec::{self, Decoded};
use crate::error::{CacheError, Result};
use crate::store::KeyValueStore;

// == Cache Proxy ==
/// Command surface bound to one alias.
#[derive(Debug, Clone)]
pub struct CacheProxy<S> {
    /// Shared store handle
    store: S,
    /// Namespace prefix
    alias: String,
    /// Command name this proxy was resolved for, introspection only
    action: Option<String>,
    /// TTL in seconds applied by `set`, 0 = no expiration
    ttl: u64,
}

impl<S: KeyValueStore> CacheProxy<S> {
    // == Constructor ==
    /// Creates a proxy for `alias` with no expiration on writes.
    ///
    /// # Arguments
    /// * `store` - Shared store handle
    /// * `alias` - Namespace, prepended verbatim to every key
    pub fn new(store: S, alias: impl Into<String>) -> Self {
        Self {
            store,
            alias: alias.into(),
            action: None,
            ttl: 0,
        }
    }

    /// Tags the proxy with the command it was resolved for.
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Sets the TTL used by `set`. 0 disables expiration.
    pub fn with_ttl(mut self, ttl_secs: u64) -> Self {
        self.ttl = ttl_secs;
        self
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    pub fn ttl(&self) -> u64 {
        self.ttl
    }

    // == Key Construction ==
    /// Returns `alias ++ key` after checking the key's shape.
    pub fn full_key(&self, key: &str) -> Result<String> {
        self.check_key(key)?;
        Ok(format!("{}{}", self.alias, key))
    }

    fn check_key(&self, key: &str) -> Result<()> {
        if let Err(err) = validate_key(key) {
            warn!(
                alias = %self.alias,
                action = self.action.as_deref().unwrap_or("-"),
                "rejected key: {}",
                err
            );
            return Err(err);
        }
        Ok(())
    }

    fn check_member(&self, member: &str, what: &'static str) -> Result<()> {
        if member.is_empty() {
            warn!(alias = %self.alias, "missing sorted-set argument: {}", what);
            return Err(CacheError::MissingArgument(what));
        }
        Ok(())
    }

    // == Strings ==
    /// Stored text for `key`, or an empty string when absent.
    pub async fn get(&self, key: &str) -> Result<String> {
        let full_key = self.full_key(key)?;
        Ok(self.store.get(&full_key).await?.unwrap_or_default())
    }

    /// Stored value for `key` passed through the codec.
    pub async fn get_decoded(&self, key: &str) -> Result<Decoded> {
        Ok(codec::decode(&self.get(key).await?))
    }

    /// Stored value deserialized into `T`, None when absent.
    pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let full_key = self.full_key(key)?;
        match self.store.get(&full_key).await? {
            Some(raw) => codec::decode(&raw).deserialize().map(Some),
            None => Ok(None),
        }
    }

    /// Stores `value` under `key` with the proxy's TTL.
    pub async fn set<V: Serialize + ?Sized>(&self, key: &str, value: &V) -> Result<bool> {
        self.set_ex(key, value, self.ttl).await
    }

    /// Stores `value` under `key` with an explicit TTL. 0 disables expiration.
    pub async fn set_ex<V: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &V,
        ttl_secs: u64,
    ) -> Result<bool> {
        let full_key = self.full_key(key)?;
        let wire = codec::encode(value)?;
        let ttl = (ttl_secs > 0).then_some(ttl_secs);
        self.store.set(&full_key, &wire, ttl).await?;
        debug!(key = %full_key, ttl = ttl_secs, "set");
        Ok(true)
    }

    pub async fn exists(&self, key: &str) -> Result<bool> {
        let full_key = self.full_key(key)?;
        self.store.exists(&full_key).await
    }

    /// Removes `key`. Returns true when something was deleted.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        let full_key = self.full_key(key)?;
        self.store.del(&full_key).await
    }

    /// Merges `mappings` left to right, then `overrides`, and writes all keys
    /// in one MSET.
    pub async fn mset(
        &self,
        mappings: &[Map<String, Value>],
        overrides: &[(&str, Value)],
    ) -> Result<bool> {
        let merged = merge_mappings(mappings, overrides);
        if merged.is_empty() {
            warn!(alias = %self.alias, "mset with nothing to write");
            return Err(CacheError::EmptyBatch("mset"));
        }
        let pairs = merged
            .iter()
            .map(|(key, value)| -> Result<(String, String)> {
                Ok((self.full_key(key)?, codec::encode_value(value)))
            })
            .collect::<Result<Vec<_>>>()?;
        self.store.mset(&pairs).await?;
        debug!(alias = %self.alias, keys = pairs.len(), "mset");
        Ok(true)
    }

    /// Stored text for each key in input order, empty string for absent keys.
    pub async fn mget<K: AsRef<str>>(&self, keys: &[K]) -> Result<Vec<String>> {
        let full_keys = keys
            .iter()
            .map(|key| self.full_key(key.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        let values = self.store.mget(&full_keys).await?;
        Ok(values.into_iter().map(Option::unwrap_or_default).collect())
    }

    /// Like [`mget`](Self::mget) with each value passed through the codec.
    pub async fn mget_decoded<K: AsRef<str>>(&self, keys: &[K]) -> Result<Vec<Decoded>> {
        let values = self.mget(keys).await?;
        Ok(values.iter().map(|raw| codec::decode(raw)).collect())
    }

    /// Adds `amount` to the integer at `key`.
    pub async fn incr(&self, key: &str, amount: i64) -> Result<()> {
        let full_key = self.full_key(key)?;
        self.store.incr_by(&full_key, amount).await?;
        Ok(())
    }

    /// Subtracts `amount` from the integer at `key`.
    pub async fn decr(&self, key: &str, amount: i64) -> Result<()> {
        let full_key = self.full_key(key)?;
        let delta = amount
            .checked_neg()
            .ok_or_else(|| CacheError::NotAnInteger(full_key.clone()))?;
        self.store.incr_by(&full_key, delta).await?;
        Ok(())
    }

    // == Hashes ==
    /// Sets `field` in the hash named by the alias. Returns true for a new field.
    pub async fn hset<V: Serialize + ?Sized>(&self, field: &str, value: &V) -> Result<bool> {
        self.check_key(field)?;
        let wire = codec::encode(value)?;
        self.store.hset(&self.alias, field, &wire).await
    }

    /// Stored text of `field`, or an empty string when absent.
    pub async fn hget(&self, field: &str) -> Result<String> {
        self.check_key(field)?;
        Ok(self.store.hget(&self.alias, field).await?.unwrap_or_default())
    }

    pub async fn hget_decoded(&self, field: &str) -> Result<Decoded> {
        Ok(codec::decode(&self.hget(field).await?))
    }

    /// Merged like [`mset`](Self::mset), written as fields of the alias hash.
    pub async fn hmset(
        &self,
        mappings: &[Map<String, Value>],
        overrides: &[(&str, Value)],
    ) -> Result<bool> {
        let merged = merge_mappings(mappings, overrides);
        if merged.is_empty() {
            warn!(alias = %self.alias, "hmset with nothing to write");
            return Err(CacheError::EmptyBatch("hmset"));
        }
        let mut pairs = Vec::with_capacity(merged.len());
        for (field, value) in &merged {
            self.check_key(field)?;
            pairs.push((field.clone(), codec::encode_value(value)));
        }
        self.store.hset_multiple(&self.alias, &pairs).await?;
        Ok(true)
    }

    // == Sorted Sets ==
    /// Adds members with scores to the sorted set named by the alias.
    pub async fn zadd(&self, members: &[(&str, f64)]) -> Result<usize> {
        if members.is_empty() {
            warn!(alias = %self.alias, "zadd without members");
            return Err(CacheError::MissingArgument("members"));
        }
        for (member, _) in members {
            self.check_member(member, "member")?;
        }
        let members: Vec<(String, f64)> = members
            .iter()
            .map(|(member, score)| (member.to_string(), *score))
            .collect();
        self.store.zadd(&self.alias, &members).await
    }

    pub async fn zrem(&self, member: &str) -> Result<bool> {
        self.check_member(member, "member")?;
        self.store.zrem(&self.alias, member).await
    }

    /// Adds `amount` to the member's score, creating it at `amount` when absent.
    pub async fn zincrby(&self, member: &str, amount: f64) -> Result<f64> {
        self.check_member(member, "member")?;
        self.store.zincrby(&self.alias, member, amount).await
    }

    /// Rank with the highest score at 0.
    pub async fn zrevrank(&self, member: &str) -> Result<Option<usize>> {
        self.check_member(member, "member")?;
        self.store.zrevrank(&self.alias, member).await
    }

    pub async fn zscore(&self, member: &str) -> Result<Option<f64>> {
        self.check_member(member, "member")?;
        self.store.zscore(&self.alias, member).await
    }

    /// Members in index range `[start, stop]`, each passed through the codec.
    pub async fn zrange(&self, start: isize, stop: isize, desc: bool) -> Result<Vec<Decoded>> {
        let members = self.store.zrange(&self.alias, start, stop, desc).await?;
        Ok(members.iter().map(|m| codec::decode(m)).collect())
    }

    pub async fn zrange_withscores(
        &self,
        start: isize,
        stop: isize,
        desc: bool,
    ) -> Result<Vec<(Decoded, f64)>> {
        let members = self
            .store
            .zrange_withscores(&self.alias, start, stop, desc)
            .await?;
        Ok(members
            .into_iter()
            .map(|(member, score)| (codec::decode(&member), score))
            .collect())
    }
}

// == Helpers ==
/// Keys and hash fields must be non-empty and free of whitespace.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || key.chars().any(char::is_whitespace) {
        return Err(CacheError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Merges mappings left to right; `overrides` are applied last.
pub fn merge_mappings(
    mappings: &[Map<String, Value>],
    overrides: &[(&str, Value)],
) -> Map<String, Value> {
    let mut merged = Map::new();
    for mapping in mappings {
        for (key, value) in mapping {
            merged.insert(key.clone(), value.clone());
        }
    }
    for (key, value) in overrides {
        merged.insert(key.to_string(), value.clone());
    }
    merged
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde::Deserialize;
    use serde_json::json;

    fn proxy(alias: &str) -> (MemoryStore, CacheProxy<MemoryStore>) {
        let store = MemoryStore::new();
        (store.clone(), CacheProxy::new(store, alias))
    }

    fn mapping(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[tokio::test]
    async fn test_set_and_get_prefixed() {
        let (store, users) = proxy("user_units:");

        assert!(users.set("897447", "hello").await.unwrap());

        assert_eq!(users.get("897447").await.unwrap(), "hello");
        assert_eq!(
            store.get("user_units:897447").await.unwrap(),
            Some("hello".to_string())
        );
    }

    #[tokio::test]
    async fn test_get_absent_is_empty_string() {
        let (_, users) = proxy("user:");
        assert_eq!(users.get("nobody").await.unwrap(), "");
        assert!(users.get_decoded("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_structured_value_is_json_on_the_wire() {
        let (store, units) = proxy("user_units:");
        let value = json!([{"city": "410100", "class_id": 4, "type": 1}]);

        units.set("1", &value).await.unwrap();

        let raw = store.get("user_units:1").await.unwrap().unwrap();
        assert_eq!(raw, r#"[{"city":"410100","class_id":4,"type":1}]"#);
        let decoded = units.get_decoded("1").await.unwrap();
        let first = &decoded.as_list().unwrap()[0];
        assert_eq!(first.as_record().unwrap().get_i64("class_id"), Some(4));
    }

    #[tokio::test]
    async fn test_get_as_typed() {
        #[derive(Debug, Deserialize, PartialEq, Serialize)]
        struct Profile {
            name: String,
            level: u8,
        }

        let (_, profiles) = proxy("profile:");
        let profile = Profile {
            name: "ann".to_string(),
            level: 3,
        };
        profiles.set("7", &profile).await.unwrap();

        assert_eq!(profiles.get_as::<Profile>("7").await.unwrap(), Some(profile));
        assert_eq!(profiles.get_as::<Profile>("8").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_malformed_key_rejected_without_store_call() {
        let (store, users) = proxy("user:");

        assert!(matches!(users.get("").await, Err(CacheError::InvalidKey(_))));
        assert!(matches!(users.set("a b", "x").await, Err(CacheError::InvalidKey(_))));
        assert!(matches!(users.exists("a\tb").await, Err(CacheError::InvalidKey(_))));
        assert!(matches!(users.delete(" ").await, Err(CacheError::InvalidKey(_))));
        assert!(matches!(users.incr("a b", 1).await, Err(CacheError::InvalidKey(_))));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_one_bad_call_does_not_stop_a_loop() {
        let (_, users) = proxy("user:");
        let keys = ["a", "bad key", "c"];

        let results: Vec<Result<bool>> = {
            let mut out = Vec::new();
            for key in keys {
                out.push(users.set(key, "v").await);
            }
            out
        };

        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
        assert_eq!(users.get("c").await.unwrap(), "v");
    }

    #[tokio::test]
    async fn test_ttl_applied_by_set() {
        let (store, sessions) = proxy("session:");
        let sessions = sessions.with_ttl(60);

        sessions.set("abc", "token").await.unwrap();
        sessions.set_ex("forever", "token", 0).await.unwrap();

        assert!(store.ttl("session:abc").await.is_some());
        assert!(store.ttl("session:forever").await.is_none());
    }

    #[tokio::test]
    async fn test_exists_and_delete() {
        let (_, users) = proxy("user:");
        users.set("1", "x").await.unwrap();

        assert!(users.exists("1").await.unwrap());
        assert!(users.delete("1").await.unwrap());
        assert!(!users.exists("1").await.unwrap());
        assert!(!users.delete("1").await.unwrap());
    }

    #[tokio::test]
    async fn test_mset_merge_precedence() {
        let (_, cfg) = proxy("cfg:");

        cfg.mset(
            &[mapping(json!({"a": 1})), mapping(json!({"a": 2, "b": 3}))],
            &[("b", json!(4))],
        )
        .await
        .unwrap();

        assert_eq!(cfg.mget(&["a", "b"]).await.unwrap(), vec!["2", "4"]);
    }

    #[tokio::test]
    async fn test_mset_empty_is_rejected() {
        let (_, cfg) = proxy("cfg:");
        let result = cfg.mset(&[Map::new()], &[]).await;
        assert!(matches!(result, Err(CacheError::EmptyBatch("mset"))));
    }

    #[tokio::test]
    async fn test_mget_order_with_absent_keys() {
        let (_, cfg) = proxy("cfg:");
        cfg.set("x", "1").await.unwrap();
        cfg.set("z", &json!({"k": true})).await.unwrap();

        let values = cfg.mget(&["z", "y", "x"]).await.unwrap();
        assert_eq!(values, vec![r#"{"k":true}"#, "", "1"]);

        let decoded = cfg.mget_decoded(&["z", "y"]).await.unwrap();
        assert_eq!(decoded[0].as_record().unwrap().get_bool("k"), Some(true));
        assert!(decoded[1].is_empty());
    }

    #[tokio::test]
    async fn test_incr_and_decr() {
        let (_, counters) = proxy("counter:");

        counters.incr("hits", 1).await.unwrap();
        counters.incr("hits", 4).await.unwrap();
        counters.decr("hits", 2).await.unwrap();

        assert_eq!(counters.get("hits").await.unwrap(), "3");
    }

    #[tokio::test]
    async fn test_hash_commands_use_alias_as_name() {
        let (store, scores) = proxy("scores");

        assert!(scores.hset("ann", &json!({"math": 90})).await.unwrap());
        scores
            .hmset(&[mapping(json!({"bob": 70}))], &[("cid", json!("x"))])
            .await
            .unwrap();

        assert_eq!(scores.hget("bob").await.unwrap(), "70");
        assert_eq!(scores.hget("cid").await.unwrap(), "x");
        assert_eq!(scores.hget("nobody").await.unwrap(), "");
        let ann = scores.hget_decoded("ann").await.unwrap();
        assert_eq!(ann.as_record().unwrap().get_i64("math"), Some(90));
        assert_eq!(
            store.hget("scores", "bob").await.unwrap(),
            Some("70".to_string())
        );
    }

    #[tokio::test]
    async fn test_hmset_empty_is_rejected() {
        let (_, scores) = proxy("scores");
        let result = scores.hmset(&[], &[]).await;
        assert!(matches!(result, Err(CacheError::EmptyBatch("hmset"))));
    }

    #[tokio::test]
    async fn test_sorted_set_commands() {
        let (_, rank) = proxy("rankstar");

        assert_eq!(rank.zadd(&[("ann", 3.0), ("bob", 5.0)]).await.unwrap(), 2);
        assert_eq!(rank.zincrby("ann", 4.0).await.unwrap(), 7.0);
        assert_eq!(rank.zrevrank("ann").await.unwrap(), Some(0));
        assert_eq!(rank.zscore("bob").await.unwrap(), Some(5.0));

        let top = rank.zrange_withscores(0, -1, true).await.unwrap();
        assert_eq!(
            top,
            vec![
                (Decoded::Raw("ann".to_string()), 7.0),
                (Decoded::Raw("bob".to_string()), 5.0)
            ]
        );

        assert!(rank.zrem("bob").await.unwrap());
        assert_eq!(rank.zrange(0, -1, false).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_zrange_decodes_json_members() {
        let (_, rank) = proxy("rank:");
        rank.zadd(&[(r#"{"id":1}"#, 1.0)]).await.unwrap();

        let members = rank.zrange(0, -1, false).await.unwrap();
        assert_eq!(members[0].as_record().unwrap().get_i64("id"), Some(1));
    }

    #[tokio::test]
    async fn test_sorted_set_missing_arguments() {
        let (store, rank) = proxy("rank:");

        assert!(matches!(rank.zadd(&[]).await, Err(CacheError::MissingArgument(_))));
        assert!(matches!(rank.zrem("").await, Err(CacheError::MissingArgument(_))));
        assert!(matches!(rank.zincrby("", 1.0).await, Err(CacheError::MissingArgument(_))));
        assert!(matches!(rank.zrevrank("").await, Err(CacheError::MissingArgument(_))));
        assert!(matches!(rank.zscore("").await, Err(CacheError::MissingArgument(_))));
        assert!(store.is_empty().await);
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("630445").is_ok());
        assert!(validate_key(":1:user_units:897447").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("has space").is_err());
        assert!(validate_key("new\nline").is_err());
    }

    #[test]
    fn test_action_tag() {
        let p = CacheProxy::new(MemoryStore::new(), "user").with_action("get");
        assert_eq!(p.alias(), "user");
        assert_eq!(p.action(), Some("get"));
        assert_eq!(p.ttl(), 0);
    }
}
