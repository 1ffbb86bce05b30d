//! Alias Router
//!
//! Turns any alias name into a bound [`CacheProxy`]; there is no registry.

use crate::cache::CacheProxy;
use crate::store::KeyValueStore;

// == Cache ==
/// Entry point for alias-namespaced cache access.
///
/// ```ignore
/// let cache = Cache::new(store);
/// cache.proxy_for("user_units:").set("630445", "hello").await?;
/// ```
#[derive(Debug, Clone)]
pub struct Cache<S> {
    store: S,
    /// TTL handed to every proxy, 0 = no expiration
    default_ttl: u64,
}

impl<S: KeyValueStore> Cache<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            default_ttl: 0,
        }
    }

    /// Sets the TTL every resolved proxy starts with.
    pub fn with_default_ttl(mut self, ttl_secs: u64) -> Self {
        self.default_ttl = ttl_secs;
        self
    }

    /// Proxy bound to `alias`. Any string is a valid alias.
    pub fn proxy_for(&self, alias: impl Into<String>) -> CacheProxy<S> {
        CacheProxy::new(self.store.clone(), alias).with_ttl(self.default_ttl)
    }

    /// Proxy bound to `alias` and tagged with the command it is resolved for.
    pub fn action(&self, alias: impl Into<String>, action: impl Into<String>) -> CacheProxy<S> {
        self.proxy_for(alias).with_action(action)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn default_ttl(&self) -> u64 {
        self.default_ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_unregistered_alias_works() {
        let cache = Cache::new(MemoryStore::new());

        cache.proxy_for("someAlias").set("k", "v").await.unwrap();

        assert_eq!(cache.proxy_for("someAlias").get("k").await.unwrap(), "v");
    }

    #[tokio::test]
    async fn test_router_matches_explicit_proxy() {
        let store = MemoryStore::new();
        let cache = Cache::new(store.clone());

        cache.action("someAlias", "set").set("k", "v").await.unwrap();
        let explicit = CacheProxy::new(store, "someAlias").with_action("get");

        assert_eq!(explicit.get("k").await.unwrap(), "v");
    }

    #[tokio::test]
    async fn test_aliases_are_isolated() {
        let cache = Cache::new(MemoryStore::new());

        cache.proxy_for("a1:").set("k", "one").await.unwrap();
        cache.proxy_for("a2:").set("k", "two").await.unwrap();

        assert_eq!(cache.proxy_for("a1:").get("k").await.unwrap(), "one");
        assert_eq!(cache.proxy_for("a2:").get("k").await.unwrap(), "two");
    }

    #[test]
    fn test_default_ttl_propagates() {
        let cache = Cache::new(MemoryStore::new()).with_default_ttl(30);
        let proxy = cache.action("user", "get");

        assert_eq!(proxy.ttl(), 30);
        assert_eq!(proxy.action(), Some("get"));
        assert_eq!(cache.default_ttl(), 30);
    }
}
