//! Cache Module
//!
//! Alias-namespaced access to the key-value store.

mod proxy;
mod router;


// Re-export public types
pub use proxy::{merge_mappings, validate_key, CacheProxy};
pub use router::Cache;
