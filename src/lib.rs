//! Alias Cache - a namespaced Redis cache proxy with daily check-in bitmaps
//!
//! Values go through a JSON codec, keys are scoped by alias prefix, and
//! check-ins are stored as one bitmap per calendar day.

pub mod api;
pub mod cache;
pub mod checkin;
pub mod codec;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use cache::{Cache, CacheProxy};
pub use checkin::{CheckIn, UserId};
pub use config::{Config, StoreBackend};
pub use error::{CacheError, Result};
pub use store::{KeyValueStore, MemoryStore, RedisStore};
pub use tasks::spawn_cleanup_task;
