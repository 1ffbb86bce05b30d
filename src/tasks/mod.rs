//! Background Tasks Module
//!
//! # Tasks
//! - TTL Cleanup: purges expired keys from the memory backend at configured intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
