//! Check-In Module
//!
//! Daily attendance bitmaps: one key per day, one bit per user.

mod clock;
mod tracker;
mod user_id;

pub use clock::{Clock, FixedClock, LocalClock};
pub use tracker::CheckIn;
pub use user_id::UserId;

/// Default key prefix for the daily bitmaps.
pub const DEFAULT_PREFIX: &str = "_check_in_";
