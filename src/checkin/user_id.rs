//! User identifiers used as bitmap offsets.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::CacheError;

// == User Id ==
/// A user id, which is also the bit offset inside each daily bitmap.
///
/// Bit offsets are limited to `u32` by the store, so ids outside that range
/// are rejected rather than wrapped onto another user's bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(u32);

impl UserId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for UserId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl TryFrom<i64> for UserId {
    type Error = CacheError;

    fn try_from(id: i64) -> Result<Self, Self::Error> {
        u32::try_from(id)
            .map(Self)
            .map_err(|_| CacheError::InvalidUserId(id.to_string()))
    }
}

impl TryFrom<u64> for UserId {
    type Error = CacheError;

    fn try_from(id: u64) -> Result<Self, Self::Error> {
        u32::try_from(id)
            .map(Self)
            .map_err(|_| CacheError::InvalidUserId(id.to_string()))
    }
}

impl FromStr for UserId {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CacheError::InvalidUserId(s.to_string()));
        }
        s.parse::<u32>()
            .map(Self)
            .map_err(|_| CacheError::InvalidUserId(s.to_string()))
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
