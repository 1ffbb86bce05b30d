//! Check-In Tracker
//!
//! One bitmap per calendar day at `prefix ++ "YYYY-MM-DD"`, bit offset = user id.
//! Range queries read one bit per day in a single pipelined batch.

use chrono::{Datelike, Days, NaiveDate};
use tracing::{debug, info};

use super::{Clock, LocalClock, UserId, DEFAULT_PREFIX};
use crate::codec::DATE_FORMAT;
use crate::error::Result;
use crate::store::KeyValueStore;

// == Check In ==
/// Daily check-in bitmaps.
#[derive(Debug, Clone)]
pub struct CheckIn<S, C = LocalClock> {
    store: S,
    prefix: String,
    clock: C,
}

impl<S: KeyValueStore> CheckIn<S> {
    /// Tracker on the local calendar with the default key prefix.
    pub fn new(store: S) -> Self {
        Self::with_clock(store, LocalClock)
    }
}

impl<S: KeyValueStore, C: Clock> CheckIn<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self {
            store,
            prefix: DEFAULT_PREFIX.to_string(),
            clock,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Bitmap key holding every user's bit for `date`.
    pub fn day_key(&self, date: NaiveDate) -> String {
        format!("{}{}", self.prefix, date.format(DATE_FORMAT))
    }

    // == Sign ==
    /// Marks `user` as checked in today. Returns the previous bit (1 = already signed).
    pub async fn sign(&self, user: UserId) -> Result<u8> {
        let key = self.day_key(self.clock.today());
        let previous = self.store.setbit(&key, user.get(), true).await?;
        info!(user = %user, key = %key, first = (previous == 0), "check-in");
        Ok(previous)
    }

    /// Today's bit for `user`.
    pub async fn sign_status(&self, user: UserId) -> Result<u8> {
        let key = self.day_key(self.clock.today());
        self.store.getbit(&key, user.get()).await
    }

    // == Range Queries ==
    /// Bits from Monday through today; index 0 is Monday.
    pub async fn week_sign_status(&self, user: UserId) -> Result<Vec<u8>> {
        let today = self.clock.today();
        let days = today.weekday().number_from_monday();
        self.trailing_days(user, today, days).await
    }

    /// Bits from the 1st of the month through today; index 0 is the 1st.
    pub async fn month_sign_status(&self, user: UserId) -> Result<Vec<u8>> {
        let today = self.clock.today();
        self.trailing_days(user, today, today.day()).await
    }

    pub async fn week_sign_num(&self, user: UserId) -> Result<u32> {
        Ok(count(&self.week_sign_status(user).await?))
    }

    pub async fn month_sign_num(&self, user: UserId) -> Result<u32> {
        Ok(count(&self.month_sign_status(user).await?))
    }

    /// Reads `days` consecutive days ending at `today`, oldest first.
    async fn trailing_days(&self, user: UserId, today: NaiveDate, days: u32) -> Result<Vec<u8>> {
        let reads: Vec<(String, u32)> = (0..days)
            .map(|back| (self.day_key(today - Days::new(u64::from(back))), user.get()))
            .collect();
        let mut bits = self.store.getbit_batch(&reads).await?;
        bits.reverse();
        debug!(user = %user, days, "read check-in range");
        Ok(bits)
    }
}

fn count(bits: &[u8]) -> u32 {
    bits.iter().map(|&bit| u32::from(bit)).sum()
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkin::FixedClock;
    use crate::store::MemoryStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tracker_on(store: &MemoryStore, day: NaiveDate) -> CheckIn<MemoryStore, FixedClock> {
        CheckIn::with_clock(store.clone(), FixedClock(day))
    }

    #[test]
    fn test_day_key() {
        let tracker = tracker_on(&MemoryStore::new(), date(2024, 3, 5));
        assert_eq!(tracker.day_key(date(2024, 3, 5)), "_check_in_2024-03-05");

        let custom = tracker.with_prefix("sign:");
        assert_eq!(custom.day_key(date(2024, 12, 31)), "sign:2024-12-31");
    }

    #[tokio::test]
    async fn test_sign_twice_is_idempotent() {
        let store = MemoryStore::new();
        let tracker = tracker_on(&store, date(2024, 1, 17));
        let user = UserId::new(9);

        assert_eq!(tracker.sign(user).await.unwrap(), 0);
        assert_eq!(tracker.sign(user).await.unwrap(), 1);
        assert_eq!(tracker.sign_status(user).await.unwrap(), 1);

        for other in [0, 8, 10, 1000] {
            assert_eq!(tracker.sign_status(UserId::new(other)).await.unwrap(), 0);
        }
    }

    #[tokio::test]
    async fn test_sign_writes_bit_at_user_offset() {
        let store = MemoryStore::new();
        let tracker = tracker_on(&store, date(2024, 1, 17));

        tracker.sign(UserId::new(3)).await.unwrap();

        assert_eq!(store.getbit("_check_in_2024-01-17", 3).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_week_status_on_wednesday() {
        let store = MemoryStore::new();
        let user = UserId::new(42);
        // 2024-01-15 is a Monday
        tracker_on(&store, date(2024, 1, 15)).sign(user).await.unwrap();
        let wednesday = tracker_on(&store, date(2024, 1, 17));
        wednesday.sign(user).await.unwrap();

        assert_eq!(wednesday.week_sign_status(user).await.unwrap(), vec![1, 0, 1]);
        assert_eq!(wednesday.week_sign_num(user).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_week_length_by_weekday() {
        let store = MemoryStore::new();
        let user = UserId::new(1);

        let monday = tracker_on(&store, date(2024, 1, 15));
        assert_eq!(monday.week_sign_status(user).await.unwrap().len(), 1);

        let sunday = tracker_on(&store, date(2024, 1, 21));
        assert_eq!(sunday.week_sign_status(user).await.unwrap(), vec![0; 7]);
    }

    #[tokio::test]
    async fn test_week_spans_month_boundary() {
        let store = MemoryStore::new();
        let user = UserId::new(5);
        // 2024-04-29 is a Monday, 2024-05-01 a Wednesday
        tracker_on(&store, date(2024, 4, 29)).sign(user).await.unwrap();
        tracker_on(&store, date(2024, 4, 30)).sign(user).await.unwrap();

        let wednesday = tracker_on(&store, date(2024, 5, 1));
        assert_eq!(wednesday.week_sign_status(user).await.unwrap(), vec![1, 1, 0]);
        assert_eq!(wednesday.month_sign_status(user).await.unwrap(), vec![0]);
    }

    #[tokio::test]
    async fn test_month_status_on_fifth() {
        let store = MemoryStore::new();
        let user = UserId::new(77);
        tracker_on(&store, date(2024, 3, 1)).sign(user).await.unwrap();
        tracker_on(&store, date(2024, 3, 4)).sign(user).await.unwrap();
        // previous month is outside the range
        tracker_on(&store, date(2024, 2, 29)).sign(user).await.unwrap();

        let fifth = tracker_on(&store, date(2024, 3, 5));
        assert_eq!(
            fifth.month_sign_status(user).await.unwrap(),
            vec![1, 0, 0, 1, 0]
        );
        assert_eq!(fifth.month_sign_num(user).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_users_do_not_share_bits() {
        let store = MemoryStore::new();
        let tracker = tracker_on(&store, date(2024, 3, 5));

        tracker.sign(UserId::new(1)).await.unwrap();

        assert_eq!(tracker.month_sign_num(UserId::new(2)).await.unwrap(), 0);
        assert_eq!(tracker.month_sign_num(UserId::new(1)).await.unwrap(), 1);
    }

    #[test]
    fn test_count() {
        assert_eq!(count(&[1, 0, 1, 1]), 3);
        assert_eq!(count(&[]), 0);
    }
}
