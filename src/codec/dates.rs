//! Date and datetime wire formats.
//!
//! JSON has no date type; dates travel as `YYYY-MM-DD` and datetimes as
//! `YYYY-MM-DD HH:MM:SS` (no fractional seconds, no offset).

use chrono::{NaiveDate, NaiveDateTime};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// == Wire Date ==
/// A date that serializes as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WireDate(pub NaiveDate);

impl Serialize for WireDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0.format(DATE_FORMAT))
    }
}

impl<'de> Deserialize<'de> for WireDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&text, DATE_FORMAT)
            .map(WireDate)
            .map_err(de::Error::custom)
    }
}

impl From<NaiveDate> for WireDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

// == Wire DateTime ==
/// A datetime that serializes as `YYYY-MM-DD HH:MM:SS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WireDateTime(pub NaiveDateTime);

impl Serialize for WireDateTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0.format(DATETIME_FORMAT))
    }
}

impl<'de> Deserialize<'de> for WireDateTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&text, DATETIME_FORMAT)
            .map(WireDateTime)
            .map_err(de::Error::custom)
    }
}

impl From<NaiveDateTime> for WireDateTime {
    fn from(at: NaiveDateTime) -> Self {
        Self(at)
    }
}

/// `#[serde(with = "date_format")]` for `NaiveDate` fields.
pub mod date_format {
    use super::*;

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        WireDate(*date).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        WireDate::deserialize(deserializer).map(|d| d.0)
    }
}

/// `#[serde(with = "datetime_format")]` for `NaiveDateTime` fields.
pub mod datetime_format {
    use super::*;

    pub fn serialize<S: Serializer>(at: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        WireDateTime(*at).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        WireDateTime::deserialize(deserializer).map(|d| d.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datetime_drops_fractional_seconds() {
        let at = NaiveDate::from_ymd_opt(2023, 12, 31)
            .unwrap()
            .and_hms_milli_opt(23, 59, 58, 750)
            .unwrap();
        let json = serde_json::to_string(&WireDateTime(at)).unwrap();
        assert_eq!(json, "\"2023-12-31 23:59:58\"");
    }

    #[test]
    fn test_date_parse_back() {
        let parsed: WireDate = serde_json::from_str("\"2024-02-29\"").unwrap();
        assert_eq!(parsed.0, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn test_datetime_rejects_iso_t_separator() {
        let parsed = serde_json::from_str::<WireDateTime>("\"2024-02-29T10:00:00\"");
        assert!(parsed.is_err());
    }
}
