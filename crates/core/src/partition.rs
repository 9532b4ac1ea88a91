//! Calendar-hour partition keys derived from object-storage paths.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Zero-indexed positions of the `YYYY/MM/DD/HH` segments in a raw object key,
/// e.g. `raw/reddit/cryptocurrency/2025/11/25/21/<file>.json.gz`.
const KEY_SEGMENT_RANGE: std::ops::Range<usize> = 3..7;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PartitionError {
    #[error("object key has too few path segments: {0}")]
    TooShort(String),

    #[error("non-numeric partition segment in {0}")]
    NonNumeric(String),

    #[error("not a valid calendar hour: {0}")]
    OutOfRange(String),
}

/// The calendar hour a batch of raw records belongs to.
///
/// Formats as `YYYY/MM/DD/HH` (the canonical job name and storage path
/// form) and round-trips through [`FromStr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartitionKey {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
}

impl PartitionKey {
    /// Build a key, validating that it names a real calendar hour.
    pub fn new(year: i32, month: u32, day: u32, hour: u32) -> Result<Self, PartitionError> {
        if NaiveDate::from_ymd_opt(year, month, day).is_none() || hour > 23 {
            return Err(PartitionError::OutOfRange(format!(
                "{year:04}/{month:02}/{day:02}/{hour:02}"
            )));
        }
        Ok(Self { year, month, day, hour })
    }

    /// Extract the partition from a raw object key by taking the fixed
    /// `YYYY/MM/DD/HH` path segments.
    pub fn from_object_key(key: &str) -> Result<Self, PartitionError> {
        let segments: Vec<&str> = key.split('/').collect();
        if segments.len() < KEY_SEGMENT_RANGE.end {
            return Err(PartitionError::TooShort(key.to_string()));
        }
        segments[KEY_SEGMENT_RANGE].join("/").parse()
    }

    /// The instant this partition's hour begins.
    ///
    /// `None` only for keys constructed without validation (e.g. direct
    /// struct literals in deserialized input).
    pub fn hour_start(&self) -> Option<DateTime<Utc>> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
            .and_then(|date| date.and_hms_opt(self.hour, 0, 0))
            .map(|naive| naive.and_utc())
    }

    /// Hive-style date value, `YYYY-MM-DD`.
    pub fn date_string(&self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }

    /// Hive-style hour value, `HH`.
    pub fn hour_string(&self) -> String {
        format!("{:02}", self.hour)
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}/{:02}/{:02}/{:02}",
            self.year, self.month, self.day, self.hour
        )
    }
}

impl FromStr for PartitionKey {
    type Err = PartitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() != 4 {
            return Err(PartitionError::TooShort(s.to_string()));
        }
        let year: i32 = parts[0]
            .parse()
            .map_err(|_| PartitionError::NonNumeric(s.to_string()))?;
        let [month, day, hour] = [parts[1], parts[2], parts[3]].map(|p| p.parse::<u32>());
        match (month, day, hour) {
            (Ok(month), Ok(day), Ok(hour)) => Self::new(year, month, day, hour),
            _ => Err(PartitionError::NonNumeric(s.to_string())),
        }
    }
}
