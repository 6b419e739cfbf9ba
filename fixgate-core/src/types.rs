/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Core types for FIX session operations.
//!
//! - [`SeqNum`]: per-direction message sequence number
//! - [`format_utc_timestamp`]: FIX UTC timestamp with millisecond precision

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// FIX message sequence number.
///
/// Sequence numbers start at 1 and increase by exactly one per message in
/// each direction of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct SeqNum(u64);

impl SeqNum {
    /// Creates a new sequence number.
    #[inline]
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw sequence number value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Returns the next sequence number.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl Default for SeqNum {
    fn default() -> Self {
        Self(1)
    }
}

impl From<u64> for SeqNum {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<SeqNum> for u64 {
    fn from(seq: SeqNum) -> Self {
        seq.0
    }
}

impl fmt::Display for SeqNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Formats a UTC instant the way FIX expects in SendingTime and TransactTime.
///
/// Format: `YYYYMMDD-HH:MM:SS.sss`
#[must_use]
pub fn format_utc_timestamp(dt: DateTime<Utc>) -> String {
    dt.format("%Y%m%d-%H:%M:%S%.3f").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_seq_num_default_and_next() {
        let seq = SeqNum::default();
        assert_eq!(seq.value(), 1);
        assert_eq!(seq.next().value(), 2);
        assert_eq!(seq.next().to_string(), "2");
    }

    #[test]
    fn test_format_utc_timestamp() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 2).unwrap()
            + chrono::Duration::milliseconds(45);
        assert_eq!(format_utc_timestamp(dt), "20240307-09:05:02.045");
    }

    #[test]
    fn test_format_utc_timestamp_whole_second() {
        let dt = Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(format_utc_timestamp(dt), "20251231-23:59:59.000");
    }
}
