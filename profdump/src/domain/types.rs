//! Domain types providing compile-time safety and self-documentation
//!
//! These newtype wrappers keep raw wire integers from being confused with one
//! another and own the display rules for the report.

// Time conversions intentionally lose precision for display purposes
#![allow(clippy::cast_precision_loss)]

use chrono::{DateTime, Utc};
use std::fmt;

use super::errors::ProfileError;

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Profile ID
///
/// A 16-byte identifier. An empty wire value means "unset" and is the
/// all-zero id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ProfileId(pub [u8; 16]);

impl ProfileId {
    /// Parse the wire bytes of a profile id
    ///
    /// # Errors
    /// Returns [`ProfileError::InvalidProfileId`] unless `bytes` is empty or 16 bytes long
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProfileError> {
        if bytes.is_empty() {
            return Ok(Self::default());
        }
        <[u8; 16]>::try_from(bytes)
            .map(Self)
            .map_err(|_| ProfileError::InvalidProfileId { len: bytes.len() })
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Timestamp in nanoseconds since the Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(pub u64);

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // u64 nanoseconds / 1e9 always fits in i64, and the remainder in u32
        let secs = i64::try_from(self.0 / NANOS_PER_SEC).unwrap_or(i64::MAX);
        let nanos = u32::try_from(self.0 % NANOS_PER_SEC).unwrap_or(0);
        match DateTime::<Utc>::from_timestamp(secs, nanos) {
            Some(time) => write!(f, "{}", time.format("%Y-%m-%d %H:%M:%S%.f UTC")),
            None => write!(f, "{}ns", self.0),
        }
    }
}

/// Duration in nanoseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Duration(pub u64);

impl Duration {
    /// Convert to microseconds (f64)
    pub fn as_micros(self) -> f64 {
        self.0 as f64 / 1_000.0
    }

    /// Convert to milliseconds (f64)
    pub fn as_millis(self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    /// Convert to seconds (f64)
    pub fn as_seconds(self) -> f64 {
        self.0 as f64 / 1_000_000_000.0
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 1_000 {
            write!(f, "{}ns", self.0)
        } else if self.0 < 1_000_000 {
            write!(f, "{:.2}µs", self.as_micros())
        } else if self.0 < NANOS_PER_SEC {
            write!(f, "{:.2}ms", self.as_millis())
        } else {
            write!(f, "{:.2}s", self.as_seconds())
        }
    }
}
