//! Domain model for profdump
//!
//! This module contains core domain types and errors that provide:
//! - Compile-time safety via newtype pattern
//! - Display rules for ids, timestamps and durations
//! - Structured error handling

pub mod errors;
pub mod types;

// Re-export common types for convenience
pub use types::{Duration, ProfileId, Timestamp};

pub use errors::{DecodeError, ProfileError, ServeError};
