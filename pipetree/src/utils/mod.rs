//! Utility functions for timestamp handling.

pub mod timestamps;

pub use timestamps::{format_iso8601, from_system_time, iso_timestamp, Timestamp};
