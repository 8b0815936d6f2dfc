//! Utility functions for timestamp handling.
//!
//! Message lines carry a clock prefix; file renames use a compact millisecond
//! suffix that sorts lexicographically.

pub mod timestamps;

pub use timestamps::{
    backup_file_name, clock_prefix, file_suffix, now_utc, suffixed_file_name, Timestamp,
};
