//! File system helpers.
//!
//! - [`atomic`] - Write-to-temp-then-rename for persisted documents
//! - [`json`] - Deterministic pretty JSON reading and writing

pub mod atomic;
pub mod json;

pub use atomic::atomic_write;
pub use json::{to_pretty_json, write_json_file};
