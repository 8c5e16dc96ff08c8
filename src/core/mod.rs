//! Core types for altsync
//!
//! This module holds the error taxonomy shared by every component:
//! - [`SyncError`] - Enumerated failure kinds (fatal and per-app)
//! - [`ErrorContext`] - User-friendly wrapper with details and suggestions
//! - [`user_friendly_error`] - Convert any `anyhow::Error` for terminal output

pub mod error;

pub use error::{ErrorContext, SyncError, user_friendly_error};
