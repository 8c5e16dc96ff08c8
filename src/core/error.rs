//! Error handling for altsync
//!
//! This module provides the error types and user-friendly error reporting for the
//! catalog synchronization engine. The error system follows two principles:
//! 1. **Strongly-typed errors** for the failure kinds callers must tell apart
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Fatal vs. per-app errors
//!
//! Only a handful of failures abort a run: an unreadable or malformed curated
//! list ([`SyncError::CuratedListParse`]), an unwritable catalog
//! ([`SyncError::CatalogWrite`]) and configuration problems. Everything that goes
//! wrong while processing a single app ([`SyncError::Download`],
//! [`SyncError::PackageParse`], ...) is logged by the reconciler and the loop moves on.
//!
//! # Examples
//!
//! ```rust,no_run
//! use altsync::core::{SyncError, user_friendly_error};
//!
//! let err = anyhow::Error::from(SyncError::CuratedListParse {
//!     file: "apps.json".to_string(),
//!     reason: "expected value at line 1 column 1".to_string(),
//! });
//! user_friendly_error(err).display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for altsync operations.
#[derive(Error, Debug, Clone)]
pub enum SyncError {
    /// The curated list file does not exist.
    #[error("Curated list not found: {path}")]
    CuratedListNotFound {
        /// Path that was looked up
        path: String,
    },

    /// The curated list exists but is not a JSON array of app records.
    #[error("Invalid curated list {file}")]
    CuratedListParse {
        /// Curated list path
        file: String,
        /// Parser message
        reason: String,
    },

    /// The catalog (or a rewritten curated list) could not be persisted.
    #[error("Failed to write {path}")]
    CatalogWrite {
        /// Destination path
        path: String,
        /// Underlying I/O message
        reason: String,
    },

    /// `altsync.toml` is not valid TOML or has unexpected fields.
    #[error("Invalid configuration file {file}")]
    ConfigParse {
        /// Configuration path
        file: String,
        /// Parser message
        reason: String,
    },

    /// Nothing to do: no catalog targets configured or selected.
    #[error("No catalogs to synchronize")]
    NoCatalogs,

    /// A release asset could not be downloaded.
    #[error("Failed to download {url}")]
    Download {
        /// Asset URL
        url: String,
        /// Why the download failed
        reason: String,
    },

    /// A downloaded package could not be opened as an archive.
    #[error("Failed to read package {name}: {reason}")]
    PackageParse {
        /// Package file name
        name: String,
        /// Archive or manifest error
        reason: String,
    },

    /// Generic filesystem failure.
    #[error("File system error: {operation}")]
    Io {
        /// Operation that failed
        operation: String,
        /// Underlying I/O message
        reason: String,
    },

    /// Any other error.
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

/// Error context wrapper that provides user-friendly error information.
///
/// When displayed, errors show the main message in red, optional details in
/// yellow and an optional suggestion in green.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: SyncError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context without suggestion or details.
    #[must_use]
    pub const fn new(error: SyncError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with colours.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Converts any error into an [`ErrorContext`] suitable for terminal output.
///
/// Known [`SyncError`] variants get tailored suggestions. Anything else is
/// reported with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(sync_error) = error.downcast_ref::<SyncError>() {
        return create_error_context(sync_error.clone());
    }

    for cause in error.chain() {
        if let Some(sync_error) = cause.downcast_ref::<SyncError>() {
            return create_error_context(sync_error.clone());
        }
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        if io_error.kind() == std::io::ErrorKind::PermissionDenied {
            return ErrorContext::new(SyncError::Io {
                operation: "file access".to_string(),
                reason: io_error.to_string(),
            })
            .with_suggestion("Check that the catalog directory is writable by the current user");
        }
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(SyncError::Other {
        message,
    })
}

fn create_error_context(error: SyncError) -> ErrorContext {
    match &error {
        SyncError::CuratedListNotFound {
            path,
        } => ErrorContext::new(error.clone())
            .with_suggestion(format!("Create {path} containing a JSON array of tracked apps"))
            .with_details("Each entry needs at least \"name\" and \"github_repo\""),
        SyncError::CuratedListParse {
            reason,
            ..
        } => ErrorContext::new(error.clone())
            .with_details(reason.clone())
            .with_suggestion("Fix the JSON syntax; the catalog was left untouched"),
        SyncError::CatalogWrite {
            reason,
            ..
        } => ErrorContext::new(error.clone())
            .with_details(reason.clone())
            .with_suggestion("Check disk space and directory permissions; the previous catalog is intact"),
        SyncError::ConfigParse {
            reason,
            ..
        } => ErrorContext::new(error.clone())
            .with_details(reason.clone())
            .with_suggestion("Check the TOML syntax in altsync.toml"),
        SyncError::NoCatalogs => ErrorContext::new(error).with_suggestion(
            "Add a [[catalogs]] table to altsync.toml or pass --apps and --output",
        ),
        _ => ErrorContext::new(error),
    }
}
