//! Integration test suite for altsync
//!
//! End-to-end tests that drive the public API against an in-memory upstream and
//! run the compiled binary. No test touches the network.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **sync_flow**: Multi-app, multi-catalog reconciliation through the library API
//! - **cli**: Exit codes and error reporting of the `altsync` binary

mod cli;
mod sync_flow;
