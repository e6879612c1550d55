//! # Transaction Admission Test Suite
//!
//! Unified test crate for cross-module behavior:
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── admission_flows.rs   # End-to-end pipeline behavior
//!     └── concurrency.rs       # Races, arbitration, shutdown
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p admission-tests
//! cargo test -p admission-tests integration::
//! ```

#![allow(dead_code)]

pub mod integration;

use std::sync::Once;

static TRACING: Once = Once::new();

/// Installs the test log subscriber once per process. Controlled with
/// `RUST_LOG`, silent by default.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
