//! Cross-module integration tests.

pub mod admission_flows;
pub mod concurrency;
