//! Adapters layer for the admission core.
//!
//! Outcome delivery to consumers and an in-memory chain view for tests and
//! single-process deployments.

pub mod bus;
pub mod chain;
pub mod notifier;

pub use bus::{AdmissionEvent, AdmissionEventBus};
pub use chain::InMemoryChain;
pub use notifier::{AdmissionNotifier, HandlerDecision, OutcomeHandler};
