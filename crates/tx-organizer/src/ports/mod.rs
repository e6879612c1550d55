//! Ports layer for the admission core.
//!
//! Outbound (driven) ports only: the organizer in `service.rs` is itself the
//! driving surface callers use, so no inbound trait is needed.

pub mod outbound;

pub use outbound::*;
