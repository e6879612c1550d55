//! # Chain Types Crate
//!
//! Domain primitives shared between the transaction admission core and its
//! collaborators (chain query service, relay, template builders).
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: all cross-crate transaction types live here.
//! - **Immutability**: a `Transaction` is never mutated after construction;
//!   it is shared by reference (`Arc`) across the pool, the validator, and
//!   pending notification handlers.
//! - **Content Addressing**: transaction identity is the SHA-256 of its
//!   canonical field serialization.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::ChainError;
