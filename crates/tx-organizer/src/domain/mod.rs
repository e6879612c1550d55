//! # Domain Layer - Admission Core
//!
//! Pure business logic: no I/O, no locking, no async.
//!
//! ## Components
//!
//! - `entities`: PoolEntry and timestamps
//! - `pool`: CandidatePool with outpoint conflict index and fee ranking
//! - `validation`: the check / accept / connect stages and fee pricing
//! - `value_objects`: RankedEntry, PoolStatus, BlockTemplate
//! - `verdict`: Verdict and the closed RejectReason taxonomy

pub mod entities;
pub mod pool;
pub mod validation;
pub mod value_objects;
pub mod verdict;

pub use entities::*;
pub use pool::*;
pub use validation::*;
pub use value_objects::*;
pub use verdict::*;
