//! # Transaction Admission Core
//!
//! Receives individually-relayed, unconfirmed transactions, validates each
//! against current chain state and node policy, admits valid transactions
//! into a bounded in-memory candidate pool, and publishes admission outcomes
//! to interested consumers (template builders, network relay, wallet
//! notification).
//!
//! ## Admission Pipeline
//!
//! ```text
//! [CHECK] ──passed──→ [ACCEPT] ──passed──→ [CONNECT] ──passed──→ [COMMIT]
//!    │                    │                    │                    │
//!    └── rejected ────────┴────────────────────┴──── rejected ──────┘
//!                                ↓
//!                         Failed(reason)
//! ```
//!
//! `Check`, `Accept`, and `Connect` run unprotected against immutable
//! chain/pool snapshots. `Commit` alone mutates the pool and runs inside the
//! prioritized arbiter's protected region, with a fresh conflict check
//! atomic with insertion.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | No double-spend between pool entries | `domain/pool.rs` - outpoint index in `insert()` |
//! | Pool never exceeds capacity | `domain/pool.rs` - eviction inside `insert()` |
//! | At most one successful commit per identity | `domain/pool.rs` - unique hash key |
//! | Reorganization outranks admission | `arbiter.rs` - two-class prioritized mutex |
//! | Exactly one outcome per submission | `service.rs` - oneshot completion per job |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      OUTER LAYER                                │
//! │  adapters/ - outcome notifier and broadcast event bus           │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MIDDLE LAYER                               │
//! │  ports/outbound.rs - ChainQuery, MiningObserver, TimeSource     │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      INNER LAYER                                │
//! │  domain/entities.rs      - PoolEntry                            │
//! │  domain/pool.rs          - CandidatePool with priority index    │
//! │  domain/validation.rs    - check / accept / connect stages      │
//! │  domain/verdict.rs       - Verdict, RejectReason                │
//! │  domain/value_objects.rs - RankedEntry, PoolStatus, templates   │
//! │  arbiter.rs              - PrioritizedMutex                     │
//! │  service.rs              - TransactionOrganizer                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod adapters;
pub mod arbiter;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{AdmissionEvent, AdmissionEventBus, AdmissionNotifier, HandlerDecision};
pub use arbiter::{PrioritizedMutex, Priority};
pub use config::{AdmissionConfig, RuleFlags};
pub use domain::*;
pub use service::TransactionOrganizer;
