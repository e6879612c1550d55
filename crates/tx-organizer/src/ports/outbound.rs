//! Outbound (driven) ports for the admission core.
//!
//! Dependencies on external systems: the chain query service, an optional
//! mining-side observer, and a time source abstracted for deterministic
//! tests.

use crate::domain::{PoolEntry, Timestamp};
use chain_types::{Amount, ChainError, OutPoint, Transaction};
use std::sync::Arc;

/// Read view of the active chain plus the append operation for accepted
/// transactions.
///
/// The core treats this as authoritative: it never retries failures on its
/// own and surfaces them as chain-mismatch verdicts.
pub trait ChainQuery: Send + Sync {
    /// Returns true if the outpoint exists and is unspent in the active
    /// chain view.
    fn is_output_unspent(&self, outpoint: &OutPoint) -> Result<bool, ChainError>;

    /// Value of the referenced output, for fee computation.
    fn output_value(&self, outpoint: &OutPoint) -> Result<Amount, ChainError>;

    /// Current chain height.
    fn current_height(&self) -> u64;

    /// Informs chain-visible state of an admitted transaction, for
    /// consumers that track pending transactions.
    fn append_transaction(&self, tx: Arc<Transaction>) -> Result<(), ChainError>;
}

/// Optional mining-side collaborator, injected at construction.
///
/// Replaces a compile-time template-subsystem toggle: the organizer holds
/// `Option<Arc<dyn MiningObserver>>` and its core logic never branches on
/// build configuration.
pub trait MiningObserver: Send + Sync {
    /// Called with every committed pool entry.
    fn transaction_admitted(&self, entry: &PoolEntry);
}

/// Time source for consistent timestamp handling.
///
/// Abstracted to allow testing with deterministic time.
pub trait TimeSource: Send + Sync {
    /// Returns the current timestamp in milliseconds.
    fn now(&self) -> Timestamp;
}

/// Default system time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }
}

/// Mock time source for testing.
pub struct MockTimeSource {
    time: std::sync::atomic::AtomicU64,
}

impl MockTimeSource {
    /// Creates a mock clock starting at `initial` milliseconds.
    pub fn new(initial: Timestamp) -> Self {
        Self {
            time: std::sync::atomic::AtomicU64::new(initial),
        }
    }

    /// Advances the clock.
    pub fn advance(&self, ms: u64) {
        self.time.fetch_add(ms, std::sync::atomic::Ordering::SeqCst);
    }
}

impl TimeSource for MockTimeSource {
    fn now(&self) -> Timestamp {
        self.time.load(std::sync::atomic::Ordering::SeqCst)
    }
}
