//! Core entities of the admission domain.

use chain_types::{Amount, Hash, Transaction};
use std::sync::Arc;

/// Timestamp in milliseconds since UNIX epoch.
pub type Timestamp = u64;

/// An admitted transaction with pool metadata.
///
/// The transaction itself is shared by reference across the pool, the
/// validator, and pending notification handlers; only the derived metadata
/// lives here.
#[derive(Clone, Debug)]
pub struct PoolEntry {
    /// The admitted transaction.
    pub transaction: Arc<Transaction>,
    /// Transaction identity.
    pub hash: Hash,
    /// Computed fee: input value minus output value.
    pub fee: Amount,
    /// Serialized size in bytes.
    pub size: usize,
    /// Monotonically increasing admission sequence number, assigned by the
    /// pool at insert. Older entries have lower numbers.
    pub sequence: u64,
    /// Priority score: fee density in currency units per byte.
    pub fee_rate: f64,
    /// Timestamp when added to the pool (ms).
    pub added_at: Timestamp,
}

impl PoolEntry {
    /// Derives pool metadata for a transaction with a known fee.
    ///
    /// The sequence number is provisional; the pool assigns the real one
    /// at insert.
    pub fn new(transaction: Arc<Transaction>, fee: Amount, added_at: Timestamp) -> Self {
        let hash = transaction.hash();
        let size = transaction.serialized_size().max(1);
        let fee_rate = fee as f64 / size as f64;

        Self {
            transaction,
            hash,
            fee,
            size,
            sequence: 0,
            fee_rate,
            added_at,
        }
    }
}
