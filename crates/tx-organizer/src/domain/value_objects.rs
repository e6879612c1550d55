//! Value objects for the admission domain.
//!
//! Immutable types used for ordering, ranking, and reporting.

use super::entities::Timestamp;
use chain_types::{Amount, Hash, Transaction};
use std::cmp::Ordering;
use std::sync::Arc;

/// A pool entry reference with its priority score, for the ranking index.
///
/// Implements `Ord` such that a higher score ranks first. Ties rank the
/// newer entry (higher sequence) first, which keeps the pool favoring
/// recently-relayed transactions and puts the oldest of a tied score at the
/// back of the ordering, where eviction takes it first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RankedEntry {
    /// Priority score (fee per kilobyte).
    pub score: u64,
    /// Admission sequence number (unique, monotonically increasing).
    pub sequence: u64,
    /// Transaction identity.
    pub hash: Hash,
}

impl RankedEntry {
    /// Creates a ranking reference for an entry.
    pub fn new(score: u64, sequence: u64, hash: Hash) -> Self {
        Self {
            score,
            sequence,
            hash,
        }
    }

    /// The priority scoring formula: fee density in units per kilobyte.
    ///
    /// Confined here so the ranking policy stays pluggable without touching
    /// the pool indices.
    pub fn score_of(fee: Amount, size: usize) -> u64 {
        fee.saturating_mul(1000) / size.max(1) as u64
    }
}

impl Ord for RankedEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Higher score = higher priority (so reverse comparison).
        other
            .score
            .cmp(&self.score)
            // Newer entry ranks first among equal scores; the oldest of a
            // tie sits at the back and is evicted first.
            .then_with(|| other.sequence.cmp(&self.sequence))
            // Hash last, so `cmp` agreeing with `Eq` keeps ordered
            // collections from conflating distinct entries.
            .then_with(|| self.hash.cmp(&other.hash))
    }
}

impl PartialOrd for RankedEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Candidate pool status snapshot.
#[derive(Clone, Debug, Default)]
pub struct PoolStatus {
    /// Number of entries in the pool.
    pub entry_count: usize,
    /// Total serialized size of all entries in bytes.
    pub total_size_bytes: usize,
    /// Total fees across all entries.
    pub total_fees: Amount,
    /// Lowest priority score currently in the pool.
    pub min_score: Option<u64>,
    /// Age of the oldest entry in milliseconds.
    pub oldest_entry_age_ms: Timestamp,
}

/// A read-only, fee-priority-ordered snapshot of eligible pool entries for
/// block-template construction.
///
/// Snapshot consistency is point-in-time; there is no atomicity guarantee
/// across calls.
#[derive(Clone, Debug, Default)]
pub struct BlockTemplate {
    /// Transactions in priority order, highest fee density first.
    pub transactions: Vec<Arc<Transaction>>,
    /// Total fees captured by the template.
    pub total_fees: Amount,
    /// Total serialized size of the template in bytes.
    pub total_size: usize,
}
