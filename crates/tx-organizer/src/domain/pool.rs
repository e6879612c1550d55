//! # Candidate Pool - Conflict Index and Fee Ranking
//!
//! Bounded collection of admitted-but-unconfirmed transactions.
//!
//! ## Data Structures
//!
//! - `by_hash`: O(1) lookup by transaction hash
//! - `by_priority`: O(log n) fee-density ranking (BTreeSet)
//! - `by_outpoint`: O(1) conflict lookup by consumed input
//!
//! ## Invariants Enforced
//!
//! - No duplicate hashes (checked in `insert()`)
//! - Each consumed outpoint maps to at most one occupying entry; a second
//!   claimant is rejected as a conflict, never silently overwritten
//! - The pool never exceeds its configured capacity; eviction happens at
//!   insert time, lowest score first, oldest first among ties

use super::entities::{PoolEntry, Timestamp};
use super::value_objects::{BlockTemplate, PoolStatus, RankedEntry};
use super::verdict::RejectReason;
use chain_types::{Hash, OutPoint, Transaction};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::debug;

/// Bounded, indexed pool of candidate transactions.
///
/// The pool itself is single-threaded; the organizer serializes mutation
/// through the prioritized arbiter. `insert` is the single serialization
/// point that makes concurrent admissions safe.
#[derive(Debug, Default)]
pub struct CandidatePool {
    /// Maximum number of entries.
    capacity: usize,

    /// All entries indexed by hash.
    by_hash: HashMap<Hash, PoolEntry>,

    /// Entries ordered by priority score (best first).
    by_priority: BTreeSet<RankedEntry>,

    /// Consumed input -> occupying entry.
    by_outpoint: HashMap<OutPoint, Hash>,

    /// Next admission sequence number.
    next_sequence: u64,
}

impl CandidatePool {
    /// Creates an empty pool with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            by_hash: HashMap::new(),
            by_priority: BTreeSet::new(),
            by_outpoint: HashMap::new(),
            next_sequence: 0,
        }
    }

    /// Number of entries in the pool.
    pub fn len(&self) -> usize {
        self.by_hash.len()
    }

    /// Returns true if the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.by_hash.is_empty()
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Gets an entry by hash.
    pub fn get(&self, hash: &Hash) -> Option<&PoolEntry> {
        self.by_hash.get(hash)
    }

    /// Checks if a transaction identity is present.
    pub fn contains(&self, hash: &Hash) -> bool {
        self.by_hash.contains_key(hash)
    }

    /// The entry currently claiming an outpoint, if any.
    pub fn spends(&self, outpoint: &OutPoint) -> Option<Hash> {
        self.by_outpoint.get(outpoint).copied()
    }

    /// Lowest priority score currently in the pool.
    pub fn min_score(&self) -> Option<u64> {
        self.by_priority.iter().next_back().map(|r| r.score)
    }

    /// Pool entries whose inputs clash with the given transaction.
    ///
    /// Read-only; used by the accept stage pre-check and the final connect
    /// re-validation.
    pub fn conflicts_of(&self, tx: &Transaction) -> Vec<Hash> {
        let mut conflicting: Vec<Hash> = tx
            .inputs
            .iter()
            .filter_map(|input| self.by_outpoint.get(&input.previous_output).copied())
            .collect();
        conflicting.sort_unstable();
        conflicting.dedup();
        conflicting
    }

    /// Atomic check-and-insert against the input-key index.
    ///
    /// Rejects a duplicate identity or any input already claimed by a
    /// different entry as `Conflict`. At capacity, evicts the
    /// lowest-priority entry unless the incoming entry scores below the
    /// current minimum, in which case the insert itself is rejected as a
    /// policy violation and the pool is unchanged.
    ///
    /// On success the entry receives the next admission sequence number.
    pub fn insert(&mut self, mut entry: PoolEntry) -> Result<Hash, RejectReason> {
        if self.by_hash.contains_key(&entry.hash) {
            return Err(RejectReason::Conflict {
                conflicting: vec![entry.hash],
            });
        }

        let conflicting = self.conflicts_of(&entry.transaction);
        if !conflicting.is_empty() {
            return Err(RejectReason::Conflict { conflicting });
        }

        let score = RankedEntry::score_of(entry.fee, entry.size);
        if self.by_hash.len() >= self.capacity {
            match self.min_score() {
                Some(min) if score < min => {
                    return Err(RejectReason::policy(format!(
                        "fee density {score} below pool minimum {min}"
                    )));
                }
                Some(_) => {
                    self.evict_lowest();
                }
                // Capacity zero: nothing to evict, nothing fits.
                None => {
                    return Err(RejectReason::policy("pool capacity is zero"));
                }
            }
        }

        entry.sequence = self.next_sequence;
        self.next_sequence += 1;

        self.by_priority
            .insert(RankedEntry::new(score, entry.sequence, entry.hash));
        for input in &entry.transaction.inputs {
            self.by_outpoint.insert(input.previous_output, entry.hash);
        }
        let hash = entry.hash;
        self.by_hash.insert(hash, entry);

        Ok(hash)
    }

    /// Removes an entry, clearing all three indices.
    pub fn remove(&mut self, hash: &Hash) -> Option<PoolEntry> {
        let entry = self.by_hash.remove(hash)?;

        let score = RankedEntry::score_of(entry.fee, entry.size);
        self.by_priority
            .remove(&RankedEntry::new(score, entry.sequence, entry.hash));
        for input in &entry.transaction.inputs {
            self.by_outpoint.remove(&input.previous_output);
        }

        Some(entry)
    }

    /// Removes every entry claiming an outpoint the given transaction
    /// spends.
    ///
    /// Used when a newly connected block consumes inputs that pool entries
    /// were also claiming.
    pub fn remove_spent_by(&mut self, tx: &Transaction) -> Vec<PoolEntry> {
        let victims = self.conflicts_of(tx);
        victims
            .iter()
            .filter_map(|hash| self.remove(hash))
            .collect()
    }

    /// Evicts the lowest-priority entry (oldest first among ties).
    fn evict_lowest(&mut self) -> Option<PoolEntry> {
        let victim = self.by_priority.iter().next_back().copied()?;
        let entry = self.remove(&victim.hash);
        if let Some(ref e) = entry {
            debug!(
                tx = %chain_types::short_hash(&e.hash),
                score = victim.score,
                "evicted lowest-priority pool entry"
            );
        }
        entry
    }

    /// Fee-priority-ordered snapshot for block-template construction.
    ///
    /// Greedy by fee density until `max_size` bytes are consumed. Does not
    /// mutate the pool.
    pub fn template(&self, max_size: usize) -> BlockTemplate {
        let mut template = BlockTemplate::default();

        for ranked in &self.by_priority {
            let Some(entry) = self.by_hash.get(&ranked.hash) else {
                continue;
            };
            if template.total_size + entry.size > max_size {
                continue;
            }
            template.total_size += entry.size;
            template.total_fees = template.total_fees.saturating_add(entry.fee);
            template.transactions.push(Arc::clone(&entry.transaction));
        }

        template
    }

    /// Up to `max_count` transaction identities, highest priority first.
    pub fn ranked_hashes(&self, max_count: usize) -> Vec<Hash> {
        self.by_priority
            .iter()
            .take(max_count)
            .map(|r| r.hash)
            .collect()
    }

    /// Status snapshot.
    pub fn status(&self, now: Timestamp) -> PoolStatus {
        let oldest_age = self
            .by_hash
            .values()
            .map(|e| now.saturating_sub(e.added_at))
            .max()
            .unwrap_or(0);

        PoolStatus {
            entry_count: self.by_hash.len(),
            total_size_bytes: self.by_hash.values().map(|e| e.size).sum(),
            total_fees: self
                .by_hash
                .values()
                .fold(0u64, |acc, e| acc.saturating_add(e.fee)),
            min_score: self.min_score(),
            oldest_entry_age_ms: oldest_age,
        }
    }
}
