//! Broadcast event stream for admission outcomes.
//!
//! For consumers that want a stream instead of a callback (relay inventory,
//! wallet refresh). Uses `tokio::sync::broadcast` for multi-producer,
//! multi-consumer semantics; lagging receivers lose oldest events.

use chain_types::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Maximum events buffered per receiver before the oldest are dropped.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// One admission outcome, as broadcast to stream consumers.
#[derive(Clone, Debug, PartialEq)]
pub enum AdmissionEvent {
    /// A transaction entered the candidate pool.
    Admitted {
        /// Transaction identity.
        hash: Hash,
        /// Computed fee.
        fee: u64,
        /// Fee density score used for ranking.
        score: u64,
    },
    /// A transaction was rejected; `reason` is the display form of the
    /// verdict's rejection.
    Rejected {
        /// Transaction identity.
        hash: Hash,
        /// Human-readable rejection reason.
        reason: String,
    },
}

/// In-process broadcast bus for admission events.
pub struct AdmissionEventBus {
    sender: broadcast::Sender<AdmissionEvent>,
    events_published: AtomicU64,
    capacity: usize,
}

impl AdmissionEventBus {
    /// Creates a bus with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a bus with the given per-receiver capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Subscribes a new receiver. Only events published after this call are
    /// observed.
    pub fn subscribe(&self) -> broadcast::Receiver<AdmissionEvent> {
        self.sender.subscribe()
    }

    /// Publishes an event to all current receivers.
    ///
    /// Returns the number of receivers that got the event; zero (with a
    /// warning) when nobody is listening.
    pub fn publish(&self, event: AdmissionEvent) -> usize {
        self.events_published.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(event) {
            Ok(receiver_count) => {
                debug!(receivers = receiver_count, "admission event published");
                receiver_count
            }
            Err(e) => {
                warn!(error = %e, "admission event dropped (no receivers)");
                0
            }
        }
    }

    /// Number of active receivers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Total events published since construction.
    pub fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }

    /// Per-receiver buffer capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for AdmissionEventBus {
    fn default() -> Self {
        Self::new()
    }
}
