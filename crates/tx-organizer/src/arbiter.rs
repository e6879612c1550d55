//! Two-class prioritized arbiter over the pool's protected region.
//!
//! Commit sections run at [`Priority::Low`]; reorganization handling runs at
//! [`Priority::High`]. A high-class acquirer waits for at most the one
//! low-class section already in progress, never behind the queue of pending
//! low-class work.
//!
//! The scheme uses two FIFO mutexes. Low-class acquisition takes the `wait`
//! gate first and holds it for the whole section, so at most one low-class
//! task ever queues on `access`. High-class acquisition goes straight to
//! `access`, where tokio's FIFO ordering places it ahead of all gated
//! low-class tasks.

use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Acquisition class for the protected region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    /// Structural operations: reorganization handling.
    High,
    /// Per-transaction commit sections.
    Low,
}

/// Mutual exclusion with two acquisition classes.
#[derive(Debug, Clone)]
pub struct PrioritizedMutex {
    wait: Arc<Mutex<()>>,
    access: Arc<Mutex<()>>,
}

/// Guard over the protected region. Dropping it releases the region and,
/// for low-class holders, readmits the next gated low-class task.
#[derive(Debug)]
pub struct PriorityGuard {
    _access: OwnedMutexGuard<()>,
    _wait: Option<OwnedMutexGuard<()>>,
}

impl PrioritizedMutex {
    /// Creates an unlocked arbiter.
    pub fn new() -> Self {
        Self {
            wait: Arc::new(Mutex::new(())),
            access: Arc::new(Mutex::new(())),
        }
    }

    /// Acquires the protected region at the given class.
    ///
    /// Low-class holders keep the `wait` gate for their whole section.
    pub async fn acquire(&self, priority: Priority) -> PriorityGuard {
        match priority {
            Priority::High => PriorityGuard {
                _access: self.access.clone().lock_owned().await,
                _wait: None,
            },
            Priority::Low => {
                let wait = self.wait.clone().lock_owned().await;
                PriorityGuard {
                    _access: self.access.clone().lock_owned().await,
                    _wait: Some(wait),
                }
            }
        }
    }
}

impl Default for PrioritizedMutex {
    fn default() -> Self {
        Self::new()
    }
}
