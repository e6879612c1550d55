//! Outcome notification fabric.
//!
//! Delivers exactly one `(Verdict, Transaction)` pair per admission event to
//! every registered handler, in registration order. A handler may request
//! self-removal during its own invocation; removal takes effect for
//! subsequent transactions.

use crate::domain::Verdict;
use chain_types::Transaction;
use std::sync::{Arc, Mutex};
use tracing::debug;
use uuid::Uuid;

/// What a handler wants done with its registration after a delivery.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandlerDecision {
    /// Remain subscribed for subsequent transactions.
    Keep,
    /// Drop this registration after the current fan-out.
    Unsubscribe,
}

/// A registered outcome consumer.
pub type OutcomeHandler =
    Box<dyn Fn(&Verdict, &Arc<Transaction>) -> HandlerDecision + Send + Sync>;

type SharedHandler = Arc<dyn Fn(&Verdict, &Arc<Transaction>) -> HandlerDecision + Send + Sync>;

/// Multi-consumer outcome publisher.
///
/// Each fan-out delivers to every handler registered at its start, exactly
/// once. The registry lock is not held across handler invocations, so a
/// handler may re-enter `subscribe`/`unsubscribe`; changes made during a
/// fan-out take effect for subsequent transactions.
#[derive(Default)]
pub struct AdmissionNotifier {
    handlers: Mutex<Vec<(Uuid, SharedHandler)>>,
}

impl AdmissionNotifier {
    /// Creates a notifier with no consumers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler; later registrations are notified later.
    pub fn subscribe(&self, handler: OutcomeHandler) -> Uuid {
        let id = Uuid::new_v4();
        if let Ok(mut handlers) = self.handlers.lock() {
            handlers.push((id, Arc::from(handler)));
            debug!(subscription = %id, total = handlers.len(), "outcome handler registered");
        }
        id
    }

    /// Removes one registration by handle.
    pub fn unsubscribe(&self, id: Uuid) {
        if let Ok(mut handlers) = self.handlers.lock() {
            handlers.retain(|(handle, _)| *handle != id);
        }
    }

    /// Drops every registration. Used at organizer shutdown.
    pub fn unsubscribe_all(&self) {
        if let Ok(mut handlers) = self.handlers.lock() {
            handlers.clear();
        }
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.lock().map(|h| h.len()).unwrap_or(0)
    }

    /// Returns true if no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Delivers one outcome to every registered handler in registration
    /// order, then clears the registrations that asked to unsubscribe.
    ///
    /// Fan-out runs over a snapshot of the registry, without the lock held.
    pub fn notify(&self, verdict: &Verdict, tx: &Arc<Transaction>) {
        let snapshot = match self.handlers.lock() {
            Ok(handlers) => handlers.clone(),
            Err(_) => return,
        };

        let mut dropped = Vec::new();
        for (id, handler) in &snapshot {
            if handler(verdict, tx) == HandlerDecision::Unsubscribe {
                dropped.push(*id);
            }
        }

        if !dropped.is_empty() {
            if let Ok(mut handlers) = self.handlers.lock() {
                handlers.retain(|(id, _)| !dropped.contains(id));
            }
        }
    }
}

impl std::fmt::Debug for AdmissionNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionNotifier")
            .field("handlers", &self.len())
            .finish()
    }
}
