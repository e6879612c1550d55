//! Admission verdicts.
//!
//! A `Verdict` is the tagged result of one pipeline stage. Verdicts are
//! terminal for a given attempt: once rejected, the pipeline does not
//! continue to later stages.

use chain_types::{ChainError, Hash};
use thiserror::Error;

/// Closed set of admission failure categories.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    /// Structural check-stage failure. Never retried.
    #[error("malformed transaction: {detail}")]
    Malformed {
        /// What the check stage objected to.
        detail: String,
    },

    /// Accept-stage policy failure (fee too low, non-standard, oversized).
    /// The caller may resubmit with a different fee in a later relay.
    #[error("policy violation: {detail}")]
    PolicyViolation {
        /// Which policy was violated.
        detail: String,
    },

    /// Double-spend against the pool, or a duplicate submission.
    #[error("conflicts with {} pool transaction(s)", conflicting.len())]
    Conflict {
        /// Pool entries occupying the contested inputs (or the duplicate
        /// identity itself).
        conflicting: Vec<Hash>,
    },

    /// Script or consensus evaluation failed for one of the inputs.
    #[error("script failure: {detail}")]
    ScriptFailure {
        /// What the evaluator objected to.
        detail: String,
    },

    /// Connect-stage failure due to chain state (missing input, chain
    /// reorganized mid-flight). The caller may retry once chain state
    /// stabilizes; the core itself never does.
    #[error("chain mismatch: {detail}")]
    ChainMismatch {
        /// The chain-state discrepancy observed.
        detail: String,
    },

    /// The organizer is not started or is shutting down.
    #[error("admission service stopped")]
    ServiceStopped,

    /// Unexpected evaluator or dispatch failure. Logged, surfaced, and
    /// non-fatal to the organizer itself.
    #[error("internal failure: {detail}")]
    Internal {
        /// Diagnostic detail.
        detail: String,
    },
}

impl RejectReason {
    /// Shorthand for structural failures.
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::Malformed {
            detail: detail.into(),
        }
    }

    /// Shorthand for policy failures.
    pub fn policy(detail: impl Into<String>) -> Self {
        Self::PolicyViolation {
            detail: detail.into(),
        }
    }

    /// Shorthand for chain-state failures.
    pub fn chain(detail: impl Into<String>) -> Self {
        Self::ChainMismatch {
            detail: detail.into(),
        }
    }

    /// Shorthand for internal failures.
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }
}

impl From<ChainError> for RejectReason {
    fn from(err: ChainError) -> Self {
        Self::ChainMismatch {
            detail: err.to_string(),
        }
    }
}

/// Tagged result of one pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The stage passed; the pipeline may advance.
    Passed,
    /// The stage rejected the transaction; the attempt is discarded.
    Rejected(RejectReason),
}

impl Verdict {
    /// Returns true if the stage passed.
    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// The rejection reason, if any.
    pub fn reason(&self) -> Option<&RejectReason> {
        match self {
            Self::Passed => None,
            Self::Rejected(reason) => Some(reason),
        }
    }
}

impl From<RejectReason> for Verdict {
    fn from(reason: RejectReason) -> Self {
        Self::Rejected(reason)
    }
}

impl From<Result<(), RejectReason>> for Verdict {
    fn from(result: Result<(), RejectReason>) -> Self {
        match result {
            Ok(()) => Self::Passed,
            Err(reason) => Self::Rejected(reason),
        }
    }
}
