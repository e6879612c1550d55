//! Errors surfaced at the chain query boundary.

use thiserror::Error;

use crate::entities::OutPoint;

/// Failure reported by the chain query service.
///
/// The admission core treats the chain view as authoritative: it never
/// retries these on its own and surfaces them as a chain-mismatch verdict.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// The referenced output does not exist in the active chain view.
    #[error("unknown output {txid}:{index}", txid = hex::encode(&.0.txid[..4]), index = .0.index)]
    UnknownOutput(OutPoint),

    /// The chain reorganized while the query was in flight.
    #[error("chain reorganized during query")]
    Reorganized,

    /// The backing store rejected the operation.
    #[error("chain store error: {0}")]
    Store(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_output_display() {
        let err = ChainError::UnknownOutput(OutPoint::new([0xAB; 32], 7));
        let msg = err.to_string();
        assert!(msg.contains("abababab"));
        assert!(msg.contains('7'));
    }

    #[test]
    fn test_store_error_display() {
        let err = ChainError::Store("disk failure".into());
        assert!(err.to_string().contains("disk failure"));
    }
}
