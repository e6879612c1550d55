//! In-memory chain view, for tests and standalone operation.

use crate::ports::ChainQuery;
use chain_types::{Amount, ChainError, OutPoint, Transaction};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Chain state backing one `InMemoryChain`.
struct ChainState {
    /// Known outputs: value plus spent flag.
    outputs: HashMap<OutPoint, (Amount, bool)>,
    /// Transactions appended after admission, in order.
    appended: Vec<Arc<Transaction>>,
    height: u64,
}

/// `ChainQuery` backed by a hash map of funded outputs.
pub struct InMemoryChain {
    state: RwLock<ChainState>,
}

impl InMemoryChain {
    /// Creates a chain view at the given height with no known outputs.
    pub fn new(height: u64) -> Self {
        Self {
            state: RwLock::new(ChainState {
                outputs: HashMap::new(),
                appended: Vec::new(),
                height,
            }),
        }
    }

    /// Registers an unspent output with the given value.
    pub fn fund(&self, outpoint: OutPoint, value: Amount) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.outputs.insert(outpoint, (value, false));
    }

    /// Marks a known output as spent.
    pub fn mark_spent(&self, outpoint: OutPoint) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = state.outputs.get_mut(&outpoint) {
            entry.1 = true;
        }
    }

    /// Advances the reported chain height.
    pub fn set_height(&self, height: u64) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.height = height;
    }

    /// Transactions recorded by `append_transaction`, in call order.
    pub fn appended(&self) -> Vec<Arc<Transaction>> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        state.appended.clone()
    }
}

impl ChainQuery for InMemoryChain {
    fn is_output_unspent(&self, outpoint: &OutPoint) -> Result<bool, ChainError> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        match state.outputs.get(outpoint) {
            Some((_, spent)) => Ok(!spent),
            None => Err(ChainError::UnknownOutput(*outpoint)),
        }
    }

    fn output_value(&self, outpoint: &OutPoint) -> Result<Amount, ChainError> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        match state.outputs.get(outpoint) {
            Some((value, _)) => Ok(*value),
            None => Err(ChainError::UnknownOutput(*outpoint)),
        }
    }

    fn current_height(&self) -> u64 {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        state.height
    }

    fn append_transaction(&self, tx: Arc<Transaction>) -> Result<(), ChainError> {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.appended.push(tx);
        Ok(())
    }
}
