//! # Core Domain Entities
//!
//! Transactions and their building blocks for a UTXO chain.
//!
//! A `Transaction` is content-addressed by `hash()` and immutable after
//! construction. The admission core shares transactions as
//! `Arc<Transaction>`; the value's lifetime ends only when no pool entry,
//! in-flight validation, or subscriber callback still references it.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// A 32-byte hash (SHA-256).
pub type Hash = [u8; 32];

/// A currency amount in base units.
pub type Amount = u64;

/// Renders the first four bytes of a hash for log output.
pub fn short_hash(hash: &Hash) -> String {
    hex::encode(&hash[..4])
}

/// A reference to a specific output of a previous transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OutPoint {
    /// Hash of the transaction holding the referenced output.
    pub txid: Hash,
    /// Index of the output within that transaction.
    pub index: u32,
}

impl OutPoint {
    /// Creates a new outpoint.
    pub fn new(txid: Hash, index: u32) -> Self {
        Self { txid, index }
    }

    /// The conventional null outpoint used by coinbase inputs.
    pub fn null() -> Self {
        Self {
            txid: [0u8; 32],
            index: u32::MAX,
        }
    }

    /// Returns true if this is the coinbase null reference.
    pub fn is_null(&self) -> bool {
        self.index == u32::MAX && self.txid == [0u8; 32]
    }
}

/// A transaction input spending a previous output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInput {
    /// The output being spent.
    pub previous_output: OutPoint,
    /// Unlocking script satisfying the previous output's conditions.
    pub script_sig: Vec<u8>,
    /// Relative lock / replacement signaling field.
    pub sequence: u32,
}

impl TxInput {
    /// Creates an input spending the given outpoint with an empty script.
    pub fn spending(previous_output: OutPoint) -> Self {
        Self {
            previous_output,
            script_sig: Vec::new(),
            sequence: u32::MAX,
        }
    }
}

/// A transaction output locking an amount behind a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    /// Value in base currency units.
    pub value: Amount,
    /// Locking script.
    pub script_pubkey: Vec<u8>,
}

impl TxOutput {
    /// Creates an output paying `value` to the given script.
    pub fn new(value: Amount, script_pubkey: Vec<u8>) -> Self {
        Self {
            value,
            script_pubkey,
        }
    }
}

/// An immutable, content-addressed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction format version.
    pub version: u32,
    /// Inputs spending previous outputs.
    pub inputs: Vec<TxInput>,
    /// Newly created outputs.
    pub outputs: Vec<TxOutput>,
    /// Earliest block height or time at which the transaction is final.
    pub lock_time: u32,
}

impl Transaction {
    /// Computes the transaction identity: SHA-256 over a canonical
    /// field-by-field serialization.
    pub fn hash(&self) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(self.version.to_le_bytes());
        hasher.update((self.inputs.len() as u64).to_le_bytes());
        for input in &self.inputs {
            hasher.update(input.previous_output.txid);
            hasher.update(input.previous_output.index.to_le_bytes());
            hasher.update((input.script_sig.len() as u64).to_le_bytes());
            hasher.update(&input.script_sig);
            hasher.update(input.sequence.to_le_bytes());
        }
        hasher.update((self.outputs.len() as u64).to_le_bytes());
        for output in &self.outputs {
            hasher.update(output.value.to_le_bytes());
            hasher.update((output.script_pubkey.len() as u64).to_le_bytes());
            hasher.update(&output.script_pubkey);
        }
        hasher.update(self.lock_time.to_le_bytes());
        hasher.finalize().into()
    }

    /// Serialized size in bytes, used for per-byte fee policy.
    ///
    /// Returns 0 only if serialization fails, which the check stage treats
    /// as malformed.
    pub fn serialized_size(&self) -> usize {
        bincode::serialized_size(self).unwrap_or(0) as usize
    }

    /// Sum of all output values, saturating on overflow.
    pub fn total_output_value(&self) -> Amount {
        self.outputs
            .iter()
            .fold(0u64, |acc, out| acc.saturating_add(out.value))
    }

    /// Returns true if this is a coinbase transaction (single null input).
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].previous_output.is_null()
    }

    /// Returns true if two inputs reference the same previous output.
    pub fn has_duplicate_inputs(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.inputs.len());
        self.inputs
            .iter()
            .any(|input| !seen.insert(input.previous_output))
    }

    /// Counts signature operations across all scripts.
    ///
    /// Opcode-level parsing belongs to the consensus library; the admission
    /// core only needs an upper bound for the sigop fee floor, so each
    /// script counts as at most one operation per 64 script bytes.
    pub fn signature_operations(&self) -> usize {
        let script_bytes: usize = self
            .inputs
            .iter()
            .map(|i| i.script_sig.len())
            .chain(self.outputs.iter().map(|o| o.script_pubkey.len()))
            .sum();
        script_bytes.div_ceil(64)
    }
}
