//! Configuration for the admission core.
//!
//! Read once at construction and immutable for the organizer's lifetime.

use serde::Deserialize;

/// Activation flags for protocol-upgrade rules.
///
/// Each gate is combined into an effective rule-set bitmask handed to the
/// script evaluator.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct RuleFlags {
    /// Pay-to-script-hash evaluation.
    pub script_hash: bool,
    /// Strict signature encoding.
    pub strict_encoding: bool,
    /// Absolute lock-time enforcement.
    pub check_locktime: bool,
    /// Relative lock-time (sequence) enforcement.
    pub check_sequence: bool,
    /// Median-time-past lock evaluation.
    pub median_time_past: bool,
}

/// Bit assigned to each rule in the combined mask.
pub mod rule_bits {
    pub const SCRIPT_HASH: u32 = 1 << 0;
    pub const STRICT_ENCODING: u32 = 1 << 1;
    pub const CHECK_LOCKTIME: u32 = 1 << 2;
    pub const CHECK_SEQUENCE: u32 = 1 << 3;
    pub const MEDIAN_TIME_PAST: u32 = 1 << 4;
}

impl RuleFlags {
    /// Combines the enabled gates into a rule-set bitmask.
    pub fn enabled(&self) -> u32 {
        let mut mask = 0;
        if self.script_hash {
            mask |= rule_bits::SCRIPT_HASH;
        }
        if self.strict_encoding {
            mask |= rule_bits::STRICT_ENCODING;
        }
        if self.check_locktime {
            mask |= rule_bits::CHECK_LOCKTIME;
        }
        if self.check_sequence {
            mask |= rule_bits::CHECK_SEQUENCE;
        }
        if self.median_time_past {
            mask |= rule_bits::MEDIAN_TIME_PAST;
        }
        mask
    }
}

impl Default for RuleFlags {
    fn default() -> Self {
        Self {
            script_hash: true,
            strict_encoding: true,
            check_locktime: true,
            check_sequence: true,
            median_time_past: true,
        }
    }
}

/// Runtime configuration for transaction admission.
#[derive(Clone, Debug, Deserialize)]
pub struct AdmissionConfig {
    /// Maximum entries in the candidate pool.
    pub max_pool_size: usize,

    /// Minimum relay fee rate in currency units per byte.
    pub min_relay_fee_rate: f32,

    /// Minimum fee per signature operation.
    pub min_sigop_fee_rate: f32,

    /// Maximum serialized transaction size accepted by the check stage.
    pub max_tx_size: usize,

    /// Maximum depth a reorganization may reach before manual intervention.
    pub max_block_reorg_depth: u32,

    /// Accept non-standard scripts.
    pub allow_nonstandard: bool,

    /// Use the external reference consensus evaluator instead of the
    /// built-in one.
    pub use_external_evaluator: bool,

    /// Worker tasks in the admission dispatch pool.
    pub workers: usize,

    /// Protocol-upgrade activation gates.
    pub rules: RuleFlags,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            max_pool_size: 5000,
            min_relay_fee_rate: 1.0,
            min_sigop_fee_rate: 100.0,
            max_tx_size: 100_000,
            max_block_reorg_depth: 256,
            allow_nonstandard: false,
            use_external_evaluator: false,
            workers: 4,
            rules: RuleFlags::default(),
        }
    }
}

impl AdmissionConfig {
    /// Creates a minimal config for testing.
    pub fn for_testing() -> Self {
        Self {
            max_pool_size: 100,
            workers: 2,
            ..Default::default()
        }
    }
}
