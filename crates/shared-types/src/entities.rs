//! # Core Domain Entities
//!
//! Identifier aliases and the small value types shared by every stage of
//! event admission.
//!
//! ## Clusters
//!
//! - **Identity**: `EventId`, `ValidatorId`, `Address`
//! - **DAG clocks**: `Epoch`, `Seq`, `Frame`, `Lamport`, `Timestamp`
//! - **Throughput**: `GasPowerLeft`, track indices

use serde::{Deserialize, Serialize};

// Re-export U256 from primitive-types for use across all subsystems
pub use primitive_types::U256;

pub use shared_crypto::{Address, Hash};

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// Event identifier (keccak-256 of the signed event).
pub type EventId = Hash;

/// Validator identifier within an epoch.
pub type ValidatorId = u32;

/// Stake weight of a validator.
pub type Weight = u64;

/// Block height as seen by the block-formation protocol.
pub type BlockNumber = u64;

// =============================================================================
// CLUSTER B: DAG CLOCKS
// =============================================================================

/// Monotonic epoch number.
pub type Epoch = u32;

/// Per-creator sequence number (first event of an epoch has seq 1).
pub type Seq = u32;

/// aBFT frame number.
pub type Frame = u32;

/// Lamport logical time.
pub type Lamport = u32;

/// Proposal turn of the single-proposer protocol.
pub type Turn = u32;

/// Wall-clock time in nanoseconds since the Unix epoch.
pub type Timestamp = u64;

/// Nanoseconds per second.
pub const NANOS_PER_SEC: u64 = 1_000_000_000;

// =============================================================================
// CLUSTER C: GAS POWER
// =============================================================================

/// Index of the short-term (bursty) gas power track.
pub const SHORT_TERM_GAS: usize = 0;

/// Index of the long-term (sustained) gas power track.
pub const LONG_TERM_GAS: usize = 1;

/// Number of gas power tracks.
pub const GAS_POWER_CONFIGS: usize = 2;

/// Gas power left after an event, one value per track.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GasPowerLeft {
    /// Remaining gas power indexed by track.
    pub gas: [u64; GAS_POWER_CONFIGS],
}

impl GasPowerLeft {
    /// Create from explicit track values.
    pub fn new(short_term: u64, long_term: u64) -> Self {
        Self {
            gas: [short_term, long_term],
        }
    }

    /// Smallest value across tracks.
    pub fn min(&self) -> u64 {
        self.gas.iter().copied().min().unwrap_or(0)
    }

    /// Largest value across tracks.
    pub fn max(&self) -> u64 {
        self.gas.iter().copied().max().unwrap_or(0)
    }

    /// Subtract `used` from every track, flooring at zero.
    pub fn saturating_sub(&self, used: u64) -> Self {
        let mut gas = self.gas;
        for value in &mut gas {
            *value = value.saturating_sub(used);
        }
        Self { gas }
    }
}
