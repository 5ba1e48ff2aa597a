//! Per-epoch network rules
//!
//! Rules are published together with the validator set at every epoch
//! transition and never change within an epoch.

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use shared_types::{Timestamp, NANOS_PER_SEC};

/// Default per-event gas overhead.
pub const DEFAULT_EVENT_GAS: u64 = 28_000;

/// DAG shape limits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DagRules {
    /// Maximum number of parents.
    pub max_parents: u32,
    /// Parents that do not cost extra gas.
    pub max_free_parents: u32,
    /// Maximum extra data length in bytes.
    pub max_extra_data: u32,
}

/// Gas costs charged against gas power.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasRules {
    /// Maximum gas power one event may use.
    pub max_event_gas: u64,
    /// Fixed overhead per event.
    pub event_gas: u64,
    /// Cost of each parent above `max_free_parents`.
    pub parent_gas: u64,
    /// Cost per byte of extra data.
    pub extra_data_gas: u64,
    /// Cost of attaching a non-empty set of block votes.
    pub block_votes_base_gas: u64,
    /// Cost per block vote.
    pub block_vote_gas: u64,
}

/// Gas power allocation of one track.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasPowerRules {
    /// Network-wide allocation per second, shared by stake.
    pub alloc_per_sec: u64,
    /// Bucket capacity expressed as accrual time (nanoseconds).
    pub max_alloc_period: Timestamp,
    /// Startup grace expressed as accrual time (nanoseconds).
    pub startup_alloc_period: Timestamp,
    /// Startup grace floor.
    pub min_startup_gas: u64,
}

/// Economy rules.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomyRules {
    /// Minimum fee cap accepted in events.
    pub min_gas_price: U256,
    /// Gas costs.
    pub gas: GasRules,
    /// Short-term (bursty) gas power track.
    pub short_gas_power: GasPowerRules,
    /// Long-term (sustained) gas power track.
    pub long_gas_power: GasPowerRules,
}

/// Block formation limits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlocksRules {
    /// Maximum gas in one block.
    pub max_block_gas: u64,
}

/// Network upgrade switches.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upgrades {
    /// Access-list transactions.
    pub berlin: bool,
    /// Dynamic-fee transactions.
    pub london: bool,
    /// Set-code transactions and the Allegro intrinsic gas schedule.
    pub allegro: bool,
    /// Single-proposer block formation.
    pub single_proposer_block_formation: bool,
}

/// Intrinsic gas schedule selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Revision {
    /// Schedule before the Allegro upgrade.
    PreAllegro,
    /// Allegro schedule with init-code and authorization surcharges.
    Allegro,
}

/// Network rules of one epoch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rules {
    /// Network name.
    pub name: String,
    /// DAG limits.
    pub dag: DagRules,
    /// Economy.
    pub economy: EconomyRules,
    /// Blocks.
    pub blocks: BlocksRules,
    /// Upgrades.
    pub upgrades: Upgrades,
}

impl Rules {
    /// Intrinsic gas schedule in force.
    pub fn revision(&self) -> Revision {
        if self.upgrades.allegro {
            Revision::Allegro
        } else {
            Revision::PreAllegro
        }
    }

    /// Whether a transaction type byte is enabled.
    pub fn tx_type_allowed(&self, tx_type: u8) -> bool {
        match tx_type {
            0 => true,
            1 => self.upgrades.berlin,
            2 => self.upgrades.london,
            4 => self.upgrades.allegro,
            _ => false,
        }
    }
}

impl Default for Rules {
    fn default() -> Self {
        let max_event_gas = 10_000_000 + DEFAULT_EVENT_GAS;
        Self {
            name: "fakenet".to_string(),
            dag: DagRules {
                max_parents: 10,
                max_free_parents: 3,
                max_extra_data: 128,
            },
            economy: EconomyRules {
                min_gas_price: U256::from(1_000_000_000u64),
                gas: GasRules {
                    max_event_gas,
                    event_gas: DEFAULT_EVENT_GAS,
                    parent_gas: 2_400,
                    extra_data_gas: 25,
                    block_votes_base_gas: 1_024,
                    block_vote_gas: 512,
                },
                short_gas_power: GasPowerRules {
                    alloc_per_sec: 2 * 100 * DEFAULT_EVENT_GAS,
                    max_alloc_period: 5 * NANOS_PER_SEC,
                    startup_alloc_period: NANOS_PER_SEC,
                    min_startup_gas: 20 * DEFAULT_EVENT_GAS,
                },
                long_gas_power: GasPowerRules {
                    alloc_per_sec: 100 * DEFAULT_EVENT_GAS,
                    max_alloc_period: 60 * NANOS_PER_SEC,
                    startup_alloc_period: 5 * NANOS_PER_SEC,
                    min_startup_gas: 20 * DEFAULT_EVENT_GAS,
                },
            },
            blocks: BlocksRules {
                max_block_gas: 20_500_000,
            },
            upgrades: Upgrades {
                berlin: true,
                london: true,
                allegro: false,
                single_proposer_block_formation: false,
            },
        }
    }
}
