//! Configuration types for event admission

use crate::adapters::sender_cache::DEFAULT_SENDER_CACHE_SIZE;
use crate::domain::rules::DEFAULT_EVENT_GAS;
use serde::Deserialize;

/// Default heavy check queue capacity.
pub const DEFAULT_MAX_QUEUED_TASKS: usize = 1024;

/// Runtime configuration for the admission pipeline
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AdmissionConfig {
    /// Heavy check worker pool
    pub heavy_check: HeavyCheckConfig,

    /// Recovered-sender cache entries
    pub sender_cache_size: usize,

    /// Self event emission
    pub emitter: EmitterConfig,
}

/// Heavy check worker pool settings
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct HeavyCheckConfig {
    /// Worker threads (0 = number of CPUs minus one, at least 1)
    pub threads: usize,

    /// Queue capacity
    pub max_queued_tasks: usize,
}

impl HeavyCheckConfig {
    /// Effective thread count.
    pub fn resolved_threads(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get().saturating_sub(1).max(1)
        } else {
            self.threads
        }
    }
}

impl Default for HeavyCheckConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            max_queued_tasks: DEFAULT_MAX_QUEUED_TASKS,
        }
    }
}

/// Emitter throughput smoothing
///
/// Below `no_txs_threshold` of gas power left no transactions are packed;
/// between the two thresholds the usable gas grows linearly.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Gas power reserve below which events carry no transactions
    pub no_txs_threshold: u64,

    /// Gas power reserve above which throughput is unthrottled
    pub limited_tps_threshold: u64,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        let no_txs_threshold = 30 * DEFAULT_EVENT_GAS;
        Self {
            no_txs_threshold,
            limited_tps_threshold: 3 * no_txs_threshold,
        }
    }
}

impl AdmissionConfig {
    /// Effective sender cache size.
    pub fn sender_cache_size(&self) -> usize {
        if self.sender_cache_size == 0 {
            DEFAULT_SENDER_CACHE_SIZE
        } else {
            self.sender_cache_size
        }
    }
}
