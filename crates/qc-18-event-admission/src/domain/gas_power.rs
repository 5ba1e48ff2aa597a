//! # Gas Power Accounting
//!
//! Stake-weighted leaky bucket run independently on two tracks.
//!
//! For a validator with weight `w` out of `W` and a track config:
//!
//! ```text
//! per_sec = alloc_per_sec * w / W
//! max     = max(per_sec * max_alloc_period_secs, min_ensured_alloc)
//! startup = max(per_sec * startup_alloc_period_secs, min_startup_gas)
//! gas     = min(prev_left + per_sec * elapsed / 1s, max)
//! ```
//!
//! Periods are truncated to whole seconds. All products are taken in
//! 128-bit arithmetic.

use super::rules::{EconomyRules, GasPowerRules};
use super::validators::Validators;
use shared_types::{
    DagEvent, Epoch, EventId, GasPowerLeft, Timestamp, ValidatorId, GAS_POWER_CONFIGS,
    NANOS_PER_SEC,
};
use std::collections::HashMap;

/// Gas power allocation parameters of one track.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GasPowerConfig {
    /// Network-wide allocation per second.
    pub alloc_per_sec: u64,
    /// Bucket capacity as accrual time (nanoseconds).
    pub max_alloc_period: Timestamp,
    /// Capacity floor regardless of stake.
    pub min_ensured_alloc: u64,
    /// Startup grace as accrual time (nanoseconds).
    pub startup_alloc_period: Timestamp,
    /// Startup grace floor.
    pub min_startup_gas: u64,
}

impl GasPowerConfig {
    /// Derive a track config from epoch rules.
    pub fn from_rules(rules: &GasPowerRules, min_ensured_alloc: u64) -> Self {
        Self {
            alloc_per_sec: rules.alloc_per_sec,
            max_alloc_period: rules.max_alloc_period,
            min_ensured_alloc,
            startup_alloc_period: rules.startup_alloc_period,
            min_startup_gas: rules.min_startup_gas,
        }
    }
}

/// Last event a validator created in the previous epoch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PrevEpochEvent {
    /// Event id.
    pub id: EventId,
    /// Gas power left after that event.
    pub gas_power_left: GasPowerLeft,
}

/// Carry-over state of a validator into a new epoch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ValidatorState {
    /// Last event of the previous epoch, if the validator created any.
    pub prev_epoch_event: Option<PrevEpochEvent>,
    /// Gas refunded at the epoch transition.
    pub gas_refund: u64,
}

/// Immutable per-epoch snapshot consumed by gas power accounting.
#[derive(Clone, Debug, Default)]
pub struct ValidationContext {
    /// Epoch this context is valid for.
    pub epoch: Epoch,
    /// Validator set of the epoch.
    pub validators: Validators,
    /// Time the epoch started.
    pub epoch_start: Timestamp,
    /// Track configs indexed by `SHORT_TERM_GAS` / `LONG_TERM_GAS`.
    pub configs: [GasPowerConfig; GAS_POWER_CONFIGS],
    /// Carry-over state per validator.
    pub validator_states: HashMap<ValidatorId, ValidatorState>,
}

impl ValidationContext {
    /// Build a context, deriving both tracks from `economy` with
    /// `min_ensured_alloc = max_event_gas`.
    pub fn new(
        epoch: Epoch,
        validators: Validators,
        epoch_start: Timestamp,
        economy: &EconomyRules,
        validator_states: HashMap<ValidatorId, ValidatorState>,
    ) -> Self {
        let min_ensured_alloc = economy.gas.max_event_gas;
        Self {
            epoch,
            validators,
            epoch_start,
            configs: [
                GasPowerConfig::from_rules(&economy.short_gas_power, min_ensured_alloc),
                GasPowerConfig::from_rules(&economy.long_gas_power, min_ensured_alloc),
            ],
            validator_states,
        }
    }

    /// Carry-over state of `validator` (default when absent).
    pub fn validator_state(&self, validator: ValidatorId) -> ValidatorState {
        self.validator_states
            .get(&validator)
            .copied()
            .unwrap_or_default()
    }
}

fn clamp_u64(value: u128) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

/// Stake-weighted `(per_sec, max, startup)` of a validator on one track.
///
/// Zero stake (or an empty set) yields `(0, 0, 0)`.
pub fn calc_validator_gas_power_per_sec(
    validator: ValidatorId,
    validators: &Validators,
    config: &GasPowerConfig,
) -> (u64, u64, u64) {
    let stake = validators.get(validator);
    let total = validators.total_weight();
    if stake == 0 || total == 0 {
        return (0, 0, 0);
    }

    let per_sec = clamp_u64(u128::from(config.alloc_per_sec) * u128::from(stake) / u128::from(total));

    let max_period_secs = config.max_alloc_period / NANOS_PER_SEC;
    let max = clamp_u64(u128::from(per_sec) * u128::from(max_period_secs)).max(config.min_ensured_alloc);

    let startup_period_secs = config.startup_alloc_period / NANOS_PER_SEC;
    let startup =
        clamp_u64(u128::from(per_sec) * u128::from(startup_period_secs)).max(config.min_startup_gas);

    (per_sec, max, startup)
}

/// Gas power available to `event` on one track.
///
/// `prev_left`/`prev_time` describe the state right after the previous
/// event of the creator.
pub fn calc_validator_gas_power(
    event: &dyn DagEvent,
    event_time: Timestamp,
    prev_time: Timestamp,
    prev_left: u64,
    validators: &Validators,
    config: &GasPowerConfig,
) -> u64 {
    let (per_sec, max, startup) =
        calc_validator_gas_power_per_sec(event.creator(), validators, config);

    let mut prev_left = prev_left;
    if event.self_parent().is_none() && prev_left < startup {
        prev_left = startup;
    }

    // no time travel
    let prev_time = prev_time.min(event_time);

    let elapsed = u128::from(event_time - prev_time);
    let allocated = u128::from(per_sec) * elapsed / u128::from(NANOS_PER_SEC);

    clamp_u64((u128::from(prev_left) + allocated).min(u128::from(max)))
}
