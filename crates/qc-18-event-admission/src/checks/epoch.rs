//! Epoch-scoped rule checks

use super::{CheckInput, EventCheck};
use crate::domain::{AdmissionError, Result, Rules};
use crate::ports::outbound::EpochReader;
use shared_types::DagEvent;
use std::sync::Arc;

/// Gas power an event must declare as used under `rules`.
///
/// Sum of transaction gas, the per-event overhead, the cost of parents above
/// the free allowance, extra data and block votes.
pub fn calc_gas_power_used(event: &dyn DagEvent, rules: &Rules) -> u64 {
    let gas = &rules.economy.gas;
    let payload = event.payload();

    let txs_gas = payload
        .transactions
        .iter()
        .fold(0u64, |acc, tx| acc.saturating_add(tx.gas));

    let paid_parents =
        (event.parents().len() as u64).saturating_sub(u64::from(rules.dag.max_free_parents));
    let parents_gas = paid_parents.saturating_mul(gas.parent_gas);

    let extra_gas = (event.extra().len() as u64).saturating_mul(gas.extra_data_gas);

    let block_votes_gas = if payload.block_votes.is_empty() {
        0
    } else {
        (payload.block_votes.votes.len() as u64)
            .saturating_mul(gas.block_vote_gas)
            .saturating_add(gas.block_votes_base_gas)
    };

    txs_gas
        .saturating_add(gas.event_gas)
        .saturating_add(parents_gas)
        .saturating_add(extra_gas)
        .saturating_add(block_votes_gas)
}

/// Checks an event against the current epoch's validators and rules.
pub struct EpochValidator<R: EpochReader> {
    reader: Arc<R>,
}

impl<R: EpochReader> EpochValidator<R> {
    /// Create with a reader.
    pub fn new(reader: Arc<R>) -> Self {
        Self { reader }
    }

    /// Validate epoch membership and rule limits.
    pub fn validate(&self, event: &dyn DagEvent) -> Result<()> {
        let (validators, validators_epoch) = self.reader.get_epoch_validators();
        let (rules, rules_epoch) = self.reader.get_epoch_rules();
        if event.epoch() != validators_epoch || event.epoch() != rules_epoch {
            return Err(AdmissionError::NotRelevant);
        }

        if !validators.exists(event.creator()) {
            return Err(AdmissionError::UnknownCreator(event.creator()));
        }

        if event.parents().len() > rules.dag.max_parents as usize {
            return Err(AdmissionError::TooManyParents);
        }
        if event.extra().len() > rules.dag.max_extra_data as usize {
            return Err(AdmissionError::TooBigExtra);
        }

        if event.gas_power_used() > rules.economy.gas.max_event_gas {
            return Err(AdmissionError::TooBigGasUsed);
        }
        let expected = calc_gas_power_used(event, &rules);
        if event.gas_power_used() != expected {
            return Err(AdmissionError::WrongGasUsed {
                declared: event.gas_power_used(),
                expected,
            });
        }

        for tx in &event.payload().transactions {
            let tx_type = tx.tx_type.as_u8();
            if !rules.tx_type_allowed(tx_type) {
                return Err(AdmissionError::UnsupportedTxType(tx_type));
            }
            if tx.gas_fee_cap < rules.economy.min_gas_price {
                return Err(AdmissionError::Underpriced);
            }
        }
        Ok(())
    }
}

impl<R: EpochReader> EventCheck for EpochValidator<R> {
    fn name(&self) -> &'static str {
        "epoch"
    }

    fn check(&self, input: &CheckInput<'_>) -> Result<()> {
        self.validate(input.event)
    }
}
