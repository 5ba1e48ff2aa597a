//! Stateless structural checks

use super::{CheckInput, EventCheck};
use crate::domain::{intrinsic_gas, AdmissionError, Result, Revision};
use shared_types::{DagEvent, Transaction};

/// Sanity ceiling for gas power figures.
pub const MAX_GAS_POWER_USED: u64 = (i64::MAX / 2) as u64;

/// Sanity ceiling for DAG counters.
pub const MAX_DAG_COUNTER: u32 = (i32::MAX / 2) as u32;

/// Cheap checks that need no chain state.
#[derive(Clone, Copy, Debug, Default)]
pub struct BasicValidator;

impl BasicValidator {
    /// Create the validator.
    pub fn new() -> Self {
        Self
    }

    /// Validate event fields and its transactions.
    pub fn validate(&self, event: &dyn DagEvent, revision: Revision) -> Result<()> {
        if event.net_fork_id() != 0 {
            return Err(AdmissionError::WrongNetForkId);
        }

        let counters = [event.seq(), event.epoch(), event.frame(), event.lamport()];
        if counters.iter().any(|v| *v == 0) {
            return Err(AdmissionError::NotInitialized);
        }
        if counters.iter().any(|v| *v >= MAX_DAG_COUNTER) {
            return Err(AdmissionError::HugeValue);
        }
        if event.seq() > 1 && event.parents().is_empty() {
            return Err(AdmissionError::NoParents);
        }

        if event.gas_power_used() >= MAX_GAS_POWER_USED
            || event.gas_power_left().max() >= MAX_GAS_POWER_USED
        {
            return Err(AdmissionError::HugeValue);
        }

        if event.creation_time() == 0 || event.median_time() == 0 {
            return Err(AdmissionError::ZeroTime);
        }

        let block_votes = &event.payload().block_votes;
        if !block_votes.is_empty() && (block_votes.start == 0 || block_votes.epoch > event.epoch()) {
            return Err(AdmissionError::MalformedBlockVotes);
        }

        for tx in &event.payload().transactions {
            validate_tx(tx, revision)?;
        }
        Ok(())
    }
}

fn validate_tx(tx: &Transaction, revision: Revision) -> Result<()> {
    let want = intrinsic_gas(tx, revision).ok_or(AdmissionError::GasUintOverflow)?;
    if tx.gas < want {
        return Err(AdmissionError::IntrinsicGasTooLow { have: tx.gas, want });
    }
    if tx.gas_tip_cap > tx.gas_fee_cap {
        return Err(AdmissionError::TipAboveFeeCap);
    }
    Ok(())
}

impl EventCheck for BasicValidator {
    fn name(&self) -> &'static str {
        "basic"
    }

    fn check(&self, input: &CheckInput<'_>) -> Result<()> {
        self.validate(input.event, input.revision)
    }
}
