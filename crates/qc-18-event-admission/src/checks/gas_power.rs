//! Gas power accountant and the check that events declare it truthfully

use super::{CheckInput, EventCheck};
use crate::domain::{calc_validator_gas_power, AdmissionError, Result};
use crate::ports::outbound::GasPowerReader;
use shared_types::{DagEvent, Event, GasPowerLeft, GAS_POWER_CONFIGS};
use std::sync::Arc;

/// Computes the gas power available to an event on every track.
pub struct GasPowerAccountant<R: GasPowerReader> {
    reader: Arc<R>,
}

impl<R: GasPowerReader> GasPowerAccountant<R> {
    /// Create with a reader.
    pub fn new(reader: Arc<R>) -> Self {
        Self { reader }
    }

    /// Gas power available at `event`, before subtracting its own usage.
    ///
    /// # Errors
    /// * `AdmissionError::NotRelevant` - event epoch differs from the context
    pub fn calc_gas_power(
        &self,
        event: &dyn DagEvent,
        self_parent: Option<&Event>,
    ) -> Result<GasPowerLeft> {
        let ctx = self.reader.get_validation_context();
        if ctx.epoch != event.epoch() {
            return Err(AdmissionError::NotRelevant);
        }

        let mut gas_power = GasPowerLeft::default();
        for track in 0..GAS_POWER_CONFIGS {
            let (prev_left, prev_time) = match self_parent {
                Some(sp) => (sp.gas_power_left().gas[track], sp.median_time()),
                None => {
                    let state = ctx.validator_state(event.creator());
                    let carried = state
                        .prev_epoch_event
                        .map(|prev| prev.gas_power_left.gas[track])
                        .unwrap_or(0);
                    (carried.saturating_add(state.gas_refund), ctx.epoch_start)
                }
            };

            gas_power.gas[track] = calc_validator_gas_power(
                event,
                event.median_time(),
                prev_time,
                prev_left,
                &ctx.validators,
                &ctx.configs[track],
            );
        }
        Ok(gas_power)
    }
}

/// Rejects events whose `gas_power_left + gas_power_used` differs from the
/// recomputed gas power on any track.
pub struct GasPowerValidator<R: GasPowerReader> {
    accountant: GasPowerAccountant<R>,
}

impl<R: GasPowerReader> GasPowerValidator<R> {
    /// Create with a reader.
    pub fn new(reader: Arc<R>) -> Self {
        Self {
            accountant: GasPowerAccountant::new(reader),
        }
    }

    /// Validate declared gas power.
    pub fn validate(&self, event: &dyn DagEvent, self_parent: Option<&Event>) -> Result<()> {
        let computed = self.accountant.calc_gas_power(event, self_parent)?;
        let left = event.gas_power_left();

        for track in 0..GAS_POWER_CONFIGS {
            let declared = left.gas[track].saturating_add(event.gas_power_used());
            if declared != computed.gas[track] {
                return Err(AdmissionError::WrongGasPowerLeft {
                    track,
                    declared,
                    computed: computed.gas[track],
                });
            }
        }
        Ok(())
    }
}

impl<R: GasPowerReader> EventCheck for GasPowerValidator<R> {
    fn name(&self) -> &'static str {
        "gas_power"
    }

    fn check(&self, input: &CheckInput<'_>) -> Result<()> {
        self.validate(input.event, input.self_parent)
    }
}
