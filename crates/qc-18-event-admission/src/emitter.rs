//! # Self Event Emitter
//!
//! Builds, pre-validates and signs the local validator's events using the
//! same gas power accountant and checks as inbound admission, so an emitted
//! event is accepted by every honest peer.
//!
//! ## Flow
//!
//! 1. Overhead gas of the draft (no transactions)
//! 2. Available gas power via the accountant
//! 3. Smoothed maximum from the remaining reserve
//! 4. Greedy packing of price-sorted pending transactions
//! 5. Synchronous checks, signature, heavy check

use crate::checkers::Checkers;
use crate::checks::{calc_gas_power_used, GasPowerAccountant, HeavyValidator};
use crate::config::EmitterConfig;
use crate::domain::{intrinsic_gas, AdmissionError, Rules};
use crate::metrics;
use crate::ports::outbound::{AdmissionReader, HeavyCheckReader};
use shared_crypto::{CryptoError, Secp256k1KeyPair};
use shared_types::{DagEvent, Event, EventBuilder, Transaction, ValidatorId};
use std::cmp::Reverse;
use std::sync::Arc;
use thiserror::Error;

/// Emission failures.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("not enough gas power: have {have}, need {need}")]
    NotEnoughGasPower { have: u64, need: u64 },

    #[error("signing failed: {0}")]
    Signing(#[from] CryptoError),

    #[error("event rejected: {0}")]
    Rejected(#[from] AdmissionError),
}

/// Largest gas an event may use given the creator's lowest gas power left.
///
/// Capped by both the event and the block gas limit; below
/// `no_txs_threshold` nothing may be spent, and up to
/// `limited_tps_threshold` the cap scales linearly with the reserve.
pub fn max_gas_power_to_use(rules: &Rules, config: &EmitterConfig, gas_power_left: u64) -> u64 {
    let max = rules
        .economy
        .gas
        .max_event_gas
        .min(rules.blocks.max_block_gas);

    let upper = config.limited_tps_threshold;
    let lower = config.no_txs_threshold;
    if upper <= lower {
        return max;
    }
    if gas_power_left <= lower {
        return 0;
    }
    if gas_power_left >= upper {
        return max;
    }

    let scaled =
        u128::from(max) * u128::from(gas_power_left - lower) / u128::from(upper - lower);
    u64::try_from(scaled).unwrap_or(max)
}

/// Builds and signs events of one local validator.
pub struct SelfEventEmitter<R: AdmissionReader + HeavyCheckReader + 'static> {
    creator: ValidatorId,
    key: Secp256k1KeyPair,
    config: EmitterConfig,
    reader: Arc<R>,
    accountant: GasPowerAccountant<R>,
    checkers: Arc<Checkers>,
    heavy: Arc<HeavyValidator<R>>,
}

impl<R: AdmissionReader + HeavyCheckReader + 'static> SelfEventEmitter<R> {
    pub fn new(
        creator: ValidatorId,
        key: Secp256k1KeyPair,
        config: EmitterConfig,
        reader: Arc<R>,
        checkers: Arc<Checkers>,
        heavy: Arc<HeavyValidator<R>>,
    ) -> Self {
        Self {
            creator,
            key,
            config,
            accountant: GasPowerAccountant::new(Arc::clone(&reader)),
            reader,
            checkers,
            heavy,
        }
    }

    /// Validator this emitter signs for.
    pub fn creator(&self) -> ValidatorId {
        self.creator
    }

    /// Complete `draft` with transactions from `pending` and sign it.
    ///
    /// The draft supplies the DAG position (epoch, seq, frame, Lamport,
    /// times, parents, extra and proposal fields); transactions, gas fields
    /// and the payload hash are filled here.
    ///
    /// # Errors
    /// * `EmitError::NotEnoughGasPower` - cannot pay the event overhead
    /// * `EmitError::Rejected` - the finished event fails admission
    /// * `EmitError::Signing` - key failure
    #[tracing::instrument(skip(self, draft, pending), fields(creator = self.creator, seq = draft.seq()))]
    pub fn emit(&self, draft: EventBuilder, pending: &[Transaction]) -> Result<Arc<Event>, EmitError> {
        let (rules, _) = self.reader.get_epoch_rules();

        let mut payload = draft.payload().clone();
        payload.transactions.clear();
        let draft = draft.with_creator(self.creator).with_payload(payload.clone());

        let self_parent = match draft.self_parent() {
            Some(id) => Some(
                self.reader
                    .get_event(id)
                    .ok_or(AdmissionError::UnknownParent)?,
            ),
            None => None,
        };

        let overhead = calc_gas_power_used(&draft, &rules);
        let available = self
            .accountant
            .calc_gas_power(&draft, self_parent.as_deref())?;
        if available.min() < overhead {
            return Err(EmitError::NotEnoughGasPower {
                have: available.min(),
                need: overhead,
            });
        }

        let max_to_use = max_gas_power_to_use(
            &rules,
            &self.config,
            available.saturating_sub(overhead).min(),
        );
        let (transactions, used) = self.pack(&rules, pending, available.min(), overhead, max_to_use);
        let packed = transactions.len();
        payload.transactions = transactions;

        let builder = draft
            .with_payload(payload)
            .with_gas_power_used(used)
            .with_gas_power_left(available.saturating_sub(used))
            .with_computed_payload_hash();

        self.checkers.validate(&builder, self_parent.as_deref())?;

        let signature = self.key.sign_prehash(&builder.hash_to_sign())?;
        let event = builder.build(signature);
        self.heavy.validate_event(&event)?;

        metrics::record_event_emitted();
        tracing::debug!(
            event_id = %hex::encode(&event.id()[..8]),
            txs = packed,
            gas_used = used,
            "Self event emitted"
        );
        Ok(Arc::new(event))
    }

    /// Greedily take the best paying transactions that fit.
    fn pack(
        &self,
        rules: &Rules,
        pending: &[Transaction],
        gas_power: u64,
        overhead: u64,
        max_to_use: u64,
    ) -> (Vec<Transaction>, u64) {
        let mut sorted: Vec<&Transaction> = pending
            .iter()
            .filter(|tx| self.is_includable(rules, tx))
            .collect();
        sorted.sort_by_key(|tx| Reverse(tx.gas_tip_cap));

        let mut used = overhead;
        let mut packed = Vec::new();
        for tx in sorted {
            let left = gas_power.saturating_sub(used);
            if tx.gas >= left || used.saturating_add(tx.gas) >= max_to_use {
                continue;
            }
            used += tx.gas;
            packed.push(tx.clone());
        }
        (packed, used)
    }

    fn is_includable(&self, rules: &Rules, tx: &Transaction) -> bool {
        let enough_gas = intrinsic_gas(tx, rules.revision()).is_some_and(|want| tx.gas >= want);
        enough_gas
            && rules.tx_type_allowed(tx.tx_type.as_u8())
            && tx.gas_fee_cap >= rules.economy.min_gas_price
            && tx.gas_tip_cap <= tx.gas_fee_cap
    }
}
