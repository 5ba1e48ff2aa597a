//! Validator network fixture shared by the integration flows

use parking_lot::Mutex;
use primitive_types::U256;
use qc_18_event_admission::{
    AdmissionConfig, AdmissionError, EmitterConfig, EpochSnapshotStore, EpochState,
    EventAdmissionService, HeavyCheckConfig, InMemoryEventStore, RejectedEventSink, Rules,
    SelfEventEmitter, ValidatorState, Validators,
};
use shared_crypto::Secp256k1KeyPair;
use shared_types::{
    BlockNumber, Epoch, Event, EventBuilder, EventId, Timestamp, Transaction, TxType,
    ValidatorId, NANOS_PER_SEC,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

pub const GWEI: u64 = 1_000_000_000;

pub type Service = EventAdmissionService<EpochSnapshotStore, InMemoryEventStore, RejectionLog>;

/// Records heavy check rejections.
#[derive(Default)]
pub struct RejectionLog {
    pub entries: Mutex<Vec<(EventId, AdmissionError)>>,
}

impl RejectionLog {
    pub fn errors_for(&self, id: &EventId) -> Vec<AdmissionError> {
        self.entries
            .lock()
            .iter()
            .filter(|(event, _)| event == id)
            .map(|(_, e)| e.clone())
            .collect()
    }
}

impl RejectedEventSink for RejectionLog {
    fn on_rejected(&self, event: &Event, error: &AdmissionError) {
        self.entries.lock().push((event.id(), error.clone()));
    }
}

/// Validators `1..=n` with equal stake, one admission service.
pub struct Network {
    pub keys: HashMap<ValidatorId, Secp256k1KeyPair>,
    pub rules: Rules,
    pub store: Arc<EpochSnapshotStore>,
    pub events: Arc<InMemoryEventStore>,
    pub rejections: Arc<RejectionLog>,
    pub service: Service,
}

impl Network {
    pub fn new(validators: u32, rules: Rules) -> Self {
        init_tracing();
        let keys: HashMap<_, _> = (1..=validators)
            .map(|id| (id, Secp256k1KeyPair::generate()))
            .collect();
        let events = Arc::new(InMemoryEventStore::new());
        let genesis = epoch_state(&keys, &rules, 1, 0, 1, HashMap::new());
        let store = Arc::new(EpochSnapshotStore::new(genesis, Arc::clone(&events)));
        let rejections = Arc::new(RejectionLog::default());

        let config = AdmissionConfig {
            heavy_check: HeavyCheckConfig {
                threads: 2,
                max_queued_tasks: 64,
            },
            ..Default::default()
        };
        let service = EventAdmissionService::new(
            Arc::clone(&store),
            Arc::clone(&events),
            Arc::clone(&rejections),
            &config,
        );
        service.start();

        Self {
            keys,
            rules,
            store,
            events,
            rejections,
            service,
        }
    }

    /// Publish the next epoch with the current keys.
    pub fn advance_epoch(
        &self,
        epoch: Epoch,
        epoch_start: Timestamp,
        block_start: BlockNumber,
        validator_states: HashMap<ValidatorId, ValidatorState>,
    ) -> bool {
        self.store.apply_epoch(epoch_state(
            &self.keys,
            &self.rules,
            epoch,
            epoch_start,
            block_start,
            validator_states,
        ))
    }

    /// Emitter signing for `creator`.
    pub fn emitter(&self, creator: ValidatorId) -> SelfEventEmitter<EpochSnapshotStore> {
        let key = Secp256k1KeyPair::from_bytes(self.keys[&creator].to_bytes())
            .expect("valid key bytes");
        SelfEventEmitter::new(
            creator,
            key,
            EmitterConfig::default(),
            Arc::clone(&self.store),
            self.service.checkers(),
            self.service.heavy(),
        )
    }

    /// Block until `id` is admitted or the timeout expires.
    pub fn wait_admitted(&self, id: &EventId) -> bool {
        wait_until(|| self.events.contains(id))
    }

    /// Block until `id` is rejected by the heavy check or the timeout expires.
    pub fn wait_rejected(&self, id: &EventId) -> bool {
        wait_until(|| !self.rejections.errors_for(id).is_empty())
    }
}

impl Drop for Network {
    fn drop(&mut self) {
        self.service.stop();
    }
}

/// Route admission logs to the test writer; `RUST_LOG` overrides the level.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

pub fn epoch_state(
    keys: &HashMap<ValidatorId, Secp256k1KeyPair>,
    rules: &Rules,
    epoch: Epoch,
    epoch_start: Timestamp,
    block_start: BlockNumber,
    validator_states: HashMap<ValidatorId, ValidatorState>,
) -> EpochState {
    EpochState {
        epoch,
        validators: Validators::new(keys.keys().map(|id| (*id, 1))),
        rules: rules.clone(),
        epoch_start,
        validator_states,
        pub_keys: keys.iter().map(|(id, k)| (*id, k.public_key())).collect(),
        block_start,
    }
}

fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}

/// Header of an event at DAG position `(seq, lamport)` created at `secs`.
pub fn draft(epoch: Epoch, seq: u32, lamport: u32, secs: u64, parents: Vec<EventId>) -> EventBuilder {
    EventBuilder::new()
        .with_epoch(epoch)
        .with_seq(seq)
        .with_frame(1)
        .with_lamport(lamport)
        .with_creation_time(secs * NANOS_PER_SEC)
        .with_median_time(secs * NANOS_PER_SEC)
        .with_parents(parents)
}

/// Signed dynamic-fee transfer.
pub fn transfer(sender: &Secp256k1KeyPair, nonce: u64, tip_gwei: u64) -> Transaction {
    let mut tx = Transaction {
        tx_type: TxType::DynamicFee,
        chain_id: 4003,
        nonce,
        gas: 21_000,
        gas_fee_cap: U256::from(50 * GWEI),
        gas_tip_cap: U256::from(tip_gwei * GWEI),
        to: Some([0x42; 20]),
        value: U256::from(1_000u64),
        ..Default::default()
    };
    tx.signature = sender
        .sign_recoverable(&tx.signing_hash())
        .expect("signing succeeds");
    tx
}

/// Re-sign a modified copy of `event` with `key`.
pub fn resign(builder: EventBuilder, key: &Secp256k1KeyPair) -> Event {
    use shared_types::DagEvent;
    let signature = key
        .sign_prehash(&builder.hash_to_sign())
        .expect("signing succeeds");
    builder.build(signature)
}
