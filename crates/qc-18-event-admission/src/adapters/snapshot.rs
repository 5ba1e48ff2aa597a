//! # Epoch Snapshot Store
//!
//! Implements every reader port from immutable snapshots published with
//! `arc-swap`. Readers load an `Arc` and keep using it for the whole check,
//! so an epoch transition never becomes visible half-way through an event.
//!
//! Three snapshots are swapped independently:
//!
//! - epoch view: validators, rules, cheaters
//! - gas power `ValidationContext`
//! - current epoch public keys
//!
//! Public keys and first block numbers of recent epochs stay in a history
//! map so block votes for an earlier epoch can still be checked.

use super::event_store::InMemoryEventStore;
use crate::domain::{EpochPubKeys, Rules, ValidationContext, ValidatorState, Validators};
use crate::ports::outbound::{
    EpochReader, GasPowerReader, HeavyCheckReader, ParentsReader, ProposalReader,
};
use arc_swap::ArcSwap;
use parking_lot::RwLock;
use shared_crypto::Secp256k1PublicKey;
use shared_types::{
    BlockNumber, Epoch, Event, EventId, EventPayload, Timestamp, ValidatorId,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// Past epochs whose keys and block starts are kept.
pub const DEFAULT_RETAINED_EPOCHS: usize = 4;

/// Everything known about an epoch when it starts.
#[derive(Clone, Debug, Default)]
pub struct EpochState {
    pub epoch: Epoch,
    pub validators: Validators,
    pub rules: Rules,
    /// Median time of the epoch's first moment.
    pub epoch_start: Timestamp,
    /// Carry-over gas power state from the previous epoch.
    pub validator_states: HashMap<ValidatorId, ValidatorState>,
    pub pub_keys: HashMap<ValidatorId, Secp256k1PublicKey>,
    /// First block of the epoch.
    pub block_start: BlockNumber,
}

#[derive(Clone, Debug)]
struct EpochView {
    epoch: Epoch,
    validators: Arc<Validators>,
    rules: Arc<Rules>,
    cheaters: HashSet<ValidatorId>,
}

#[derive(Clone, Debug)]
struct EpochHistory {
    pub_keys: Arc<EpochPubKeys>,
    block_start: BlockNumber,
}

/// Reader ports backed by swappable epoch snapshots and an event store.
pub struct EpochSnapshotStore {
    view: ArcSwap<EpochView>,
    context: ArcSwap<ValidationContext>,
    pub_keys: ArcSwap<EpochPubKeys>,
    history: RwLock<BTreeMap<Epoch, EpochHistory>>,
    retained_epochs: usize,
    events: Arc<InMemoryEventStore>,
}

impl EpochSnapshotStore {
    /// Create from the first epoch.
    pub fn new(genesis: EpochState, events: Arc<InMemoryEventStore>) -> Self {
        let (view, context, pub_keys, block_start) = Self::split(genesis);
        let mut history = BTreeMap::new();
        history.insert(
            pub_keys.epoch,
            EpochHistory {
                pub_keys: Arc::clone(&pub_keys),
                block_start,
            },
        );

        Self {
            view: ArcSwap::new(view),
            context: ArcSwap::new(context),
            pub_keys: ArcSwap::new(pub_keys),
            history: RwLock::new(history),
            retained_epochs: DEFAULT_RETAINED_EPOCHS,
            events,
        }
    }

    /// Override how many past epochs stay in history (at least 1).
    pub fn with_retained_epochs(mut self, retained: usize) -> Self {
        self.retained_epochs = retained.max(1);
        self
    }

    fn split(
        state: EpochState,
    ) -> (
        Arc<EpochView>,
        Arc<ValidationContext>,
        Arc<EpochPubKeys>,
        BlockNumber,
    ) {
        let context = ValidationContext::new(
            state.epoch,
            state.validators.clone(),
            state.epoch_start,
            &state.rules.economy,
            state.validator_states,
        );
        let view = EpochView {
            epoch: state.epoch,
            validators: Arc::new(state.validators),
            rules: Arc::new(state.rules),
            cheaters: HashSet::new(),
        };
        let pub_keys = EpochPubKeys::new(state.epoch, state.pub_keys);
        (
            Arc::new(view),
            Arc::new(context),
            Arc::new(pub_keys),
            state.block_start,
        )
    }

    /// Current epoch.
    pub fn epoch(&self) -> Epoch {
        self.view.load().epoch
    }

    /// Event store the parent lookups read from.
    pub fn events(&self) -> &Arc<InMemoryEventStore> {
        &self.events
    }

    /// Publish a new epoch. Returns false and leaves the store untouched
    /// when `state` does not advance the epoch.
    pub fn apply_epoch(&self, state: EpochState) -> bool {
        let current = self.epoch();
        if state.epoch <= current {
            tracing::warn!(current, proposed = state.epoch, "Ignoring stale epoch state");
            return false;
        }

        let epoch = state.epoch;
        let (view, context, pub_keys, block_start) = Self::split(state);
        {
            let mut history = self.history.write();
            history.insert(
                epoch,
                EpochHistory {
                    pub_keys: Arc::clone(&pub_keys),
                    block_start,
                },
            );
            while history.len() > self.retained_epochs + 1 {
                history.pop_first();
            }
        }

        self.context.store(context);
        self.view.store(view);
        self.pub_keys.store(pub_keys);

        tracing::info!(epoch, block_start, "Epoch snapshot published");
        true
    }

    /// Record `validator` as a cheater of the current epoch.
    pub fn mark_cheater(&self, validator: ValidatorId) {
        self.view.rcu(|current| {
            let mut next = EpochView::clone(current);
            next.cheaters.insert(validator);
            next
        });
        tracing::debug!(validator, "Validator marked as cheater");
    }
}

impl EpochReader for EpochSnapshotStore {
    fn get_epoch_validators(&self) -> (Arc<Validators>, Epoch) {
        let view = self.view.load();
        (Arc::clone(&view.validators), view.epoch)
    }

    fn get_epoch_rules(&self) -> (Arc<Rules>, Epoch) {
        let view = self.view.load();
        (Arc::clone(&view.rules), view.epoch)
    }
}

impl ParentsReader for EpochSnapshotStore {
    fn get_event(&self, id: &EventId) -> Option<Arc<Event>> {
        self.events.get_event(id)
    }

    fn is_cheater(&self, validator: ValidatorId) -> bool {
        self.view.load().cheaters.contains(&validator)
    }
}

impl GasPowerReader for EpochSnapshotStore {
    fn get_validation_context(&self) -> Arc<ValidationContext> {
        self.context.load_full()
    }
}

impl ProposalReader for EpochSnapshotStore {
    fn get_event_payload(&self, id: &EventId) -> Option<Arc<EventPayload>> {
        self.events.get_event_payload(id)
    }
}

impl HeavyCheckReader for EpochSnapshotStore {
    fn get_epoch_pub_keys(&self) -> Arc<EpochPubKeys> {
        self.pub_keys.load_full()
    }

    fn get_epoch_pub_keys_of(&self, epoch: Epoch) -> Option<Arc<EpochPubKeys>> {
        self.history
            .read()
            .get(&epoch)
            .map(|h| Arc::clone(&h.pub_keys))
    }

    fn get_epoch_block_start(&self, epoch: Epoch) -> Option<BlockNumber> {
        self.history.read().get(&epoch).map(|h| h.block_start)
    }
}
