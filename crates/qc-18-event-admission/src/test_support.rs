//! Hand-written fakes shared by unit tests

use crate::domain::{EpochPubKeys, Rules, ValidationContext, Validators};
use crate::ports::outbound::{
    EpochReader, GasPowerReader, HeavyCheckReader, ParentsReader, ProposalReader,
};
use parking_lot::RwLock;
use shared_crypto::Secp256k1Signature;
use shared_types::{
    BlockNumber, Epoch, Event, EventBuilder, EventId, EventPayload, ValidatorId,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub(crate) struct FakeReader {
    pub epoch: Epoch,
    pub validators: Arc<Validators>,
    pub rules: Arc<Rules>,
    pub context: Arc<ValidationContext>,
    pub events: RwLock<HashMap<EventId, Arc<Event>>>,
    pub cheaters: RwLock<HashSet<ValidatorId>>,
    pub pub_keys: Arc<EpochPubKeys>,
    pub past_pub_keys: HashMap<Epoch, Arc<EpochPubKeys>>,
    pub block_starts: HashMap<Epoch, BlockNumber>,
}

impl FakeReader {
    pub fn new(epoch: Epoch, validators: Validators, rules: Rules) -> Self {
        let context = ValidationContext::new(
            epoch,
            validators.clone(),
            0,
            &rules.economy,
            HashMap::new(),
        );
        Self {
            epoch,
            validators: Arc::new(validators),
            rules: Arc::new(rules),
            context: Arc::new(context),
            events: RwLock::new(HashMap::new()),
            cheaters: RwLock::new(HashSet::new()),
            pub_keys: Arc::new(EpochPubKeys::new(epoch, HashMap::new())),
            past_pub_keys: HashMap::new(),
            block_starts: HashMap::new(),
        }
    }

    pub fn insert(&self, event: Event) -> Arc<Event> {
        let event = Arc::new(event);
        self.events.write().insert(event.id(), Arc::clone(&event));
        event
    }
}

impl EpochReader for FakeReader {
    fn get_epoch_validators(&self) -> (Arc<Validators>, Epoch) {
        (Arc::clone(&self.validators), self.epoch)
    }

    fn get_epoch_rules(&self) -> (Arc<Rules>, Epoch) {
        (Arc::clone(&self.rules), self.epoch)
    }
}

impl ParentsReader for FakeReader {
    fn get_event(&self, id: &EventId) -> Option<Arc<Event>> {
        self.events.read().get(id).cloned()
    }

    fn is_cheater(&self, validator: ValidatorId) -> bool {
        self.cheaters.read().contains(&validator)
    }
}

impl GasPowerReader for FakeReader {
    fn get_validation_context(&self) -> Arc<ValidationContext> {
        Arc::clone(&self.context)
    }
}

impl ProposalReader for FakeReader {
    fn get_event_payload(&self, id: &EventId) -> Option<Arc<EventPayload>> {
        self.events.read().get(id).map(|e| e.payload_arc())
    }
}

impl HeavyCheckReader for FakeReader {
    fn get_epoch_pub_keys(&self) -> Arc<EpochPubKeys> {
        Arc::clone(&self.pub_keys)
    }

    fn get_epoch_pub_keys_of(&self, epoch: Epoch) -> Option<Arc<EpochPubKeys>> {
        if epoch == self.pub_keys.epoch {
            return Some(Arc::clone(&self.pub_keys));
        }
        self.past_pub_keys.get(&epoch).cloned()
    }

    fn get_epoch_block_start(&self, epoch: Epoch) -> Option<BlockNumber> {
        self.block_starts.get(&epoch).copied()
    }
}

/// Seal a builder with a placeholder signature.
pub(crate) fn unsigned(builder: EventBuilder) -> Event {
    builder.build(Secp256k1Signature::empty())
}
