//! # Outbound Ports (Driven Ports / SPI)
//!
//! Minimal capability interfaces each check reads through, plus the sinks
//! the service delivers results to. Every reader must answer from an
//! immutable snapshot so concurrent validations never see a half-applied
//! epoch.

use crate::domain::{AdmissionError, EpochPubKeys, Rules, ValidationContext, Validators};
use shared_types::{BlockNumber, Epoch, Event, EventId, EventPayload, ValidatorId};
use std::sync::Arc;

/// Epoch validator set and rules.
pub trait EpochReader: Send + Sync {
    /// Validators of the current epoch.
    fn get_epoch_validators(&self) -> (Arc<Validators>, Epoch);

    /// Rules of the current epoch.
    fn get_epoch_rules(&self) -> (Arc<Rules>, Epoch);
}

/// Access to already admitted events.
pub trait ParentsReader: Send + Sync {
    /// Look up an event by id.
    fn get_event(&self, id: &EventId) -> Option<Arc<Event>>;

    /// Whether `validator` is a known cheater in the current epoch.
    fn is_cheater(&self, validator: ValidatorId) -> bool;
}

/// Validation context for gas power accounting.
pub trait GasPowerReader: Send + Sync {
    /// Context of the currently active epoch.
    fn get_validation_context(&self) -> Arc<ValidationContext>;
}

/// Proposal protocol state of known events.
pub trait ProposalReader: EpochReader {
    /// Payload of an admitted event.
    fn get_event_payload(&self, id: &EventId) -> Option<Arc<EventPayload>>;
}

/// Key material for the heavy check.
pub trait HeavyCheckReader: Send + Sync {
    /// Public keys of the current epoch.
    fn get_epoch_pub_keys(&self) -> Arc<EpochPubKeys>;

    /// Public keys of a specific (possibly past) epoch.
    fn get_epoch_pub_keys_of(&self, epoch: Epoch) -> Option<Arc<EpochPubKeys>>;

    /// First block of an epoch.
    fn get_epoch_block_start(&self, epoch: Epoch) -> Option<BlockNumber>;
}

/// Everything the synchronous pipeline reads.
pub trait AdmissionReader: EpochReader + ParentsReader + GasPowerReader + ProposalReader {}

impl<T> AdmissionReader for T where T: EpochReader + ParentsReader + GasPowerReader + ProposalReader {}

/// Receives fully admitted events.
pub trait AdmittedEventSink: Send + Sync {
    /// Called under the service's processing lock once the heavy check passed.
    fn on_admitted(&self, event: Arc<Event>);
}

/// Receives events rejected by the heavy check.
pub trait RejectedEventSink: Send + Sync {
    /// Called with the typed reason so peers can be penalized.
    fn on_rejected(&self, event: &Event, error: &AdmissionError);
}
