//! # DAG Events
//!
//! An `Event` is immutable once built. The only way to produce one is
//! through `EventBuilder`, which the emitter fills field by field before
//! signing. Both implement `DagEvent`, so admission checks run unchanged on
//! a signed peer event and on a local event that is still being assembled.
//!
//! ## Hashing
//!
//! - `payload_hash = keccak(tx_root ‖ proposal_hash ‖ sync_state ‖ block_votes_hash)`
//! - `hash_to_sign = keccak(header fields ‖ payload_hash)`
//! - `id = keccak(hash_to_sign ‖ signature)`

use crate::entities::*;
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};
use shared_crypto::{keccak256, Keccak256Hasher, Secp256k1Signature};
use std::sync::Arc;

/// Block proposal attached by the turn's proposer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    /// Proposed block number.
    pub number: BlockNumber,
    /// Hash of the parent block.
    pub parent_hash: Hash,
    /// Proposed block time.
    pub time: Timestamp,
    /// Randomness contribution.
    pub randao: Hash,
}

impl Proposal {
    /// Keccak hash of the proposal fields.
    pub fn hash(&self) -> Hash {
        let mut hasher = Keccak256Hasher::new();
        hasher
            .update_u64(self.number)
            .update(&self.parent_hash)
            .update_u64(self.time)
            .update(&self.randao);
        hasher.finalize()
    }
}

/// What the creator last observed of the single-proposer protocol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProposalSyncState {
    /// Turn of the latest proposal seen.
    pub last_seen_proposal_turn: Turn,
    /// Block number of the latest proposal seen.
    pub last_seen_proposed_block: BlockNumber,
    /// Frame in which the latest proposal was seen.
    pub last_seen_proposal_frame: Frame,
}

impl ProposalSyncState {
    /// Join two sync states: the higher turn wins, ties broken by block then frame.
    pub fn join(self, other: Self) -> Self {
        let key = |s: &Self| {
            (
                s.last_seen_proposal_turn,
                s.last_seen_proposed_block,
                s.last_seen_proposal_frame,
            )
        };
        if key(&other) > key(&self) {
            other
        } else {
            self
        }
    }

    /// Whether any field of `self` is ahead of `base`.
    pub fn advances(&self, base: &Self) -> bool {
        self.last_seen_proposal_turn > base.last_seen_proposal_turn
            || self.last_seen_proposed_block > base.last_seen_proposed_block
            || self.last_seen_proposal_frame > base.last_seen_proposal_frame
    }

    fn to_bytes(self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        bytes[..4].copy_from_slice(&self.last_seen_proposal_turn.to_be_bytes());
        bytes[4..12].copy_from_slice(&self.last_seen_proposed_block.to_be_bytes());
        bytes[12..].copy_from_slice(&self.last_seen_proposal_frame.to_be_bytes());
        bytes
    }
}

/// Votes for a contiguous range of blocks of some epoch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockVotes {
    /// Epoch the voted blocks belong to.
    pub epoch: Epoch,
    /// Number of the first voted block.
    pub start: BlockNumber,
    /// Block hashes, one per consecutive block from `start`.
    pub votes: Vec<Hash>,
}

impl BlockVotes {
    /// No votes attached.
    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    /// Keccak hash of the votes, zero when empty.
    pub fn hash(&self) -> Hash {
        if self.is_empty() {
            return [0u8; 32];
        }
        let mut hasher = Keccak256Hasher::new();
        hasher.update_u32(self.epoch).update_u64(self.start);
        for vote in &self.votes {
            hasher.update(vote);
        }
        hasher.finalize()
    }
}

/// Everything an event carries besides its header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPayload {
    /// Transactions originated by the creator.
    pub transactions: Vec<Transaction>,
    /// Block proposal, if the creator is proposing this turn.
    pub proposal: Option<Proposal>,
    /// Proposal protocol state as seen by the creator.
    pub sync_state: ProposalSyncState,
    /// Block votes.
    pub block_votes: BlockVotes,
}

impl EventPayload {
    /// Keccak over the ordered transaction hashes.
    pub fn tx_root(&self) -> Hash {
        let mut hasher = Keccak256Hasher::new();
        for tx in &self.transactions {
            hasher.update(&tx.hash());
        }
        hasher.finalize()
    }

    /// Hash committed to by `Event::payload_hash`.
    pub fn hash(&self) -> Hash {
        let proposal_hash = self
            .proposal
            .as_ref()
            .map(Proposal::hash)
            .unwrap_or([0u8; 32]);

        let mut hasher = Keccak256Hasher::new();
        hasher
            .update(&self.tx_root())
            .update(&proposal_hash)
            .update(&self.sync_state.to_bytes())
            .update(&self.block_votes.hash());
        hasher.finalize()
    }
}

/// Read view over an event, signed or still under construction.
pub trait DagEvent {
    /// Network fork identifier (0 for the current network).
    fn net_fork_id(&self) -> u16;
    /// Epoch the event belongs to.
    fn epoch(&self) -> Epoch;
    /// Per-creator sequence number.
    fn seq(&self) -> Seq;
    /// aBFT frame.
    fn frame(&self) -> Frame;
    /// Creating validator.
    fn creator(&self) -> ValidatorId;
    /// Lamport time.
    fn lamport(&self) -> Lamport;
    /// Creator's wall-clock time.
    fn creation_time(&self) -> Timestamp;
    /// Stake-weighted median of the creator's observed times.
    fn median_time(&self) -> Timestamp;
    /// Parent event ids; the first is the self-parent iff `seq > 1`.
    fn parents(&self) -> &[EventId];
    /// Declared gas power left per track.
    fn gas_power_left(&self) -> GasPowerLeft;
    /// Declared gas power used.
    fn gas_power_used(&self) -> u64;
    /// Opaque extra data.
    fn extra(&self) -> &[u8];
    /// Payload contents.
    fn payload(&self) -> &EventPayload;
    /// Declared payload hash.
    fn payload_hash(&self) -> Hash;

    /// Self-parent id, if any.
    fn self_parent(&self) -> Option<&EventId> {
        if self.seq() <= 1 {
            return None;
        }
        self.parents().first()
    }

    /// Whether `id` is this event's self-parent.
    fn is_self_parent(&self, id: &EventId) -> bool {
        self.self_parent() == Some(id)
    }

    /// Hash covered by the creator's signature.
    fn hash_to_sign(&self) -> Hash {
        let mut hasher = Keccak256Hasher::new();
        hasher
            .update(&self.net_fork_id().to_be_bytes())
            .update_u32(self.epoch())
            .update_u32(self.seq())
            .update_u32(self.frame())
            .update_u32(self.creator())
            .update_u32(self.lamport())
            .update_u64(self.creation_time())
            .update_u64(self.median_time())
            .update_u64(self.parents().len() as u64);
        for parent in self.parents() {
            hasher.update(parent);
        }
        for gas in self.gas_power_left().gas {
            hasher.update_u64(gas);
        }
        hasher
            .update_u64(self.gas_power_used())
            .update_u64(self.extra().len() as u64)
            .update(self.extra())
            .update(&self.payload_hash());
        hasher.finalize()
    }
}

/// A signed, immutable DAG event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    net_fork_id: u16,
    epoch: Epoch,
    seq: Seq,
    frame: Frame,
    creator: ValidatorId,
    lamport: Lamport,
    creation_time: Timestamp,
    median_time: Timestamp,
    parents: Vec<EventId>,
    gas_power_left: GasPowerLeft,
    gas_power_used: u64,
    extra: Vec<u8>,
    payload: Arc<EventPayload>,
    payload_hash: Hash,
    signature: Secp256k1Signature,
    id: EventId,
}

impl Event {
    /// Event id.
    pub fn id(&self) -> EventId {
        self.id
    }

    /// Creator's signature over `hash_to_sign()`.
    pub fn signature(&self) -> &Secp256k1Signature {
        &self.signature
    }

    /// Shared handle to the payload.
    pub fn payload_arc(&self) -> Arc<EventPayload> {
        Arc::clone(&self.payload)
    }

    /// Builder pre-filled with this event's fields, for deriving variants.
    pub fn to_builder(&self) -> EventBuilder {
        EventBuilder {
            net_fork_id: self.net_fork_id,
            epoch: self.epoch,
            seq: self.seq,
            frame: self.frame,
            creator: self.creator,
            lamport: self.lamport,
            creation_time: self.creation_time,
            median_time: self.median_time,
            parents: self.parents.clone(),
            gas_power_left: self.gas_power_left,
            gas_power_used: self.gas_power_used,
            extra: self.extra.clone(),
            payload: Arc::clone(&self.payload),
            payload_hash: self.payload_hash,
        }
    }
}

impl DagEvent for Event {
    fn net_fork_id(&self) -> u16 {
        self.net_fork_id
    }
    fn epoch(&self) -> Epoch {
        self.epoch
    }
    fn seq(&self) -> Seq {
        self.seq
    }
    fn frame(&self) -> Frame {
        self.frame
    }
    fn creator(&self) -> ValidatorId {
        self.creator
    }
    fn lamport(&self) -> Lamport {
        self.lamport
    }
    fn creation_time(&self) -> Timestamp {
        self.creation_time
    }
    fn median_time(&self) -> Timestamp {
        self.median_time
    }
    fn parents(&self) -> &[EventId] {
        &self.parents
    }
    fn gas_power_left(&self) -> GasPowerLeft {
        self.gas_power_left
    }
    fn gas_power_used(&self) -> u64 {
        self.gas_power_used
    }
    fn extra(&self) -> &[u8] {
        &self.extra
    }
    fn payload(&self) -> &EventPayload {
        &self.payload
    }
    fn payload_hash(&self) -> Hash {
        self.payload_hash
    }
}

/// Mutable event under construction.
#[derive(Debug, Clone, Default)]
pub struct EventBuilder {
    net_fork_id: u16,
    epoch: Epoch,
    seq: Seq,
    frame: Frame,
    creator: ValidatorId,
    lamport: Lamport,
    creation_time: Timestamp,
    median_time: Timestamp,
    parents: Vec<EventId>,
    gas_power_left: GasPowerLeft,
    gas_power_used: u64,
    extra: Vec<u8>,
    payload: Arc<EventPayload>,
    payload_hash: Hash,
}

impl EventBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the network fork id.
    pub fn with_net_fork_id(mut self, value: u16) -> Self {
        self.net_fork_id = value;
        self
    }

    /// Set the epoch.
    pub fn with_epoch(mut self, value: Epoch) -> Self {
        self.epoch = value;
        self
    }

    /// Set the sequence number.
    pub fn with_seq(mut self, value: Seq) -> Self {
        self.seq = value;
        self
    }

    /// Set the frame.
    pub fn with_frame(mut self, value: Frame) -> Self {
        self.frame = value;
        self
    }

    /// Set the creator.
    pub fn with_creator(mut self, value: ValidatorId) -> Self {
        self.creator = value;
        self
    }

    /// Set the Lamport time.
    pub fn with_lamport(mut self, value: Lamport) -> Self {
        self.lamport = value;
        self
    }

    /// Set the creation time.
    pub fn with_creation_time(mut self, value: Timestamp) -> Self {
        self.creation_time = value;
        self
    }

    /// Set the median time.
    pub fn with_median_time(mut self, value: Timestamp) -> Self {
        self.median_time = value;
        self
    }

    /// Set the parents (self-parent first when `seq > 1`).
    pub fn with_parents(mut self, value: Vec<EventId>) -> Self {
        self.parents = value;
        self
    }

    /// Set the declared gas power left.
    pub fn with_gas_power_left(mut self, value: GasPowerLeft) -> Self {
        self.gas_power_left = value;
        self
    }

    /// Set the declared gas power used.
    pub fn with_gas_power_used(mut self, value: u64) -> Self {
        self.gas_power_used = value;
        self
    }

    /// Set the extra data.
    pub fn with_extra(mut self, value: Vec<u8>) -> Self {
        self.extra = value;
        self
    }

    /// Set the payload.
    pub fn with_payload(mut self, value: EventPayload) -> Self {
        self.payload = Arc::new(value);
        self
    }

    /// Set the declared payload hash.
    pub fn with_payload_hash(mut self, value: Hash) -> Self {
        self.payload_hash = value;
        self
    }

    /// Set the payload hash to the hash of the current payload.
    pub fn with_computed_payload_hash(mut self) -> Self {
        self.payload_hash = self.payload.hash();
        self
    }

    /// Seal the event with the creator's signature.
    pub fn build(self, signature: Secp256k1Signature) -> Event {
        let hash_to_sign = DagEvent::hash_to_sign(&self);
        let mut id_preimage = [0u8; 96];
        id_preimage[..32].copy_from_slice(&hash_to_sign);
        id_preimage[32..].copy_from_slice(signature.as_bytes());
        let id = keccak256(&id_preimage);

        Event {
            net_fork_id: self.net_fork_id,
            epoch: self.epoch,
            seq: self.seq,
            frame: self.frame,
            creator: self.creator,
            lamport: self.lamport,
            creation_time: self.creation_time,
            median_time: self.median_time,
            parents: self.parents,
            gas_power_left: self.gas_power_left,
            gas_power_used: self.gas_power_used,
            extra: self.extra,
            payload: self.payload,
            payload_hash: self.payload_hash,
            signature,
            id,
        }
    }
}

impl DagEvent for EventBuilder {
    fn net_fork_id(&self) -> u16 {
        self.net_fork_id
    }
    fn epoch(&self) -> Epoch {
        self.epoch
    }
    fn seq(&self) -> Seq {
        self.seq
    }
    fn frame(&self) -> Frame {
        self.frame
    }
    fn creator(&self) -> ValidatorId {
        self.creator
    }
    fn lamport(&self) -> Lamport {
        self.lamport
    }
    fn creation_time(&self) -> Timestamp {
        self.creation_time
    }
    fn median_time(&self) -> Timestamp {
        self.median_time
    }
    fn parents(&self) -> &[EventId] {
        &self.parents
    }
    fn gas_power_left(&self) -> GasPowerLeft {
        self.gas_power_left
    }
    fn gas_power_used(&self) -> u64 {
        self.gas_power_used
    }
    fn extra(&self) -> &[u8] {
        &self.extra
    }
    fn payload(&self) -> &EventPayload {
        &self.payload
    }
    fn payload_hash(&self) -> Hash {
        self.payload_hash
    }
}
