//! Error types for event admission
//!
//! Every rejection has a stable variant so callers compare identities, never
//! strings. `kind()` groups variants into the classes the networking layer
//! acts on.

use shared_types::{Epoch, ValidatorId};

/// Admission error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdmissionError {
    // ---- structural (basic) ----
    #[error("Wrong network fork id")]
    WrongNetForkId,

    #[error("Event field is not initialized")]
    NotInitialized,

    #[error("Too big value")]
    HugeValue,

    #[error("Event has no parents")]
    NoParents,

    #[error("Event has zero timestamp")]
    ZeroTime,

    #[error("Malformed block votes")]
    MalformedBlockVotes,

    #[error("Intrinsic gas too low: have {have}, want {want}")]
    IntrinsicGasTooLow { have: u64, want: u64 },

    #[error("Gas uint64 overflow")]
    GasUintOverflow,

    #[error("Max priority fee per gas higher than max fee per gas")]
    TipAboveFeeCap,

    // ---- epoch rules ----
    #[error("Event is not relevant to the current epoch")]
    NotRelevant,

    #[error("Event creator isn't a validator: {0}")]
    UnknownCreator(ValidatorId),

    #[error("Too many parents")]
    TooManyParents,

    #[error("Too big extra data")]
    TooBigExtra,

    #[error("Too big gas power used")]
    TooBigGasUsed,

    #[error("Wrong gas power used: declared {declared}, expected {expected}")]
    WrongGasUsed { declared: u64, expected: u64 },

    #[error("Unsupported tx type {0}")]
    UnsupportedTxType(u8),

    #[error("Transaction underpriced")]
    Underpriced,

    // ---- DAG structure (parents) ----
    #[error("Unknown parent")]
    UnknownParent,

    #[error("Wrong self-parent")]
    WrongSelfParent,

    #[error("Event has wrong sequence number")]
    WrongSeq,

    #[error("Event has lower claimed time than self-parent")]
    PastTime,

    #[error("Two parents from the same creator")]
    DoubleParentCreator,

    #[error("Parent created by a cheater")]
    CheaterParent,

    #[error("Event has wrong Lamport time")]
    WrongLamport,

    // ---- gas power ----
    #[error("Wrong gas power left on track {track}: declared {declared}, computed {computed}")]
    WrongGasPowerLeft {
        track: usize,
        declared: u64,
        computed: u64,
    },

    // ---- proposal protocol ----
    #[error("Proposals are not allowed before single-proposer block formation")]
    ProposalNotAllowed,

    #[error("Sync state advanced without a proposal")]
    SyncStateAdvancedWithoutProposal,

    #[error("Invalid proposal sync state")]
    InvalidSyncState,

    #[error("Proposal turn does not advance")]
    InvalidProposalTurn,

    #[error("Proposal block number is not the next block")]
    InvalidProposalBlock,

    #[error("Creator is not the proposer of this turn")]
    NotTheProposer,

    // ---- cryptographic (heavy) ----
    #[error("Event signature mismatch")]
    WrongEventSignature,

    #[error("Unknown block votes epoch {0}")]
    UnknownEpochBlockVotes(Epoch),

    #[error("Validator public key changed since the voted epoch")]
    PubkeyChanged,

    #[error("Malformed transaction signature")]
    MalformedTxSignature,

    #[error("Event has wrong payload hash")]
    WrongPayloadHash,

    // ---- shutdown ----
    #[error("Heavy check pool is terminated")]
    Terminated,
}

/// Class of an admission error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed event, discarded without retry.
    Malformed,
    /// Event belongs to another epoch; soft skip.
    NotRelevant,
    /// DAG ordering violation.
    DagViolation,
    /// Declared gas power does not match the recomputed value.
    GasPower,
    /// Proposal protocol violation.
    Proposal,
    /// Bad signature, key or payload hash.
    Cryptographic,
    /// Pool shut down; says nothing about the event.
    Terminated,
}

impl AdmissionError {
    /// Error class.
    pub fn kind(&self) -> ErrorKind {
        use AdmissionError::*;
        match self {
            WrongNetForkId | NotInitialized | HugeValue | NoParents | ZeroTime
            | MalformedBlockVotes | IntrinsicGasTooLow { .. } | GasUintOverflow
            | TipAboveFeeCap | TooManyParents | TooBigExtra | TooBigGasUsed
            | WrongGasUsed { .. } | UnsupportedTxType(_) | Underpriced => ErrorKind::Malformed,
            NotRelevant => ErrorKind::NotRelevant,
            UnknownParent | WrongSelfParent | WrongSeq | PastTime | DoubleParentCreator
            | CheaterParent | WrongLamport => ErrorKind::DagViolation,
            WrongGasPowerLeft { .. } => ErrorKind::GasPower,
            ProposalNotAllowed
            | SyncStateAdvancedWithoutProposal
            | InvalidSyncState
            | InvalidProposalTurn
            | InvalidProposalBlock
            | NotTheProposer => ErrorKind::Proposal,
            UnknownCreator(_) | WrongEventSignature | UnknownEpochBlockVotes(_)
            | PubkeyChanged | MalformedTxSignature | WrongPayloadHash => ErrorKind::Cryptographic,
            Terminated => ErrorKind::Terminated,
        }
    }

    /// Soft epoch mismatch.
    pub fn is_not_relevant(&self) -> bool {
        self.kind() == ErrorKind::NotRelevant
    }

    /// Whether the sending peer may be penalized for this event.
    ///
    /// Unknown parents only mean the local DAG is behind.
    pub fn penalizes_peer(&self) -> bool {
        !matches!(
            self,
            AdmissionError::NotRelevant | AdmissionError::Terminated | AdmissionError::UnknownParent
        )
    }
}

/// Result alias for admission operations.
pub type Result<T> = std::result::Result<T, AdmissionError>;
