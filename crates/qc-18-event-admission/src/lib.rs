//! # Event Admission Subsystem (QC-18)
//!
//! Decides whether a DAG event, received from a peer or built locally, may
//! enter the event graph.
//!
//! ## Architecture
//!
//! This subsystem follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): Rules, validator sets, gas power formulas, errors
//! - **Checks** (`checks/`): One module per admission stage
//! - **Ports Layer** (`ports/`): Inbound API and the narrow reader/sink traits
//! - **Adapters** (`adapters/`): Snapshot store, in-memory event store, sender cache
//! - **Service Layer** (`service.rs`): Wires checks and the heavy pool to ports
//!
//! ## Pipeline
//!
//! ```text
//! basic → epoch → parents → gas_power → proposal   (caller thread, fail fast)
//!                                          │
//!                                          ▼
//!                               heavy (worker pool)
//!                       signature, tx senders, payload hash
//! ```
//!
//! ## Error Identity
//!
//! Every rejection is a distinct `AdmissionError` variant. `NotRelevant` and
//! `UnknownParent` are soft (stale or premature events); the rest are hard
//! rejections that `penalizes_peer()` reports.
//!
//! ## Gas Power
//!
//! Gas power is deterministic given prior events, so the emitter and the
//! validator share one accountant and must agree exactly.

pub mod adapters;
pub mod checkers;
pub mod checks;
pub mod config;
pub mod domain;
pub mod emitter;
pub mod metrics;
pub mod ports;
pub mod service;
pub mod workers;

#[cfg(test)]
mod test_support;

// Re-export public API
pub use adapters::{EpochSnapshotStore, EpochState, InMemoryEventStore, SenderCache};
pub use checkers::Checkers;
pub use checks::{
    calc_gas_power_used, CheckInput, EventCheck, GasPowerAccountant, HeavyCheck, HeavyValidator,
};
pub use config::{AdmissionConfig, EmitterConfig, HeavyCheckConfig};
pub use domain::{
    calc_validator_gas_power, calc_validator_gas_power_per_sec, intrinsic_gas, AdmissionError,
    EpochPubKeys, ErrorKind, GasPowerConfig, PrevEpochEvent, Result, Revision, Rules,
    ValidationContext, ValidatorState, Validators,
};
pub use emitter::{max_gas_power_to_use, EmitError, SelfEventEmitter};
pub use ports::inbound::EventAdmissionApi;
pub use ports::outbound::{
    AdmissionReader, AdmittedEventSink, EpochReader, GasPowerReader, HeavyCheckReader,
    ParentsReader, ProposalReader, RejectedEventSink,
};
pub use service::EventAdmissionService;
pub use workers::{PoolState, TryEnqueueError, WorkerPool};
