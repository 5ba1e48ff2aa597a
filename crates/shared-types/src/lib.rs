//! # Shared Types Crate
//!
//! DAG events, their payloads and transactions, shared by the admission
//! pipeline, the local emitter and the integration tests.
//!
//! ## Design Principles
//!
//! - **Immutable events**: an `Event` has no setters; it is produced once by
//!   `EventBuilder::build` and identified by the hash of its signed form.
//! - **One read view**: `DagEvent` is implemented by both `Event` and
//!   `EventBuilder`, so validation code never distinguishes the two.

pub mod entities;
pub mod event;
pub mod transaction;

pub use entities::*;
pub use event::{BlockVotes, DagEvent, Event, EventBuilder, EventPayload, Proposal, ProposalSyncState};
pub use transaction::{AccessTuple, Authorization, Transaction, TxType};
