//! # Integration Flows
//!
//! Exercise `qc-18-event-admission` end to end against the real snapshot
//! store, event store and heavy check pool.

#[cfg(test)]
pub(crate) mod harness;

pub mod admission_flow;
pub mod epoch_transition;
