//! # Inbound Ports (Driving Ports / API)
//!
//! Entry points used by the gossip layer.

use crate::domain::Result;
use shared_types::Event;
use std::sync::Arc;

/// Event admission API.
pub trait EventAdmissionApi: Send + Sync {
    /// Run the synchronous checks only.
    ///
    /// # Errors
    /// The first failing stage's error, unwrapped.
    fn validate(&self, event: &Event, self_parent: Option<&Event>) -> Result<()>;

    /// Run the synchronous checks and schedule the heavy check.
    ///
    /// The heavy result is delivered to the service's sinks, never returned
    /// here.
    ///
    /// # Errors
    /// * Synchronous check failure
    /// * `AdmissionError::Terminated` - heavy pool stopped
    fn submit(&self, event: Arc<Event>, self_parent: Option<&Event>) -> Result<()>;

    /// Back-pressure signal for upstream ingestion.
    fn overloaded(&self) -> bool;
}
