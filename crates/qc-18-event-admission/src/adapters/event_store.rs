//! In-memory event store
//!
//! Holds admitted events by id. Serves parent and payload lookups and doubles
//! as the admitted-event sink when the pipeline is embedded without a DAG
//! engine.

use crate::ports::outbound::AdmittedEventSink;
use parking_lot::RwLock;
use shared_types::{DagEvent, Epoch, Event, EventId, EventPayload};
use std::collections::HashMap;
use std::sync::Arc;

/// Admitted events keyed by id.
#[derive(Default)]
pub struct InMemoryEventStore {
    events: RwLock<HashMap<EventId, Arc<Event>>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an event; returns false if it was already present.
    pub fn insert(&self, event: Arc<Event>) -> bool {
        let mut events = self.events.write();
        if events.contains_key(&event.id()) {
            return false;
        }
        events.insert(event.id(), event);
        true
    }

    pub fn get_event(&self, id: &EventId) -> Option<Arc<Event>> {
        self.events.read().get(id).cloned()
    }

    pub fn get_event_payload(&self, id: &EventId) -> Option<Arc<EventPayload>> {
        self.events.read().get(id).map(|e| e.payload_arc())
    }

    pub fn contains(&self, id: &EventId) -> bool {
        self.events.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every event of an epoch older than `epoch`.
    pub fn prune_before(&self, epoch: Epoch) {
        self.events.write().retain(|_, e| e.epoch() >= epoch);
    }
}

impl AdmittedEventSink for InMemoryEventStore {
    fn on_admitted(&self, event: Arc<Event>) {
        self.insert(event);
    }
}
