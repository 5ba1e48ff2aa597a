//! # Event Admission Service
//!
//! Wires the synchronous `Checkers` and the pooled heavy check into the
//! inbound API.
//!
//! ## Flow
//!
//! 1. `submit` runs every synchronous stage on the caller's thread; the first
//!    failure is returned to the caller
//! 2. The event is queued for the heavy check
//! 3. A worker validates it, takes the processing lock, and hands the event
//!    to the admitted or rejected sink
//!
//! Heavy checks run in parallel; their effects are serialized by the
//! processing lock. Callers must not hold that lock while calling `submit`,
//! since a full queue waits on workers that need it.

use crate::adapters::SenderCache;
use crate::checkers::Checkers;
use crate::checks::HeavyValidator;
use crate::config::AdmissionConfig;
use crate::domain::Result;
use crate::metrics;
use crate::ports::inbound::EventAdmissionApi;
use crate::ports::outbound::{
    AdmissionReader, AdmittedEventSink, HeavyCheckReader, RejectedEventSink,
};
use parking_lot::Mutex;
use shared_types::{DagEvent, Event};
use std::sync::Arc;

/// Event admission service.
pub struct EventAdmissionService<R, S, J>
where
    R: AdmissionReader + HeavyCheckReader + 'static,
    S: AdmittedEventSink + 'static,
    J: RejectedEventSink + 'static,
{
    checkers: Arc<Checkers>,
    heavy: Arc<HeavyValidator<R>>,
    sender_cache: Arc<SenderCache>,
    processing: Arc<Mutex<()>>,
    admitted: Arc<S>,
    rejected: Arc<J>,
}

impl<R, S, J> EventAdmissionService<R, S, J>
where
    R: AdmissionReader + HeavyCheckReader + 'static,
    S: AdmittedEventSink + 'static,
    J: RejectedEventSink + 'static,
{
    /// Create an idle service; call `start` to spawn heavy check workers.
    pub fn new(reader: Arc<R>, admitted: Arc<S>, rejected: Arc<J>, config: &AdmissionConfig) -> Self {
        let sender_cache = Arc::new(SenderCache::new(config.sender_cache_size()));
        let checkers = Arc::new(Checkers::new(Arc::clone(&reader)));
        let heavy = Arc::new(HeavyValidator::new(
            reader,
            Arc::clone(&sender_cache),
            &config.heavy_check,
        ));

        Self {
            checkers,
            heavy,
            sender_cache,
            processing: Arc::new(Mutex::new(())),
            admitted,
            rejected,
        }
    }

    pub fn start(&self) {
        self.heavy.start();
        tracing::info!("Event admission started");
    }

    /// Drain queued heavy checks and stop the workers.
    pub fn stop(&self) {
        self.heavy.stop();
        tracing::info!("Event admission stopped");
    }

    /// Lock serializing admission effects with other DAG mutations.
    pub fn processing_lock(&self) -> Arc<Mutex<()>> {
        Arc::clone(&self.processing)
    }

    /// Synchronous pipeline, shared with the emitter.
    pub fn checkers(&self) -> Arc<Checkers> {
        Arc::clone(&self.checkers)
    }

    /// Heavy validator, shared with the emitter.
    pub fn heavy(&self) -> Arc<HeavyValidator<R>> {
        Arc::clone(&self.heavy)
    }

    /// Senders recovered by the heavy check.
    pub fn sender_cache(&self) -> Arc<SenderCache> {
        Arc::clone(&self.sender_cache)
    }
}

impl<R, S, J> EventAdmissionApi for EventAdmissionService<R, S, J>
where
    R: AdmissionReader + HeavyCheckReader + 'static,
    S: AdmittedEventSink + 'static,
    J: RejectedEventSink + 'static,
{
    fn validate(&self, event: &Event, self_parent: Option<&Event>) -> Result<()> {
        self.checkers.validate(event, self_parent)
    }

    fn submit(&self, event: Arc<Event>, self_parent: Option<&Event>) -> Result<()> {
        self.checkers.validate(event.as_ref(), self_parent)?;

        let processing = Arc::clone(&self.processing);
        let admitted = Arc::clone(&self.admitted);
        let rejected = Arc::clone(&self.rejected);
        let validated = Arc::clone(&event);

        self.heavy.enqueue_event(event, move |result| {
            let _guard = processing.lock();
            match result {
                Ok(()) => {
                    metrics::record_event_admitted();
                    admitted.on_admitted(validated);
                }
                Err(e) => {
                    metrics::record_event_rejected("heavy");
                    tracing::debug!(
                        event_id = %hex::encode(&validated.id()[..8]),
                        creator = validated.creator(),
                        epoch = validated.epoch(),
                        error = %e,
                        "Event failed heavy check"
                    );
                    rejected.on_rejected(&validated, &e);
                }
            }
        })
    }

    fn overloaded(&self) -> bool {
        self.heavy.overloaded()
    }
}
