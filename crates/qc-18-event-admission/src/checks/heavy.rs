//! # Heavy Check
//!
//! Cryptographic validation of a signed event:
//!
//! 1. Public-key snapshot must be for the event's epoch (`NotRelevant`)
//! 2. Creator key must exist (`UnknownCreator`)
//! 3. Event signature over `hash_to_sign` (`WrongEventSignature`)
//! 4. Block votes: voted epoch known and creator key unchanged since then
//! 5. Sender recovery of every transaction, in parallel (`MalformedTxSignature`)
//! 6. Payload hash recomputation (`WrongPayloadHash`)
//!
//! `HeavyValidator` runs the same check on a bounded worker pool.

use crate::adapters::sender_cache::SenderCache;
use crate::config::HeavyCheckConfig;
use crate::domain::{AdmissionError, Result};
use crate::metrics;
use crate::ports::outbound::HeavyCheckReader;
use crate::workers::WorkerPool;
use rayon::prelude::*;
use shared_crypto::recover_address;
use shared_types::{DagEvent, Event, Transaction};
use std::sync::Arc;
use std::time::Instant;

/// Synchronous heavy check.
pub struct HeavyCheck<R: HeavyCheckReader> {
    reader: Arc<R>,
    sender_cache: Arc<SenderCache>,
}

impl<R: HeavyCheckReader> HeavyCheck<R> {
    /// Create with a reader and the shared sender cache.
    pub fn new(reader: Arc<R>, sender_cache: Arc<SenderCache>) -> Self {
        Self {
            reader,
            sender_cache,
        }
    }

    /// Run every heavy check on `event`.
    #[tracing::instrument(
        skip(self, event),
        fields(event_id = %hex::encode(&event.id()[..8]), creator = event.creator(), epoch = event.epoch())
    )]
    pub fn validate_event(&self, event: &Event) -> Result<()> {
        let start = Instant::now();
        let result = self.validate_inner(event);
        metrics::record_heavy_latency(start.elapsed().as_secs_f64());

        if let Err(e) = &result {
            tracing::debug!(error = %e, "Heavy check failed");
        }
        result
    }

    fn validate_inner(&self, event: &Event) -> Result<()> {
        let pub_keys = self.reader.get_epoch_pub_keys();
        if pub_keys.epoch != event.epoch() {
            return Err(AdmissionError::NotRelevant);
        }

        let key = pub_keys
            .get(event.creator())
            .ok_or(AdmissionError::UnknownCreator(event.creator()))?;

        key.verify_prehash(&event.hash_to_sign(), event.signature())
            .map_err(|_| AdmissionError::WrongEventSignature)?;

        let block_votes = &event.payload().block_votes;
        if !block_votes.is_empty() {
            let voted_epoch = block_votes.epoch;
            if self.reader.get_epoch_block_start(voted_epoch).is_none() {
                return Err(AdmissionError::UnknownEpochBlockVotes(voted_epoch));
            }
            let voted_key = self
                .reader
                .get_epoch_pub_keys_of(voted_epoch)
                .and_then(|keys| keys.get(event.creator()).copied())
                .ok_or(AdmissionError::UnknownEpochBlockVotes(voted_epoch))?;
            if voted_key != *key {
                return Err(AdmissionError::PubkeyChanged);
            }
        }

        self.validate_tx_senders(&event.payload().transactions)?;

        if event.payload().hash() != event.payload_hash() {
            return Err(AdmissionError::WrongPayloadHash);
        }
        Ok(())
    }

    /// Recover every sender, warming the cache.
    fn validate_tx_senders(&self, txs: &[Transaction]) -> Result<()> {
        txs.par_iter().try_for_each(|tx| {
            let tx_hash = tx.hash();
            if self.sender_cache.get(&tx_hash).is_some() {
                return Ok(());
            }
            let sender = recover_address(&tx.signing_hash(), &tx.signature)
                .map_err(|_| AdmissionError::MalformedTxSignature)?;
            self.sender_cache.insert(tx_hash, sender);
            Ok(())
        })
    }
}

/// Completion callback of a queued heavy check.
pub type OnValidated = Box<dyn FnOnce(Result<()>) + Send>;

struct HeavyTask {
    event: Arc<Event>,
    on_validated: OnValidated,
}

/// Heavy check on a bounded worker pool.
pub struct HeavyValidator<R: HeavyCheckReader + 'static> {
    check: Arc<HeavyCheck<R>>,
    pool: WorkerPool<HeavyTask>,
}

impl<R: HeavyCheckReader + 'static> HeavyValidator<R> {
    /// Create an idle validator; call `start` before relying on callbacks.
    pub fn new(reader: Arc<R>, sender_cache: Arc<SenderCache>, config: &HeavyCheckConfig) -> Self {
        let check = Arc::new(HeavyCheck::new(reader, sender_cache));
        let worker_check = Arc::clone(&check);
        let pool = WorkerPool::new(
            "heavy-check",
            config.resolved_threads(),
            config.max_queued_tasks,
            move |task: HeavyTask| {
                let result = worker_check.validate_event(&task.event);
                (task.on_validated)(result);
            },
        )
        .with_queue_gauge(metrics::set_heavy_queue_len);
        Self { check, pool }
    }

    /// Spawn the workers.
    pub fn start(&self) {
        self.pool.start();
    }

    /// Stop accepting tasks, drain the queue and join the workers.
    pub fn stop(&self) {
        self.pool.stop();
    }

    /// Run the heavy check on the calling thread.
    pub fn validate_event(&self, event: &Event) -> Result<()> {
        self.check.validate_event(event)
    }

    /// Queue `event`; `on_validated` is invoked exactly once by a worker.
    ///
    /// # Errors
    /// * `AdmissionError::Terminated` - the pool was stopped
    pub fn enqueue_event(
        &self,
        event: Arc<Event>,
        on_validated: impl FnOnce(Result<()>) + Send + 'static,
    ) -> Result<()> {
        self.pool.enqueue(HeavyTask {
            event,
            on_validated: Box::new(on_validated),
        })
    }

    /// Queue `event` and await its result.
    ///
    /// While the queue is full the task waits for space without blocking
    /// the executor thread.
    pub async fn validate_async(&self, event: Arc<Event>) -> Result<()> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let task = HeavyTask {
            event,
            on_validated: Box::new(move |result| {
                let _ = tx.send(result);
            }),
        };
        self.pool.enqueue_async(task).await?;
        rx.await.unwrap_or(Err(AdmissionError::Terminated))
    }

    /// Queue more than half full.
    pub fn overloaded(&self) -> bool {
        self.pool.overloaded()
    }

    /// Tasks waiting for a worker.
    pub fn queue_len(&self) -> usize {
        self.pool.len()
    }
}
