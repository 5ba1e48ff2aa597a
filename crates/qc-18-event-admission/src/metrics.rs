//! # Admission Metrics
//!
//! Prometheus metrics for the admission pipeline.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! qc-18-event-admission = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `admission_events_checked_total` - Events that passed the synchronous checks
//! - `admission_events_rejected_total` - Rejections by stage
//! - `admission_events_admitted_total` - Events that passed the heavy check
//! - `admission_heavy_latency_seconds` - Histogram of heavy check times
//! - `admission_heavy_queue_len` - Tasks waiting for a heavy worker
//! - `admission_events_emitted_total` - Self events emitted

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Histogram, IntCounter, IntCounterVec, IntGauge,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Events that passed the synchronous checks
    pub static ref EVENTS_CHECKED: IntCounter = register_int_counter!(
        "admission_events_checked_total",
        "Total number of events that passed the synchronous checks"
    )
    .expect("Failed to create EVENTS_CHECKED metric");

    /// Rejections labeled by stage
    pub static ref EVENTS_REJECTED: IntCounterVec = register_int_counter_vec!(
        "admission_events_rejected_total",
        "Total number of events rejected",
        &["stage"]
    )
    .expect("Failed to create EVENTS_REJECTED metric");

    /// Events that passed the heavy check
    pub static ref EVENTS_ADMITTED: IntCounter = register_int_counter!(
        "admission_events_admitted_total",
        "Total number of events admitted"
    )
    .expect("Failed to create EVENTS_ADMITTED metric");

    /// Heavy check latency
    pub static ref HEAVY_LATENCY: Histogram = register_histogram!(
        "admission_heavy_latency_seconds",
        "Time taken by the heavy check in seconds",
        vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]
    )
    .expect("Failed to create HEAVY_LATENCY metric");

    /// Heavy queue depth
    pub static ref HEAVY_QUEUE_LEN: IntGauge = register_int_gauge!(
        "admission_heavy_queue_len",
        "Tasks waiting for a heavy check worker"
    )
    .expect("Failed to create HEAVY_QUEUE_LEN metric");

    /// Self events emitted
    pub static ref EVENTS_EMITTED: IntCounter = register_int_counter!(
        "admission_events_emitted_total",
        "Total number of self events emitted"
    )
    .expect("Failed to create EVENTS_EMITTED metric");
}

/// Record an event passing the synchronous checks
#[cfg(feature = "metrics")]
pub fn record_event_checked() {
    EVENTS_CHECKED.inc();
}

/// Record a rejection at `stage`
#[cfg(feature = "metrics")]
pub fn record_event_rejected(stage: &str) {
    EVENTS_REJECTED.with_label_values(&[stage]).inc();
}

/// Record an admitted event
#[cfg(feature = "metrics")]
pub fn record_event_admitted() {
    EVENTS_ADMITTED.inc();
}

/// Record heavy check latency
#[cfg(feature = "metrics")]
pub fn record_heavy_latency(seconds: f64) {
    HEAVY_LATENCY.observe(seconds);
}

/// Record heavy queue depth
#[cfg(feature = "metrics")]
pub fn set_heavy_queue_len(len: usize) {
    HEAVY_QUEUE_LEN.set(len as i64);
}

/// Record an emitted self event
#[cfg(feature = "metrics")]
pub fn record_event_emitted() {
    EVENTS_EMITTED.inc();
}

// No-op implementations when metrics feature is disabled
#[cfg(not(feature = "metrics"))]
pub fn record_event_checked() {}

#[cfg(not(feature = "metrics"))]
pub fn record_event_rejected(_stage: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_event_admitted() {}

#[cfg(not(feature = "metrics"))]
pub fn record_heavy_latency(_seconds: f64) {}

#[cfg(not(feature = "metrics"))]
pub fn set_heavy_queue_len(_len: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn record_event_emitted() {}
