//! # Checkers
//!
//! Fixed synchronous pipeline `basic → epoch → parents → gas_power → proposal`.
//! Stages are data: an ordered list iterated with early return, so the first
//! failing stage's error is returned verbatim and later stages never run.

use crate::checks::{
    BasicValidator, CheckInput, EpochValidator, EventCheck, GasPowerValidator, ParentsValidator,
    ProposalValidator,
};
use crate::domain::Result;
use crate::metrics;
use crate::ports::outbound::{AdmissionReader, EpochReader};
use shared_types::{DagEvent, Event};
use std::sync::Arc;

/// Ordered synchronous admission stages.
pub struct Checkers {
    stages: Vec<Box<dyn EventCheck>>,
    epoch_reader: Arc<dyn EpochReader>,
}

impl Checkers {
    /// Standard pipeline over one reader.
    pub fn new<R: AdmissionReader + 'static>(reader: Arc<R>) -> Self {
        let stages: Vec<Box<dyn EventCheck>> = vec![
            Box::new(BasicValidator::new()),
            Box::new(EpochValidator::new(Arc::clone(&reader))),
            Box::new(ParentsValidator::new(Arc::clone(&reader))),
            Box::new(GasPowerValidator::new(Arc::clone(&reader))),
            Box::new(ProposalValidator::new(Arc::clone(&reader))),
        ];
        Self {
            stages,
            epoch_reader: reader,
        }
    }

    /// Custom pipeline; `epoch_reader` supplies the active revision.
    pub fn from_stages(stages: Vec<Box<dyn EventCheck>>, epoch_reader: Arc<dyn EpochReader>) -> Self {
        Self {
            stages,
            epoch_reader,
        }
    }

    /// Stage names in execution order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage, stopping at the first error.
    pub fn validate(&self, event: &dyn DagEvent, self_parent: Option<&Event>) -> Result<()> {
        let (rules, _) = self.epoch_reader.get_epoch_rules();
        let input = CheckInput {
            event,
            self_parent,
            revision: rules.revision(),
        };

        for stage in &self.stages {
            if let Err(e) = stage.check(&input) {
                tracing::debug!(
                    stage = stage.name(),
                    creator = event.creator(),
                    epoch = event.epoch(),
                    seq = event.seq(),
                    error = %e,
                    "Event rejected"
                );
                metrics::record_event_rejected(stage.name());
                return Err(e);
            }
        }
        metrics::record_event_checked();
        Ok(())
    }
}
