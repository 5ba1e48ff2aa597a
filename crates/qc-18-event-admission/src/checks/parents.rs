//! DAG structure checks against the event's parents

use super::{CheckInput, EventCheck};
use crate::domain::{AdmissionError, Result};
use crate::ports::outbound::ParentsReader;
use shared_types::{DagEvent, Event};
use std::collections::HashSet;
use std::sync::Arc;

/// Checks seq, time, creator uniqueness and Lamport time against parents.
pub struct ParentsValidator<R: ParentsReader> {
    reader: Arc<R>,
}

impl<R: ParentsReader> ParentsValidator<R> {
    /// Create with a reader.
    pub fn new(reader: Arc<R>) -> Self {
        Self { reader }
    }

    /// Validate `event` against its parents.
    pub fn validate(&self, event: &dyn DagEvent, self_parent: Option<&Event>) -> Result<()> {
        let parents = event
            .parents()
            .iter()
            .map(|id| self.reader.get_event(id).ok_or(AdmissionError::UnknownParent))
            .collect::<Result<Vec<_>>>()?;

        match (event.self_parent(), self_parent) {
            (Some(declared), Some(sp)) => {
                if sp.id() != *declared || sp.creator() != event.creator() {
                    return Err(AdmissionError::WrongSelfParent);
                }
                if sp.seq().checked_add(1) != Some(event.seq()) {
                    return Err(AdmissionError::WrongSeq);
                }
                if event.creation_time() <= sp.creation_time() {
                    return Err(AdmissionError::PastTime);
                }
            }
            (None, None) => {
                if event.seq() != 1 {
                    return Err(AdmissionError::WrongSeq);
                }
            }
            _ => return Err(AdmissionError::WrongSelfParent),
        }

        let has_self_parent = event.self_parent().is_some();
        let mut creators = HashSet::with_capacity(parents.len());
        for (i, parent) in parents.iter().enumerate() {
            if !creators.insert(parent.creator()) {
                return Err(AdmissionError::DoubleParentCreator);
            }
            if i == 0 && has_self_parent {
                continue;
            }
            if parent.creator() == event.creator() {
                return Err(AdmissionError::DoubleParentCreator);
            }
            if self.reader.is_cheater(parent.creator()) {
                return Err(AdmissionError::CheaterParent);
            }
        }

        let max_lamport = parents.iter().map(|p| p.lamport()).max().unwrap_or(0);
        if max_lamport.checked_add(1) != Some(event.lamport()) {
            return Err(AdmissionError::WrongLamport);
        }
        Ok(())
    }
}

impl<R: ParentsReader> EventCheck for ParentsValidator<R> {
    fn name(&self) -> &'static str {
        "parents"
    }

    fn check(&self, input: &CheckInput<'_>) -> Result<()> {
        self.validate(input.event, input.self_parent)
    }
}
