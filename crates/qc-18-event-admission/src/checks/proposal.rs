//! Single-proposer protocol checks
//!
//! The sync state carried by an event may only progress beyond what its
//! parents already saw when the event attaches a proposal itself.

use super::{CheckInput, EventCheck};
use crate::domain::{AdmissionError, Result};
use crate::ports::outbound::ProposalReader;
use shared_types::{DagEvent, ProposalSyncState};
use std::sync::Arc;

/// Validates proposals and proposal sync states.
pub struct ProposalValidator<R: ProposalReader> {
    reader: Arc<R>,
}

impl<R: ProposalReader> ProposalValidator<R> {
    /// Create with a reader.
    pub fn new(reader: Arc<R>) -> Self {
        Self { reader }
    }

    /// Join of the parents' sync states.
    fn joined_parent_state(&self, event: &dyn DagEvent) -> Result<ProposalSyncState> {
        event
            .parents()
            .iter()
            .try_fold(ProposalSyncState::default(), |joined, id| {
                let payload = self
                    .reader
                    .get_event_payload(id)
                    .ok_or(AdmissionError::UnknownParent)?;
                Ok(joined.join(payload.sync_state))
            })
    }

    /// Validate the proposal fields of `event`.
    pub fn validate(&self, event: &dyn DagEvent) -> Result<()> {
        let (rules, _) = self.reader.get_epoch_rules();
        let payload = event.payload();

        if !rules.upgrades.single_proposer_block_formation {
            if payload.proposal.is_some() || payload.sync_state != ProposalSyncState::default() {
                return Err(AdmissionError::ProposalNotAllowed);
            }
            return Ok(());
        }

        let joined = self.joined_parent_state(event)?;
        let state = payload.sync_state;

        let Some(proposal) = &payload.proposal else {
            if state == joined {
                return Ok(());
            }
            if state.advances(&joined) {
                return Err(AdmissionError::SyncStateAdvancedWithoutProposal);
            }
            return Err(AdmissionError::InvalidSyncState);
        };

        let turn = state.last_seen_proposal_turn;
        if turn <= joined.last_seen_proposal_turn {
            return Err(AdmissionError::InvalidProposalTurn);
        }
        if joined.last_seen_proposed_block.checked_add(1) != Some(proposal.number) {
            return Err(AdmissionError::InvalidProposalBlock);
        }

        let (validators, _) = self.reader.get_epoch_validators();
        if validators.proposer_for_turn(event.epoch(), turn) != Some(event.creator()) {
            return Err(AdmissionError::NotTheProposer);
        }

        if state.last_seen_proposed_block != proposal.number
            || state.last_seen_proposal_frame != event.frame()
        {
            return Err(AdmissionError::InvalidSyncState);
        }
        Ok(())
    }
}

impl<R: ProposalReader> EventCheck for ProposalValidator<R> {
    fn name(&self) -> &'static str {
        "proposal"
    }

    fn check(&self, input: &CheckInput<'_>) -> Result<()> {
        self.validate(input.event)
    }
}
