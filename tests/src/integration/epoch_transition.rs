//! # Epoch Transition
//!
//! Snapshot swaps on the `EpochSnapshotStore` while events keep flowing.
//!
//! ## Flows Tested:
//!
//! 1. **Stale events**: previous-epoch events become `NotRelevant` (soft)
//! 2. **Gas power carry-over**: the first event of an epoch resumes from the
//!    previous epoch's last event plus the refund
//! 3. **Block votes**: votes for a past epoch need that epoch's unchanged key
//! 4. **Atomic swaps**: concurrent readers never observe a mixed context

#[cfg(test)]
mod tests {
    use crate::integration::harness::{draft, epoch_state, Network};
    use qc_18_event_admission::{
        calc_validator_gas_power, AdmissionError, EmitError, EmitterConfig, EpochReader,
        EventAdmissionApi, GasPowerReader, PrevEpochEvent, Rules, SelfEventEmitter,
        ValidatorState,
    };
    use shared_crypto::Secp256k1KeyPair;
    use shared_types::{
        BlockVotes, DagEvent, Event, EventBuilder, EventId, EventPayload, GAS_POWER_CONFIGS,
        NANOS_PER_SEC,
    };
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    const REFUND: u64 = 5_000;

    fn carry_over(event: &Event) -> HashMap<u32, ValidatorState> {
        HashMap::from([(
            event.creator(),
            ValidatorState {
                prev_epoch_event: Some(PrevEpochEvent {
                    id: event.id(),
                    gas_power_left: event.gas_power_left(),
                }),
                gas_refund: REFUND,
            },
        )])
    }

    fn admitted_genesis(net: &Network, creator: u32) -> Arc<Event> {
        let event = net
            .emitter(creator)
            .emit(draft(1, 1, 1, 2, vec![]), &[])
            .unwrap();
        net.service.submit(Arc::clone(&event), None).unwrap();
        assert!(net.wait_admitted(&event.id()));
        event
    }

    #[test]
    fn test_previous_epoch_event_not_relevant() {
        let net = Network::new(4, Rules::default());
        let late = net.emitter(2).emit(draft(1, 1, 1, 2, vec![]), &[]).unwrap();

        assert!(net.advance_epoch(2, 10 * NANOS_PER_SEC, 50, HashMap::new()));
        let err = net.service.submit(late, None).unwrap_err();

        assert_eq!(err, AdmissionError::NotRelevant);
        assert!(err.is_not_relevant());
        assert!(!err.penalizes_peer());
    }

    #[test]
    fn test_first_event_resumes_carried_gas_power() {
        let net = Network::new(4, Rules::default());
        let last = admitted_genesis(&net, 1);

        let epoch_start = 10 * NANOS_PER_SEC;
        assert!(net.advance_epoch(2, epoch_start, 50, carry_over(&last)));

        let first = net
            .emitter(1)
            .emit(draft(2, 1, 1, 11, vec![]), &[])
            .unwrap();
        net.service.submit(Arc::clone(&first), None).unwrap();
        assert!(net.wait_admitted(&first.id()));

        let ctx = net.store.get_validation_context();
        assert_eq!(ctx.epoch, 2);
        for track in 0..GAS_POWER_CONFIGS {
            let prev_left = last.gas_power_left().gas[track];
            let with_refund = calc_validator_gas_power(
                first.as_ref(),
                first.median_time(),
                epoch_start,
                prev_left + REFUND,
                &ctx.validators,
                &ctx.configs[track],
            );
            let without_refund = calc_validator_gas_power(
                first.as_ref(),
                first.median_time(),
                epoch_start,
                prev_left,
                &ctx.validators,
                &ctx.configs[track],
            );

            let declared = first.gas_power_left().gas[track] + first.gas_power_used();
            assert_eq!(declared, with_refund);
            assert_ne!(declared, without_refund);
        }
    }

    fn voting(epoch: u32, seq: u32, secs: u64, parents: Vec<EventId>) -> EventBuilder {
        draft(epoch, seq, 1, secs, parents).with_payload(EventPayload {
            block_votes: BlockVotes {
                epoch: epoch - 1,
                start: 1,
                votes: vec![[0x0B; 32], [0x0C; 32]],
            },
            ..Default::default()
        })
    }

    #[test]
    fn test_block_votes_for_previous_epoch() {
        let net = Network::new(4, Rules::default());
        assert!(net.advance_epoch(2, 10 * NANOS_PER_SEC, 50, HashMap::new()));

        let event = net.emitter(3).emit(voting(2, 1, 12, vec![]), &[]).unwrap();
        assert_eq!(event.payload().block_votes.votes.len(), 2);
        net.service.submit(Arc::clone(&event), None).unwrap();
        assert!(net.wait_admitted(&event.id()));
    }

    #[test]
    fn test_block_votes_after_key_rotation() {
        let net = Network::new(4, Rules::default());

        let mut rotated: HashMap<_, _> = net
            .keys
            .iter()
            .map(|(id, k)| (*id, Secp256k1KeyPair::from_bytes(k.to_bytes()).unwrap()))
            .collect();
        rotated.insert(3, Secp256k1KeyPair::generate());
        let state = epoch_state(&rotated, &net.rules, 2, 10 * NANOS_PER_SEC, 50, HashMap::new());
        assert!(net.store.apply_epoch(state));

        // Validator 3 signs with its new key but votes for epoch 1.
        let emitter = SelfEventEmitter::new(
            3,
            Secp256k1KeyPair::from_bytes(rotated[&3].to_bytes()).unwrap(),
            EmitterConfig::default(),
            Arc::clone(&net.store),
            net.service.checkers(),
            net.service.heavy(),
        );
        let err = emitter.emit(voting(2, 1, 12, vec![]), &[]).unwrap_err();
        assert!(matches!(
            err,
            EmitError::Rejected(AdmissionError::PubkeyChanged)
        ));
    }

    #[test]
    fn test_votes_for_forgotten_epoch() {
        let net = Network::new(4, Rules::default());
        let store = &net.store;
        for epoch in 2..=8 {
            let start = u64::from(epoch) * 10 * NANOS_PER_SEC;
            assert!(net.advance_epoch(epoch, start, 50, HashMap::new()));
        }
        assert_eq!(store.epoch(), 8);

        let stale_votes = draft(8, 1, 1, 90, vec![]).with_payload(EventPayload {
            block_votes: BlockVotes {
                epoch: 1,
                start: 1,
                votes: vec![[0x0B; 32]],
            },
            ..Default::default()
        });
        let err = net.emitter(1).emit(stale_votes, &[]).unwrap_err();
        assert!(matches!(
            err,
            EmitError::Rejected(AdmissionError::UnknownEpochBlockVotes(1))
        ));
    }

    #[test]
    fn test_concurrent_readers_see_whole_snapshots() {
        let net = Network::new(4, Rules::default());
        let store = Arc::clone(&net.store);
        let done = Arc::new(AtomicBool::new(false));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                let done = Arc::clone(&done);
                thread::spawn(move || {
                    let mut observed = 0u32;
                    while !done.load(Ordering::Acquire) {
                        let ctx = store.get_validation_context();
                        // Each context carries its own epoch's start time.
                        if ctx.epoch > 1 {
                            assert_eq!(ctx.epoch_start, u64::from(ctx.epoch) * 1_000);
                        }
                        let (validators, epoch) = store.get_epoch_validators();
                        assert_eq!(validators.len(), 4);
                        observed = observed.max(epoch);
                    }
                    observed
                })
            })
            .collect();

        for epoch in 2..=200 {
            let state = epoch_state(
                &net.keys,
                &net.rules,
                epoch,
                u64::from(epoch) * 1_000,
                u64::from(epoch),
                HashMap::new(),
            );
            assert!(store.apply_epoch(state));
        }
        done.store(true, Ordering::Release);

        for reader in readers {
            assert!(reader.join().unwrap() <= 200);
        }
        assert_eq!(store.get_epoch_rules().1, 200);
    }
}
