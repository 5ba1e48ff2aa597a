//! # Admission Flow
//!
//! Self events built by one validator's emitter are submitted to the shared
//! admission service, the way a peer's events arrive from gossip.
//!
//! ## Flows Tested:
//!
//! 1. **Emit → submit → admit**: genesis events, then a child referencing both
//! 2. **Sync rejection**: tampered gas power is returned to the submitter
//! 3. **Heavy rejection**: forged signatures reach the rejected sink
//! 4. **Cheater parents**: the emitter refuses to build on a known cheater

#[cfg(test)]
mod tests {
    use crate::integration::harness::{draft, resign, transfer, Network};
    use qc_18_event_admission::{AdmissionError, EmitError, EventAdmissionApi, Rules};
    use shared_crypto::Secp256k1KeyPair;
    use shared_types::{DagEvent, Event, GasPowerLeft};
    use std::sync::Arc;

    /// Emit genesis events for validators 1 and 2 and wait for admission.
    fn two_genesis_events(net: &Network) -> (Arc<Event>, Arc<Event>) {
        let sender = Secp256k1KeyPair::generate();
        let e1 = net
            .emitter(1)
            .emit(draft(1, 1, 1, 2, vec![]), &[transfer(&sender, 0, 2)])
            .unwrap();
        let e2 = net.emitter(2).emit(draft(1, 1, 1, 2, vec![]), &[]).unwrap();

        for event in [&e1, &e2] {
            net.service.submit(Arc::clone(event), None).unwrap();
            assert!(net.wait_admitted(&event.id()));
        }
        (e1, e2)
    }

    #[test]
    fn test_emitted_events_are_admitted() {
        let net = Network::new(4, Rules::default());
        let (e1, e2) = two_genesis_events(&net);

        assert_eq!(e1.payload().transactions.len(), 1);
        assert!(e2.payload().transactions.is_empty());
        assert_eq!(net.events.len(), 2);
        assert!(net.rejections.entries.lock().is_empty());

        // Sender recovered once by the heavy check.
        let tx_hash = e1.payload().transactions[0].hash();
        assert!(net.service.sender_cache().get(&tx_hash).is_some());
    }

    #[test]
    fn test_child_event_builds_on_both_parents() {
        let net = Network::new(4, Rules::default());
        let (e1, e2) = two_genesis_events(&net);

        let sender = Secp256k1KeyPair::generate();
        let pending: Vec<_> = (0..5).map(|n| transfer(&sender, n, 1 + n)).collect();
        let e3 = net
            .emitter(1)
            .emit(draft(1, 2, 2, 3, vec![e1.id(), e2.id()]), &pending)
            .unwrap();

        assert_eq!(e3.self_parent(), Some(&e1.id()));
        assert_eq!(e3.payload().transactions.len(), 5);
        // Highest tip first.
        assert_eq!(e3.payload().transactions[0].nonce, 4);

        net.service.submit(Arc::clone(&e3), Some(e1.as_ref())).unwrap();
        assert!(net.wait_admitted(&e3.id()));
    }

    #[test]
    fn test_tampered_gas_power_rejected_synchronously() {
        let net = Network::new(4, Rules::default());
        let (e1, _) = two_genesis_events(&net);

        let honest = net
            .emitter(1)
            .emit(draft(1, 2, 2, 4, vec![e1.id()]), &[])
            .unwrap();
        let left = honest.gas_power_left();
        let inflated = GasPowerLeft::new(left.gas[0] + 1_000, left.gas[1]);
        let tampered = resign(
            honest.to_builder().with_gas_power_left(inflated),
            &net.keys[&1],
        );

        let err = net
            .service
            .submit(Arc::new(tampered), Some(e1.as_ref()))
            .unwrap_err();
        assert!(matches!(
            err,
            AdmissionError::WrongGasPowerLeft { track: 0, .. }
        ));
        assert!(err.penalizes_peer());
    }

    #[test]
    fn test_wrong_self_parent_rejected() {
        let net = Network::new(4, Rules::default());
        let (e1, e2) = two_genesis_events(&net);

        let e3 = net
            .emitter(1)
            .emit(draft(1, 2, 2, 3, vec![e1.id(), e2.id()]), &[])
            .unwrap();
        assert_eq!(
            net.service.validate(&e3, Some(e2.as_ref())),
            Err(AdmissionError::WrongSelfParent)
        );
        assert_eq!(
            net.service.validate(&e3, None),
            Err(AdmissionError::WrongSelfParent)
        );
    }

    #[test]
    fn test_forged_signature_reaches_rejected_sink() {
        let net = Network::new(4, Rules::default());
        let honest = net.emitter(3).emit(draft(1, 1, 1, 2, vec![]), &[]).unwrap();
        let forged = Arc::new(resign(honest.to_builder(), &Secp256k1KeyPair::generate()));

        // Synchronous stages do not look at signatures.
        net.service.submit(Arc::clone(&forged), None).unwrap();
        assert!(net.wait_rejected(&forged.id()));

        assert_eq!(
            net.rejections.errors_for(&forged.id()),
            vec![AdmissionError::WrongEventSignature]
        );
        assert!(!net.events.contains(&forged.id()));
    }

    #[test]
    fn test_unknown_parent_is_soft() {
        let net = Network::new(4, Rules::default());
        let (e1, _) = two_genesis_events(&net);

        let orphan = net
            .emitter(1)
            .emit(draft(1, 2, 2, 3, vec![e1.id()]), &[])
            .unwrap();
        let dangling = resign(
            orphan.to_builder().with_parents(vec![e1.id(), [0xEE; 32]]),
            &net.keys[&1],
        );

        let err = net.service.validate(&dangling, Some(e1.as_ref())).unwrap_err();
        assert_eq!(err, AdmissionError::UnknownParent);
        assert!(!err.penalizes_peer());
    }

    #[test]
    fn test_emitter_refuses_cheater_parent() {
        let net = Network::new(4, Rules::default());
        let (e1, e2) = two_genesis_events(&net);

        net.store.mark_cheater(2);
        let err = net
            .emitter(1)
            .emit(draft(1, 2, 2, 3, vec![e1.id(), e2.id()]), &[])
            .unwrap_err();
        assert!(matches!(
            err,
            EmitError::Rejected(AdmissionError::CheaterParent)
        ));
    }
}
