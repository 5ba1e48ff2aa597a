//! # Event Admission Benchmarks
//!
//! | Path | Operation | Target |
//! |------|-----------|--------|
//! | Gas power | `calc_validator_gas_power` per track | < 1µs |
//! | Checkers | Five synchronous stages on a genesis event | < 50µs |
//! | Heavy | Signature + sender recovery + payload hash | < 1ms + 100µs/tx |
//! | Proposer | Stake-weighted proposer selection | < 5µs |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use primitive_types::U256;
use qc_18_event_admission::{
    calc_validator_gas_power, Checkers, EpochSnapshotStore, EpochState, GasPowerAccountant,
    GasPowerConfig, HeavyCheck, InMemoryEventStore, Rules, SenderCache, Validators,
};
use rand::Rng;
use shared_crypto::Secp256k1KeyPair;
use shared_types::{
    DagEvent, Event, EventBuilder, EventPayload, Transaction, TxType, NANOS_PER_SEC,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

struct Setup {
    store: Arc<EpochSnapshotStore>,
    key: Secp256k1KeyPair,
}

fn setup(validators: u32) -> Setup {
    let key = Secp256k1KeyPair::generate();
    let state = EpochState {
        epoch: 1,
        validators: Validators::new((1..=validators).map(|id| (id, if id == 1 { 1_000_000 } else { 1 }))),
        rules: Rules::default(),
        epoch_start: 0,
        validator_states: HashMap::new(),
        pub_keys: HashMap::from([(1, key.public_key())]),
        block_start: 1,
    };
    let store = Arc::new(EpochSnapshotStore::new(
        state,
        Arc::new(InMemoryEventStore::new()),
    ));
    Setup { store, key }
}

fn signed_txs(count: usize) -> Vec<Transaction> {
    let sender = Secp256k1KeyPair::generate();
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|nonce| {
            let mut tx = Transaction {
                tx_type: TxType::DynamicFee,
                nonce: nonce as u64,
                gas: 21_000,
                gas_fee_cap: U256::from(10_000_000_000u64),
                gas_tip_cap: U256::from(rng.gen_range(1..1_000_000_000u64)),
                to: Some([0x11; 20]),
                ..Default::default()
            };
            tx.signature = sender.sign_recoverable(&tx.signing_hash()).unwrap();
            tx
        })
        .collect()
}

/// Genesis event of the dominant validator 1 with truthful gas fields.
fn genesis_event(s: &Setup, txs: Vec<Transaction>) -> Event {
    let rules = Rules::default();
    let used = rules.economy.gas.event_gas + 21_000 * txs.len() as u64;
    let draft = EventBuilder::new()
        .with_epoch(1)
        .with_seq(1)
        .with_frame(1)
        .with_creator(1)
        .with_lamport(1)
        .with_creation_time(30 * NANOS_PER_SEC)
        .with_median_time(30 * NANOS_PER_SEC)
        .with_gas_power_used(used)
        .with_payload(EventPayload {
            transactions: txs,
            ..Default::default()
        });
    let available = GasPowerAccountant::new(Arc::clone(&s.store))
        .calc_gas_power(&draft, None)
        .unwrap();
    let builder = draft
        .with_gas_power_left(available.saturating_sub(used))
        .with_computed_payload_hash();
    let signature = s.key.sign_prehash(&builder.hash_to_sign()).unwrap();
    builder.build(signature)
}

fn bench_gas_power(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-18-gas-power");

    let config = GasPowerConfig {
        alloc_per_sec: 2_800_000,
        max_alloc_period: 60 * NANOS_PER_SEC,
        min_ensured_alloc: 10_028_000,
        startup_alloc_period: 5 * NANOS_PER_SEC,
        min_startup_gas: 560_000,
    };
    let event = EventBuilder::new().with_creator(7).with_seq(2);

    for size in [10u32, 100, 1_000] {
        let validators = Validators::new((1..=size).map(|id| (id, u64::from(id))));
        group.bench_with_input(BenchmarkId::new("calc_validator_gas_power", size), &validators, |b, v| {
            b.iter(|| {
                black_box(calc_validator_gas_power(
                    &event,
                    black_box(40 * NANOS_PER_SEC),
                    black_box(37 * NANOS_PER_SEC),
                    black_box(1_000_000),
                    v,
                    &config,
                ))
            })
        });
    }
    group.finish();
}

fn bench_checkers(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-18-checkers");

    for txs in [0usize, 10, 100] {
        let s = setup(100);
        let checkers = Checkers::new(Arc::clone(&s.store));
        let event = genesis_event(&s, signed_txs(txs));
        assert_eq!(checkers.validate(&event, None), Ok(()));

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("validate", txs), &event, |b, e| {
            b.iter(|| black_box(checkers.validate(e, None)))
        });
    }
    group.finish();
}

fn bench_heavy_check(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-18-heavy-check");
    group.measurement_time(Duration::from_secs(10));

    for txs in [0usize, 10, 100] {
        let s = setup(10);
        let event = genesis_event(&s, signed_txs(txs));

        group.throughput(Throughput::Elements(txs.max(1) as u64));
        group.bench_with_input(BenchmarkId::new("cold_cache", txs), &event, |b, e| {
            b.iter(|| {
                let heavy = HeavyCheck::new(Arc::clone(&s.store), Arc::new(SenderCache::new(1)));
                black_box(heavy.validate_event(e))
            })
        });

        let warm = HeavyCheck::new(Arc::clone(&s.store), Arc::new(SenderCache::default()));
        assert_eq!(warm.validate_event(&event), Ok(()));
        group.bench_with_input(BenchmarkId::new("warm_cache", txs), &event, |b, e| {
            b.iter(|| black_box(warm.validate_event(e)))
        });
    }
    group.finish();
}

fn bench_proposer_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-18-proposer");
    for size in [10u32, 100, 1_000] {
        let validators = Validators::new((1..=size).map(|id| (id, u64::from(id) * 3)));
        group.bench_with_input(BenchmarkId::new("proposer_for_turn", size), &validators, |b, v| {
            let mut turn = 0u32;
            b.iter(|| {
                turn = turn.wrapping_add(1);
                black_box(v.proposer_for_turn(5, turn))
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_gas_power,
    bench_checkers,
    bench_heavy_check,
    bench_proposer_selection
);
criterion_main!(benches);
