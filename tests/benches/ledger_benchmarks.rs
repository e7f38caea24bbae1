//! # Hybrid Ledger Benchmarks
//!
//! | Area | Measured Path |
//! |------|---------------|
//! | Fungible | Fractional transfer that banks and reissues one id |
//! | Fungible | Whole-unit transfers surrendering N ids |
//! | Discrete | Single id transfer (in-place stack removal) |
//! | Buckets | Batch carton/pack/loosie transfer |
//! | Permit | EIP-712 digest and signer recovery |
//! | Audit | Full invariant check over a populated ledger |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hybrid_ledger::prelude::*;
use ledger_tests::support::{
    accounts, address_of, admin, alice, bob, sign_permit, signing_key, small_config, small_ledger,
    units,
};
use std::time::Duration;

// ============================================================================
// FUNGIBLE TRANSFERS
// ============================================================================

fn bench_fungible_transfer(c: &mut Criterion) {
    let mut group = c.benchmark_group("fungible-transfer");

    let mut ledger = small_ledger(1_000);
    ledger.mint_fungible(admin(), alice(), units(500)).unwrap();

    // Alternating direction keeps the ledger in a steady state.
    group.bench_function("fractional_round_trip", |b| {
        b.iter(|| {
            ledger.transfer(alice(), bob(), U256::one()).unwrap();
            black_box(ledger.transfer(bob(), alice(), U256::one()).unwrap())
        })
    });

    for count in [1u64, 10, 100] {
        let mut ledger = small_ledger(1_000);
        ledger.mint_fungible(admin(), alice(), units(500)).unwrap();

        group.throughput(Throughput::Elements(count));
        group.bench_with_input(BenchmarkId::new("whole_units", count), &count, |b, &count| {
            b.iter(|| {
                ledger.transfer(alice(), bob(), units(count)).unwrap();
                black_box(ledger.transfer(bob(), alice(), units(count)).unwrap())
            })
        });
    }

    group.finish();
}

// ============================================================================
// DISCRETE TRANSFERS
// ============================================================================

fn bench_discrete_transfer(c: &mut Criterion) {
    let mut group = c.benchmark_group("discrete-transfer");

    let mut ledger = small_ledger(1_000);
    ledger.mint_fungible(admin(), alice(), units(500)).unwrap();
    let id = ID_PREFIX + 1;

    group.bench_function("transfer_token_round_trip", |b| {
        b.iter(|| {
            ledger.transfer_token(alice(), id, bob()).unwrap();
            black_box(ledger.transfer_token(bob(), id, alice()).unwrap())
        })
    });

    group.finish();
}

// ============================================================================
// BUCKETS
// ============================================================================

fn bench_bucket_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("buckets");

    let mut ledger = small_ledger(1_000);
    // 199 spare base units leave packs and loosies behind each carton move.
    ledger
        .mint_fungible(admin(), alice(), units(50) + U256::from(199u64))
        .unwrap();
    ledger.mint_fungible(admin(), bob(), units(50)).unwrap();
    let ids = [U256::zero(), U256::one(), U256::from(2u64)];
    let amounts = [U256::from(3u64), U256::from(7u64), U256::from(11u64)];

    group.bench_function("batch_round_trip", |b| {
        b.iter(|| {
            ledger
                .safe_batch_transfer_from(alice(), alice(), bob(), &ids, &amounts)
                .unwrap();
            black_box(
                ledger
                    .safe_batch_transfer_from(bob(), bob(), alice(), &ids, &amounts)
                    .unwrap(),
            )
        })
    });

    group.bench_function("decompose", |b| {
        b.iter(|| black_box(ledger.bucket_balance_of(&alice(), U256::one()).unwrap()))
    });

    group.finish();
}

// ============================================================================
// PERMITS
// ============================================================================

fn bench_permit_verification(c: &mut Criterion) {
    let mut group = c.benchmark_group("permit");
    group.measurement_time(Duration::from_secs(10));

    let config = small_config(10);
    let verifier = Eip712PermitVerifier::from_config(&config);
    let key = signing_key(7);
    let permit = Permit {
        owner: address_of(&key),
        spender: bob(),
        value: U256::from(1_000u64),
        nonce: U256::zero(),
        deadline: u64::MAX,
    };
    let signature = sign_permit(&verifier, &key, &permit);

    group.bench_function("digest", |b| b.iter(|| black_box(verifier.digest(&permit))));
    group.bench_function("recover_signer", |b| {
        b.iter(|| black_box(verifier.recover_signer(&permit, &signature).unwrap()))
    });

    group.finish();
}

// ============================================================================
// INVARIANT AUDIT
// ============================================================================

fn bench_invariant_check(c: &mut Criterion) {
    let mut group = c.benchmark_group("invariants");

    for holders in [4u8, 32, 128] {
        let mut config = small_config(100_000);
        config.verify_invariants = false;
        let mut ledger = HybridLedger::new(config).unwrap();
        for account in accounts(holders) {
            ledger.mint_fungible(admin(), account, units(50)).unwrap();
        }

        group.throughput(Throughput::Elements(u64::from(holders) * 50));
        group.bench_with_input(BenchmarkId::new("check_all", holders), &ledger, |b, ledger| {
            b.iter(|| black_box(ledger.check_invariants().is_valid()))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_fungible_transfer,
    bench_discrete_transfer,
    bench_bucket_batch,
    bench_permit_verification,
    bench_invariant_check,
);
criterion_main!(benches);
