//! # Allocation Benchmarks
//!
//! Hot path of the allocator and the configuration-time validator.
//!
//! ```bash
//! cargo bench -p ncf-tests --bench allocation_benchmarks
//! cargo bench -p ncf-tests --bench allocation_benchmarks -- allocator
//! ```
//!
//! | Group | Measures |
//! |-------|----------|
//! | allocator | Uncontended `issue` (lock, CAS, ledger check, commit) |
//! | validation | `validate_range` against many historical ranges |
//! | formatting | `format_identifier` for both layouts |

use std::hint::black_box;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ncf_sequencing::{
    format_identifier, validate_range, CompanyId, FixedClock, IdentifierFormat, NewSequence,
    RangeCandidate, SequenceApi, SequenceService, SequencingConfig, TypeCatalog,
};
use tokio::runtime::Runtime;

const COMPANY: CompanyId = CompanyId(1);

fn authorized() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date")
}

fn service() -> SequenceService {
    let clock = Arc::new(FixedClock::new(authorized()));
    let (service, _store) =
        SequenceService::in_memory(TypeCatalog::standard(), clock, SequencingConfig::default());
    service
}

fn bench_allocator(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");
    let service = service();
    rt.block_on(async {
        let draft = service
            .create_sequence(NewSequence::new(
                COMPANY,
                "31",
                1,
                IdentifierFormat::Electronic.max_number(),
                authorized(),
            ))
            .await
            .expect("range accepted");
        service.activate(draft.id).await.expect("activation");
    });

    let counter = AtomicU64::new(0);
    c.bench_function("allocator/issue_uncontended", |b| {
        b.to_async(&rt).iter(|| {
            let reference = format!("BENCH/{}", counter.fetch_add(1, Ordering::Relaxed));
            let service = &service;
            async move {
                black_box(
                    service
                        .issue(COMPANY, "31", &reference)
                        .await
                        .expect("allocation"),
                )
            }
        })
    });
}

fn bench_validation(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");
    let mut group = c.benchmark_group("validation");

    for history in [10u64, 100, 1_000] {
        let service = service();
        let existing = rt.block_on(async {
            for i in 0..history {
                let from = i * 1_000 + 1;
                service
                    .create_sequence(NewSequence::new(COMPANY, "01", from, from + 999, authorized()))
                    .await
                    .expect("range accepted");
            }
            service
                .list_sequences(COMPANY, "01")
                .await
                .expect("list")
        });

        let candidate = RangeCandidate {
            company: COMPANY,
            type_code: "01",
            prefix: "B01",
            format: IdentifierFormat::Physical,
            range_from: history * 1_000 + 1,
            range_to: history * 1_000 + 1_000,
            exclude: None,
        };
        group.bench_with_input(
            BenchmarkId::new("accepted", history),
            &existing,
            |b, existing| b.iter(|| validate_range(black_box(&candidate), existing, 0)),
        );
    }

    group.finish();
}

fn bench_formatting(c: &mut Criterion) {
    let mut group = c.benchmark_group("formatting");
    group.bench_function("physical", |b| {
        b.iter(|| format_identifier("B01", black_box(12_345), IdentifierFormat::Physical))
    });
    group.bench_function("electronic", |b| {
        b.iter(|| format_identifier("E31", black_box(12_345), IdentifierFormat::Electronic))
    });
    group.finish();
}

criterion_group!(
    name = allocation_benches;
    config = Criterion::default().sample_size(100);
    targets = bench_allocator, bench_validation, bench_formatting
);

criterion_main!(allocation_benches);
