use std::collections::HashMap;

use chrono::{NaiveDate, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use revenue_core::{
    Contract, EngineConfig, FixedClock, PerformanceObligation, Period, ProgressMeasurement,
    RevenueEngine, SatisfactionMethod,
};
use rust_decimal::Decimal;
use uuid::Uuid;

fn build_contract(engine: &RevenueEngine<FixedClock>, obligations: usize) -> Contract {
    let total = Decimal::from(obligations as u64 * 1_000);
    let mut contract = engine
        .draft_contract(Uuid::new_v4(), Uuid::new_v4(), "BENCH-1", "Benchmark", total)
        .expect("draft")
        .with_term(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), None);
    let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    for idx in 0..obligations {
        let method = if idx % 4 == 0 {
            SatisfactionMethod::PointInTime
        } else {
            SatisfactionMethod::OverTime
        };
        let ssp = engine
            .money(Decimal::from(500 + (idx % 100) as u64 * 10))
            .expect("ssp");
        contract.add_obligation(PerformanceObligation::new(
            format!("Deliverable {idx}"),
            method,
            ssp,
            created,
        ));
    }
    contract
}

fn bench_allocation(c: &mut Criterion) {
    let clock = FixedClock(Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap());
    let engine = RevenueEngine::with_clock(EngineConfig::default(), clock).expect("engine");
    let contract = build_contract(&engine, black_box(1_000));

    c.bench_function("allocate_1k_obligations", |b| {
        b.iter_batched(
            || contract.clone(),
            |mut contract| {
                engine
                    .allocate_transaction_price(&mut contract)
                    .expect("allocate");
                black_box(contract);
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_period_posting(c: &mut Criterion) {
    let clock = FixedClock(Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap());
    let engine = RevenueEngine::with_clock(EngineConfig::default(), clock).expect("engine");
    let mut contract = build_contract(&engine, black_box(1_000));
    engine
        .allocate_transaction_price(&mut contract)
        .expect("allocate");
    engine.activate(&mut contract).expect("activate");

    let progress: HashMap<Uuid, ProgressMeasurement> = contract
        .obligations()
        .iter()
        .enumerate()
        .map(|(idx, ob)| {
            let measurement = match ob.satisfaction_method {
                SatisfactionMethod::PointInTime => ProgressMeasurement::ControlTransferred,
                SatisfactionMethod::OverTime => ProgressMeasurement::input(
                    Decimal::from((idx % 90) as u64 + 1),
                    Decimal::from(100),
                ),
            };
            (ob.id, measurement)
        })
        .collect();
    let period = Period::new(2024, 3).expect("period");

    c.bench_function("post_period_1k_obligations", |b| {
        b.iter_batched(
            || contract.clone(),
            |mut contract| {
                let entries = engine
                    .post_period(&mut contract, period, &progress)
                    .expect("post period");
                black_box(entries);
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_allocation, bench_period_posting);
criterion_main!(benches);
