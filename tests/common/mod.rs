#![allow(dead_code)]

use chrono::{NaiveDate, TimeZone, Utc};
use revenue_core::{
    Contract, EngineConfig, FixedClock, PerformanceObligation, RevenueEngine, SatisfactionMethod,
};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Engine pinned to 2024-03-15 09:00 UTC.
pub fn engine() -> RevenueEngine<FixedClock> {
    engine_with(EngineConfig::default())
}

pub fn engine_with(config: EngineConfig) -> RevenueEngine<FixedClock> {
    let clock = FixedClock(Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap());
    RevenueEngine::with_clock(config, clock).expect("engine")
}

/// Draft contract with a start date and one obligation per `(description, method, ssp)`.
pub fn draft_contract(
    engine: &RevenueEngine<FixedClock>,
    total: Decimal,
    obligations: &[(&str, SatisfactionMethod, Decimal)],
) -> (Contract, Vec<Uuid>) {
    let mut contract = engine
        .draft_contract(Uuid::new_v4(), Uuid::new_v4(), "C-2024-001", "Platform rollout", total)
        .expect("draft contract")
        .with_term(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), None);
    let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let ids = obligations
        .iter()
        .map(|(description, method, ssp)| {
            let ssp = engine.money(*ssp).expect("ssp");
            contract.add_obligation(PerformanceObligation::new(*description, *method, ssp, created))
        })
        .collect();
    (contract, ids)
}

/// Allocated and activated contract.
pub fn active_contract(
    engine: &RevenueEngine<FixedClock>,
    total: Decimal,
    obligations: &[(&str, SatisfactionMethod, Decimal)],
) -> (Contract, Vec<Uuid>) {
    let (mut contract, ids) = draft_contract(engine, total, obligations);
    engine
        .allocate_transaction_price(&mut contract)
        .expect("allocate");
    engine.activate(&mut contract).expect("activate");
    (contract, ids)
}
