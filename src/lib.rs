#![doc(test(attr(deny(warnings))))]

//! Revenue Core recognises contract revenue under IFRS 15: it allocates transaction prices
//! across performance obligations, turns progress into recognition entries and posts them.

pub mod engine;
pub mod errors;
pub mod storage;
pub mod system_clock;
pub mod utils;

pub use engine::RevenueEngine;
pub use errors::RevenueError;
pub use revrec_config::{ConfigError, ConfigManager, EngineConfig};
pub use revrec_core::{
    AllocationBasis, AllocationOutcome, Clock, ContractRepository, ContractSummary, CoreError,
    FixedClock, ObligationSummary, ProgressByObligation, RecognitionPolicy,
    RecognitionRepository, ValidationResult, Violation, ViolationCode,
};
pub use revrec_domain::{
    Contract, ContractStatus, CurrencyCode, DomainError, Money, PerformanceObligation, Period,
    Progress, ProgressMeasurement, RecognitionStatus, RevenueRecognitionEntry,
    SatisfactionMethod,
};
pub use storage::InMemoryRepository;
pub use system_clock::SystemClock;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Revenue Core tracing initialized.");
    });
}

/// Initializes tracing using the filter from `config`.
pub fn init_with_config(config: &EngineConfig) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing_with(&config.log_filter);
        tracing::info!(filter = %config.log_filter, "Revenue Core tracing initialized.");
    });
}
