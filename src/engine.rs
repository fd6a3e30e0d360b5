//! `RevenueEngine` ties configuration, a clock and the core services together.

use chrono::NaiveDate;
use revrec_config::{ConfigManager, EngineConfig};
use revrec_core::{
    AllocationOutcome, AllocationService, Clock, ContractRepository, ContractSummary,
    LifecycleService, PostingService, ProgressByObligation, RecognitionPolicy,
    RecognitionRepository, RecognitionService, SummaryService, ValidationResult,
    ValidationService,
};
use revrec_domain::{
    Contract, CurrencyCode, Displayable, Money, PerformanceObligation, Period, Progress,
    RevenueRecognitionEntry,
};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{errors::RevenueError, system_clock::SystemClock};

/// Entry point for callers: every operation runs against the configured policy and clock.
#[derive(Debug, Clone)]
pub struct RevenueEngine<C: Clock = SystemClock> {
    config: EngineConfig,
    policy: RecognitionPolicy,
    clock: C,
}

impl RevenueEngine<SystemClock> {
    pub fn new(config: EngineConfig) -> Result<Self, RevenueError> {
        Self::with_clock(config, SystemClock)
    }

    /// Builds an engine from the config persisted by `manager`.
    pub fn from_manager(manager: &ConfigManager) -> Result<Self, RevenueError> {
        Self::new(manager.load()?)
    }
}

impl<C: Clock> RevenueEngine<C> {
    pub fn with_clock(config: EngineConfig, clock: C) -> Result<Self, RevenueError> {
        config.validate()?;
        let policy = policy_from_config(&config);
        Ok(Self {
            config,
            policy,
            clock,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn policy(&self) -> &RecognitionPolicy {
        &self.policy
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn default_currency(&self) -> CurrencyCode {
        CurrencyCode::new(self.config.default_currency.as_str())
    }

    /// Money in the configured default currency.
    pub fn money(&self, amount: Decimal) -> Result<Money, RevenueError> {
        Ok(Money::new(amount, self.default_currency())?)
    }

    /// New draft contract valued in the default currency, stamped with the engine clock.
    pub fn draft_contract(
        &self,
        tenant_id: Uuid,
        customer_id: Uuid,
        contract_number: &str,
        title: &str,
        total_value: Decimal,
    ) -> Result<Contract, RevenueError> {
        Ok(Contract::new(
            tenant_id,
            customer_id,
            contract_number,
            title,
            self.money(total_value)?,
            self.clock.now(),
        ))
    }

    pub fn validate_contract(&self, contract: &Contract) -> ValidationResult {
        ValidationService::validate_contract(contract, &self.policy)
    }

    pub fn activate(&self, contract: &mut Contract) -> Result<(), RevenueError> {
        Ok(LifecycleService::activate(contract, &self.policy, &self.clock)?)
    }

    pub fn complete(&self, contract: &mut Contract) -> Result<(), RevenueError> {
        Ok(LifecycleService::complete(contract, &self.clock)?)
    }

    pub fn cancel(&self, contract: &mut Contract) -> Result<(), RevenueError> {
        Ok(LifecycleService::cancel(contract, &self.clock)?)
    }

    pub fn allocate_transaction_price(
        &self,
        contract: &mut Contract,
    ) -> Result<AllocationOutcome, RevenueError> {
        let outcome = AllocationService::allocate_transaction_price(contract, &self.policy)?;
        contract.touch(self.clock.now());
        Ok(outcome)
    }

    pub fn generate_revenue_recognition_entries(
        &self,
        contract: &Contract,
        period: Period,
        progress: &ProgressByObligation,
    ) -> Result<Vec<RevenueRecognitionEntry>, RevenueError> {
        Ok(RecognitionService::generate_revenue_recognition_entries(
            contract,
            period,
            progress,
            &self.policy,
            &self.clock,
        )?)
    }

    pub fn recognize(
        &self,
        entry: &mut RevenueRecognitionEntry,
        contract: &mut Contract,
    ) -> Result<(), RevenueError> {
        Ok(PostingService::recognize(entry, contract, &self.policy, &self.clock)?)
    }

    /// Reverses a posted entry. The obligation balance is left as is.
    pub fn reverse(&self, entry: &mut RevenueRecognitionEntry) -> Result<(), RevenueError> {
        Ok(PostingService::reverse(entry, &self.clock)?)
    }

    /// Reverses a posted entry, restoring the obligation balance when configured to.
    pub fn reverse_with_contract(
        &self,
        entry: &mut RevenueRecognitionEntry,
        contract: &mut Contract,
    ) -> Result<(), RevenueError> {
        Ok(PostingService::reverse_with_contract(
            entry,
            contract,
            &self.policy,
            &self.clock,
        )?)
    }

    pub fn cancel_entry(&self, entry: &mut RevenueRecognitionEntry) -> Result<(), RevenueError> {
        Ok(PostingService::cancel(entry, &self.clock)?)
    }

    pub fn contract_liability(&self, contract: &Contract) -> Result<Money, RevenueError> {
        Ok(SummaryService::contract_liability(contract)?)
    }

    pub fn contract_asset(
        &self,
        contract: &Contract,
        billed: &Money,
    ) -> Result<Money, RevenueError> {
        Ok(SummaryService::contract_asset(contract, billed)?)
    }

    /// Summary with billing treated as zero.
    pub fn summarize(&self, contract: &Contract) -> Result<ContractSummary, RevenueError> {
        Ok(SummaryService::summarize(contract, None)?)
    }

    pub fn estimate_completion_date(
        &self,
        obligation: &PerformanceObligation,
        progress: Progress,
    ) -> Option<NaiveDate> {
        RecognitionService::estimate_completion_date(obligation, progress, self.clock.today())
    }

    /// Records a completion estimate on each measured obligation of `contract`.
    pub fn refresh_completion_estimates(
        &self,
        contract: &mut Contract,
        progress: &ProgressByObligation,
    ) -> Result<usize, RevenueError> {
        let updated = RecognitionService::refresh_completion_estimates(
            contract,
            progress,
            self.clock.today(),
        )?;
        contract.touch(self.clock.now());
        Ok(updated)
    }

    /// Generates and posts every entry for `period` as one unit.
    ///
    /// Work happens on a copy of the contract; `contract` is only replaced once every
    /// entry has posted, so a failure leaves it exactly as it was.
    pub fn post_period(
        &self,
        contract: &mut Contract,
        period: Period,
        progress: &ProgressByObligation,
    ) -> Result<Vec<RevenueRecognitionEntry>, RevenueError> {
        let mut working = contract.clone();
        let mut entries = self.generate_revenue_recognition_entries(&working, period, progress)?;
        for entry in &mut entries {
            if let Err(err) = self.recognize(entry, &mut working) {
                warn!(
                    contract = %contract.display_label(),
                    period = %period,
                    error = %err,
                    "period posting rolled back"
                );
                return Err(err);
            }
        }
        *contract = working;
        info!(
            contract = %contract.display_label(),
            period = %period,
            entries = entries.len(),
            "period posted"
        );
        Ok(entries)
    }

    /// Loads a contract, posts `period` and writes the contract and its entries back.
    ///
    /// The contract is written first. Its version check rejects a concurrent run against the
    /// same contract with `Conflict` before any entry is stored, so a lost race never leaves
    /// orphaned entries. Entries are saved afterwards; a repository that can fail between
    /// those writes must wrap the whole call in its own transaction.
    pub fn run_period<R>(
        &self,
        repository: &R,
        tenant_id: Uuid,
        contract_id: Uuid,
        period: Period,
        progress: &ProgressByObligation,
    ) -> Result<Vec<RevenueRecognitionEntry>, RevenueError>
    where
        R: ContractRepository + RecognitionRepository,
    {
        let mut contract = repository.load_contract(tenant_id, contract_id)?;
        let entries = self.post_period(&mut contract, period, progress)?;
        contract.version = repository.save_contract(&contract)?;
        for entry in &entries {
            repository.save_entry(entry)?;
        }
        Ok(entries)
    }
}

fn policy_from_config(config: &EngineConfig) -> RecognitionPolicy {
    RecognitionPolicy {
        allocation_tolerance: config.allocation_tolerance,
        allocation_scale: config.allocation_scale,
        reversal_restores_balance: config.reversal_restores_balance,
        clamp_recognition_date: config.clamp_recognition_date,
    }
}
