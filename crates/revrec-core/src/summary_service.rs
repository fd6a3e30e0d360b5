//! Derived aggregates: deferred revenue, unbilled revenue and per-period totals.

use std::collections::BTreeMap;

use revrec_domain::{
    Contract, ContractStatus, CurrencyCode, Money, Period, Progress, RecognitionStatus,
    RevenueRecognitionEntry, SatisfactionMethod,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObligationSummary {
    pub obligation_id: Uuid,
    pub description: String,
    pub satisfaction_method: SatisfactionMethod,
    pub allocated: Money,
    pub recognized: Money,
    pub remaining: Money,
    pub completion: Progress,
    pub satisfied: bool,
}

/// Snapshot of a contract's recognition position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractSummary {
    pub contract_id: Uuid,
    pub status: ContractStatus,
    pub total_value: Money,
    pub allocated: Money,
    pub recognized: Money,
    /// Contract liability: value not yet earned.
    pub deferred_revenue: Money,
    /// Contract asset: revenue earned but not yet billed.
    pub unbilled_revenue: Money,
    pub completion: Progress,
    pub obligations: Vec<ObligationSummary>,
}

/// Read-only reporting helpers over contracts and entries.
pub struct SummaryService;

impl SummaryService {
    /// Total value less everything recognised, floored at zero.
    pub fn contract_liability(contract: &Contract) -> Result<Money, CoreError> {
        let recognized = contract.recognized_total()?;
        Ok(contract.total_value.saturating_sub(&recognized)?)
    }

    /// Recognised revenue less what has been billed, floored at zero.
    ///
    /// Billing lives outside the engine; pass a zero amount when no billing data exists.
    pub fn contract_asset(contract: &Contract, billed: &Money) -> Result<Money, CoreError> {
        let recognized = contract.recognized_total()?;
        Ok(recognized.saturating_sub(billed)?)
    }

    pub fn summarize(
        contract: &Contract,
        billed: Option<&Money>,
    ) -> Result<ContractSummary, CoreError> {
        let currency = contract.currency().clone();
        let billed = billed
            .cloned()
            .unwrap_or_else(|| Money::zero(currency.clone()));
        let allocated = contract.allocated_total()?;
        let recognized = contract.recognized_total()?;
        let completion = if contract.total_value.is_zero() {
            Progress::ZERO
        } else {
            Progress::from_fraction(recognized.amount() / contract.total_value.amount())
        };

        let obligations = contract
            .obligations()
            .iter()
            .map(|ob| ObligationSummary {
                obligation_id: ob.id,
                description: ob.description.clone(),
                satisfaction_method: ob.satisfaction_method,
                allocated: ob.allocated_amount().clone(),
                recognized: ob.recognized_amount().clone(),
                remaining: ob.remaining_amount(),
                completion: ob.completion_percentage(),
                satisfied: ob.is_satisfied(),
            })
            .collect();

        Ok(ContractSummary {
            contract_id: contract.id,
            status: contract.status(),
            total_value: contract.total_value.clone(),
            deferred_revenue: Self::contract_liability(contract)?,
            unbilled_revenue: Self::contract_asset(contract, &billed)?,
            allocated,
            recognized,
            completion,
            obligations,
        })
    }

    /// Posted revenue per period. Pending, cancelled and reversed entries are excluded.
    pub fn recognized_by_period(
        currency: &CurrencyCode,
        entries: &[RevenueRecognitionEntry],
    ) -> Result<BTreeMap<Period, Money>, CoreError> {
        let mut totals: BTreeMap<Period, Money> = BTreeMap::new();
        for entry in entries
            .iter()
            .filter(|entry| entry.status() == RecognitionStatus::Recognized)
        {
            let slot = totals
                .entry(entry.period)
                .or_insert_with(|| Money::zero(currency.clone()));
            *slot = slot.checked_add(&entry.amount)?;
        }
        Ok(totals)
    }
}
