use std::collections::HashSet;

use revrec_domain::{Contract, Period, RevenueRecognitionEntry};
use uuid::Uuid;

use crate::CoreError;

/// Persistence for contracts, scoped by tenant.
///
/// `save_contract` is an optimistic write: it fails with `Conflict` when the stored version
/// differs from `contract.version`, and returns the new version on success.
pub trait ContractRepository: Send + Sync {
    fn load_contract(&self, tenant_id: Uuid, id: Uuid) -> Result<Contract, CoreError>;
    fn save_contract(&self, contract: &Contract) -> Result<u64, CoreError>;
    fn list_contracts(&self, tenant_id: Uuid) -> Result<Vec<Contract>, CoreError>;
}

/// Persistence for recognition entries, scoped by tenant.
pub trait RecognitionRepository: Send + Sync {
    fn save_entry(&self, entry: &RevenueRecognitionEntry) -> Result<(), CoreError>;
    fn load_entry(&self, tenant_id: Uuid, id: Uuid) -> Result<RevenueRecognitionEntry, CoreError>;
    fn entries_for_contract(
        &self,
        tenant_id: Uuid,
        contract_id: Uuid,
    ) -> Result<Vec<RevenueRecognitionEntry>, CoreError>;

    fn entries_for_period(
        &self,
        tenant_id: Uuid,
        contract_id: Uuid,
        period: Period,
    ) -> Result<Vec<RevenueRecognitionEntry>, CoreError> {
        Ok(self
            .entries_for_contract(tenant_id, contract_id)?
            .into_iter()
            .filter(|entry| entry.period == period)
            .collect())
    }
}

/// Detects entries that no longer line up with their contract snapshot.
pub fn entry_warnings(contract: &Contract, entries: &[RevenueRecognitionEntry]) -> Vec<String> {
    let obligation_ids: HashSet<_> = contract.obligations().iter().map(|ob| ob.id).collect();
    let mut warnings = Vec::new();

    for entry in entries {
        if entry.contract_id != contract.id {
            warnings.push(format!(
                "entry {} belongs to contract {}",
                entry.id, entry.contract_id
            ));
            continue;
        }
        if !obligation_ids.contains(&entry.performance_obligation_id) {
            warnings.push(format!(
                "entry {} references missing obligation {}",
                entry.id, entry.performance_obligation_id
            ));
        }
        if !entry.period_matches_date() {
            warnings.push(format!(
                "entry {} dated {} outside period {}",
                entry.id, entry.recognition_date, entry.period
            ));
        }
    }
    warnings
}
