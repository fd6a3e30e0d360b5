use std::{
    collections::HashMap,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use revrec_core::{ContractRepository, CoreError, RecognitionRepository};
use revrec_domain::{Contract, RevenueRecognitionEntry};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::RevenueError;

type Key = (Uuid, Uuid);

/// Serializable copy of everything an [`InMemoryRepository`] holds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositorySnapshot {
    #[serde(default)]
    pub contracts: Vec<Contract>,
    #[serde(default)]
    pub entries: Vec<RevenueRecognitionEntry>,
}

/// Thread-safe repository keeping contracts and entries in memory, keyed by
/// `(tenant_id, id)`.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    contracts: RwLock<HashMap<Key, Contract>>,
    entries: RwLock<HashMap<Key, RevenueRecognitionEntry>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: RepositorySnapshot) -> Self {
        let contracts = snapshot
            .contracts
            .into_iter()
            .map(|contract| ((contract.tenant_id, contract.id), contract))
            .collect();
        let entries = snapshot
            .entries
            .into_iter()
            .map(|entry| ((entry.tenant_id, entry.id), entry))
            .collect();
        Self {
            contracts: RwLock::new(contracts),
            entries: RwLock::new(entries),
        }
    }

    pub fn snapshot(&self) -> Result<RepositorySnapshot, CoreError> {
        let mut contracts: Vec<Contract> = read(&self.contracts)?.values().cloned().collect();
        contracts.sort_by_key(|contract| contract.created_at);
        let mut entries: Vec<RevenueRecognitionEntry> =
            read(&self.entries)?.values().cloned().collect();
        entries.sort_by_key(|entry| (entry.period, entry.created_at));
        Ok(RepositorySnapshot { contracts, entries })
    }

    pub fn to_json(&self) -> Result<String, RevenueError> {
        Ok(serde_json::to_string_pretty(&self.snapshot()?)?)
    }

    pub fn from_json(data: &str) -> Result<Self, RevenueError> {
        Ok(Self::from_snapshot(serde_json::from_str(data)?))
    }
}

impl ContractRepository for InMemoryRepository {
    fn load_contract(&self, tenant_id: Uuid, id: Uuid) -> Result<Contract, CoreError> {
        read(&self.contracts)?
            .get(&(tenant_id, id))
            .cloned()
            .ok_or(CoreError::ContractNotFound(id))
    }

    fn save_contract(&self, contract: &Contract) -> Result<u64, CoreError> {
        let mut contracts = write(&self.contracts)?;
        let key = (contract.tenant_id, contract.id);
        let stored_version = contracts.get(&key).map(|stored| stored.version).unwrap_or(0);
        if stored_version != contract.version {
            return Err(CoreError::Conflict(format!(
                "contract {} is at version {stored_version}, write was based on {}",
                contract.id, contract.version
            )));
        }
        let mut stored = contract.clone();
        stored.version = stored_version + 1;
        let version = stored.version;
        contracts.insert(key, stored);
        Ok(version)
    }

    fn list_contracts(&self, tenant_id: Uuid) -> Result<Vec<Contract>, CoreError> {
        let mut contracts: Vec<Contract> = read(&self.contracts)?
            .values()
            .filter(|contract| contract.tenant_id == tenant_id)
            .cloned()
            .collect();
        contracts.sort_by(|a, b| a.contract_number.cmp(&b.contract_number));
        Ok(contracts)
    }
}

impl RecognitionRepository for InMemoryRepository {
    fn save_entry(&self, entry: &RevenueRecognitionEntry) -> Result<(), CoreError> {
        write(&self.entries)?.insert((entry.tenant_id, entry.id), entry.clone());
        Ok(())
    }

    fn load_entry(&self, tenant_id: Uuid, id: Uuid) -> Result<RevenueRecognitionEntry, CoreError> {
        read(&self.entries)?
            .get(&(tenant_id, id))
            .cloned()
            .ok_or(CoreError::EntryNotFound(id))
    }

    fn entries_for_contract(
        &self,
        tenant_id: Uuid,
        contract_id: Uuid,
    ) -> Result<Vec<RevenueRecognitionEntry>, CoreError> {
        let mut entries: Vec<RevenueRecognitionEntry> = read(&self.entries)?
            .values()
            .filter(|entry| entry.tenant_id == tenant_id && entry.contract_id == contract_id)
            .cloned()
            .collect();
        entries.sort_by_key(|entry| (entry.period, entry.created_at));
        Ok(entries)
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, CoreError> {
    lock.read()
        .map_err(|_| CoreError::Conflict("repository lock poisoned".into()))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, CoreError> {
    lock.write()
        .map_err(|_| CoreError::Conflict("repository lock poisoned".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use revrec_domain::{CurrencyCode, Money};
    use rust_decimal_macros::dec;

    fn contract() -> Contract {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let value = Money::new(dec!(100), CurrencyCode::default()).unwrap();
        Contract::new(Uuid::new_v4(), Uuid::new_v4(), "C-1", "Support", value, created)
    }

    #[test]
    fn stale_write_is_rejected() {
        let repo = InMemoryRepository::new();
        let mut contract = contract();
        contract.version = repo.save_contract(&contract).unwrap();
        assert_eq!(contract.version, 1);

        let stale = contract.clone();
        contract.version = repo.save_contract(&contract).unwrap();
        assert_eq!(contract.version, 2);

        let err = repo.save_contract(&stale).unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
    }

    #[test]
    fn lookups_are_tenant_scoped() {
        let repo = InMemoryRepository::new();
        let contract = contract();
        repo.save_contract(&contract).unwrap();

        assert!(repo.load_contract(contract.tenant_id, contract.id).is_ok());
        let err = repo.load_contract(Uuid::new_v4(), contract.id).unwrap_err();
        assert_eq!(err, CoreError::ContractNotFound(contract.id));
        assert!(repo.list_contracts(Uuid::new_v4()).unwrap().is_empty());
    }

    #[test]
    fn json_snapshot_round_trips_contracts() {
        let repo = InMemoryRepository::new();
        let contract = contract();
        repo.save_contract(&contract).unwrap();

        let restored = InMemoryRepository::from_json(&repo.to_json().unwrap()).unwrap();
        let loaded = restored.load_contract(contract.tenant_id, contract.id).unwrap();
        assert_eq!(loaded.version, 1);
        assert_eq!(loaded.title, "Support");
    }
}
