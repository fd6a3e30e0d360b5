//! The contract aggregate root and its lifecycle states.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    common::{Displayable, Identifiable, TenantScoped},
    error::DomainError,
    money::{CurrencyCode, Money},
    obligation::PerformanceObligation,
};

/// Lifecycle states of a contract.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    #[default]
    Draft,
    Active,
    Completed,
    Cancelled,
}

impl ContractStatus {
    /// Returns whether the lifecycle graph allows moving from `self` to `next`.
    pub fn can_transition_to(self, next: ContractStatus) -> bool {
        use ContractStatus::*;
        matches!(
            (self, next),
            (Draft, Active) | (Active, Completed) | (Draft, Cancelled) | (Active, Cancelled)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ContractStatus::Completed | ContractStatus::Cancelled)
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ContractStatus::Draft => "draft",
            ContractStatus::Active => "active",
            ContractStatus::Completed => "completed",
            ContractStatus::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// A customer contract and the performance obligations it exclusively owns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Contract {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub customer_id: Uuid,
    pub contract_number: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub total_value: Money,
    status: ContractStatus,
    #[serde(default)]
    performance_obligations: Vec<PerformanceObligation>,
    /// Optimistic concurrency token maintained by repositories.
    #[serde(default)]
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contract {
    pub fn new(
        tenant_id: Uuid,
        customer_id: Uuid,
        contract_number: impl Into<String>,
        title: impl Into<String>,
        total_value: Money,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            customer_id,
            contract_number: contract_number.into(),
            title: title.into(),
            description: None,
            start_date: None,
            end_date: None,
            total_value,
            status: ContractStatus::Draft,
            performance_obligations: Vec::new(),
            version: 0,
            created_at,
            updated_at: created_at,
        }
    }

    pub fn with_term(mut self, start: NaiveDate, end: Option<NaiveDate>) -> Self {
        self.start_date = Some(start);
        self.end_date = end;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn status(&self) -> ContractStatus {
        self.status
    }

    pub fn currency(&self) -> &CurrencyCode {
        self.total_value.currency()
    }

    /// Moves the contract along the lifecycle graph.
    pub fn transition_to(
        &mut self,
        next: ContractStatus,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                entity: "contract",
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        self.touch(at);
        Ok(())
    }

    /// Takes ownership of `obligation`, binding it to this contract.
    pub fn add_obligation(&mut self, mut obligation: PerformanceObligation) -> Uuid {
        obligation.contract_id = self.id;
        obligation.rebase_currency(self.total_value.currency());
        let id = obligation.id;
        self.performance_obligations.push(obligation);
        id
    }

    /// Removes an obligation that has not recognised any revenue yet.
    pub fn remove_obligation(&mut self, id: Uuid) -> Option<PerformanceObligation> {
        let index = self
            .performance_obligations
            .iter()
            .position(|ob| ob.id == id && ob.recognized_amount().is_zero())?;
        Some(self.performance_obligations.remove(index))
    }

    pub fn obligations(&self) -> &[PerformanceObligation] {
        &self.performance_obligations
    }

    pub fn obligation(&self, id: Uuid) -> Option<&PerformanceObligation> {
        self.performance_obligations.iter().find(|ob| ob.id == id)
    }

    pub fn obligation_mut(&mut self, id: Uuid) -> Option<&mut PerformanceObligation> {
        self.performance_obligations
            .iter_mut()
            .find(|ob| ob.id == id)
    }

    pub fn distinct_obligations(&self) -> impl Iterator<Item = &PerformanceObligation> {
        self.performance_obligations.iter().filter(|ob| ob.is_distinct)
    }

    /// Sum of every obligation's allocated amount.
    pub fn allocated_total(&self) -> Result<Money, DomainError> {
        Money::sum(
            self.currency(),
            self.performance_obligations
                .iter()
                .map(PerformanceObligation::allocated_amount),
        )
    }

    /// Sum of every obligation's recognised amount.
    pub fn recognized_total(&self) -> Result<Money, DomainError> {
        Money::sum(
            self.currency(),
            self.performance_obligations
                .iter()
                .map(PerformanceObligation::recognized_amount),
        )
    }

    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

impl Identifiable for Contract {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl TenantScoped for Contract {
    fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }
}

impl Displayable for Contract {
    fn display_label(&self) -> String {
        format!("contract:{} [{}] {}", self.contract_number, self.status, self.title)
    }
}
