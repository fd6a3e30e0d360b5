//! Revenue recognition entries: pending or posted revenue facts for a period.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    common::{Displayable, Identifiable, TenantScoped},
    error::DomainError,
    money::Money,
    period::Period,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionStatus {
    #[default]
    Pending,
    Recognized,
    Reversed,
    Cancelled,
}

impl RecognitionStatus {
    pub fn can_transition_to(self, next: RecognitionStatus) -> bool {
        use RecognitionStatus::*;
        matches!(
            (self, next),
            (Pending, Recognized) | (Recognized, Reversed) | (Pending, Cancelled)
        )
    }
}

impl fmt::Display for RecognitionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RecognitionStatus::Pending => "pending",
            RecognitionStatus::Recognized => "recognized",
            RecognitionStatus::Reversed => "reversed",
            RecognitionStatus::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// A revenue fact for one obligation in one period.
///
/// The contract and obligation ids are lookup keys only; the entry owns neither.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RevenueRecognitionEntry {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub contract_id: Uuid,
    pub performance_obligation_id: Uuid,
    pub amount: Money,
    pub recognition_date: NaiveDate,
    pub period: Period,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    status: RecognitionStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recognized_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reversed_at: Option<DateTime<Utc>>,
}

impl RevenueRecognitionEntry {
    pub fn new(
        tenant_id: Uuid,
        contract_id: Uuid,
        performance_obligation_id: Uuid,
        amount: Money,
        recognition_date: NaiveDate,
        period: Period,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            contract_id,
            performance_obligation_id,
            amount,
            recognition_date,
            period,
            description: None,
            status: RecognitionStatus::Pending,
            created_at,
            recognized_at: None,
            reversed_at: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn status(&self) -> RecognitionStatus {
        self.status
    }

    pub fn is_pending(&self) -> bool {
        self.status == RecognitionStatus::Pending
    }

    /// Whether the recognition date falls inside the stated period.
    pub fn period_matches_date(&self) -> bool {
        self.period.contains(self.recognition_date)
    }

    /// Moves the entry along its status graph, stamping the relevant timestamp.
    pub fn transition_to(
        &mut self,
        next: RecognitionStatus,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                entity: "recognition entry",
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        match next {
            RecognitionStatus::Recognized => self.recognized_at = Some(at),
            RecognitionStatus::Reversed => self.reversed_at = Some(at),
            RecognitionStatus::Pending | RecognitionStatus::Cancelled => {}
        }
        self.status = next;
        Ok(())
    }
}

impl Identifiable for RevenueRecognitionEntry {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl TenantScoped for RevenueRecognitionEntry {
    fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }
}

impl Displayable for RevenueRecognitionEntry {
    fn display_label(&self) -> String {
        format!("entry:{} {} {} [{}]", self.id, self.period, self.amount, self.status)
    }
}
