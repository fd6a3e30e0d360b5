use std::fmt;

use revrec_domain::DomainError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Validation failed: {}", join_violations(.0))]
    ValidationFailed(Vec<Violation>),
    #[error("Allocation error: {0}")]
    Allocation(String),
    #[error("Invalid {entity} state transition from {from} to {to}")]
    InvalidStateTransition {
        entity: String,
        from: String,
        to: String,
    },
    #[error("Currency mismatch: expected {expected}, found {found}")]
    CurrencyMismatch { expected: String, found: String },
    #[error("Out of range: {0}")]
    OutOfRange(String),
    #[error("Contract not found: {0}")]
    ContractNotFound(Uuid),
    #[error("Performance obligation not found: {0}")]
    ObligationNotFound(Uuid),
    #[error("Recognition entry not found: {0}")]
    EntryNotFound(Uuid),
    #[error("Concurrent modification: {0}")]
    Conflict(String),
}

impl CoreError {
    /// Violations carried by a [`CoreError::ValidationFailed`], empty otherwise.
    pub fn violations(&self) -> &[Violation] {
        match self {
            CoreError::ValidationFailed(violations) => violations,
            _ => &[],
        }
    }
}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::CurrencyMismatch { expected, found } => {
                CoreError::CurrencyMismatch { expected, found }
            }
            DomainError::OutOfRange(message) | DomainError::NegativeAmount(message) => {
                CoreError::OutOfRange(message)
            }
            DomainError::InvalidTransition { entity, from, to } => {
                CoreError::InvalidStateTransition {
                    entity: entity.to_string(),
                    from,
                    to,
                }
            }
        }
    }
}

/// Machine-readable category of a business-rule violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViolationCode {
    MissingCustomer,
    MissingStartDate,
    EndBeforeStart,
    MissingContractNumber,
    MissingTitle,
    NonPositiveTotal,
    NoObligations,
    AllocationMismatch,
    CurrencyMismatch,
    NonPositiveAmount,
    PeriodMismatch,
    ObligationNotFound,
    ContractMismatch,
    ExceedsRemaining,
    ContractNotActive,
    UnsatisfiedObligation,
}

/// A single failed business rule with a human-readable explanation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub code: ViolationCode,
    pub message: String,
}

impl Violation {
    pub fn new(code: ViolationCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
