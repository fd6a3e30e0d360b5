use thiserror::Error;

/// Failures raised by value types and entity state guards.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("currency mismatch: expected {expected}, found {found}")]
    CurrencyMismatch { expected: String, found: String },
    #[error("value out of range: {0}")]
    OutOfRange(String),
    #[error("negative amount: {0}")]
    NegativeAmount(String),
    #[error("invalid {entity} transition from {from} to {to}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
    },
}
