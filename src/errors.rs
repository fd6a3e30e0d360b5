use revrec_config::ConfigError;
use revrec_core::{CoreError, Violation};
use revrec_domain::DomainError;
use thiserror::Error;

/// Error type surfaced by the engine facade.
#[derive(Debug, Error)]
pub enum RevenueError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl RevenueError {
    /// Violations carried by a failed validation, empty for every other error.
    pub fn violations(&self) -> &[Violation] {
        match self {
            RevenueError::Core(err) => err.violations(),
            _ => &[],
        }
    }
}

impl From<DomainError> for RevenueError {
    fn from(err: DomainError) -> Self {
        RevenueError::Core(err.into())
    }
}
