use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Tunables for the recognition engine, persisted as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "EngineConfig::default_currency_value")]
    pub default_currency: String,
    /// Allowed gap between the allocated total and the contract value.
    #[serde(default = "EngineConfig::default_allocation_tolerance")]
    pub allocation_tolerance: Decimal,
    /// Decimal places for allocated shares. Unset keeps full precision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocation_scale: Option<u32>,
    #[serde(default)]
    pub reversal_restores_balance: bool,
    #[serde(default = "EngineConfig::default_clamp_recognition_date")]
    pub clamp_recognition_date: bool,
    #[serde(default = "EngineConfig::default_log_filter")]
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_currency: Self::default_currency_value(),
            allocation_tolerance: Self::default_allocation_tolerance(),
            allocation_scale: None,
            reversal_restores_balance: false,
            clamp_recognition_date: Self::default_clamp_recognition_date(),
            log_filter: Self::default_log_filter(),
        }
    }
}

impl EngineConfig {
    pub fn default_currency_value() -> String {
        "USD".into()
    }

    pub fn default_allocation_tolerance() -> Decimal {
        Decimal::new(1, 2)
    }

    pub fn default_clamp_recognition_date() -> bool {
        true
    }

    pub fn default_log_filter() -> String {
        "revenue_core=info,revrec_core=info".into()
    }

    /// Rejects values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let currency = self.default_currency.trim();
        if currency.len() != 3 || !currency.chars().all(|ch| ch.is_ascii_alphabetic()) {
            return Err(ConfigError::Invalid(format!(
                "default_currency `{}` is not a three-letter code",
                self.default_currency
            )));
        }
        if self.allocation_tolerance.is_sign_negative() {
            return Err(ConfigError::Invalid(
                "allocation_tolerance cannot be negative".into(),
            ));
        }
        if let Some(scale) = self.allocation_scale {
            if scale > 28 {
                return Err(ConfigError::Invalid(format!(
                    "allocation_scale {scale} exceeds 28 decimal places"
                )));
            }
        }
        Ok(())
    }
}
