//! Non-negative monetary amounts tagged with an ISO 4217 currency.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// ISO 4217 currency representation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CurrencyCode(pub String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::new("USD")
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable non-negative amount in a single currency.
///
/// Binary operations refuse to mix currencies and report
/// [`DomainError::CurrencyMismatch`] instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "RawMoney")]
pub struct Money {
    amount: Decimal,
    currency: CurrencyCode,
}

#[derive(Deserialize)]
struct RawMoney {
    amount: Decimal,
    currency: CurrencyCode,
}

impl TryFrom<RawMoney> for Money {
    type Error = DomainError;

    fn try_from(raw: RawMoney) -> Result<Self, Self::Error> {
        Money::new(raw.amount, raw.currency)
    }
}

impl Money {
    pub fn new(amount: Decimal, currency: CurrencyCode) -> Result<Self, DomainError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(DomainError::NegativeAmount(format!("{amount} {currency}")));
        }
        Ok(Self { amount, currency })
    }

    pub fn zero(currency: CurrencyCode) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    /// Fails unless `other` carries the same currency.
    pub fn ensure_same_currency(&self, other: &Money) -> Result<(), DomainError> {
        self.ensure_currency(&other.currency)
    }

    pub fn ensure_currency(&self, currency: &CurrencyCode) -> Result<(), DomainError> {
        if &self.currency != currency {
            return Err(DomainError::CurrencyMismatch {
                expected: self.currency.to_string(),
                found: currency.to_string(),
            });
        }
        Ok(())
    }

    pub fn checked_add(&self, other: &Money) -> Result<Money, DomainError> {
        self.ensure_same_currency(other)?;
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or_else(|| DomainError::OutOfRange(format!("{self} + {other} overflows")))?;
        Ok(Money {
            amount,
            currency: self.currency.clone(),
        })
    }

    /// Subtracts `other`, failing when the result would be negative.
    pub fn checked_sub(&self, other: &Money) -> Result<Money, DomainError> {
        self.ensure_same_currency(other)?;
        let amount = self.amount - other.amount;
        Money::new(amount, self.currency.clone())
    }

    /// Subtracts `other`, flooring the result at zero.
    pub fn saturating_sub(&self, other: &Money) -> Result<Money, DomainError> {
        self.ensure_same_currency(other)?;
        Ok(Money {
            amount: (self.amount - other.amount).max(Decimal::ZERO),
            currency: self.currency.clone(),
        })
    }

    /// Multiplies the amount by a non-negative factor.
    pub fn scale(&self, factor: Decimal) -> Result<Money, DomainError> {
        let amount = self
            .amount
            .checked_mul(factor)
            .ok_or_else(|| DomainError::OutOfRange(format!("{self} x {factor} overflows")))?;
        Money::new(amount, self.currency.clone())
    }

    /// Rounds half away from zero to `dp` decimal places.
    pub fn round_dp(&self, dp: u32) -> Money {
        Money {
            amount: self
                .amount
                .round_dp_with_strategy(dp, rust_decimal::RoundingStrategy::MidpointAwayFromZero),
            currency: self.currency.clone(),
        }
    }

    /// Sums an iterator of amounts that must all share `currency`.
    pub fn sum<'a, I>(currency: &CurrencyCode, items: I) -> Result<Money, DomainError>
    where
        I: IntoIterator<Item = &'a Money>,
    {
        items
            .into_iter()
            .try_fold(Money::zero(currency.clone()), |acc, item| acc.checked_add(item))
    }

    /// Absolute difference between two amounts in the same currency.
    pub fn abs_diff(&self, other: &Money) -> Result<Decimal, DomainError> {
        self.ensure_same_currency(other)?;
        Ok((self.amount - other.amount).abs())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount.round_dp(2), self.currency)
    }
}
