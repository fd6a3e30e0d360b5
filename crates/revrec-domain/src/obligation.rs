//! Performance obligations: the distinct promises a contract is split into.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    common::{Displayable, Identifiable},
    error::DomainError,
    money::{CurrencyCode, Money},
    progress::Progress,
};

/// How control of the promised good or service passes to the customer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SatisfactionMethod {
    /// Revenue follows measured progress.
    OverTime,
    /// Revenue is recognised in a single event once control transfers.
    PointInTime,
}

impl fmt::Display for SatisfactionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SatisfactionMethod::OverTime => "over_time",
            SatisfactionMethod::PointInTime => "point_in_time",
        };
        f.write_str(label)
    }
}

/// A promise to transfer a good or service, owned by exactly one contract.
///
/// `recognized_amount` never exceeds `allocated_amount`; both are expressed in the
/// owning contract's currency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceObligation {
    pub id: Uuid,
    pub contract_id: Uuid,
    pub description: String,
    allocated_amount: Money,
    recognized_amount: Money,
    pub is_distinct: bool,
    pub satisfaction_method: SatisfactionMethod,
    pub standalone_selling_price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_completion_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl PerformanceObligation {
    pub fn new(
        description: impl Into<String>,
        satisfaction_method: SatisfactionMethod,
        standalone_selling_price: Money,
        created_at: DateTime<Utc>,
    ) -> Self {
        let currency = standalone_selling_price.currency().clone();
        Self {
            id: Uuid::new_v4(),
            contract_id: Uuid::nil(),
            description: description.into(),
            allocated_amount: Money::zero(currency.clone()),
            recognized_amount: Money::zero(currency),
            is_distinct: true,
            satisfaction_method,
            standalone_selling_price,
            estimated_completion_date: None,
            created_at,
        }
    }

    /// Marks the obligation as not distinct, excluding it from allocation and recognition.
    pub fn non_distinct(mut self) -> Self {
        self.is_distinct = false;
        self
    }

    pub fn allocated_amount(&self) -> &Money {
        &self.allocated_amount
    }

    pub fn recognized_amount(&self) -> &Money {
        &self.recognized_amount
    }

    pub fn currency(&self) -> &CurrencyCode {
        self.allocated_amount.currency()
    }

    /// Replaces the allocation. Refuses amounts below what has already been recognised.
    pub fn set_allocated_amount(&mut self, amount: Money) -> Result<(), DomainError> {
        amount.ensure_same_currency(&self.recognized_amount)?;
        if amount.amount() < self.recognized_amount.amount() {
            return Err(DomainError::OutOfRange(format!(
                "allocation {amount} is below recognised {}",
                self.recognized_amount
            )));
        }
        self.allocated_amount = amount;
        Ok(())
    }

    /// Allocation still available for recognition.
    pub fn remaining_amount(&self) -> Money {
        self.allocated_amount
            .saturating_sub(&self.recognized_amount)
            .unwrap_or_else(|_| Money::zero(self.currency().clone()))
    }

    /// Share of the allocation recognised so far.
    pub fn completion_percentage(&self) -> Progress {
        let allocated = self.allocated_amount.amount();
        if allocated.is_zero() {
            return Progress::ZERO;
        }
        Progress::from_fraction(self.recognized_amount.amount() / allocated)
    }

    pub fn is_satisfied(&self) -> bool {
        self.recognized_amount.amount() >= self.allocated_amount.amount()
    }

    /// Adds `amount` to the recognised total, keeping it within the allocation.
    pub fn apply_recognition(&mut self, amount: &Money) -> Result<(), DomainError> {
        let remaining = self.remaining_amount();
        remaining.ensure_same_currency(amount)?;
        if amount.amount() > remaining.amount() {
            return Err(DomainError::OutOfRange(format!(
                "recognising {amount} exceeds remaining {remaining}"
            )));
        }
        self.recognized_amount = self.recognized_amount.checked_add(amount)?;
        Ok(())
    }

    /// Removes `amount` from the recognised total, used when a posting is reversed.
    pub fn release_recognition(&mut self, amount: &Money) -> Result<(), DomainError> {
        self.recognized_amount = self.recognized_amount.checked_sub(amount)?;
        Ok(())
    }

    pub(crate) fn rebase_currency(&mut self, currency: &CurrencyCode) {
        if self.recognized_amount.is_zero() && self.allocated_amount.is_zero() {
            self.allocated_amount = Money::zero(currency.clone());
            self.recognized_amount = Money::zero(currency.clone());
        }
    }
}

impl Identifiable for PerformanceObligation {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Displayable for PerformanceObligation {
    fn display_label(&self) -> String {
        format!("obligation:{} [{}] {}", self.id, self.satisfaction_method, self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn usd(amount: Decimal) -> Money {
        Money::new(amount, CurrencyCode::default()).unwrap()
    }

    fn obligation() -> PerformanceObligation {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut ob = PerformanceObligation::new(
            "Licence",
            SatisfactionMethod::OverTime,
            usd(dec!(100)),
            created,
        );
        ob.set_allocated_amount(usd(dec!(100))).unwrap();
        ob
    }

    #[test]
    fn recognition_is_bounded_by_allocation() {
        let mut ob = obligation();
        ob.apply_recognition(&usd(dec!(60))).unwrap();
        assert_eq!(ob.remaining_amount().amount(), dec!(40));
        assert_eq!(ob.completion_percentage().percent(), dec!(60));
        assert!(ob.apply_recognition(&usd(dec!(41))).is_err());
        assert_eq!(ob.recognized_amount().amount(), dec!(60));
        ob.apply_recognition(&usd(dec!(40))).unwrap();
        assert!(ob.is_satisfied());
    }

    #[test]
    fn allocation_cannot_drop_below_recognised() {
        let mut ob = obligation();
        ob.apply_recognition(&usd(dec!(70))).unwrap();
        assert!(ob.set_allocated_amount(usd(dec!(50))).is_err());
        ob.set_allocated_amount(usd(dec!(70))).unwrap();
        assert!(ob.is_satisfied());
    }

    #[test]
    fn release_restores_balance() {
        let mut ob = obligation();
        ob.apply_recognition(&usd(dec!(30))).unwrap();
        ob.release_recognition(&usd(dec!(30))).unwrap();
        assert!(ob.recognized_amount().is_zero());
        assert!(ob.release_recognition(&usd(dec!(1))).is_err());
    }
}
