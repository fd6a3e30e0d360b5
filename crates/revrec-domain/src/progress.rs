//! Completion ratios and the external measurements they are derived from.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Percentage of completion bounded to `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Progress(Decimal);

impl Progress {
    pub const ZERO: Progress = Progress(Decimal::ZERO);
    pub const COMPLETE: Progress = Progress(HUNDRED);

    /// Builds a progress value from a percentage, rejecting values outside `0..=100`.
    pub fn new(percent: Decimal) -> Result<Self, DomainError> {
        if percent < Decimal::ZERO || percent > HUNDRED {
            return Err(DomainError::OutOfRange(format!(
                "progress {percent}% is outside 0..=100"
            )));
        }
        Ok(Self(percent))
    }

    /// Builds a progress value from a percentage, clamping into `0..=100`.
    pub fn clamped(percent: Decimal) -> Self {
        Self(percent.clamp(Decimal::ZERO, HUNDRED))
    }

    /// Converts a fractional ratio (`0.75` is 75%), clamping into range.
    pub fn from_fraction(ratio: Decimal) -> Self {
        Self::clamped(ratio * HUNDRED)
    }

    /// Converts a numerator/denominator pair.
    ///
    /// Fails when the denominator is not positive, the numerator is negative,
    /// or the numerator exceeds the denominator. Equal parts yield exactly 100.
    pub fn from_ratio(numerator: Decimal, denominator: Decimal) -> Result<Self, DomainError> {
        if denominator <= Decimal::ZERO {
            return Err(DomainError::OutOfRange(format!(
                "denominator {denominator} must be positive"
            )));
        }
        if numerator < Decimal::ZERO {
            return Err(DomainError::OutOfRange(format!(
                "numerator {numerator} must not be negative"
            )));
        }
        if numerator > denominator {
            return Err(DomainError::OutOfRange(format!(
                "numerator {numerator} exceeds denominator {denominator}"
            )));
        }
        if numerator == denominator {
            return Ok(Self::COMPLETE);
        }
        numerator
            .checked_div(denominator)
            .and_then(|ratio| ratio.checked_mul(HUNDRED))
            .map(Self)
            .ok_or_else(|| {
                DomainError::OutOfRange(format!("{numerator} / {denominator} is not representable"))
            })
    }

    pub fn percent(&self) -> Decimal {
        self.0
    }

    /// Progress as a ratio in `0..=1`.
    pub fn as_fraction(&self) -> Decimal {
        self.0 / HUNDRED
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_complete(&self) -> bool {
        self.0 >= HUNDRED
    }
}

impl TryFrom<Decimal> for Progress {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Progress::new(value)
    }
}

impl From<Progress> for Decimal {
    fn from(value: Progress) -> Self {
        value.0
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0.round_dp(2).normalize())
    }
}

/// An externally sourced measurement of how far an obligation has progressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum ProgressMeasurement {
    /// Input method: cost incurred against total estimated cost.
    Input {
        cost_incurred: Decimal,
        total_estimated_cost: Decimal,
    },
    /// Output method: units delivered against total units promised.
    Output {
        units_delivered: Decimal,
        total_units: Decimal,
    },
    /// A progress figure already computed upstream.
    Reported { progress: Progress },
    /// Control of the promised good or service has passed to the customer.
    ControlTransferred,
}

impl ProgressMeasurement {
    pub fn input(cost_incurred: Decimal, total_estimated_cost: Decimal) -> Self {
        Self::Input {
            cost_incurred,
            total_estimated_cost,
        }
    }

    pub fn output(units_delivered: Decimal, total_units: Decimal) -> Self {
        Self::Output {
            units_delivered,
            total_units,
        }
    }

    pub fn reported(progress: Progress) -> Self {
        Self::Reported { progress }
    }

    /// Resolves the measurement to a progress value.
    ///
    /// Overruns (more cost or units than estimated) clamp to 100%; a non-positive
    /// total or a negative measured quantity is rejected.
    pub fn progress(&self) -> Result<Progress, DomainError> {
        match self {
            Self::Input {
                cost_incurred,
                total_estimated_cost,
            } => measured(*cost_incurred, *total_estimated_cost),
            Self::Output {
                units_delivered,
                total_units,
            } => measured(*units_delivered, *total_units),
            Self::Reported { progress } => Ok(*progress),
            Self::ControlTransferred => Ok(Progress::COMPLETE),
        }
    }

    /// Whether the measurement shows control has fully passed to the customer.
    pub fn transfers_control(&self) -> Result<bool, DomainError> {
        Ok(self.progress()?.is_complete())
    }
}

fn measured(numerator: Decimal, denominator: Decimal) -> Result<Progress, DomainError> {
    Progress::from_ratio(numerator.min(denominator.max(Decimal::ZERO)), denominator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn equal_ratio_is_exactly_complete() {
        let progress = Progress::from_ratio(dec!(3), dec!(3)).unwrap();
        assert_eq!(progress.percent(), dec!(100));
        assert!(progress.is_complete());
    }

    #[test]
    fn ratio_guards_fail_fast() {
        assert!(Progress::from_ratio(dec!(4), dec!(3)).is_err());
        assert!(Progress::from_ratio(dec!(1), dec!(0)).is_err());
        assert!(Progress::from_ratio(dec!(1), dec!(-2)).is_err());
        assert!(Progress::from_ratio(dec!(-1), dec!(2)).is_err());
    }

    #[test]
    fn clamps_and_converts_fractions() {
        assert_eq!(Progress::clamped(dec!(120)), Progress::COMPLETE);
        assert_eq!(Progress::clamped(dec!(-5)), Progress::ZERO);
        assert_eq!(Progress::from_fraction(dec!(0.75)).percent(), dec!(75));
        assert_eq!(Progress::new(dec!(40)).unwrap().as_fraction(), dec!(0.4));
        assert!(Progress::new(dec!(100.01)).is_err());
    }

    #[test]
    fn measurements_resolve_to_progress() {
        let input = ProgressMeasurement::input(dec!(75000), dec!(100000));
        assert_eq!(input.progress().unwrap().percent(), dec!(75));

        let output = ProgressMeasurement::output(dec!(2), dec!(5));
        assert_eq!(output.progress().unwrap().percent(), dec!(40));

        let overrun = ProgressMeasurement::input(dec!(130), dec!(100));
        assert_eq!(overrun.progress().unwrap(), Progress::COMPLETE);

        let broken = ProgressMeasurement::output(dec!(1), dec!(0));
        assert!(broken.progress().is_err());

        assert!(ProgressMeasurement::ControlTransferred
            .transfers_control()
            .unwrap());
    }

    #[test]
    fn huge_quantities_resolve_without_overflow() {
        let spent = Decimal::from_i128_with_scale(7_000_000_000_000_000_000_000_000_000, 0);
        let budget = Decimal::from_i128_with_scale(8_000_000_000_000_000_000_000_000_000, 0);
        let progress = ProgressMeasurement::input(spent, budget).progress().unwrap();
        assert_eq!(progress.percent(), dec!(87.5));

        let near_max = Progress::from_ratio(Decimal::MAX - Decimal::ONE, Decimal::MAX).unwrap();
        assert!(near_max.percent() <= dec!(100));
    }

    #[test]
    fn deserializes_tagged_measurements() {
        let raw = r#"{"method":"input","cost_incurred":"30","total_estimated_cost":"120"}"#;
        let measurement: ProgressMeasurement = serde_json::from_str(raw).unwrap();
        assert_eq!(measurement.progress().unwrap().percent(), dec!(25));

        let invalid = r#"{"method":"reported","progress":"140"}"#;
        assert!(serde_json::from_str::<ProgressMeasurement>(invalid).is_err());
    }
}
