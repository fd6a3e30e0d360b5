//! Revenue calculator: how much an obligation may recognise now, and the pending
//! entries that carry those amounts into a period.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use revrec_domain::{
    Contract, Displayable, Money, PerformanceObligation, Period, Progress, ProgressMeasurement,
    RevenueRecognitionEntry, SatisfactionMethod,
};
use rust_decimal::{prelude::ToPrimitive, Decimal};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{error::CoreError, policy::RecognitionPolicy, time::Clock};

/// Progress measurements keyed by performance obligation id.
pub type ProgressByObligation = HashMap<Uuid, ProgressMeasurement>;

/// Computes recognisable revenue and issues pending recognition entries.
pub struct RecognitionService;

impl RecognitionService {
    /// Amount the obligation may recognise now.
    ///
    /// Point-in-time obligations yield either their whole remaining allocation (once control
    /// has transferred) or nothing. Over-time obligations yield the cumulative revenue earned
    /// at the measured progress less what is already recognised, floored at zero.
    pub fn recognizable_amount(
        obligation: &PerformanceObligation,
        measurement: Option<&ProgressMeasurement>,
    ) -> Result<Money, CoreError> {
        let zero = Money::zero(obligation.currency().clone());
        let Some(measurement) = measurement else {
            return Ok(zero);
        };
        match obligation.satisfaction_method {
            SatisfactionMethod::PointInTime => {
                if measurement.transfers_control()? {
                    Ok(obligation.remaining_amount())
                } else {
                    Ok(zero)
                }
            }
            SatisfactionMethod::OverTime => {
                let cumulative = Self::cumulative_revenue(obligation, measurement.progress()?)?;
                Ok(cumulative.saturating_sub(obligation.recognized_amount())?)
            }
        }
    }

    /// Revenue earned to date at `progress`: `allocated x progress / 100`.
    pub fn cumulative_revenue(
        obligation: &PerformanceObligation,
        progress: Progress,
    ) -> Result<Money, CoreError> {
        Ok(obligation.allocated_amount().scale(progress.as_fraction())?)
    }

    /// Builds the pending entries for `period`, one per distinct obligation with a positive
    /// recognisable amount. Obligations without a measurement recognise nothing.
    pub fn generate_revenue_recognition_entries(
        contract: &Contract,
        period: Period,
        progress: &ProgressByObligation,
        policy: &RecognitionPolicy,
        clock: &dyn Clock,
    ) -> Result<Vec<RevenueRecognitionEntry>, CoreError> {
        let now = clock.now();
        let today = clock.today();
        let recognition_date = if policy.clamp_recognition_date {
            period.clamp_date(today)
        } else {
            today
        };

        let mut entries = Vec::new();
        for obligation in contract.distinct_obligations() {
            let measurement = progress.get(&obligation.id);
            let amount = Self::recognizable_amount(obligation, measurement)?;
            debug!(
                obligation = %obligation.display_label(),
                amount = %amount,
                "computed recognisable amount"
            );
            if !amount.is_positive() {
                continue;
            }
            let description = describe(obligation, measurement, period)?;
            entries.push(
                RevenueRecognitionEntry::new(
                    contract.tenant_id,
                    contract.id,
                    obligation.id,
                    amount,
                    recognition_date,
                    period,
                    now,
                )
                .with_description(description),
            );
        }

        info!(
            contract = %contract.display_label(),
            period = %period,
            entries = entries.len(),
            "generated recognition entries"
        );
        Ok(entries)
    }

    /// Projects a completion date by linear extrapolation from the obligation's creation date.
    ///
    /// Returns `None` when progress is too small to extrapolate from or the projection
    /// falls outside the calendar.
    pub fn estimate_completion_date(
        obligation: &PerformanceObligation,
        progress: Progress,
        today: NaiveDate,
    ) -> Option<NaiveDate> {
        let fraction = progress.as_fraction();
        if fraction.is_zero() {
            return None;
        }
        let started = obligation.created_at.date_naive();
        let elapsed_days = (today - started).num_days().max(0);
        let total_days = Decimal::from(elapsed_days)
            .checked_div(fraction)?
            .ceil()
            .to_i64()?;
        started.checked_add_signed(Duration::try_days(total_days)?)
    }

    /// Stores a fresh completion estimate on every obligation that has a measurement.
    /// Returns how many obligations were updated.
    pub fn refresh_completion_estimates(
        contract: &mut Contract,
        progress: &ProgressByObligation,
        today: NaiveDate,
    ) -> Result<usize, CoreError> {
        let mut updated = 0;
        for (id, measurement) in progress {
            let Some(obligation) = contract.obligation_mut(*id) else {
                continue;
            };
            obligation.estimated_completion_date =
                Self::estimate_completion_date(obligation, measurement.progress()?, today);
            debug!(
                obligation = %obligation.display_label(),
                estimate = ?obligation.estimated_completion_date,
                "refreshed completion estimate"
            );
            updated += 1;
        }
        Ok(updated)
    }
}

fn describe(
    obligation: &PerformanceObligation,
    measurement: Option<&ProgressMeasurement>,
    period: Period,
) -> Result<String, CoreError> {
    let detail = match (obligation.satisfaction_method, measurement) {
        (SatisfactionMethod::PointInTime, _) => "control transferred".to_string(),
        (SatisfactionMethod::OverTime, Some(measurement)) => {
            format!("{} complete", measurement.progress()?)
        }
        (SatisfactionMethod::OverTime, None) => "no progress".to_string(),
    };
    Ok(format!(
        "Revenue for `{}` in {period} ({detail})",
        obligation.description
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use revrec_domain::CurrencyCode;
    use rust_decimal_macros::dec;

    fn usd(amount: Decimal) -> Money {
        Money::new(amount, CurrencyCode::default()).unwrap()
    }

    fn obligation(method: SatisfactionMethod, allocated: Decimal) -> PerformanceObligation {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut ob = PerformanceObligation::new("Work", method, usd(allocated), created);
        ob.set_allocated_amount(usd(allocated)).unwrap();
        ob
    }

    #[test]
    fn over_time_recognises_progress_delta() {
        let mut ob = obligation(SatisfactionMethod::OverTime, dec!(100000));
        let at_75 = ProgressMeasurement::input(dec!(75), dec!(100));
        let amount = RecognitionService::recognizable_amount(&ob, Some(&at_75)).unwrap();
        assert_eq!(amount.amount(), dec!(75000));

        ob.apply_recognition(&amount).unwrap();
        let at_90 = ProgressMeasurement::reported(Progress::new(dec!(90)).unwrap());
        let delta = RecognitionService::recognizable_amount(&ob, Some(&at_90)).unwrap();
        assert_eq!(delta.amount(), dec!(15000));
    }

    #[test]
    fn progress_regression_recognises_nothing() {
        let mut ob = obligation(SatisfactionMethod::OverTime, dec!(1000));
        ob.apply_recognition(&usd(dec!(600))).unwrap();
        let regressed = ProgressMeasurement::output(dec!(4), dec!(10));
        let amount = RecognitionService::recognizable_amount(&ob, Some(&regressed)).unwrap();
        assert!(amount.is_zero());
    }

    #[test]
    fn point_in_time_is_all_or_nothing() {
        let ob = obligation(SatisfactionMethod::PointInTime, dec!(500));
        let partial = ProgressMeasurement::output(dec!(9), dec!(10));
        assert!(RecognitionService::recognizable_amount(&ob, Some(&partial))
            .unwrap()
            .is_zero());
        let transferred = ProgressMeasurement::ControlTransferred;
        let amount = RecognitionService::recognizable_amount(&ob, Some(&transferred)).unwrap();
        assert_eq!(amount.amount(), dec!(500));
        assert!(RecognitionService::recognizable_amount(&ob, None)
            .unwrap()
            .is_zero());
    }

    #[test]
    fn completion_estimate_extrapolates_linearly() {
        let ob = obligation(SatisfactionMethod::OverTime, dec!(1000));
        let today = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let estimate = RecognitionService::estimate_completion_date(
            &ob,
            Progress::new(dec!(25)).unwrap(),
            today,
        );
        assert_eq!(estimate, NaiveDate::from_ymd_opt(2024, 4, 30));
        assert_eq!(
            RecognitionService::estimate_completion_date(&ob, Progress::ZERO, today),
            None
        );
    }

    #[test]
    fn completion_estimate_gives_up_on_vanishing_progress() {
        let ob = obligation(SatisfactionMethod::OverTime, dec!(1000));
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let tiny = Progress::new(dec!(0.0000000000000000000000000014)).unwrap();
        assert!(!tiny.is_zero());
        assert_eq!(
            RecognitionService::estimate_completion_date(&ob, tiny, today),
            None
        );

        let sliver = Progress::new(dec!(0.0000001)).unwrap();
        assert_eq!(
            RecognitionService::estimate_completion_date(&ob, sliver, today),
            None
        );
    }
}
