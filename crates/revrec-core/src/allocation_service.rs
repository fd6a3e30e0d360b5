//! Transaction price allocation across distinct performance obligations.
//!
//! The contract total value is treated as the already-determined transaction price.
//! Variable consideration, financing components and residual/expected-cost SSP
//! estimation are not modelled.

use revrec_domain::{Contract, Displayable, DomainError, Money};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{error::CoreError, policy::RecognitionPolicy};

/// How the transaction price was split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationBasis {
    /// Proportional to standalone selling prices.
    RelativeStandalonePrice,
    /// Equal shares, used when every standalone selling price is zero.
    EqualSplit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AllocationLine {
    pub obligation_id: Uuid,
    pub allocated: Money,
}

/// Result of a single allocation run.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationOutcome {
    pub basis: AllocationBasis,
    pub lines: Vec<AllocationLine>,
}

/// Splits a contract's transaction price across its distinct obligations.
pub struct AllocationService;

impl AllocationService {
    /// Recomputes every obligation's allocated amount from scratch.
    ///
    /// Non-distinct obligations are reset to zero. Nothing is written unless every new
    /// allocation is valid, so a failed run leaves the contract untouched.
    pub fn allocate_transaction_price(
        contract: &mut Contract,
        policy: &RecognitionPolicy,
    ) -> Result<AllocationOutcome, CoreError> {
        if contract.status().is_terminal() {
            return Err(CoreError::Allocation(format!(
                "cannot allocate a {} contract",
                contract.status()
            )));
        }

        let currency = contract.currency().clone();
        let distinct: Vec<(Uuid, Decimal)> = contract
            .distinct_obligations()
            .map(|ob| -> Result<(Uuid, Decimal), DomainError> {
                ob.standalone_selling_price.ensure_currency(&currency)?;
                Ok((ob.id, ob.standalone_selling_price.amount()))
            })
            .collect::<Result<_, _>>()?;

        if distinct.is_empty() {
            return Err(CoreError::Allocation(
                "contract has no distinct performance obligations".into(),
            ));
        }

        let price = contract.total_value.amount();
        let total_ssp = distinct
            .iter()
            .try_fold(Decimal::ZERO, |acc, (_, ssp)| acc.checked_add(*ssp))
            .ok_or_else(|| CoreError::OutOfRange("standalone selling prices overflow".into()))?;
        let basis = if total_ssp.is_zero() {
            AllocationBasis::EqualSplit
        } else {
            AllocationBasis::RelativeStandalonePrice
        };

        let mut shares = Vec::with_capacity(distinct.len());
        for (id, ssp) in &distinct {
            let share = match basis {
                AllocationBasis::EqualSplit => price / Decimal::from(distinct.len()),
                AllocationBasis::RelativeStandalonePrice => price
                    .checked_mul(*ssp)
                    .ok_or_else(|| CoreError::OutOfRange("allocation overflow".into()))?
                    / total_ssp,
            };
            shares.push((*id, share));
        }

        if let Some(scale) = policy.allocation_scale {
            round_with_residual(&mut shares, price, scale);
        }

        let mut lines = Vec::with_capacity(contract.obligations().len());
        for obligation in contract.obligations() {
            let amount = shares
                .iter()
                .find(|(id, _)| *id == obligation.id)
                .map(|(_, share)| *share)
                .unwrap_or(Decimal::ZERO);
            if amount < obligation.recognized_amount().amount() {
                return Err(CoreError::Allocation(format!(
                    "obligation `{}` would be allocated {amount} but has already recognised {}",
                    obligation.description,
                    obligation.recognized_amount()
                )));
            }
            lines.push(AllocationLine {
                obligation_id: obligation.id,
                allocated: Money::new(amount, currency.clone())?,
            });
        }

        for line in &lines {
            if let Some(obligation) = contract.obligation_mut(line.obligation_id) {
                obligation.set_allocated_amount(line.allocated.clone())?;
                debug!(
                    obligation = %obligation.display_label(),
                    allocated = %line.allocated,
                    "allocated transaction price"
                );
            }
        }

        info!(
            contract = %contract.display_label(),
            basis = ?basis,
            obligations = distinct.len(),
            "transaction price allocated"
        );
        Ok(AllocationOutcome { basis, lines })
    }
}

/// Truncates each share to `scale` places and gives the residual to the last share, so the
/// shares still add up to `price` exactly and none goes negative.
fn round_with_residual(shares: &mut [(Uuid, Decimal)], price: Decimal, scale: u32) {
    let Some(((_, last), head)) = shares.split_last_mut() else {
        return;
    };
    let mut assigned = Decimal::ZERO;
    for (_, share) in head.iter_mut() {
        *share = share.round_dp_with_strategy(scale, RoundingStrategy::ToZero);
        assigned += *share;
    }
    *last = price - assigned;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use revrec_domain::{CurrencyCode, PerformanceObligation, SatisfactionMethod};
    use rust_decimal_macros::dec;

    fn usd(amount: Decimal) -> Money {
        Money::new(amount, CurrencyCode::default()).unwrap()
    }

    fn contract_with(ssps: &[Decimal]) -> Contract {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut contract =
            Contract::new(Uuid::new_v4(), Uuid::new_v4(), "C-7", "Bundle", usd(dec!(100)), created);
        for (idx, ssp) in ssps.iter().enumerate() {
            contract.add_obligation(PerformanceObligation::new(
                format!("Item {idx}"),
                SatisfactionMethod::OverTime,
                usd(*ssp),
                created,
            ));
        }
        contract
    }

    #[test]
    fn rounding_pushes_residual_to_last_obligation() {
        let mut contract = contract_with(&[dec!(1), dec!(1), dec!(1)]);
        let policy = RecognitionPolicy {
            allocation_scale: Some(2),
            ..RecognitionPolicy::default()
        };
        let outcome =
            AllocationService::allocate_transaction_price(&mut contract, &policy).unwrap();
        let amounts: Vec<Decimal> = outcome.lines.iter().map(|l| l.allocated.amount()).collect();
        assert_eq!(amounts, vec![dec!(33.33), dec!(33.33), dec!(33.34)]);
        assert_eq!(contract.allocated_total().unwrap().amount(), dec!(100));
    }

    #[test]
    fn non_distinct_obligations_receive_nothing() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut contract = contract_with(&[dec!(80)]);
        let bundled = contract.add_obligation(
            PerformanceObligation::new(
                "Manual",
                SatisfactionMethod::PointInTime,
                usd(dec!(20)),
                created,
            )
            .non_distinct(),
        );
        AllocationService::allocate_transaction_price(&mut contract, &RecognitionPolicy::default())
            .unwrap();
        assert!(contract.obligation(bundled).unwrap().allocated_amount().is_zero());
        assert_eq!(contract.allocated_total().unwrap().amount(), dec!(100));
    }

    #[test]
    fn oversized_standalone_prices_are_rejected() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut contract = contract_with(&[]);
        for name in ["Left", "Right"] {
            contract.add_obligation(PerformanceObligation::new(
                name,
                SatisfactionMethod::OverTime,
                usd(Decimal::MAX),
                created,
            ));
        }
        let err = AllocationService::allocate_transaction_price(
            &mut contract,
            &RecognitionPolicy::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::OutOfRange(_)));
        assert!(contract.allocated_total().unwrap().is_zero());
    }

    #[test]
    fn rejects_foreign_currency_ssp() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut contract = contract_with(&[]);
        let eur = Money::new(dec!(10), CurrencyCode::new("EUR")).unwrap();
        contract.add_obligation(PerformanceObligation::new(
            "Import",
            SatisfactionMethod::OverTime,
            eur,
            created,
        ));
        let policy = RecognitionPolicy::default();
        let err =
            AllocationService::allocate_transaction_price(&mut contract, &policy).unwrap_err();
        assert!(matches!(err, CoreError::CurrencyMismatch { .. }));
    }
}
