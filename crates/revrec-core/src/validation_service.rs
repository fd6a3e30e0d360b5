//! Structural and business-rule checks run before activation, allocation and posting.
//!
//! Every check accumulates violations instead of stopping at the first one, so callers can
//! present complete feedback.

use revrec_domain::{Contract, ContractStatus, RevenueRecognitionEntry};

use crate::{
    error::{CoreError, Violation, ViolationCode},
    policy::RecognitionPolicy,
};

/// Outcome of a validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub errors: Vec<Violation>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn push(&mut self, code: ViolationCode, message: impl Into<String>) {
        self.errors.push(Violation::new(code, message));
    }

    pub fn extend(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
    }

    pub fn has(&self, code: ViolationCode) -> bool {
        self.errors.iter().any(|violation| violation.code == code)
    }

    /// Converts into `Err(ValidationFailed)` carrying every violation.
    pub fn into_result(self) -> Result<(), CoreError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(CoreError::ValidationFailed(self.errors))
        }
    }
}

/// Stateless validation rules for contracts and recognition entries.
pub struct ValidationService;

impl ValidationService {
    /// Checks the contract's structural invariants.
    pub fn validate_contract(contract: &Contract, policy: &RecognitionPolicy) -> ValidationResult {
        let mut result = ValidationResult::default();

        if contract.customer_id.is_nil() {
            result.push(ViolationCode::MissingCustomer, "customer id is required");
        }
        if contract.contract_number.trim().is_empty() {
            result.push(
                ViolationCode::MissingContractNumber,
                "contract number is required",
            );
        }
        if contract.title.trim().is_empty() {
            result.push(ViolationCode::MissingTitle, "contract title is required");
        }
        match (contract.start_date, contract.end_date) {
            (None, _) => result.push(ViolationCode::MissingStartDate, "start date is required"),
            (Some(start), Some(end)) if end < start => result.push(
                ViolationCode::EndBeforeStart,
                format!("end date {end} is before start date {start}"),
            ),
            _ => {}
        }
        if !contract.total_value.is_positive() {
            result.push(
                ViolationCode::NonPositiveTotal,
                "total value must be greater than zero",
            );
        }
        if contract.obligations().is_empty() {
            result.push(
                ViolationCode::NoObligations,
                "at least one performance obligation is required",
            );
        }

        let currency = contract.currency();
        for obligation in contract.obligations() {
            if obligation.standalone_selling_price.currency() != currency
                || obligation.currency() != currency
            {
                result.push(
                    ViolationCode::CurrencyMismatch,
                    format!(
                        "obligation `{}` is priced in {} but the contract is in {}",
                        obligation.description,
                        obligation.standalone_selling_price.currency(),
                        currency
                    ),
                );
            }
        }

        if !contract.obligations().is_empty() && !result.has(ViolationCode::CurrencyMismatch) {
            let allocation = contract.allocated_total().and_then(|allocated| {
                let difference = allocated.abs_diff(&contract.total_value)?;
                Ok((allocated, difference))
            });
            match allocation {
                Ok((allocated, difference)) if difference > policy.allocation_tolerance => {
                    result.push(
                        ViolationCode::AllocationMismatch,
                        format!(
                            "allocated total {allocated} does not match contract value {}",
                            contract.total_value
                        ),
                    );
                }
                Ok(_) => {}
                Err(err) => result.push(ViolationCode::AllocationMismatch, err.to_string()),
            }
        }

        result
    }

    /// Checks the entry on its own, without looking at the contract.
    pub fn validate_entry(entry: &RevenueRecognitionEntry) -> ValidationResult {
        let mut result = ValidationResult::default();
        if !entry.amount.is_positive() {
            result.push(
                ViolationCode::NonPositiveAmount,
                "recognition amount must be greater than zero",
            );
        }
        if !entry.period_matches_date() {
            result.push(
                ViolationCode::PeriodMismatch,
                format!(
                    "recognition date {} does not fall in period {}",
                    entry.recognition_date, entry.period
                ),
            );
        }
        result
    }

    /// Checks the entry against the contract it references, including the contract's own
    /// structural validation.
    pub fn validate_entry_against_contract(
        entry: &RevenueRecognitionEntry,
        contract: &Contract,
        policy: &RecognitionPolicy,
    ) -> ValidationResult {
        let mut result = Self::validate_entry(entry);

        if entry.contract_id != contract.id || entry.tenant_id != contract.tenant_id {
            result.push(
                ViolationCode::ContractMismatch,
                format!(
                    "entry references contract {} but was checked against {}",
                    entry.contract_id, contract.id
                ),
            );
        }
        if contract.status() != ContractStatus::Active {
            result.push(
                ViolationCode::ContractNotActive,
                format!(
                    "contract is {}, revenue can only post to active contracts",
                    contract.status()
                ),
            );
        }
        if entry.amount.currency() != contract.currency() {
            result.push(
                ViolationCode::CurrencyMismatch,
                format!(
                    "entry is in {} but the contract is in {}",
                    entry.amount.currency(),
                    contract.currency()
                ),
            );
        }

        match contract.obligation(entry.performance_obligation_id) {
            None => result.push(
                ViolationCode::ObligationNotFound,
                format!(
                    "performance obligation {} is not part of the contract",
                    entry.performance_obligation_id
                ),
            ),
            Some(obligation) => {
                let remaining = obligation.remaining_amount();
                if entry.amount.amount() > remaining.amount() {
                    result.push(
                        ViolationCode::ExceedsRemaining,
                        format!(
                            "entry amount {} exceeds remaining {} on `{}`",
                            entry.amount, remaining, obligation.description
                        ),
                    );
                }
            }
        }

        result.extend(Self::validate_contract(contract, policy));
        result
    }
}
