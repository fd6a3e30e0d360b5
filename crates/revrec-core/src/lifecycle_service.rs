//! Contract lifecycle: draft -> active -> completed, with cancellation from draft or active.

use revrec_domain::{Contract, ContractStatus, Displayable};
use tracing::{info, warn};

use crate::{
    error::{CoreError, ViolationCode},
    policy::RecognitionPolicy,
    time::Clock,
    validation_service::{ValidationResult, ValidationService},
};

/// Drives contract status changes, guarding each edge of the lifecycle graph.
pub struct LifecycleService;

impl LifecycleService {
    /// Activates a draft contract once it passes structural validation.
    pub fn activate(
        contract: &mut Contract,
        policy: &RecognitionPolicy,
        clock: &dyn Clock,
    ) -> Result<(), CoreError> {
        ensure_transition(contract, ContractStatus::Active)?;
        let result = ValidationService::validate_contract(contract, policy);
        if !result.is_valid() {
            warn!(
                contract = %contract.display_label(),
                violations = result.errors.len(),
                "activation rejected"
            );
            return result.into_result();
        }
        contract.transition_to(ContractStatus::Active, clock.now())?;
        info!(contract = %contract.display_label(), "contract activated");
        Ok(())
    }

    /// Completes an active contract. Every distinct obligation must be satisfied first.
    pub fn complete(contract: &mut Contract, clock: &dyn Clock) -> Result<(), CoreError> {
        ensure_transition(contract, ContractStatus::Completed)?;
        let mut result = ValidationResult::default();
        for obligation in contract.distinct_obligations() {
            if !obligation.is_satisfied() {
                result.push(
                    ViolationCode::UnsatisfiedObligation,
                    format!(
                        "obligation `{}` has {} left to recognise",
                        obligation.description,
                        obligation.remaining_amount()
                    ),
                );
            }
        }
        result.into_result()?;
        contract.transition_to(ContractStatus::Completed, clock.now())?;
        info!(contract = %contract.display_label(), "contract completed");
        Ok(())
    }

    /// Cancels a contract that has not been completed.
    pub fn cancel(contract: &mut Contract, clock: &dyn Clock) -> Result<(), CoreError> {
        ensure_transition(contract, ContractStatus::Cancelled)?;
        contract.transition_to(ContractStatus::Cancelled, clock.now())?;
        info!(contract = %contract.display_label(), "contract cancelled");
        Ok(())
    }
}

fn ensure_transition(contract: &Contract, next: ContractStatus) -> Result<(), CoreError> {
    if contract.status().can_transition_to(next) {
        return Ok(());
    }
    warn!(
        contract = %contract.display_label(),
        to = %next,
        "illegal contract transition"
    );
    Err(CoreError::InvalidStateTransition {
        entity: "contract".into(),
        from: contract.status().to_string(),
        to: next.to_string(),
    })
}
