//! Posting recognition entries against their contract, and reversing them.

use revrec_domain::{Contract, Displayable, RecognitionStatus, RevenueRecognitionEntry};
use tracing::{info, warn};

use crate::{
    error::CoreError, policy::RecognitionPolicy, time::Clock, validation_service::ValidationService,
};

/// Moves recognition entries through `pending -> recognized -> reversed`.
pub struct PostingService;

impl PostingService {
    /// Posts a pending entry, adding its amount to the obligation's recognised total.
    ///
    /// Fails with `InvalidStateTransition` unless the entry is pending, and with
    /// `ValidationFailed` when the entry or its contract break a business rule. The
    /// obligation and entry are only mutated once every check has passed.
    pub fn recognize(
        entry: &mut RevenueRecognitionEntry,
        contract: &mut Contract,
        policy: &RecognitionPolicy,
        clock: &dyn Clock,
    ) -> Result<(), CoreError> {
        ensure_status(entry, RecognitionStatus::Recognized)?;
        let result = ValidationService::validate_entry_against_contract(entry, contract, policy);
        if !result.is_valid() {
            warn!(
                entry = %entry.display_label(),
                violations = result.errors.len(),
                "posting rejected"
            );
            return result.into_result();
        }

        let now = clock.now();
        let obligation = contract
            .obligation_mut(entry.performance_obligation_id)
            .ok_or(CoreError::ObligationNotFound(entry.performance_obligation_id))?;
        obligation.apply_recognition(&entry.amount)?;
        entry.transition_to(RecognitionStatus::Recognized, now)?;
        contract.touch(now);

        info!(entry = %entry.display_label(), "recognition entry posted");
        Ok(())
    }

    /// Reverses a posted entry without touching the obligation balance.
    pub fn reverse(
        entry: &mut RevenueRecognitionEntry,
        clock: &dyn Clock,
    ) -> Result<(), CoreError> {
        ensure_status(entry, RecognitionStatus::Reversed)?;
        entry.transition_to(RecognitionStatus::Reversed, clock.now())?;
        info!(entry = %entry.display_label(), "recognition entry reversed");
        Ok(())
    }

    /// Reverses a posted entry and, when the policy asks for it, gives the amount back to
    /// the obligation it was recognised against.
    pub fn reverse_with_contract(
        entry: &mut RevenueRecognitionEntry,
        contract: &mut Contract,
        policy: &RecognitionPolicy,
        clock: &dyn Clock,
    ) -> Result<(), CoreError> {
        ensure_status(entry, RecognitionStatus::Reversed)?;
        if !policy.reversal_restores_balance {
            return Self::reverse(entry, clock);
        }
        if entry.contract_id != contract.id {
            return Err(CoreError::ContractNotFound(entry.contract_id));
        }
        let now = clock.now();
        let obligation = contract
            .obligation_mut(entry.performance_obligation_id)
            .ok_or(CoreError::ObligationNotFound(entry.performance_obligation_id))?;
        obligation.release_recognition(&entry.amount)?;
        entry.transition_to(RecognitionStatus::Reversed, now)?;
        contract.touch(now);
        info!(
            entry = %entry.display_label(),
            "recognition entry reversed, obligation balance restored"
        );
        Ok(())
    }

    /// Cancels a pending entry before it is posted.
    pub fn cancel(entry: &mut RevenueRecognitionEntry, clock: &dyn Clock) -> Result<(), CoreError> {
        ensure_status(entry, RecognitionStatus::Cancelled)?;
        entry.transition_to(RecognitionStatus::Cancelled, clock.now())?;
        info!(entry = %entry.display_label(), "recognition entry cancelled");
        Ok(())
    }
}

fn ensure_status(
    entry: &RevenueRecognitionEntry,
    next: RecognitionStatus,
) -> Result<(), CoreError> {
    if entry.status().can_transition_to(next) {
        return Ok(());
    }
    warn!(entry = %entry.display_label(), to = %next, "illegal entry transition");
    Err(CoreError::InvalidStateTransition {
        entity: "recognition entry".into(),
        from: entry.status().to_string(),
        to: next.to_string(),
    })
}
