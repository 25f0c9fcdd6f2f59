//! Period state machine: `draft -> review -> closed`.
//!
//! These functions only inspect and mutate the in-memory period; persisting
//! the result is the caller's job.

use chrono::{DateTime, Utc};

use super::periods_errors::PeriodError;
use super::periods_model::{AccountingPeriod, CloseChecklist, PeriodStatus};
use crate::errors::Result;
use crate::ids::UserId;
use crate::reconciliation::ReconciliationResult;

fn locked(period: &AccountingPeriod) -> PeriodError {
    PeriodError::Locked {
        period_id: period.id,
        year_month: period.year_month(),
    }
}

/// Rejects any write against a closed period.
pub fn assert_period_writable(period: &AccountingPeriod) -> Result<()> {
    if period.is_closed() {
        return Err(locked(period).into());
    }
    Ok(())
}

/// Entries can be edited in draft and review.
pub fn assert_entries_editable(period: &AccountingPeriod) -> Result<()> {
    assert_period_writable(period)
}

/// Entries can be deleted only in draft.
pub fn assert_entries_deletable(period: &AccountingPeriod) -> Result<()> {
    assert_period_writable(period)?;
    if period.status != PeriodStatus::Draft {
        return Err(PeriodError::ActionNotAllowed {
            action: "delete ledger entries",
            status: period.status,
        }
        .into());
    }
    Ok(())
}

/// Moves a draft period to review. Returns false when it already was in review.
pub fn submit_for_review(period: &mut AccountingPeriod, now: DateTime<Utc>) -> Result<bool> {
    assert_period_writable(period)?;
    if period.status == PeriodStatus::Review {
        return Ok(false);
    }
    period.status = PeriodStatus::Review;
    period.updated_at = now;
    Ok(true)
}

/// Manual reset to draft or review. Closing goes through [`close_period`].
pub fn set_status(
    period: &mut AccountingPeriod,
    target: PeriodStatus,
    now: DateTime<Utc>,
) -> Result<()> {
    assert_period_writable(period)?;
    if target == PeriodStatus::Closed {
        return Err(PeriodError::InvalidTransition {
            from: period.status,
            to: target,
        }
        .into());
    }
    if period.status != target {
        period.status = target;
        period.updated_at = now;
    }
    Ok(())
}

pub fn build_close_checklist(
    period: &AccountingPeriod,
    position_count: usize,
    has_ledger_entries: bool,
    reconciliation: &ReconciliationResult,
) -> CloseChecklist {
    CloseChecklist {
        has_positions: position_count > 0,
        has_ledger_entries,
        submitted_for_review: matches!(period.status, PeriodStatus::Review | PeriodStatus::Closed),
        reconciled: reconciliation.passed,
        not_already_closed: !period.is_closed(),
    }
}

/// Closes the period when the checklist passes.
///
/// `closed_at` and `locked_at` get the same instant.
pub fn close_period(
    period: &mut AccountingPeriod,
    closed_by: UserId,
    checklist: &CloseChecklist,
    now: DateTime<Utc>,
) -> Result<()> {
    assert_period_writable(period)?;
    if !checklist.can_close() {
        return Err(PeriodError::ChecklistFailed {
            period_id: period.id,
            failed: checklist
                .failed_items()
                .into_iter()
                .map(String::from)
                .collect(),
        }
        .into());
    }
    period.status = PeriodStatus::Closed;
    period.closed_at = Some(now);
    period.locked_at = Some(now);
    period.closed_by_user_id = Some(closed_by);
    period.updated_at = now;
    Ok(())
}
