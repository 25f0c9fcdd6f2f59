use thiserror::Error;

use super::periods_model::PeriodStatus;
use crate::ids::{ClubId, InvestorId, PeriodId};
use crate::utils::Money;

/// Lifecycle and opening-resolution errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PeriodError {
    /// Write attempted against a closed period.
    #[error("Period {year_month} is closed and locked. Post an adjustment in a later open period instead.")]
    Locked {
        period_id: PeriodId,
        year_month: String,
    },

    #[error("Period {period_id} cannot be closed; failed checks: {}", failed.join(", "))]
    ChecklistFailed {
        period_id: PeriodId,
        failed: Vec<String>,
    },

    #[error("Cannot move period from {from} to {to}")]
    InvalidTransition { from: PeriodStatus, to: PeriodStatus },

    #[error("Cannot {action} while period is {status}")]
    ActionNotAllowed {
        action: &'static str,
        status: PeriodStatus,
    },

    #[error("Period {year_month} already exists for club {club_id}")]
    AlreadyExists { club_id: ClubId, year_month: String },

    #[error("Opening balances reference unknown or inactive investors: {0:?}")]
    UnknownInvestors(Vec<InvestorId>),

    #[error("Opening NAV {opening_nav} does not match the sum of investor openings {opening_sum}")]
    OpeningNavMismatch {
        opening_nav: Money,
        opening_sum: Money,
    },

    #[error("Opening NAV {0} must be split across investors when the club has active investors")]
    UnallocatedOpeningNav(Money),

    #[error("No opening source: supply opening balances, close a prior period, or give an opening NAV")]
    MissingOpeningSource,
}
