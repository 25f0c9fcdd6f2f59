use rust_decimal::Decimal;
use thiserror::Error;

use crate::ids::InvestorId;

/// Precondition violations of an allocation run.
///
/// Any of these aborts the run before a single share is computed; callers
/// must not persist or reconcile a rejected allocation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AllocationError {
    #[error("{field} must be >= 0 (got {value})")]
    NegativeAmount { field: &'static str, value: Decimal },

    #[error("{field} exceeds the largest accepted amount (got {value})")]
    AmountOutOfRange { field: &'static str, value: Decimal },

    #[error("opening_nav must be >= 0 (got {0})")]
    NegativeOpeningNav(Decimal),

    #[error("Investor opening balances must sum exactly to opening_nav ({opening_sum} != {opening_nav})")]
    OpeningSumMismatch {
        opening_nav: Decimal,
        opening_sum: Decimal,
    },

    #[error("opening_nav cannot be 0 when investor openings are non-zero (sum {opening_sum})")]
    NonZeroOpeningsWithZeroNav { opening_sum: Decimal },

    #[error("Investor {0} appears more than once in the allocation input")]
    DuplicateInvestor(InvestorId),
}
