use serde::{Deserialize, Serialize};

use crate::utils::Money;

/// Outcome of comparing investor closing balances with the closing NAV.
///
/// A failed reconciliation is an expected state of an open period, not an
/// error. `reasons` is empty exactly when `passed` is true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationResult {
    pub passed: bool,
    /// `sum(closing_balance) - closing_nav`
    pub mismatch: Money,
    pub reasons: Vec<String>,
}

/// Operator-facing summary of a period's reconciliation state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationStamp {
    pub reconciled: bool,
    pub stamp: String,
    pub mismatch_abs: Money,
    pub club_closing_nav: Money,
    pub investor_total: Money,
}
