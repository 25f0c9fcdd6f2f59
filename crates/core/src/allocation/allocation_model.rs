//! Allocation input and output models.

use serde::{Deserialize, Serialize};

use crate::ids::InvestorId;
use crate::utils::{money, zero_money, Money, Percentage};

/// Period-level aggregate used as allocation input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationSnapshotInput {
    pub opening_nav: Money,
    pub contributions_total: Money,
    pub withdrawals_total: Money,
    pub income_total: Money,
    pub expenses_total: Money,
    pub closing_nav: Money,
}

impl AllocationSnapshotInput {
    /// Builds a snapshot whose `closing_nav` is derived from the flows.
    pub fn from_flows(
        opening_nav: Money,
        contributions_total: Money,
        withdrawals_total: Money,
        income_total: Money,
        expenses_total: Money,
    ) -> Self {
        let closing_nav = money(
            opening_nav + contributions_total - withdrawals_total + income_total - expenses_total,
        );
        Self {
            opening_nav: money(opening_nav),
            contributions_total: money(contributions_total),
            withdrawals_total: money(withdrawals_total),
            income_total: money(income_total),
            expenses_total: money(expenses_total),
            closing_nav,
        }
    }
}

/// Per-investor input to one allocation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestorOpening {
    pub investor_id: InvestorId,
    pub opening_balance: Money,
    pub contributions: Money,
    pub withdrawals: Money,
}

impl InvestorOpening {
    pub fn new(investor_id: InvestorId, opening_balance: Money) -> Self {
        Self {
            investor_id,
            opening_balance,
            contributions: zero_money(),
            withdrawals: zero_money(),
        }
    }

    pub fn with_contributions(mut self, contributions: Money) -> Self {
        self.contributions = contributions;
        self
    }

    pub fn with_withdrawals(mut self, withdrawals: Money) -> Self {
        self.withdrawals = withdrawals;
        self
    }
}

/// One investor's allocation outcome for a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestorAllocationResult {
    pub investor_id: InvestorId,
    pub opening_balance: Money,
    pub ownership_pct: Percentage,
    pub income_share: Money,
    pub expense_share: Money,
    /// `income_share - expense_share`
    pub net_alloc: Money,
    pub contributions: Money,
    pub withdrawals: Money,
    /// `opening_balance + net_alloc + contributions - withdrawals`
    pub closing_balance: Money,
}
