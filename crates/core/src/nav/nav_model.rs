//! NAV computation and snapshot models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::allocation::InvestorAllocationResult;
use crate::ids::{ClubId, InvestorId, PeriodId, SnapshotId};
use crate::periods::PeriodStatus;
use crate::reconciliation::ReconciliationResult;
use crate::utils::{Money, Percentage};

/// Period-level figures after one recomputation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodTotals {
    pub contributions: Money,
    pub withdrawals: Money,
    pub income: Money,
    pub expenses: Money,
    pub net_result: Money,
    pub closing_nav: Money,
    pub investor_total: Money,
    /// `investor_total - closing_nav`
    pub mismatch: Money,
}

/// How one investor's closing balance came about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestorExplanation {
    pub investor_id: InvestorId,
    pub ownership_pct: Percentage,
    pub income_share: Money,
    pub expense_share: Money,
    pub net_alloc: Money,
    pub closing_balance: Money,
}

impl From<&InvestorAllocationResult> for InvestorExplanation {
    fn from(row: &InvestorAllocationResult) -> Self {
        Self {
            investor_id: row.investor_id,
            ownership_pct: row.ownership_pct,
            income_share: row.income_share,
            expense_share: row.expense_share,
            net_alloc: row.net_alloc,
            closing_balance: row.closing_balance,
        }
    }
}

/// Output of one aggregate-allocate-reconcile pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavComputation {
    pub opening_nav: Money,
    pub totals: PeriodTotals,
    /// Ordered by investor id ascending
    pub allocations: Vec<InvestorAllocationResult>,
    pub reconciliation: ReconciliationResult,
}

impl NavComputation {
    pub fn explainability(&self) -> Vec<InvestorExplanation> {
        self.allocations.iter().map(InvestorExplanation::from).collect()
    }
}

/// Read-only view of a period's NAV, computed without writing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavPreview {
    pub club_id: ClubId,
    pub period_id: PeriodId,
    pub status: PeriodStatus,
    pub opening_nav: Money,
    pub totals: PeriodTotals,
    pub allocations: Vec<InvestorAllocationResult>,
    pub explainability: Vec<InvestorExplanation>,
    pub reconciliation: ReconciliationResult,
}

/// Club-level figures frozen at close.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavSnapshot {
    pub id: SnapshotId,
    pub club_id: ClubId,
    pub period_id: PeriodId,
    pub opening_nav: Money,
    pub contributions_total: Money,
    pub withdrawals_total: Money,
    pub income_total: Money,
    pub expenses_total: Money,
    pub closing_nav: Money,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNavSnapshot {
    pub club_id: ClubId,
    pub period_id: PeriodId,
    pub opening_nav: Money,
    pub contributions_total: Money,
    pub withdrawals_total: Money,
    pub income_total: Money,
    pub expenses_total: Money,
    pub closing_nav: Money,
}

impl NewNavSnapshot {
    pub fn from_preview(preview: &NavPreview) -> Self {
        Self {
            club_id: preview.club_id,
            period_id: preview.period_id,
            opening_nav: preview.opening_nav,
            contributions_total: preview.totals.contributions,
            withdrawals_total: preview.totals.withdrawals,
            income_total: preview.totals.income,
            expenses_total: preview.totals.expenses,
            closing_nav: preview.totals.closing_nav,
        }
    }
}

/// One investor's balance frozen at close.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestorBalance {
    pub id: i64,
    pub snapshot_id: SnapshotId,
    pub club_id: ClubId,
    pub period_id: PeriodId,
    pub investor_id: InvestorId,
    pub opening_balance: Money,
    pub ownership_pct: Percentage,
    pub contributions: Money,
    pub withdrawals: Money,
    pub income_alloc: Money,
    pub expense_alloc: Money,
    pub net_alloc: Money,
    pub closing_balance: Money,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInvestorBalance {
    pub club_id: ClubId,
    pub period_id: PeriodId,
    pub investor_id: InvestorId,
    pub opening_balance: Money,
    pub ownership_pct: Percentage,
    pub contributions: Money,
    pub withdrawals: Money,
    pub income_alloc: Money,
    pub expense_alloc: Money,
    pub net_alloc: Money,
    pub closing_balance: Money,
}

impl NewInvestorBalance {
    pub fn from_allocation(club_id: ClubId, period_id: PeriodId, row: &InvestorAllocationResult) -> Self {
        Self {
            club_id,
            period_id,
            investor_id: row.investor_id,
            opening_balance: row.opening_balance,
            ownership_pct: row.ownership_pct,
            contributions: row.contributions,
            withdrawals: row.withdrawals,
            income_alloc: row.income_share,
            expense_alloc: row.expense_share,
            net_alloc: row.net_alloc,
            closing_balance: row.closing_balance,
        }
    }
}

/// Snapshot header with its investor balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavSnapshotRecord {
    pub snapshot: NavSnapshot,
    pub balances: Vec<InvestorBalance>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightLevel {
    Info,
    Warning,
    Critical,
}

/// Rule-based observation about a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub code: String,
    pub level: InsightLevel,
    pub title: String,
    pub description: String,
}
