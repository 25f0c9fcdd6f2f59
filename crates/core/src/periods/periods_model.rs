//! Accounting period domain models.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::allocation::InvestorAllocationResult;
use crate::constants::{MAX_PERIOD_YEAR, MIN_PERIOD_YEAR};
use crate::errors::{Result, ValidationError};
use crate::ids::{ClubId, InvestorId, PeriodId, UserId};
use crate::nav::{NavSnapshotRecord, PeriodTotals};
use crate::reconciliation::ReconciliationStamp;
use crate::utils::time_utils::{period_key, year_month_label};
use crate::utils::{pct, zero_money, Money, Percentage};

/// Lifecycle status of an accounting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodStatus {
    Draft,
    Review,
    Closed,
}

impl PeriodStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodStatus::Draft => "draft",
            PeriodStatus::Review => "review",
            PeriodStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for PeriodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(PeriodStatus::Draft),
            "review" => Ok(PeriodStatus::Review),
            "closed" => Ok(PeriodStatus::Closed),
            other => Err(format!("Unknown period status: {}", other)),
        }
    }
}

/// One club-month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountingPeriod {
    pub id: PeriodId,
    pub club_id: ClubId,
    pub year: i32,
    pub month: u32,
    pub status: PeriodStatus,
    pub opening_nav: Money,
    pub closing_nav: Money,
    /// Investor total minus closing NAV as of the last recomputation
    pub reconciliation_diff: Money,
    pub locked_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub closed_by_user_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AccountingPeriod {
    pub fn year_month(&self) -> String {
        year_month_label(self.year, self.month)
    }

    /// `year * 100 + month`, ordered chronologically.
    pub fn period_key(&self) -> i64 {
        period_key(self.year, self.month)
    }

    pub fn is_closed(&self) -> bool {
        self.status == PeriodStatus::Closed
    }
}

/// Persisted per-investor allocation row of one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestorPosition {
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

impl InvestorPosition {
    /// A fresh position holding only its opening balance.
    pub fn opening(period_id: PeriodId, investor_id: InvestorId, opening_balance: Money) -> Self {
        Self {
            period_id,
            investor_id,
            opening_balance,
            ownership_pct: pct(Decimal::ZERO),
            contributions: zero_money(),
            withdrawals: zero_money(),
            income_alloc: zero_money(),
            expense_alloc: zero_money(),
            net_alloc: zero_money(),
            closing_balance: opening_balance,
        }
    }

    pub fn apply_allocation(&mut self, row: &InvestorAllocationResult) {
        self.ownership_pct = row.ownership_pct;
        self.contributions = row.contributions;
        self.withdrawals = row.withdrawals;
        self.income_alloc = row.income_share;
        self.expense_alloc = row.expense_share;
        self.net_alloc = row.net_alloc;
        self.closing_balance = row.closing_balance;
    }
}

/// Request to open a new period.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPeriod {
    pub club_id: ClubId,
    pub year: i32,
    pub month: u32,
    #[serde(default)]
    pub opening_nav: Option<Money>,
    /// Explicit opening balance per investor
    #[serde(default)]
    pub investor_openings: Option<BTreeMap<InvestorId, Money>>,
}

impl NewPeriod {
    pub fn validate(&self) -> Result<()> {
        if !(1..=12).contains(&self.month) {
            return Err(ValidationError::InvalidInput(format!(
                "Month must be between 1 and 12, got {}",
                self.month
            ))
            .into());
        }
        if !(MIN_PERIOD_YEAR..=MAX_PERIOD_YEAR).contains(&self.year) {
            return Err(ValidationError::InvalidInput(format!(
                "Year must be between {} and {}, got {}",
                MIN_PERIOD_YEAR, MAX_PERIOD_YEAR, self.year
            ))
            .into());
        }
        Ok(())
    }

    pub fn year_month(&self) -> String {
        year_month_label(self.year, self.month)
    }
}

/// Opening balance of one investor in a period about to be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInvestorPosition {
    pub investor_id: InvestorId,
    pub opening_balance: Money,
}

/// Storage input for a new period and its opening positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccountingPeriod {
    pub club_id: ClubId,
    pub year: i32,
    pub month: u32,
    pub opening_nav: Money,
    pub positions: Vec<NewInvestorPosition>,
}

/// Close checklist. Closing requires every item to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CloseChecklist {
    pub has_positions: bool,
    pub has_ledger_entries: bool,
    pub submitted_for_review: bool,
    pub reconciled: bool,
    pub not_already_closed: bool,
}

impl CloseChecklist {
    pub fn can_close(&self) -> bool {
        self.failed_items().is_empty()
    }

    /// Keys of the items that do not hold, in checklist order.
    pub fn failed_items(&self) -> Vec<&'static str> {
        [
            ("has_positions", self.has_positions),
            ("has_ledger_entries", self.has_ledger_entries),
            ("submitted_for_review", self.submitted_for_review),
            ("reconciled", self.reconciled),
            ("not_already_closed", self.not_already_closed),
        ]
        .into_iter()
        .filter(|(_, ok)| !ok)
        .map(|(key, _)| key)
        .collect()
    }
}

/// Period with its current totals, positions and reconciliation stamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodState {
    pub period: AccountingPeriod,
    pub totals: PeriodTotals,
    pub positions: Vec<InvestorPosition>,
    pub stamp: ReconciliationStamp,
}

/// Result of closing a period.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseOutcome {
    pub period: AccountingPeriod,
    pub snapshot: NavSnapshotRecord,
    /// True when the period was closed before this call
    pub already_closed: bool,
}
