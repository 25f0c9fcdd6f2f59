//! Reduction of a period's ledger entries into canonical totals.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ledger_model::{LedgerEntry, LedgerEntryType};
use crate::ids::InvestorId;
use crate::utils::{money, zero_money, Money};

/// Typed totals of one period's ledger, plus per-investor capital flows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerTotals {
    pub contributions: Money,
    pub withdrawals: Money,
    pub income: Money,
    pub expenses: Money,
    pub investor_contributions: BTreeMap<InvestorId, Money>,
    pub investor_withdrawals: BTreeMap<InvestorId, Money>,
}

impl Default for LedgerTotals {
    fn default() -> Self {
        Self {
            contributions: zero_money(),
            withdrawals: zero_money(),
            income: zero_money(),
            expenses: zero_money(),
            investor_contributions: BTreeMap::new(),
            investor_withdrawals: BTreeMap::new(),
        }
    }
}

impl LedgerTotals {
    /// `income - expenses`
    pub fn net_result(&self) -> Money {
        money(self.income - self.expenses)
    }

    /// `opening_nav + contributions - withdrawals + income - expenses`
    pub fn closing_nav(&self, opening_nav: Money) -> Money {
        money(money(opening_nav) + self.contributions - self.withdrawals + self.income - self.expenses)
    }

    pub fn contributions_for(&self, investor_id: InvestorId) -> Money {
        self.investor_contributions
            .get(&investor_id)
            .copied()
            .unwrap_or_else(zero_money)
    }

    pub fn withdrawals_for(&self, investor_id: InvestorId) -> Money {
        self.investor_withdrawals
            .get(&investor_id)
            .copied()
            .unwrap_or_else(zero_money)
    }

    fn add_contribution(&mut self, investor_id: Option<InvestorId>, amount: Money) {
        self.contributions = money(self.contributions + amount);
        if let Some(investor_id) = investor_id {
            let slot = self
                .investor_contributions
                .entry(investor_id)
                .or_insert_with(zero_money);
            *slot = money(*slot + amount);
        }
    }

    fn add_withdrawal(&mut self, investor_id: Option<InvestorId>, amount: Money) {
        self.withdrawals = money(self.withdrawals + amount);
        if let Some(investor_id) = investor_id {
            let slot = self
                .investor_withdrawals
                .entry(investor_id)
                .or_insert_with(zero_money);
            *slot = money(*slot + amount);
        }
    }
}

/// Aggregates entries into [`LedgerTotals`].
///
/// Adjustments are reclassified: without an investor, a non-negative amount
/// is income and a negative one an expense (by magnitude); with an investor,
/// a non-negative amount is a contribution and a negative one a withdrawal
/// (by magnitude). Each addition is quantized immediately.
pub fn aggregate_entries(entries: &[LedgerEntry]) -> LedgerTotals {
    let mut totals = LedgerTotals::default();

    for entry in entries {
        let amount = money(entry.amount);
        match entry.entry_type {
            LedgerEntryType::Contribution => totals.add_contribution(entry.investor_id, amount),
            LedgerEntryType::Withdrawal => totals.add_withdrawal(entry.investor_id, amount),
            LedgerEntryType::Income => totals.income = money(totals.income + amount),
            LedgerEntryType::Expense => totals.expenses = money(totals.expenses + amount),
            LedgerEntryType::Adjustment => match entry.investor_id {
                None if amount >= zero_money() => totals.income = money(totals.income + amount),
                None => totals.expenses = money(totals.expenses + amount.abs()),
                Some(_) if amount >= zero_money() => totals.add_contribution(entry.investor_id, amount),
                Some(_) => totals.add_withdrawal(entry.investor_id, amount.abs()),
            },
        }
    }

    totals
}
