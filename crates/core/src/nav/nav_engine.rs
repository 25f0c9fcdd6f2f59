//! Aggregate, allocate and reconcile one period.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use log::{debug, warn};

use super::nav_model::{NavComputation, PeriodTotals};
use crate::allocation::{allocate_returns, AllocationSnapshotInput, InvestorOpening};
use crate::errors::Result;
use crate::ledger::{aggregate_entries, LedgerEntry, LedgerTotals};
use crate::periods::{AccountingPeriod, InvestorPosition};
use crate::reconciliation::validate;
use crate::utils::{money, sum_money, zero_money, Money};

/// Allocation inputs from stored positions and the period's capital flows,
/// ordered by investor id ascending.
pub fn investor_openings(positions: &[InvestorPosition], totals: &LedgerTotals) -> Vec<InvestorOpening> {
    let mut openings: Vec<InvestorOpening> = positions
        .iter()
        .map(|position| {
            InvestorOpening::new(position.investor_id, position.opening_balance)
                .with_contributions(totals.contributions_for(position.investor_id))
                .with_withdrawals(totals.withdrawals_for(position.investor_id))
        })
        .collect();
    openings.sort_by_key(|row| row.investor_id);
    openings
}

/// Computes totals, allocations and reconciliation for one period.
///
/// Pure. With no positions, allocation is skipped and the whole closing NAV
/// shows up as mismatch.
pub fn compute_period_nav(
    opening_nav: Money,
    entries: &[LedgerEntry],
    positions: &[InvestorPosition],
    currency_code: &str,
) -> Result<NavComputation> {
    let opening_nav = money(opening_nav);
    let ledger_totals = aggregate_entries(entries);
    let closing_nav = ledger_totals.closing_nav(opening_nav);

    let allocations = if positions.is_empty() {
        Vec::new()
    } else {
        let snapshot = AllocationSnapshotInput::from_flows(
            opening_nav,
            ledger_totals.contributions,
            ledger_totals.withdrawals,
            ledger_totals.income,
            ledger_totals.expenses,
        );
        allocate_returns(&snapshot, &investor_openings(positions, &ledger_totals))?
    };

    let investor_total = if allocations.is_empty() {
        zero_money()
    } else {
        sum_money(allocations.iter().map(|row| &row.closing_balance))
    };
    let reconciliation = validate(closing_nav, &allocations, currency_code);

    let totals = PeriodTotals {
        contributions: ledger_totals.contributions,
        withdrawals: ledger_totals.withdrawals,
        income: ledger_totals.income,
        expenses: ledger_totals.expenses,
        net_result: ledger_totals.net_result(),
        closing_nav,
        investor_total,
        mismatch: money(investor_total - closing_nav),
    };

    debug!(
        "NAV computed: opening {} closing {} investor total {} over {} entries",
        opening_nav,
        totals.closing_nav,
        totals.investor_total,
        entries.len()
    );

    Ok(NavComputation {
        opening_nav,
        totals,
        allocations,
        reconciliation,
    })
}

/// Writes a computation onto the period and its positions.
pub fn apply_computation(
    period: &mut AccountingPeriod,
    positions: &mut [InvestorPosition],
    computation: &NavComputation,
    now: DateTime<Utc>,
) {
    period.closing_nav = computation.totals.closing_nav;
    period.reconciliation_diff = computation.totals.mismatch;
    period.updated_at = now;

    let by_investor: BTreeMap<_, _> = computation
        .allocations
        .iter()
        .map(|row| (row.investor_id, row))
        .collect();
    for position in positions.iter_mut() {
        if let Some(row) = by_investor.get(&position.investor_id) {
            position.apply_allocation(row);
        }
    }

    if !computation.reconciliation.passed {
        warn!(
            "Period {} does not reconcile: {}",
            period.year_month(),
            computation.reconciliation.reasons.join(" ")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LedgerEntryType;
    use crate::periods::PeriodStatus;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn entry(id: i64, entry_type: LedgerEntryType, investor_id: Option<i64>, amount: Money) -> LedgerEntry {
        LedgerEntry {
            id,
            club_id: 1,
            period_id: 7,
            investor_id,
            entry_type,
            amount,
            category: "general".to_string(),
            tx_date: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            description: "entry".to_string(),
            note: None,
            reference: None,
            created_by_user_id: 1,
            created_at: Utc::now(),
        }
    }

    fn scenario_entries() -> Vec<LedgerEntry> {
        vec![
            entry(1, LedgerEntryType::Contribution, Some(1), dec!(100.00)),
            entry(2, LedgerEntryType::Contribution, Some(2), dec!(50.00)),
            entry(3, LedgerEntryType::Withdrawal, Some(3), dec!(20.00)),
            entry(4, LedgerEntryType::Income, None, dec!(80.00)),
            entry(5, LedgerEntryType::Expense, None, dec!(30.00)),
        ]
    }

    fn positions(rows: &[(i64, Money)]) -> Vec<InvestorPosition> {
        rows.iter()
            .map(|(id, opening)| InvestorPosition::opening(7, *id, *opening))
            .collect()
    }

    #[test]
    fn test_compute_period_nav_reconciles() {
        // Positions out of order still allocate by investor id.
        let positions = positions(&[(3, dec!(100.00)), (1, dec!(600.00)), (2, dec!(300.00))]);
        let computation = compute_period_nav(dec!(1000.00), &scenario_entries(), &positions, "UGX").unwrap();

        assert_eq!(computation.totals.closing_nav, dec!(1180.00));
        assert_eq!(computation.totals.net_result, dec!(50.00));
        assert_eq!(computation.totals.investor_total, dec!(1180.00));
        assert_eq!(computation.totals.mismatch, dec!(0));
        assert!(computation.reconciliation.passed);

        let ids: Vec<i64> = computation.allocations.iter().map(|r| r.investor_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(computation.explainability()[0].closing_balance, dec!(730.00));
    }

    #[test]
    fn test_no_positions_reports_full_mismatch() {
        let computation = compute_period_nav(dec!(0), &scenario_entries(), &[], "UGX").unwrap();

        assert!(computation.allocations.is_empty());
        assert_eq!(computation.totals.closing_nav, dec!(180.00));
        assert_eq!(computation.totals.investor_total, dec!(0));
        assert_eq!(computation.totals.mismatch, dec!(-180.00));
        assert!(!computation.reconciliation.passed);
    }

    #[test]
    fn test_contribution_from_investor_without_position_breaks_reconciliation() {
        let positions = positions(&[(1, dec!(100.00))]);
        let entries = vec![entry(1, LedgerEntryType::Contribution, Some(9), dec!(25.00))];
        let computation = compute_period_nav(dec!(100.00), &entries, &positions, "UGX").unwrap();

        assert_eq!(computation.totals.mismatch, dec!(-25.00));
        assert!(!computation.reconciliation.passed);
    }

    #[test]
    fn test_recomputation_is_idempotent() {
        let positions = positions(&[(1, dec!(600.00)), (2, dec!(300.00)), (3, dec!(100.00))]);
        let first = compute_period_nav(dec!(1000.00), &scenario_entries(), &positions, "UGX").unwrap();
        let second = compute_period_nav(dec!(1000.00), &scenario_entries(), &positions, "UGX").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_openings_propagate_allocation_error() {
        let positions = positions(&[(1, dec!(600.00))]);
        let err = compute_period_nav(dec!(1000.00), &[], &positions, "UGX").unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_apply_computation_updates_period_and_positions() {
        let mut positions = positions(&[(1, dec!(600.00)), (2, dec!(300.00)), (3, dec!(100.00))]);
        let computation = compute_period_nav(dec!(1000.00), &scenario_entries(), &positions, "UGX").unwrap();
        let now = Utc::now();
        let mut period = AccountingPeriod {
            id: 7,
            club_id: 1,
            year: 2026,
            month: 3,
            status: PeriodStatus::Draft,
            opening_nav: dec!(1000.00),
            closing_nav: dec!(1000.00),
            reconciliation_diff: dec!(0),
            locked_at: None,
            closed_at: None,
            closed_by_user_id: None,
            created_at: now,
            updated_at: now,
        };

        apply_computation(&mut period, &mut positions, &computation, now);

        assert_eq!(period.closing_nav, dec!(1180.00));
        assert_eq!(period.reconciliation_diff, dec!(0));
        assert_eq!(positions[0].ownership_pct, dec!(60));
        assert_eq!(positions[0].income_alloc, dec!(48.00));
        assert_eq!(positions[2].closing_balance, dec!(85.00));
    }
}
