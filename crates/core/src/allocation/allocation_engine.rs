//! Proportional allocation with an exact-remainder rule.
//!
//! Income and expenses are split by opening ownership in the order the
//! investors are supplied (callers pass them by investor id ascending). Every
//! investor but the last receives a quantized proportional share; the last
//! receives `total - running_sum`, so the shares always add up to the total
//! exactly. Reordering the input changes which investor absorbs the residual
//! cent, so the order is part of the contract.

use std::collections::BTreeSet;

use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::allocation_errors::AllocationError;
use super::allocation_model::{AllocationSnapshotInput, InvestorAllocationResult, InvestorOpening};
use crate::constants::MAX_AMOUNT;
use crate::errors::Result;
use crate::utils::{money, pct, sum_money, zero_money, Money, Percentage};

fn ensure_in_range(field: &'static str, value: Money) -> std::result::Result<(), AllocationError> {
    if value.abs() > MAX_AMOUNT {
        return Err(AllocationError::AmountOutOfRange { field, value });
    }
    Ok(())
}

fn ensure_non_negative(field: &'static str, value: Money) -> std::result::Result<(), AllocationError> {
    ensure_in_range(field, value)?;
    let value = money(value);
    if value < zero_money() {
        return Err(AllocationError::NegativeAmount { field, value });
    }
    Ok(())
}

/// Ownership of each investor as a percentage of `opening_nav`.
///
/// Returns zeros when `opening_nav` is zero.
pub fn ownership_percentages(opening_nav: Money, openings: &[InvestorOpening]) -> Vec<Percentage> {
    let opening_nav = money(opening_nav);
    openings
        .iter()
        .map(|row| {
            if opening_nav.is_zero() {
                pct(Decimal::ZERO)
            } else {
                pct(money(row.opening_balance) / opening_nav * dec!(100))
            }
        })
        .collect()
}

/// Splits `amount` across the given ownership percentages.
///
/// The last slot takes the exact remainder and is never rounded on its own.
pub fn allocate_component(amount: Money, ownership_pcts: &[Percentage]) -> Vec<Money> {
    let Some(last_index) = ownership_pcts.len().checked_sub(1) else {
        return Vec::new();
    };

    let total = money(amount);
    let mut running = zero_money();
    let mut shares = Vec::with_capacity(ownership_pcts.len());
    for (index, ownership) in ownership_pcts.iter().enumerate() {
        let share = if index < last_index {
            let share = money(total * *ownership / dec!(100));
            running = money(running + share);
            share
        } else {
            money(total - running)
        };
        shares.push(share);
    }
    shares
}

fn validate_inputs(
    snapshot: &AllocationSnapshotInput,
    openings: &[InvestorOpening],
) -> std::result::Result<(), AllocationError> {
    ensure_in_range("opening_nav", snapshot.opening_nav)?;
    let opening_nav = money(snapshot.opening_nav);
    if opening_nav < zero_money() {
        return Err(AllocationError::NegativeOpeningNav(opening_nav));
    }

    ensure_non_negative("income_total", snapshot.income_total)?;
    ensure_non_negative("expenses_total", snapshot.expenses_total)?;
    ensure_non_negative("contributions_total", snapshot.contributions_total)?;
    ensure_non_negative("withdrawals_total", snapshot.withdrawals_total)?;

    if openings.is_empty() {
        return Ok(());
    }

    let mut seen = BTreeSet::new();
    for row in openings {
        if !seen.insert(row.investor_id) {
            return Err(AllocationError::DuplicateInvestor(row.investor_id));
        }
        ensure_non_negative("opening_balance", row.opening_balance)?;
        ensure_non_negative("contributions", row.contributions)?;
        ensure_non_negative("withdrawals", row.withdrawals)?;
    }

    let opening_sum = sum_money(openings.iter().map(|row| &row.opening_balance));
    if opening_nav.is_zero() && !opening_sum.is_zero() {
        return Err(AllocationError::NonZeroOpeningsWithZeroNav { opening_sum });
    }
    if !opening_nav.is_zero() && opening_sum != opening_nav {
        return Err(AllocationError::OpeningSumMismatch {
            opening_nav,
            opening_sum,
        });
    }
    Ok(())
}

/// Allocates a period's income and expenses across investors and derives
/// each investor's closing balance.
///
/// An empty investor list yields an empty result; whether that is acceptable
/// is the caller's decision (closing a period requires positions).
pub fn allocate_returns(
    snapshot: &AllocationSnapshotInput,
    openings: &[InvestorOpening],
) -> Result<Vec<InvestorAllocationResult>> {
    validate_inputs(snapshot, openings)?;
    if openings.is_empty() {
        return Ok(Vec::new());
    }

    let ownerships = ownership_percentages(snapshot.opening_nav, openings);
    let income_shares = allocate_component(snapshot.income_total, &ownerships);
    let expense_shares = allocate_component(snapshot.expenses_total, &ownerships);

    let rows: Vec<InvestorAllocationResult> = openings
        .iter()
        .zip(ownerships)
        .zip(income_shares.into_iter().zip(expense_shares))
        .map(|((row, ownership_pct), (income_share, expense_share))| {
            let opening_balance = money(row.opening_balance);
            let contributions = money(row.contributions);
            let withdrawals = money(row.withdrawals);
            let net_alloc = money(income_share - expense_share);
            let closing_balance = money(opening_balance + net_alloc + contributions - withdrawals);
            InvestorAllocationResult {
                investor_id: row.investor_id,
                opening_balance,
                ownership_pct,
                income_share,
                expense_share,
                net_alloc,
                contributions,
                withdrawals,
                closing_balance,
            }
        })
        .collect();

    debug!(
        "Allocated income {} and expenses {} across {} investors",
        money(snapshot.income_total),
        money(snapshot.expenses_total),
        rows.len()
    );
    Ok(rows)
}
