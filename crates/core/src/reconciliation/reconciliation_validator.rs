use rust_decimal::Decimal;

use crate::allocation::InvestorAllocationResult;
use crate::utils::{format_money, money, sum_money, zero_money, Money};

use super::reconciliation_model::{ReconciliationResult, ReconciliationStamp};

/// Checks that investor closing balances add up to `closing_nav` to the cent
/// and that no investor holds a negative share or balance.
///
/// Pure and infallible; every failure is reported through the result.
pub fn validate(
    closing_nav: Money,
    balances: &[InvestorAllocationResult],
    currency_code: &str,
) -> ReconciliationResult {
    let target = money(closing_nav);
    let investor_total = sum_money(balances.iter().map(|row| &row.closing_balance));
    let mismatch = money(investor_total - target);

    let mut reasons = Vec::new();
    if !mismatch.is_zero() {
        reasons.push(format!(
            "Investor total {cur} {} differs from closing NAV {cur} {} by {cur} {}.",
            format_money(investor_total),
            format_money(target),
            format_money(mismatch.abs()),
            cur = currency_code,
        ));
    }
    if balances.iter().any(|row| row.ownership_pct < Decimal::ZERO) {
        reasons.push("Negative ownership percentage detected.".to_string());
    }
    if balances.iter().any(|row| row.closing_balance < zero_money()) {
        reasons.push("Negative investor closing balance detected.".to_string());
    }

    ReconciliationResult {
        passed: reasons.is_empty(),
        mismatch,
        reasons,
    }
}

/// Builds the reconciliation stamp shown on period summaries.
pub fn reconciliation_stamp(
    closing_nav: Money,
    investor_total: Money,
    currency_code: &str,
) -> ReconciliationStamp {
    let club_closing_nav = money(closing_nav);
    let investor_total = money(investor_total);
    let mismatch = money(investor_total - club_closing_nav);
    let reconciled = mismatch.is_zero();
    let stamp = if reconciled {
        "Reconciled".to_string()
    } else {
        format!("Mismatch {} {}", currency_code, format_money(mismatch.abs()))
    };

    ReconciliationStamp {
        reconciled,
        stamp,
        mismatch_abs: mismatch.abs(),
        club_closing_nav,
        investor_total,
    }
}
