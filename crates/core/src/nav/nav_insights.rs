use rust_decimal_macros::dec;

use super::nav_model::{Insight, InsightLevel, PeriodTotals};
use crate::ledger::LedgerEntry;
use crate::periods::{AccountingPeriod, PeriodStatus};
use crate::settings::NavSettings;
use crate::utils::time_utils::month_bounds;
use crate::utils::{format_money, money, zero_money, Money};

/// Rule-based insights for one period.
pub fn build_insights(opening_nav: Money, totals: &PeriodTotals, settings: &NavSettings) -> Vec<Insight> {
    let mut insights = Vec::new();
    let currency = &settings.currency_code;
    let opening_nav = money(opening_nav);

    if totals.expenses > zero_money() && opening_nav > zero_money() {
        let expense_ratio = totals.expenses / opening_nav * dec!(100);
        if expense_ratio > settings.expense_spike_threshold_pct {
            insights.push(Insight {
                code: "expense-spike".to_string(),
                level: InsightLevel::Warning,
                title: "Expense anomaly".to_string(),
                description: format!("Expense ratio is elevated at {}%.", money(expense_ratio)),
            });
        }
    }

    if !totals.mismatch.is_zero() {
        insights.push(Insight {
            code: "reconciliation-mismatch".to_string(),
            level: InsightLevel::Critical,
            title: "Reconciliation mismatch".to_string(),
            description: format!(
                "Mismatch detected: {} {}.",
                currency,
                format_money(totals.mismatch.abs())
            ),
        });
    }

    if totals.net_result > zero_money() {
        insights.push(Insight {
            code: "net-positive".to_string(),
            level: InsightLevel::Info,
            title: "Positive month".to_string(),
            description: format!(
                "Net result is positive at {} {}.",
                currency,
                format_money(totals.net_result)
            ),
        });
    }

    insights
}

/// Flags entries dated before the first day of the period's month.
///
/// A warning while the period is a draft, critical once it is under review.
pub fn backdated_entries_insight(period: &AccountingPeriod, entries: &[LedgerEntry]) -> Option<Insight> {
    let (month_start, _) = month_bounds(period.year, period.month)?;
    let backdated = entries.iter().filter(|e| e.tx_date < month_start).count();
    if backdated == 0 {
        return None;
    }
    let level = if period.status == PeriodStatus::Draft {
        InsightLevel::Warning
    } else {
        InsightLevel::Critical
    };
    Some(Insight {
        code: "backdated-entries".to_string(),
        level,
        title: "Backdated transaction warning".to_string(),
        description: format!(
            "{} entries are dated before {}. Backdated entries are allowed only in draft with explicit review.",
            backdated,
            month_start.format("%Y-%m-%d")
        ),
    })
}
