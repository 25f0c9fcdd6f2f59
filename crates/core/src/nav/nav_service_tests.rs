//! Tests for the NAV service.

use rust_decimal_macros::dec;

use super::*;
use crate::events::DomainEvent;
use crate::ledger::{LedgerEntryType, LedgerServiceTrait};
use crate::periods::{NewPeriod, PeriodRepositoryTrait, PeriodServiceTrait};
use crate::test_support::{new_entry, Harness, CLUB_ID, USER_ID};

async fn period_with_ledger(harness: &Harness) -> i64 {
    let period_id = harness
        .period_service
        .create_period(NewPeriod {
            club_id: CLUB_ID,
            year: 2026,
            month: 3,
            opening_nav: None,
            investor_openings: Some(Harness::openings(&[
                (1, dec!(700.00)),
                (2, dec!(300.00)),
            ])),
        })
        .await
        .unwrap()
        .id;
    harness
        .ledger_service
        .import_entries(
            CLUB_ID,
            period_id,
            vec![
                new_entry(period_id, LedgerEntryType::Income, None, dec!(10.00)),
                new_entry(period_id, LedgerEntryType::Expense, None, dec!(40.00)),
            ],
            false,
        )
        .await
        .unwrap();
    period_id
}

#[tokio::test]
async fn test_preview_explains_allocation() {
    let harness = Harness::with_three_investors();
    let period_id = period_with_ledger(&harness).await;

    let preview = harness.nav_service.preview(CLUB_ID, period_id).unwrap();
    assert_eq!(preview.opening_nav, dec!(1000.00));
    assert_eq!(preview.totals.closing_nav, dec!(970.00));
    assert_eq!(preview.totals.net_result, dec!(-30.00));
    assert!(preview.reconciliation.passed);

    // Investor 3 was active but had no opening balance.
    assert_eq!(preview.explainability.len(), 3);
    assert_eq!(preview.explainability[0].closing_balance, dec!(679.00));
    assert_eq!(preview.explainability[1].closing_balance, dec!(291.00));
    assert_eq!(preview.explainability[2].net_alloc, dec!(0));
}

#[tokio::test]
async fn test_preview_does_not_write() {
    let harness = Harness::with_three_investors();
    let period_id = period_with_ledger(&harness).await;
    let before = harness.periods.get_by_id(CLUB_ID, period_id).unwrap();
    harness.events.clear();

    harness.nav_service.preview(CLUB_ID, period_id).unwrap();
    harness.nav_service.reconciliation(CLUB_ID, period_id).unwrap();
    harness.nav_service.insights(CLUB_ID, period_id).unwrap();

    assert_eq!(harness.periods.get_by_id(CLUB_ID, period_id).unwrap(), before);
    assert!(harness.events.is_empty());
}

#[tokio::test]
async fn test_recalculate_stores_positions_and_emits() {
    let harness = Harness::with_three_investors();
    let period_id = period_with_ledger(&harness).await;
    harness.events.clear();

    let totals = harness.nav_service.recalculate(CLUB_ID, period_id).await.unwrap();
    assert_eq!(totals.closing_nav, dec!(970.00));

    let positions = harness.periods.list_positions(period_id).unwrap();
    assert_eq!(positions[0].expense_alloc, dec!(28.00));
    assert_eq!(positions[0].income_alloc, dec!(7.00));
    assert_eq!(positions[1].expense_alloc, dec!(12.00));
    assert_eq!(
        harness.events.events(),
        vec![DomainEvent::period_recalculated(CLUB_ID, period_id, dec!(970.00), dec!(0))]
    );
}

#[tokio::test]
async fn test_recalculation_is_idempotent() {
    let harness = Harness::with_three_investors();
    let period_id = period_with_ledger(&harness).await;

    let first = harness.nav_service.recalculate(CLUB_ID, period_id).await.unwrap();
    let positions = harness.periods.list_positions(period_id).unwrap();
    let second = harness.nav_service.recalculate(CLUB_ID, period_id).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(harness.periods.list_positions(period_id).unwrap(), positions);
    assert_eq!(
        harness.nav_service.reconciliation(CLUB_ID, period_id).unwrap(),
        harness.nav_service.reconciliation(CLUB_ID, period_id).unwrap()
    );
}

#[tokio::test]
async fn test_insights_for_expensive_month() {
    let harness = Harness::with_three_investors();
    let period_id = period_with_ledger(&harness).await;

    let insights = harness.nav_service.insights(CLUB_ID, period_id).unwrap();
    let codes: Vec<&str> = insights.iter().map(|i| i.code.as_str()).collect();
    assert_eq!(codes, vec!["expense-spike"]);
    assert_eq!(insights[0].description, "Expense ratio is elevated at 4.00%.");
}

#[tokio::test]
async fn test_insights_flag_backdated_entries() {
    let harness = Harness::with_three_investors();
    let period_id = period_with_ledger(&harness).await;
    let mut entry = new_entry(period_id, LedgerEntryType::Income, None, dec!(40.00));
    entry.tx_date = chrono::NaiveDate::from_ymd_opt(2026, 2, 27);
    harness.ledger_service.post_entry(entry).await.unwrap();

    let insights = harness.nav_service.insights(CLUB_ID, period_id).unwrap();
    let backdated = insights.iter().find(|i| i.code == "backdated-entries").unwrap();
    assert_eq!(backdated.level, InsightLevel::Warning);
    assert!(backdated.description.starts_with("1 entries are dated before 2026-03-01."));

    harness.period_service.submit_for_review(CLUB_ID, period_id).await.unwrap();
    let insights = harness.nav_service.insights(CLUB_ID, period_id).unwrap();
    let backdated = insights.iter().find(|i| i.code == "backdated-entries").unwrap();
    assert_eq!(backdated.level, InsightLevel::Critical);
}

#[tokio::test]
async fn test_stamp_and_snapshot_lookup() {
    let harness = Harness::with_three_investors();
    let period_id = period_with_ledger(&harness).await;

    let stamp = harness.nav_service.reconciliation_stamp(CLUB_ID, period_id).unwrap();
    assert!(stamp.reconciled);
    assert_eq!(stamp.club_closing_nav, dec!(970.00));
    assert_eq!(stamp.investor_total, dec!(970.00));
    assert!(harness.nav_service.snapshot(CLUB_ID, period_id).unwrap().is_none());

    harness.period_service.submit_for_review(CLUB_ID, period_id).await.unwrap();
    harness
        .period_service
        .close_period(CLUB_ID, period_id, USER_ID)
        .await
        .unwrap();

    let record = harness.nav_service.snapshot(CLUB_ID, period_id).unwrap().unwrap();
    assert_eq!(record.snapshot.expenses_total, dec!(40.00));
    assert_eq!(record.balances.len(), 3);

    // Reads still work on the closed period; writes do not.
    assert_eq!(
        harness.nav_service.preview(CLUB_ID, period_id).unwrap().totals.closing_nav,
        dec!(970.00)
    );
    let err = harness.nav_service.recalculate(CLUB_ID, period_id).await.unwrap_err();
    assert!(err.is_immutability_violation());
}

#[tokio::test]
async fn test_record_close_snapshot_replaces_leftover_until_closed() {
    let harness = Harness::with_three_investors();
    let period_id = period_with_ledger(&harness).await;

    // Still open: a leftover snapshot is rewritten from the current ledger.
    let leftover = harness.nav_service.record_close_snapshot(CLUB_ID, period_id).await.unwrap();
    assert_eq!(leftover.snapshot.closing_nav, dec!(970.00));
    harness
        .ledger_service
        .post_entry(new_entry(period_id, LedgerEntryType::Income, None, dec!(30.00)))
        .await
        .unwrap();
    let fresh = harness.nav_service.record_close_snapshot(CLUB_ID, period_id).await.unwrap();
    assert_ne!(fresh.snapshot.id, leftover.snapshot.id);
    assert_eq!(fresh.snapshot.closing_nav, dec!(1000.00));
    assert_eq!(harness.snapshots.count(), 1);

    harness.period_service.submit_for_review(CLUB_ID, period_id).await.unwrap();
    let outcome = harness
        .period_service
        .close_period(CLUB_ID, period_id, USER_ID)
        .await
        .unwrap();

    // Closed: the stored snapshot is returned as is.
    let again = harness.nav_service.record_close_snapshot(CLUB_ID, period_id).await.unwrap();
    assert_eq!(again, outcome.snapshot);
    assert_eq!(harness.snapshots.count(), 1);
}
