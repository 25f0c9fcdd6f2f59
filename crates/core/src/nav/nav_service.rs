use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info, warn};

use super::nav_engine::{apply_computation, compute_period_nav};
use super::nav_insights::{backdated_entries_insight, build_insights};
use super::nav_model::{
    Insight, NavComputation, NavPreview, NavSnapshotRecord, NewInvestorBalance, NewNavSnapshot,
    PeriodTotals,
};
use super::nav_traits::{NavServiceTrait, NavSnapshotRepositoryTrait};
use crate::errors::Result;
use crate::events::{DomainEvent, DomainEventSink, NoOpDomainEventSink};
use crate::ids::{ClubId, PeriodId};
use crate::ledger::LedgerRepositoryTrait;
use crate::periods::{assert_period_writable, AccountingPeriod, PeriodRepositoryTrait, PeriodStatus};
use crate::reconciliation::{reconciliation_stamp, ReconciliationResult, ReconciliationStamp};
use crate::settings::SettingsServiceTrait;

pub struct NavService {
    period_repository: Arc<dyn PeriodRepositoryTrait>,
    ledger_repository: Arc<dyn LedgerRepositoryTrait>,
    snapshot_repository: Arc<dyn NavSnapshotRepositoryTrait>,
    settings_service: Arc<dyn SettingsServiceTrait>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl NavService {
    pub fn new(
        period_repository: Arc<dyn PeriodRepositoryTrait>,
        ledger_repository: Arc<dyn LedgerRepositoryTrait>,
        snapshot_repository: Arc<dyn NavSnapshotRepositoryTrait>,
        settings_service: Arc<dyn SettingsServiceTrait>,
    ) -> Self {
        Self {
            period_repository,
            ledger_repository,
            snapshot_repository,
            settings_service,
            event_sink: Arc::new(NoOpDomainEventSink),
        }
    }

    /// Sets the domain event sink for this service.
    pub fn with_event_sink(mut self, event_sink: Arc<dyn DomainEventSink>) -> Self {
        self.event_sink = event_sink;
        self
    }

    fn compute(&self, period: &AccountingPeriod) -> Result<NavComputation> {
        let settings = self.settings_service.get_nav_settings()?;
        let entries = self.ledger_repository.list_for_period(period.id)?;
        let positions = self.period_repository.list_positions(period.id)?;
        compute_period_nav(period.opening_nav, &entries, &positions, &settings.currency_code)
    }
}

#[async_trait]
impl NavServiceTrait for NavService {
    fn preview(&self, club_id: ClubId, period_id: PeriodId) -> Result<NavPreview> {
        let period = self.period_repository.get_by_id(club_id, period_id)?;
        let computation = self.compute(&period)?;
        let explainability = computation.explainability();
        Ok(NavPreview {
            club_id: period.club_id,
            period_id: period.id,
            status: period.status,
            opening_nav: computation.opening_nav,
            totals: computation.totals,
            allocations: computation.allocations,
            explainability,
            reconciliation: computation.reconciliation,
        })
    }

    async fn recalculate(&self, club_id: ClubId, period_id: PeriodId) -> Result<PeriodTotals> {
        let mut period = self.period_repository.get_by_id(club_id, period_id)?;
        assert_period_writable(&period)?;

        let computation = self.compute(&period)?;
        let mut positions = self.period_repository.list_positions(period.id)?;
        apply_computation(&mut period, &mut positions, &computation, Utc::now());
        let period = self.period_repository.save_state(period, positions).await?;

        debug!(
            "Recalculated period {}: closing NAV {} mismatch {}",
            period.year_month(),
            computation.totals.closing_nav,
            computation.totals.mismatch
        );
        self.event_sink.emit(DomainEvent::period_recalculated(
            period.club_id,
            period.id,
            computation.totals.closing_nav,
            computation.totals.mismatch,
        ));
        Ok(computation.totals)
    }

    fn reconciliation(&self, club_id: ClubId, period_id: PeriodId) -> Result<ReconciliationResult> {
        Ok(self.preview(club_id, period_id)?.reconciliation)
    }

    fn reconciliation_stamp(&self, club_id: ClubId, period_id: PeriodId) -> Result<ReconciliationStamp> {
        let settings = self.settings_service.get_nav_settings()?;
        let preview = self.preview(club_id, period_id)?;
        Ok(reconciliation_stamp(
            preview.totals.closing_nav,
            preview.totals.investor_total,
            &settings.currency_code,
        ))
    }

    fn snapshot(&self, club_id: ClubId, period_id: PeriodId) -> Result<Option<NavSnapshotRecord>> {
        self.snapshot_repository.get_by_period(club_id, period_id)
    }

    async fn record_close_snapshot(&self, club_id: ClubId, period_id: PeriodId) -> Result<NavSnapshotRecord> {
        let period = self.period_repository.get_by_id(club_id, period_id)?;
        if let Some(existing) = self.snapshot_repository.get_by_period(club_id, period_id)? {
            if period.status == PeriodStatus::Closed {
                return Ok(existing);
            }
            // A close that failed after writing its snapshot; the ledger may have moved since.
            warn!(
                "Replacing snapshot {} left by an unfinished close of period {}",
                existing.snapshot.id,
                period.year_month()
            );
            self.snapshot_repository.delete_by_period(club_id, period_id).await?;
        }

        let preview = self.preview(club_id, period_id)?;
        let snapshot = NewNavSnapshot::from_preview(&preview);
        let balances = preview
            .allocations
            .iter()
            .map(|row| NewInvestorBalance::from_allocation(preview.club_id, preview.period_id, row))
            .collect();
        let record = self.snapshot_repository.create(snapshot, balances).await?;
        info!(
            "Recorded NAV snapshot {} for period {} with {} investor balances",
            record.snapshot.id,
            period_id,
            record.balances.len()
        );
        Ok(record)
    }

    fn insights(&self, club_id: ClubId, period_id: PeriodId) -> Result<Vec<Insight>> {
        let settings = self.settings_service.get_nav_settings()?;
        let preview = self.preview(club_id, period_id)?;
        let period = self.period_repository.get_by_id(club_id, period_id)?;
        let entries = self.ledger_repository.list_for_period(period.id)?;

        let mut insights = build_insights(preview.opening_nav, &preview.totals, &settings);
        insights.extend(backdated_entries_insight(&period, &entries));
        Ok(insights)
    }
}
