use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info, warn};

use super::opening_resolver::{resolve_openings, PriorClose};
use super::period_lifecycle::{self, build_close_checklist};
use super::period_locks::PeriodLocks;
use super::periods_errors::PeriodError;
use super::periods_model::{
    AccountingPeriod, CloseChecklist, CloseOutcome, NewAccountingPeriod, NewPeriod, PeriodState,
    PeriodStatus,
};
use super::periods_traits::{PeriodRepositoryTrait, PeriodServiceTrait};
use crate::errors::Result;
use crate::events::{DomainEvent, DomainEventSink, NoOpDomainEventSink};
use crate::ids::{ClubId, PeriodId, UserId};
use crate::investors::{active_investor_ids, InvestorRepositoryTrait};
use crate::ledger::LedgerRepositoryTrait;
use crate::nav::{NavServiceTrait, PeriodTotals};
use crate::reconciliation::reconciliation_stamp;
use crate::settings::SettingsServiceTrait;

/// Service for opening, reviewing and closing accounting periods.
pub struct PeriodService {
    period_repository: Arc<dyn PeriodRepositoryTrait>,
    ledger_repository: Arc<dyn LedgerRepositoryTrait>,
    investor_repository: Arc<dyn InvestorRepositoryTrait>,
    nav_service: Arc<dyn NavServiceTrait>,
    settings_service: Arc<dyn SettingsServiceTrait>,
    period_locks: Arc<PeriodLocks>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl PeriodService {
    pub fn new(
        period_repository: Arc<dyn PeriodRepositoryTrait>,
        ledger_repository: Arc<dyn LedgerRepositoryTrait>,
        investor_repository: Arc<dyn InvestorRepositoryTrait>,
        nav_service: Arc<dyn NavServiceTrait>,
        settings_service: Arc<dyn SettingsServiceTrait>,
        period_locks: Arc<PeriodLocks>,
    ) -> Self {
        Self {
            period_repository,
            ledger_repository,
            investor_repository,
            nav_service,
            settings_service,
            period_locks,
            event_sink: Arc::new(NoOpDomainEventSink),
        }
    }

    /// Sets the domain event sink for this service.
    pub fn with_event_sink(mut self, event_sink: Arc<dyn DomainEventSink>) -> Self {
        self.event_sink = event_sink;
        self
    }

    fn load_prior_close(&self, new_period: &NewPeriod) -> Result<Option<PriorClose>> {
        let Some(prior) = self.period_repository.find_latest_closed_before(
            new_period.club_id,
            new_period.year,
            new_period.month,
        )?
        else {
            return Ok(None);
        };

        let closing_balances: BTreeMap<_, _> = self
            .period_repository
            .list_positions(prior.id)?
            .into_iter()
            .map(|position| (position.investor_id, position.closing_balance))
            .collect();
        debug!(
            "Carrying forward {} balances from period {}",
            closing_balances.len(),
            prior.year_month()
        );
        Ok(Some(PriorClose {
            period_id: prior.id,
            closing_nav: prior.closing_nav,
            closing_balances,
        }))
    }

    fn emit_status_change(&self, period: &AccountingPeriod, from: PeriodStatus) {
        self.event_sink.emit(DomainEvent::period_status_changed(
            period.club_id,
            period.id,
            from,
            period.status,
        ));
    }
}

#[async_trait]
impl PeriodServiceTrait for PeriodService {
    async fn create_period(&self, new_period: NewPeriod) -> Result<AccountingPeriod> {
        new_period.validate()?;

        if self
            .period_repository
            .find_by_year_month(new_period.club_id, new_period.year, new_period.month)?
            .is_some()
        {
            return Err(PeriodError::AlreadyExists {
                club_id: new_period.club_id,
                year_month: new_period.year_month(),
            }
            .into());
        }

        let investors = self
            .investor_repository
            .list_by_club(new_period.club_id, Some(true))?;
        let active_ids = active_investor_ids(&investors);

        let has_explicit = new_period
            .investor_openings
            .as_ref()
            .is_some_and(|openings| !openings.is_empty());
        let prior = if has_explicit {
            None
        } else {
            self.load_prior_close(&new_period)?
        };

        let resolved = resolve_openings(
            new_period.opening_nav,
            new_period.investor_openings.as_ref(),
            &active_ids,
            prior.as_ref(),
        )?;

        let period = self
            .period_repository
            .create(NewAccountingPeriod {
                club_id: new_period.club_id,
                year: new_period.year,
                month: new_period.month,
                opening_nav: resolved.opening_nav,
                positions: resolved.positions(&active_ids),
            })
            .await?;
        info!(
            "Created period {} for club {} with opening NAV {} ({:?})",
            period.year_month(),
            period.club_id,
            period.opening_nav,
            resolved.source
        );

        {
            let _guard = self.period_locks.acquire(period.id).await;
            self.nav_service.recalculate(period.club_id, period.id).await?;
        }

        self.event_sink.emit(DomainEvent::period_created(
            period.club_id,
            period.id,
            period.year_month(),
        ));
        self.period_repository.get_by_id(period.club_id, period.id)
    }

    fn get_period(&self, club_id: ClubId, period_id: PeriodId) -> Result<AccountingPeriod> {
        self.period_repository.get_by_id(club_id, period_id)
    }

    async fn get_period_state(&self, club_id: ClubId, period_id: PeriodId) -> Result<PeriodState> {
        let _guard = self.period_locks.acquire(period_id).await;
        let period = self.period_repository.get_by_id(club_id, period_id)?;

        let totals = if period.is_closed() {
            self.nav_service.preview(club_id, period_id)?.totals
        } else {
            self.nav_service.recalculate(club_id, period_id).await?
        };

        let period = self.period_repository.get_by_id(club_id, period_id)?;
        let positions = self.period_repository.list_positions(period.id)?;
        let settings = self.settings_service.get_nav_settings()?;
        let stamp = reconciliation_stamp(
            period.closing_nav,
            totals.investor_total,
            &settings.currency_code,
        );
        Ok(PeriodState {
            period,
            totals,
            positions,
            stamp,
        })
    }

    async fn recalculate_period(&self, club_id: ClubId, period_id: PeriodId) -> Result<PeriodTotals> {
        let _guard = self.period_locks.acquire(period_id).await;
        self.nav_service.recalculate(club_id, period_id).await
    }

    async fn submit_for_review(&self, club_id: ClubId, period_id: PeriodId) -> Result<AccountingPeriod> {
        let _guard = self.period_locks.acquire(period_id).await;
        let mut period = self.period_repository.get_by_id(club_id, period_id)?;
        let from = period.status;

        if !period_lifecycle::submit_for_review(&mut period, Utc::now())? {
            return Ok(period);
        }
        let period = self.period_repository.update(period).await?;
        info!("Period {} submitted for review", period.year_month());
        self.emit_status_change(&period, from);
        Ok(period)
    }

    async fn set_status(
        &self,
        club_id: ClubId,
        period_id: PeriodId,
        status: PeriodStatus,
    ) -> Result<AccountingPeriod> {
        let _guard = self.period_locks.acquire(period_id).await;
        let mut period = self.period_repository.get_by_id(club_id, period_id)?;
        let from = period.status;

        period_lifecycle::set_status(&mut period, status, Utc::now())?;
        if from == period.status {
            return Ok(period);
        }
        let period = self.period_repository.update(period).await?;
        info!(
            "Period {} moved from {} to {}",
            period.year_month(),
            from,
            period.status
        );
        self.emit_status_change(&period, from);
        Ok(period)
    }

    fn close_checklist(&self, club_id: ClubId, period_id: PeriodId) -> Result<CloseChecklist> {
        let period = self.period_repository.get_by_id(club_id, period_id)?;
        let preview = self.nav_service.preview(club_id, period_id)?;
        let position_count = self.period_repository.list_positions(period.id)?.len();
        let has_entries = self.ledger_repository.has_entries(period.id)?;
        Ok(build_close_checklist(
            &period,
            position_count,
            has_entries,
            &preview.reconciliation,
        ))
    }

    async fn close_period(
        &self,
        club_id: ClubId,
        period_id: PeriodId,
        closed_by: UserId,
    ) -> Result<CloseOutcome> {
        let _guard = self.period_locks.acquire(period_id).await;
        let period = self.period_repository.get_by_id(club_id, period_id)?;

        if period.is_closed() {
            return match self.nav_service.snapshot(club_id, period_id)? {
                Some(snapshot) => {
                    debug!("Period {} already closed, returning its snapshot", period.year_month());
                    Ok(CloseOutcome {
                        period,
                        snapshot,
                        already_closed: true,
                    })
                }
                None => Err(PeriodError::Locked {
                    period_id: period.id,
                    year_month: period.year_month(),
                }
                .into()),
            };
        }

        self.nav_service.recalculate(club_id, period_id).await?;
        let checklist = self.close_checklist(club_id, period_id)?;

        let mut closed = self.period_repository.get_by_id(club_id, period_id)?;
        if let Err(err) = period_lifecycle::close_period(&mut closed, closed_by, &checklist, Utc::now()) {
            warn!(
                "Close of period {} refused: {:?}",
                closed.year_month(),
                checklist.failed_items()
            );
            return Err(err);
        }

        let snapshot = self.nav_service.record_close_snapshot(club_id, period_id).await?;
        let period = self.period_repository.update(closed).await?;
        info!(
            "Closed period {} at closing NAV {} (snapshot {})",
            period.year_month(),
            period.closing_nav,
            snapshot.snapshot.id
        );

        self.emit_status_change(&period, PeriodStatus::Review);
        self.event_sink.emit(DomainEvent::period_closed(
            period.club_id,
            period.id,
            snapshot.snapshot.id,
            period.closing_nav,
        ));
        Ok(CloseOutcome {
            period,
            snapshot,
            already_closed: false,
        })
    }
}
