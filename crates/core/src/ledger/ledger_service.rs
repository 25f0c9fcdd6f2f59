use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};

use super::ledger_model::{
    LedgerEntry, LedgerEntryUpdate, LedgerImportSummary, NewLedgerEntry, PostedEntry,
};
use super::ledger_traits::{LedgerRepositoryTrait, LedgerServiceTrait};
use crate::errors::{DatabaseError, Error, Result, ValidationError};
use crate::events::{DomainEvent, DomainEventSink, NoOpDomainEventSink};
use crate::ids::{ClubId, InvestorId, LedgerEntryId, PeriodId};
use crate::investors::InvestorRepositoryTrait;
use crate::nav::{compute_period_nav, NavServiceTrait, PeriodTotals};
use crate::periods::{
    assert_entries_deletable, assert_entries_editable, assert_period_writable, AccountingPeriod,
    PeriodLocks, PeriodRepositoryTrait,
};
use crate::settings::SettingsServiceTrait;
use crate::utils::time_utils::business_date_today;

/// Service for posting, editing and importing ledger entries.
///
/// Every write runs under the period lock and ends with a recomputation of
/// the period, so stored positions never lag behind the ledger.
pub struct LedgerService {
    ledger_repository: Arc<dyn LedgerRepositoryTrait>,
    period_repository: Arc<dyn PeriodRepositoryTrait>,
    investor_repository: Arc<dyn InvestorRepositoryTrait>,
    nav_service: Arc<dyn NavServiceTrait>,
    settings_service: Arc<dyn SettingsServiceTrait>,
    period_locks: Arc<PeriodLocks>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl LedgerService {
    pub fn new(
        ledger_repository: Arc<dyn LedgerRepositoryTrait>,
        period_repository: Arc<dyn PeriodRepositoryTrait>,
        investor_repository: Arc<dyn InvestorRepositoryTrait>,
        nav_service: Arc<dyn NavServiceTrait>,
        settings_service: Arc<dyn SettingsServiceTrait>,
        period_locks: Arc<PeriodLocks>,
    ) -> Self {
        Self {
            ledger_repository,
            period_repository,
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

    fn load_writable_period(&self, club_id: ClubId, period_id: PeriodId) -> Result<AccountingPeriod> {
        let period = self.period_repository.get_by_id(club_id, period_id)?;
        if let Err(err) = assert_period_writable(&period) {
            warn!(
                "Rejected ledger write against closed period {} ({})",
                period.id,
                period.year_month()
            );
            return Err(err);
        }
        Ok(period)
    }

    fn ensure_active_investor(&self, club_id: ClubId, investor_id: InvestorId) -> Result<()> {
        let investor = match self.investor_repository.get_by_id(club_id, investor_id) {
            Ok(investor) => investor,
            Err(Error::Database(DatabaseError::NotFound(_))) => {
                return Err(ValidationError::InvalidInput(format!(
                    "Investor {} not found in this club.",
                    investor_id
                ))
                .into());
            }
            Err(err) => return Err(err),
        };
        if !investor.is_active {
            return Err(ValidationError::InvalidInput(format!(
                "Investor {} is not active in this club.",
                investor_id
            ))
            .into());
        }
        Ok(())
    }

    fn position_holders(&self, period_id: PeriodId) -> Result<BTreeSet<InvestorId>> {
        Ok(self
            .period_repository
            .list_positions(period_id)?
            .into_iter()
            .map(|position| position.investor_id)
            .collect())
    }

    /// Attributed entries must name an active member holding a position in
    /// the period; otherwise the flow lands in no investor's balance.
    fn validate_for_period(
        &self,
        period: &AccountingPeriod,
        position_holders: &BTreeSet<InvestorId>,
        new_entry: &NewLedgerEntry,
    ) -> Result<()> {
        if new_entry.club_id != period.club_id || new_entry.period_id != period.id {
            return Err(ValidationError::InvalidInput(format!(
                "Entry targets club {} period {} but period {} of club {} was requested",
                new_entry.club_id, new_entry.period_id, period.id, period.club_id
            ))
            .into());
        }
        new_entry.validate()?;
        if let Some(investor_id) = new_entry.investor_id {
            self.ensure_active_investor(period.club_id, investor_id)?;
            if !position_holders.contains(&investor_id) {
                return Err(ValidationError::InvalidInput(format!(
                    "Investor {} has no position in period {}.",
                    investor_id,
                    period.year_month()
                ))
                .into());
            }
        }
        Ok(())
    }

    fn emit_ledger_changed(&self, period: &AccountingPeriod, entry_ids: Vec<LedgerEntryId>) {
        self.event_sink
            .emit(DomainEvent::ledger_changed(period.club_id, period.id, entry_ids));
    }
}

#[async_trait]
impl LedgerServiceTrait for LedgerService {
    fn list_entries(&self, club_id: ClubId, period_id: PeriodId) -> Result<Vec<LedgerEntry>> {
        let period = self.period_repository.get_by_id(club_id, period_id)?;
        self.ledger_repository.list_for_period(period.id)
    }

    async fn post_entry(&self, new_entry: NewLedgerEntry) -> Result<PostedEntry> {
        let _guard = self.period_locks.acquire(new_entry.period_id).await;
        let period = self.load_writable_period(new_entry.club_id, new_entry.period_id)?;
        let holders = self.position_holders(period.id)?;
        self.validate_for_period(&period, &holders, &new_entry)?;

        let settings = self.settings_service.get_nav_settings()?;
        let prepared = new_entry.prepared(business_date_today(settings.club_tz()));
        let entry = self.ledger_repository.create(prepared).await?;
        debug!(
            "Posted {} entry {} of {} to period {}",
            entry.entry_type,
            entry.id,
            entry.amount,
            period.year_month()
        );

        let totals = self.nav_service.recalculate(period.club_id, period.id).await?;
        self.emit_ledger_changed(&period, vec![entry.id]);
        Ok(PostedEntry { entry, totals })
    }

    async fn update_entry(
        &self,
        club_id: ClubId,
        period_id: PeriodId,
        update: LedgerEntryUpdate,
    ) -> Result<PostedEntry> {
        let _guard = self.period_locks.acquire(period_id).await;
        let period = self.period_repository.get_by_id(club_id, period_id)?;
        assert_entries_editable(&period)?;

        let mut entry = self.ledger_repository.get_by_id(period.id, update.id)?;
        update.apply_to(&mut entry)?;
        let entry = self.ledger_repository.update(entry).await?;

        let totals = self.nav_service.recalculate(period.club_id, period.id).await?;
        self.emit_ledger_changed(&period, vec![entry.id]);
        Ok(PostedEntry { entry, totals })
    }

    async fn delete_entry(
        &self,
        club_id: ClubId,
        period_id: PeriodId,
        entry_id: LedgerEntryId,
    ) -> Result<PeriodTotals> {
        let _guard = self.period_locks.acquire(period_id).await;
        let period = self.period_repository.get_by_id(club_id, period_id)?;
        assert_entries_deletable(&period)?;

        // Surface NotFound before deleting anything
        self.ledger_repository.get_by_id(period.id, entry_id)?;
        self.ledger_repository.delete(period.id, entry_id).await?;
        info!("Deleted ledger entry {} from period {}", entry_id, period.year_month());

        let totals = self.nav_service.recalculate(period.club_id, period.id).await?;
        self.emit_ledger_changed(&period, vec![entry_id]);
        Ok(totals)
    }

    async fn import_entries(
        &self,
        club_id: ClubId,
        period_id: PeriodId,
        entries: Vec<NewLedgerEntry>,
        dry_run: bool,
    ) -> Result<LedgerImportSummary> {
        if entries.is_empty() {
            return Err(ValidationError::invalid("Import contains no entries.").into());
        }

        let _guard = self.period_locks.acquire(period_id).await;
        let period = self.load_writable_period(club_id, period_id)?;

        let holders = self.position_holders(period.id)?;
        for (index, new_entry) in entries.iter().enumerate() {
            self.validate_for_period(&period, &holders, new_entry).map_err(|err| match err {
                Error::Validation(inner) => ValidationError::InvalidInput(format!(
                    "Entry {}: {}",
                    index + 1,
                    inner
                ))
                .into(),
                other => other,
            })?;
        }

        let settings = self.settings_service.get_nav_settings()?;
        let business_date = business_date_today(settings.club_tz());
        let entry_count = entries.len();

        if dry_run {
            let mut projected = self.ledger_repository.list_for_period(period.id)?;
            projected.extend(entries.iter().map(|e| e.to_unsaved_entry(business_date)));
            let positions = self.period_repository.list_positions(period.id)?;
            let computation = compute_period_nav(
                period.opening_nav,
                &projected,
                &positions,
                &settings.currency_code,
            )?;
            debug!(
                "Dry-run import of {} entries into period {} projects closing NAV {}",
                entry_count,
                period.year_month(),
                computation.totals.closing_nav
            );
            return Ok(LedgerImportSummary {
                dry_run: true,
                entry_count,
                entry_ids: Vec::new(),
                totals: computation.totals,
            });
        }

        let prepared: Vec<NewLedgerEntry> = entries
            .into_iter()
            .map(|e| e.prepared(business_date))
            .collect();
        let created = self.ledger_repository.create_many(prepared).await?;
        let entry_ids: Vec<LedgerEntryId> = created.iter().map(|e| e.id).collect();
        info!(
            "Imported {} ledger entries into period {}",
            entry_ids.len(),
            period.year_month()
        );

        let totals = self.nav_service.recalculate(period.club_id, period.id).await?;
        self.emit_ledger_changed(&period, entry_ids.clone());
        Ok(LedgerImportSummary {
            dry_run: false,
            entry_count: entry_ids.len(),
            entry_ids,
            totals,
        })
    }
}
