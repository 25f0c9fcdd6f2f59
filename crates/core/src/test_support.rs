//! In-memory repositories and service wiring for service tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use crate::errors::{DatabaseError, Result};
use crate::events::MockDomainEventSink;
use crate::ids::{ClubId, InvestorId, LedgerEntryId, PeriodId};
use crate::investors::{Investor, InvestorRepositoryTrait};
use crate::ledger::{LedgerEntry, LedgerEntryType, LedgerRepositoryTrait, LedgerService, NewLedgerEntry};
use crate::nav::{
    InvestorBalance, NavService, NavSnapshot, NavSnapshotRecord, NavSnapshotRepositoryTrait,
    NewInvestorBalance, NewNavSnapshot,
};
use crate::periods::{
    AccountingPeriod, InvestorPosition, NewAccountingPeriod, PeriodLocks, PeriodRepositoryTrait,
    PeriodService, PeriodStatus,
};
use crate::settings::{SettingsRepositoryTrait, SettingsService};
use crate::utils::time_utils::period_key;
use crate::utils::{zero_money, Money};

pub const CLUB_ID: ClubId = 1;
pub const USER_ID: i64 = 99;

pub fn investor(id: InvestorId, is_active: bool) -> Investor {
    Investor {
        id,
        club_id: CLUB_ID,
        investor_code: format!("INV-{:03}", id),
        name: format!("Investor {}", id),
        is_active,
    }
}

pub fn new_entry(
    period_id: PeriodId,
    entry_type: LedgerEntryType,
    investor_id: Option<InvestorId>,
    amount: Money,
) -> NewLedgerEntry {
    NewLedgerEntry {
        club_id: CLUB_ID,
        period_id,
        investor_id,
        entry_type,
        amount,
        category: None,
        tx_date: None,
        description: format!("{} entry", entry_type),
        note: None,
        reference: None,
        created_by_user_id: USER_ID,
    }
}

// ==================== Investors ====================

#[derive(Default)]
pub struct MockInvestorRepository {
    investors: Mutex<Vec<Investor>>,
}

impl MockInvestorRepository {
    pub fn new(investors: Vec<Investor>) -> Self {
        Self {
            investors: Mutex::new(investors),
        }
    }

    pub fn set_active(&self, investor_id: InvestorId, is_active: bool) {
        let mut investors = self.investors.lock().unwrap();
        if let Some(investor) = investors.iter_mut().find(|i| i.id == investor_id) {
            investor.is_active = is_active;
        }
    }
}

impl InvestorRepositoryTrait for MockInvestorRepository {
    fn list_by_club(&self, club_id: ClubId, is_active: Option<bool>) -> Result<Vec<Investor>> {
        let mut investors: Vec<Investor> = self
            .investors
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.club_id == club_id && is_active.map_or(true, |flag| i.is_active == flag))
            .cloned()
            .collect();
        investors.sort_by_key(|i| i.id);
        Ok(investors)
    }

    fn get_by_id(&self, club_id: ClubId, investor_id: InvestorId) -> Result<Investor> {
        self.investors
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.club_id == club_id && i.id == investor_id)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound(format!("investor {}", investor_id)).into())
    }
}

// ==================== Periods ====================

#[derive(Default)]
struct PeriodTables {
    periods: BTreeMap<PeriodId, AccountingPeriod>,
    positions: BTreeMap<PeriodId, Vec<InvestorPosition>>,
    next_id: PeriodId,
}

#[derive(Default)]
pub struct MockPeriodRepository {
    tables: Mutex<PeriodTables>,
    fail_next_update: AtomicBool,
}

impl MockPeriodRepository {
    /// Makes the next `update` call fail with a backend error.
    pub fn fail_next_update(&self) {
        self.fail_next_update.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl PeriodRepositoryTrait for MockPeriodRepository {
    fn get_by_id(&self, club_id: ClubId, period_id: PeriodId) -> Result<AccountingPeriod> {
        self.tables
            .lock()
            .unwrap()
            .periods
            .get(&period_id)
            .filter(|p| p.club_id == club_id)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound(format!("period {}", period_id)).into())
    }

    fn find_by_year_month(&self, club_id: ClubId, year: i32, month: u32) -> Result<Option<AccountingPeriod>> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .periods
            .values()
            .find(|p| p.club_id == club_id && p.year == year && p.month == month)
            .cloned())
    }

    fn find_latest_closed_before(
        &self,
        club_id: ClubId,
        year: i32,
        month: u32,
    ) -> Result<Option<AccountingPeriod>> {
        let key = period_key(year, month);
        Ok(self
            .tables
            .lock()
            .unwrap()
            .periods
            .values()
            .filter(|p| p.club_id == club_id && p.status == PeriodStatus::Closed && p.period_key() < key)
            .max_by_key(|p| p.period_key())
            .cloned())
    }

    fn list_positions(&self, period_id: PeriodId) -> Result<Vec<InvestorPosition>> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .positions
            .get(&period_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn create(&self, new_period: NewAccountingPeriod) -> Result<AccountingPeriod> {
        let mut tables = self.tables.lock().unwrap();
        tables.next_id += 1;
        let id = tables.next_id;
        let now = Utc::now();
        let period = AccountingPeriod {
            id,
            club_id: new_period.club_id,
            year: new_period.year,
            month: new_period.month,
            status: PeriodStatus::Draft,
            opening_nav: new_period.opening_nav,
            closing_nav: new_period.opening_nav,
            reconciliation_diff: zero_money(),
            locked_at: None,
            closed_at: None,
            closed_by_user_id: None,
            created_at: now,
            updated_at: now,
        };
        let mut positions: Vec<InvestorPosition> = new_period
            .positions
            .iter()
            .map(|p| InvestorPosition::opening(id, p.investor_id, p.opening_balance))
            .collect();
        positions.sort_by_key(|p| p.investor_id);
        tables.periods.insert(id, period.clone());
        tables.positions.insert(id, positions);
        Ok(period)
    }

    async fn save_state(
        &self,
        period: AccountingPeriod,
        mut positions: Vec<InvestorPosition>,
    ) -> Result<AccountingPeriod> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.periods.contains_key(&period.id) {
            return Err(DatabaseError::NotFound(format!("period {}", period.id)).into());
        }
        positions.sort_by_key(|p| p.investor_id);
        tables.positions.insert(period.id, positions);
        tables.periods.insert(period.id, period.clone());
        Ok(period)
    }

    async fn update(&self, period: AccountingPeriod) -> Result<AccountingPeriod> {
        if self.fail_next_update.swap(false, Ordering::SeqCst) {
            return Err(DatabaseError::Backend("connection reset".to_string()).into());
        }
        let mut tables = self.tables.lock().unwrap();
        if !tables.periods.contains_key(&period.id) {
            return Err(DatabaseError::NotFound(format!("period {}", period.id)).into());
        }
        tables.periods.insert(period.id, period.clone());
        Ok(period)
    }
}

// ==================== Ledger ====================

#[derive(Default)]
pub struct MockLedgerRepository {
    entries: Mutex<Vec<LedgerEntry>>,
    next_id: Mutex<LedgerEntryId>,
}

impl MockLedgerRepository {
    fn materialize(&self, new_entry: NewLedgerEntry) -> LedgerEntry {
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        LedgerEntry {
            id: *next_id,
            club_id: new_entry.club_id,
            period_id: new_entry.period_id,
            investor_id: new_entry.investor_id,
            entry_type: new_entry.entry_type,
            amount: new_entry.amount,
            category: new_entry.category.expect("prepared entries carry a category"),
            tx_date: new_entry.tx_date.expect("prepared entries carry a tx_date"),
            description: new_entry.description,
            note: new_entry.note,
            reference: new_entry.reference,
            created_by_user_id: new_entry.created_by_user_id,
            created_at: Utc::now(),
        }
    }

    pub fn count(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

#[async_trait]
impl LedgerRepositoryTrait for MockLedgerRepository {
    fn list_for_period(&self, period_id: PeriodId) -> Result<Vec<LedgerEntry>> {
        let mut entries: Vec<LedgerEntry> = self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.period_id == period_id)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.id);
        Ok(entries)
    }

    fn get_by_id(&self, period_id: PeriodId, entry_id: LedgerEntryId) -> Result<LedgerEntry> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.period_id == period_id && e.id == entry_id)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound(format!("ledger entry {}", entry_id)).into())
    }

    fn has_entries(&self, period_id: PeriodId) -> Result<bool> {
        Ok(self.entries.lock().unwrap().iter().any(|e| e.period_id == period_id))
    }

    async fn create(&self, new_entry: NewLedgerEntry) -> Result<LedgerEntry> {
        let entry = self.materialize(new_entry);
        self.entries.lock().unwrap().push(entry.clone());
        Ok(entry)
    }

    async fn create_many(&self, new_entries: Vec<NewLedgerEntry>) -> Result<Vec<LedgerEntry>> {
        let created: Vec<LedgerEntry> = new_entries.into_iter().map(|e| self.materialize(e)).collect();
        self.entries.lock().unwrap().extend(created.iter().cloned());
        Ok(created)
    }

    async fn update(&self, entry: LedgerEntry) -> Result<LedgerEntry> {
        let mut entries = self.entries.lock().unwrap();
        match entries.iter_mut().find(|e| e.id == entry.id) {
            Some(slot) => {
                *slot = entry.clone();
                Ok(entry)
            }
            None => Err(DatabaseError::NotFound(format!("ledger entry {}", entry.id)).into()),
        }
    }

    async fn delete(&self, period_id: PeriodId, entry_id: LedgerEntryId) -> Result<usize> {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|e| !(e.period_id == period_id && e.id == entry_id));
        Ok(before - entries.len())
    }
}

// ==================== Snapshots ====================

#[derive(Default)]
pub struct MockSnapshotRepository {
    records: Mutex<Vec<NavSnapshotRecord>>,
    next_id: AtomicI64,
}

impl MockSnapshotRepository {
    pub fn count(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl NavSnapshotRepositoryTrait for MockSnapshotRepository {
    fn get_by_period(&self, club_id: ClubId, period_id: PeriodId) -> Result<Option<NavSnapshotRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.snapshot.club_id == club_id && r.snapshot.period_id == period_id)
            .cloned())
    }

    async fn create(
        &self,
        snapshot: NewNavSnapshot,
        balances: Vec<NewInvestorBalance>,
    ) -> Result<NavSnapshotRecord> {
        let mut records = self.records.lock().unwrap();
        if records.iter().any(|r| r.snapshot.period_id == snapshot.period_id) {
            return Err(DatabaseError::UniqueViolation(format!(
                "snapshot for period {}",
                snapshot.period_id
            ))
            .into());
        }
        let snapshot_id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();
        let record = NavSnapshotRecord {
            snapshot: NavSnapshot {
                id: snapshot_id,
                club_id: snapshot.club_id,
                period_id: snapshot.period_id,
                opening_nav: snapshot.opening_nav,
                contributions_total: snapshot.contributions_total,
                withdrawals_total: snapshot.withdrawals_total,
                income_total: snapshot.income_total,
                expenses_total: snapshot.expenses_total,
                closing_nav: snapshot.closing_nav,
                created_at: now,
            },
            balances: balances
                .into_iter()
                .enumerate()
                .map(|(index, b)| InvestorBalance {
                    id: index as i64 + 1,
                    snapshot_id,
                    club_id: b.club_id,
                    period_id: b.period_id,
                    investor_id: b.investor_id,
                    opening_balance: b.opening_balance,
                    ownership_pct: b.ownership_pct,
                    contributions: b.contributions,
                    withdrawals: b.withdrawals,
                    income_alloc: b.income_alloc,
                    expense_alloc: b.expense_alloc,
                    net_alloc: b.net_alloc,
                    closing_balance: b.closing_balance,
                    created_at: now,
                })
                .collect(),
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn delete_by_period(&self, club_id: ClubId, period_id: PeriodId) -> Result<usize> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| !(r.snapshot.club_id == club_id && r.snapshot.period_id == period_id));
        Ok(before - records.len())
    }
}

// ==================== Settings ====================

#[derive(Default)]
pub struct MockSettingsRepository {
    values: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl SettingsRepositoryTrait for MockSettingsRepository {
    fn get_setting(&self, setting_key: &str) -> Result<String> {
        self.values
            .lock()
            .unwrap()
            .get(setting_key)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound(setting_key.to_string()).into())
    }

    async fn update_setting(&self, setting_key: &str, setting_value: &str) -> Result<()> {
        self.values
            .lock()
            .unwrap()
            .insert(setting_key.to_string(), setting_value.to_string());
        Ok(())
    }
}

// ==================== Wiring ====================

/// Services wired over shared in-memory repositories.
pub struct Harness {
    pub periods: Arc<MockPeriodRepository>,
    pub ledger: Arc<MockLedgerRepository>,
    pub investors: Arc<MockInvestorRepository>,
    pub snapshots: Arc<MockSnapshotRepository>,
    pub events: MockDomainEventSink,
    pub nav_service: Arc<NavService>,
    pub period_service: PeriodService,
    pub ledger_service: LedgerService,
}

impl Harness {
    pub fn new(investors: Vec<Investor>) -> Self {
        let periods = Arc::new(MockPeriodRepository::default());
        let ledger = Arc::new(MockLedgerRepository::default());
        let investors = Arc::new(MockInvestorRepository::new(investors));
        let snapshots = Arc::new(MockSnapshotRepository::default());
        let settings_service = Arc::new(SettingsService::new(Arc::new(MockSettingsRepository::default())));
        let events = MockDomainEventSink::new();
        let locks = Arc::new(PeriodLocks::new());

        let nav_service = Arc::new(
            NavService::new(
                periods.clone(),
                ledger.clone(),
                snapshots.clone(),
                settings_service.clone(),
            )
            .with_event_sink(Arc::new(events.clone())),
        );
        let period_service = PeriodService::new(
            periods.clone(),
            ledger.clone(),
            investors.clone(),
            nav_service.clone(),
            settings_service.clone(),
            locks.clone(),
        )
        .with_event_sink(Arc::new(events.clone()));
        let ledger_service = LedgerService::new(
            ledger.clone(),
            periods.clone(),
            investors.clone(),
            nav_service.clone(),
            settings_service,
            locks,
        )
        .with_event_sink(Arc::new(events.clone()));

        Self {
            periods,
            ledger,
            investors,
            snapshots,
            events,
            nav_service,
            period_service,
            ledger_service,
        }
    }

    /// Three active investors, ids 1..=3.
    pub fn with_three_investors() -> Self {
        Self::new(vec![investor(1, true), investor(2, true), investor(3, true)])
    }

    pub fn openings(rows: &[(InvestorId, Money)]) -> BTreeMap<InvestorId, Money> {
        rows.iter().copied().collect()
    }
}
