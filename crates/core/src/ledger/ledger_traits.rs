use async_trait::async_trait;

use super::ledger_model::{
    LedgerEntry, LedgerEntryUpdate, LedgerImportSummary, NewLedgerEntry, PostedEntry,
};
use crate::errors::Result;
use crate::ids::{ClubId, LedgerEntryId, PeriodId};
use crate::nav::PeriodTotals;

/// Trait defining the contract for ledger entry storage.
#[async_trait]
pub trait LedgerRepositoryTrait: Send + Sync {
    /// Entries of one period ordered by id ascending.
    fn list_for_period(&self, period_id: PeriodId) -> Result<Vec<LedgerEntry>>;
    fn get_by_id(&self, period_id: PeriodId, entry_id: LedgerEntryId) -> Result<LedgerEntry>;
    fn has_entries(&self, period_id: PeriodId) -> Result<bool>;
    /// Stores a prepared entry; `tx_date` and `category` are always set.
    async fn create(&self, new_entry: NewLedgerEntry) -> Result<LedgerEntry>;
    /// Stores all entries or none.
    async fn create_many(&self, new_entries: Vec<NewLedgerEntry>) -> Result<Vec<LedgerEntry>>;
    async fn update(&self, entry: LedgerEntry) -> Result<LedgerEntry>;
    async fn delete(&self, period_id: PeriodId, entry_id: LedgerEntryId) -> Result<usize>;
}

/// Trait defining the contract for ledger write operations.
#[async_trait]
pub trait LedgerServiceTrait: Send + Sync {
    fn list_entries(&self, club_id: ClubId, period_id: PeriodId) -> Result<Vec<LedgerEntry>>;
    async fn post_entry(&self, new_entry: NewLedgerEntry) -> Result<PostedEntry>;
    async fn update_entry(
        &self,
        club_id: ClubId,
        period_id: PeriodId,
        update: LedgerEntryUpdate,
    ) -> Result<PostedEntry>;
    async fn delete_entry(
        &self,
        club_id: ClubId,
        period_id: PeriodId,
        entry_id: LedgerEntryId,
    ) -> Result<PeriodTotals>;
    async fn import_entries(
        &self,
        club_id: ClubId,
        period_id: PeriodId,
        entries: Vec<NewLedgerEntry>,
        dry_run: bool,
    ) -> Result<LedgerImportSummary>;
}
