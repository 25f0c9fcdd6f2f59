use async_trait::async_trait;

use super::nav_model::{
    Insight, NavPreview, NavSnapshotRecord, NewInvestorBalance, NewNavSnapshot, PeriodTotals,
};
use crate::errors::Result;
use crate::ids::{ClubId, PeriodId};
use crate::reconciliation::{ReconciliationResult, ReconciliationStamp};

/// Storage for close snapshots. Snapshots of closed periods are never updated.
#[async_trait]
pub trait NavSnapshotRepositoryTrait: Send + Sync {
    fn get_by_period(&self, club_id: ClubId, period_id: PeriodId) -> Result<Option<NavSnapshotRecord>>;

    /// Returns `DatabaseError::UniqueViolation` if the period already has one.
    async fn create(
        &self,
        snapshot: NewNavSnapshot,
        balances: Vec<NewInvestorBalance>,
    ) -> Result<NavSnapshotRecord>;

    /// Removes the snapshot and its balance rows. Only used for snapshots
    /// left behind by a close that never reached the period row.
    async fn delete_by_period(&self, club_id: ClubId, period_id: PeriodId) -> Result<usize>;
}

/// NAV computation over stored periods.
///
/// `recalculate` and `record_close_snapshot` do not take the period lock;
/// callers hold it.
#[async_trait]
pub trait NavServiceTrait: Send + Sync {
    fn preview(&self, club_id: ClubId, period_id: PeriodId) -> Result<NavPreview>;

    async fn recalculate(&self, club_id: ClubId, period_id: PeriodId) -> Result<PeriodTotals>;

    fn reconciliation(&self, club_id: ClubId, period_id: PeriodId) -> Result<ReconciliationResult>;

    fn reconciliation_stamp(&self, club_id: ClubId, period_id: PeriodId) -> Result<ReconciliationStamp>;

    fn snapshot(&self, club_id: ClubId, period_id: PeriodId) -> Result<Option<NavSnapshotRecord>>;

    /// Returns the snapshot of a closed period. For any other period, writes a
    /// fresh snapshot from the current preview, replacing a leftover one.
    async fn record_close_snapshot(&self, club_id: ClubId, period_id: PeriodId) -> Result<NavSnapshotRecord>;

    fn insights(&self, club_id: ClubId, period_id: PeriodId) -> Result<Vec<Insight>>;
}
