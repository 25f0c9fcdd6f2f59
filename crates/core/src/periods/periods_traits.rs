use async_trait::async_trait;

use super::periods_model::{
    AccountingPeriod, CloseChecklist, CloseOutcome, InvestorPosition, NewAccountingPeriod,
    NewPeriod, PeriodState, PeriodStatus,
};
use crate::errors::Result;
use crate::ids::{ClubId, PeriodId, UserId};
use crate::nav::PeriodTotals;

/// Trait defining the contract for period and position storage.
#[async_trait]
pub trait PeriodRepositoryTrait: Send + Sync {
    /// Returns `DatabaseError::NotFound` when the period is not in the club.
    fn get_by_id(&self, club_id: ClubId, period_id: PeriodId) -> Result<AccountingPeriod>;

    fn find_by_year_month(
        &self,
        club_id: ClubId,
        year: i32,
        month: u32,
    ) -> Result<Option<AccountingPeriod>>;

    /// Latest closed period strictly before the given club-month.
    fn find_latest_closed_before(
        &self,
        club_id: ClubId,
        year: i32,
        month: u32,
    ) -> Result<Option<AccountingPeriod>>;

    /// Positions ordered by investor id ascending.
    fn list_positions(&self, period_id: PeriodId) -> Result<Vec<InvestorPosition>>;

    /// Creates the period in draft with `closing_nav = opening_nav` and one
    /// opening position per entry of `new_period.positions`.
    async fn create(&self, new_period: NewAccountingPeriod) -> Result<AccountingPeriod>;

    /// Persists recomputed period figures and replaces the position rows.
    async fn save_state(
        &self,
        period: AccountingPeriod,
        positions: Vec<InvestorPosition>,
    ) -> Result<AccountingPeriod>;

    /// Persists status and lock fields.
    async fn update(&self, period: AccountingPeriod) -> Result<AccountingPeriod>;
}

/// Trait defining the contract for period lifecycle operations.
#[async_trait]
pub trait PeriodServiceTrait: Send + Sync {
    async fn create_period(&self, new_period: NewPeriod) -> Result<AccountingPeriod>;

    fn get_period(&self, club_id: ClubId, period_id: PeriodId) -> Result<AccountingPeriod>;

    async fn get_period_state(&self, club_id: ClubId, period_id: PeriodId) -> Result<PeriodState>;

    async fn recalculate_period(&self, club_id: ClubId, period_id: PeriodId) -> Result<PeriodTotals>;

    async fn submit_for_review(&self, club_id: ClubId, period_id: PeriodId) -> Result<AccountingPeriod>;

    async fn set_status(
        &self,
        club_id: ClubId,
        period_id: PeriodId,
        status: PeriodStatus,
    ) -> Result<AccountingPeriod>;

    fn close_checklist(&self, club_id: ClubId, period_id: PeriodId) -> Result<CloseChecklist>;

    async fn close_period(
        &self,
        club_id: ClubId,
        period_id: PeriodId,
        closed_by: UserId,
    ) -> Result<CloseOutcome>;
}
