use crate::errors::Result;
use crate::ids::{ClubId, InvestorId};

use super::investors_model::Investor;

/// Read access to club membership. Investors are managed outside the engine.
pub trait InvestorRepositoryTrait: Send + Sync {
    /// Investors of a club ordered by id; `is_active` filters when set.
    fn list_by_club(&self, club_id: ClubId, is_active: Option<bool>) -> Result<Vec<Investor>>;

    /// Returns `DatabaseError::NotFound` when the investor is not in the club.
    fn get_by_id(&self, club_id: ClubId, investor_id: InvestorId) -> Result<Investor>;
}
