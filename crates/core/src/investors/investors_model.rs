use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ids::{ClubId, InvestorId};

/// Club member as seen by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Investor {
    pub id: InvestorId,
    pub club_id: ClubId,
    pub investor_code: String,
    pub name: String,
    pub is_active: bool,
}

/// Ids of the active investors, ascending.
pub fn active_investor_ids(investors: &[Investor]) -> BTreeSet<InvestorId> {
    investors
        .iter()
        .filter(|investor| investor.is_active)
        .map(|investor| investor.id)
        .collect()
}
