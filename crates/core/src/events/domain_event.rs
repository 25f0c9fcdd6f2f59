//! Domain event types.

use serde::{Deserialize, Serialize};

use crate::ids::{ClubId, LedgerEntryId, PeriodId, SnapshotId};
use crate::periods::PeriodStatus;
use crate::utils::Money;

/// Domain events emitted by core services after successful mutations.
///
/// These events represent facts about period data changes. Hosting layers
/// translate them into their own actions (audit trail, report refresh,
/// notifications).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// A period was opened.
    PeriodCreated {
        club_id: ClubId,
        period_id: PeriodId,
        year_month: String,
    },

    /// Ledger entries were posted, edited, deleted, or imported.
    LedgerChanged {
        club_id: ClubId,
        period_id: PeriodId,
        entry_ids: Vec<LedgerEntryId>,
    },

    /// Period figures and positions were recomputed and stored.
    PeriodRecalculated {
        club_id: ClubId,
        period_id: PeriodId,
        closing_nav: Money,
        mismatch: Money,
    },

    PeriodStatusChanged {
        club_id: ClubId,
        period_id: PeriodId,
        from: PeriodStatus,
        to: PeriodStatus,
    },

    /// A period was closed and its snapshot recorded.
    PeriodClosed {
        club_id: ClubId,
        period_id: PeriodId,
        snapshot_id: SnapshotId,
        closing_nav: Money,
    },
}

impl DomainEvent {
    pub fn period_created(club_id: ClubId, period_id: PeriodId, year_month: String) -> Self {
        Self::PeriodCreated {
            club_id,
            period_id,
            year_month,
        }
    }

    pub fn ledger_changed(club_id: ClubId, period_id: PeriodId, entry_ids: Vec<LedgerEntryId>) -> Self {
        Self::LedgerChanged {
            club_id,
            period_id,
            entry_ids,
        }
    }

    pub fn period_recalculated(
        club_id: ClubId,
        period_id: PeriodId,
        closing_nav: Money,
        mismatch: Money,
    ) -> Self {
        Self::PeriodRecalculated {
            club_id,
            period_id,
            closing_nav,
            mismatch,
        }
    }

    pub fn period_status_changed(
        club_id: ClubId,
        period_id: PeriodId,
        from: PeriodStatus,
        to: PeriodStatus,
    ) -> Self {
        Self::PeriodStatusChanged {
            club_id,
            period_id,
            from,
            to,
        }
    }

    pub fn period_closed(
        club_id: ClubId,
        period_id: PeriodId,
        snapshot_id: SnapshotId,
        closing_nav: Money,
    ) -> Self {
        Self::PeriodClosed {
            club_id,
            period_id,
            snapshot_id,
            closing_nav,
        }
    }

    /// Period the event concerns.
    pub fn period_id(&self) -> PeriodId {
        match self {
            Self::PeriodCreated { period_id, .. }
            | Self::LedgerChanged { period_id, .. }
            | Self::PeriodRecalculated { period_id, .. }
            | Self::PeriodStatusChanged { period_id, .. }
            | Self::PeriodClosed { period_id, .. } => *period_id,
        }
    }
}
