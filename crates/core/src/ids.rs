//! Foreign-key style identifiers shared across modules.
//!
//! Entities reference each other by id only; the object graph between clubs,
//! investors, periods and ledger entries belongs to the storage layer.

pub type ClubId = i64;
pub type InvestorId = i64;
pub type PeriodId = i64;
pub type LedgerEntryId = i64;
pub type SnapshotId = i64;
pub type UserId = i64;
