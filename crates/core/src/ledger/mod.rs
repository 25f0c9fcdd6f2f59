//! Ledger module - period transactions, validation and aggregation.

mod ledger_aggregator;
mod ledger_model;
mod ledger_service;
mod ledger_traits;


pub use ledger_aggregator::{aggregate_entries, LedgerTotals};
pub use ledger_model::{
    LedgerEntry, LedgerEntryType, LedgerEntryUpdate, LedgerImportSummary, NewLedgerEntry,
    PostedEntry,
};
pub use ledger_service::LedgerService;
pub use ledger_traits::{LedgerRepositoryTrait, LedgerServiceTrait};
