//! Club NAV Core - Domain entities, engine functions, services, and traits.
//!
//! This crate contains the monthly NAV allocation and reconciliation logic
//! for investment clubs. It is database-agnostic and defines the repository
//! traits a storage layer implements.

pub mod allocation;
pub mod constants;
pub mod errors;
pub mod events;
pub mod ids;
pub mod investors;
pub mod ledger;
pub mod nav;
pub mod periods;
pub mod reconciliation;
pub mod settings;
pub mod utils;

#[cfg(test)]
mod test_support;

// Re-export the engine entry points
pub use allocation::{allocate_returns, AllocationSnapshotInput, InvestorAllocationResult, InvestorOpening};
pub use ledger::aggregate_entries;
pub use nav::compute_period_nav;
pub use reconciliation::validate as validate_reconciliation;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
