//! Allocation engine - proportional distribution of a period's income and
//! expenses across investors by opening ownership.

mod allocation_engine;
mod allocation_errors;
mod allocation_model;


pub use allocation_engine::{allocate_component, allocate_returns, ownership_percentages};
pub use allocation_errors::AllocationError;
pub use allocation_model::{AllocationSnapshotInput, InvestorAllocationResult, InvestorOpening};
