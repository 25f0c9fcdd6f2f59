//! Investors module - read-only club membership.

mod investors_model;
mod investors_traits;

pub use investors_model::{active_investor_ids, Investor};
pub use investors_traits::InvestorRepositoryTrait;
