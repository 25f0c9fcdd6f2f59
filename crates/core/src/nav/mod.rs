//! NAV module - per-period computation, close snapshots and insights.

mod nav_engine;
mod nav_insights;
mod nav_model;
mod nav_service;
mod nav_traits;

#[cfg(test)]
mod nav_service_tests;

pub use nav_engine::{apply_computation, compute_period_nav, investor_openings};
pub use nav_insights::{backdated_entries_insight, build_insights};
pub use nav_model::{
    Insight, InsightLevel, InvestorBalance, InvestorExplanation, NavComputation, NavPreview,
    NavSnapshot, NavSnapshotRecord, NewInvestorBalance, NewNavSnapshot, PeriodTotals,
};
pub use nav_service::NavService;
pub use nav_traits::{NavServiceTrait, NavSnapshotRepositoryTrait};
