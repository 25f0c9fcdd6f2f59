//! Periods module - lifecycle, opening resolution and period services.

mod opening_resolver;
mod period_lifecycle;
mod period_locks;
mod periods_errors;
mod periods_model;
mod periods_service;
mod periods_traits;


pub use opening_resolver::{resolve_openings, OpeningSource, PriorClose, ResolvedOpenings};
pub use period_lifecycle::{
    assert_entries_deletable, assert_entries_editable, assert_period_writable,
    build_close_checklist, close_period, set_status, submit_for_review,
};
pub use period_locks::{PeriodGuard, PeriodLocks};
pub use periods_errors::PeriodError;
pub use periods_model::{
    AccountingPeriod, CloseChecklist, CloseOutcome, InvestorPosition, NewAccountingPeriod,
    NewInvestorPosition, NewPeriod, PeriodState, PeriodStatus,
};
pub use periods_service::PeriodService;
pub use periods_traits::{PeriodRepositoryTrait, PeriodServiceTrait};
