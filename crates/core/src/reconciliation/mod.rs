//! Reconciliation of investor balances against the club-level NAV.

mod reconciliation_model;
mod reconciliation_validator;

pub use reconciliation_model::{ReconciliationResult, ReconciliationStamp};
pub use reconciliation_validator::{reconciliation_stamp, validate};
