//! Resolution of a new period's opening NAV and per-investor balances.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::periods_errors::PeriodError;
use super::periods_model::NewInvestorPosition;
use crate::constants::MAX_AMOUNT;
use crate::errors::{Result, ValidationError};
use crate::ids::{InvestorId, PeriodId};
use crate::utils::{money, sum_money, zero_money, Money};

/// Closing state of the latest closed period before the one being created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorClose {
    pub period_id: PeriodId,
    pub closing_nav: Money,
    pub closing_balances: BTreeMap<InvestorId, Money>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OpeningSource {
    Explicit,
    CarriedForward { from_period_id: PeriodId },
    FirstPeriod,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOpenings {
    pub opening_nav: Money,
    pub balances: BTreeMap<InvestorId, Money>,
    pub source: OpeningSource,
}

impl ResolvedOpenings {
    /// Opening positions for every active investor plus every investor that
    /// carries a balance, ascending by id. Investors without a balance open at zero.
    pub fn positions(&self, active_investor_ids: &BTreeSet<InvestorId>) -> Vec<NewInvestorPosition> {
        let ids: BTreeSet<InvestorId> = active_investor_ids
            .iter()
            .chain(self.balances.keys())
            .copied()
            .collect();
        ids.into_iter()
            .map(|investor_id| NewInvestorPosition {
                investor_id,
                opening_balance: self
                    .balances
                    .get(&investor_id)
                    .copied()
                    .unwrap_or_else(zero_money),
            })
            .collect()
    }
}

fn ensure_in_range(label: &str, amount: Money) -> Result<()> {
    if amount.abs() > MAX_AMOUNT {
        return Err(ValidationError::InvalidInput(format!(
            "{} cannot exceed {} in magnitude",
            label, MAX_AMOUNT
        ))
        .into());
    }
    Ok(())
}

/// Resolves openings in order of precedence:
///
/// 1. explicit per-investor balances (ids must be active members; their sum
///    must equal `opening_nav`, or becomes it when omitted);
/// 2. carry-forward of the prior closed period's closing balances;
/// 3. an explicit `opening_nav` for the club's first period.
///
/// An empty explicit map counts as no map.
pub fn resolve_openings(
    opening_nav: Option<Money>,
    investor_openings: Option<&BTreeMap<InvestorId, Money>>,
    active_investor_ids: &BTreeSet<InvestorId>,
    prior_close: Option<&PriorClose>,
) -> Result<ResolvedOpenings> {
    if let Some(nav) = opening_nav {
        ensure_in_range("Opening NAV", nav)?;
    }

    if let Some(openings) = investor_openings.filter(|map| !map.is_empty()) {
        let unknown: Vec<InvestorId> = openings
            .keys()
            .filter(|id| !active_investor_ids.contains(id))
            .copied()
            .collect();
        if !unknown.is_empty() {
            return Err(PeriodError::UnknownInvestors(unknown).into());
        }

        let mut balances = BTreeMap::new();
        for (investor_id, amount) in openings {
            ensure_in_range(&format!("Opening balance for investor {}", investor_id), *amount)?;
            let amount = money(*amount);
            if amount < zero_money() {
                return Err(ValidationError::InvalidInput(format!(
                    "Opening balance for investor {} cannot be negative",
                    investor_id
                ))
                .into());
            }
            balances.insert(*investor_id, amount);
        }

        let opening_sum = sum_money(balances.values());
        if let Some(nav) = opening_nav {
            if money(nav) != opening_sum {
                return Err(PeriodError::OpeningNavMismatch {
                    opening_nav: money(nav),
                    opening_sum,
                }
                .into());
            }
        }
        return Ok(ResolvedOpenings {
            opening_nav: opening_sum,
            balances,
            source: OpeningSource::Explicit,
        });
    }

    if let Some(prior) = prior_close {
        return Ok(ResolvedOpenings {
            opening_nav: money(prior.closing_nav),
            balances: prior
                .closing_balances
                .iter()
                .map(|(id, amount)| (*id, money(*amount)))
                .collect(),
            source: OpeningSource::CarriedForward {
                from_period_id: prior.period_id,
            },
        });
    }

    match opening_nav.map(money) {
        Some(nav) if nav < zero_money() => Err(ValidationError::InvalidInput(format!(
            "Opening NAV cannot be negative, got {}",
            nav
        ))
        .into()),
        // Zero-balance positions cannot sum to a non-zero NAV.
        Some(nav) if !nav.is_zero() && !active_investor_ids.is_empty() => {
            Err(PeriodError::UnallocatedOpeningNav(nav).into())
        }
        Some(nav) => Ok(ResolvedOpenings {
            opening_nav: nav,
            balances: BTreeMap::new(),
            source: OpeningSource::FirstPeriod,
        }),
        None => Err(PeriodError::MissingOpeningSource.into()),
    }
}
