use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CURRENCY_CODE, DEFAULT_EXPENSE_SPIKE_THRESHOLD_PCT};
use crate::utils::time_utils::DEFAULT_CLUB_TZ;

pub const CURRENCY_CODE_KEY: &str = "currency_code";
pub const EXPENSE_SPIKE_THRESHOLD_KEY: &str = "expense_spike_threshold_pct";
pub const TIMEZONE_KEY: &str = "timezone";

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavSettings {
    /// Labels amounts in reasons, stamps and insights
    pub currency_code: String,
    pub expense_spike_threshold_pct: Decimal,
    /// IANA name of the zone business dates are taken in
    pub timezone: String,
}

impl Default for NavSettings {
    fn default() -> Self {
        Self {
            currency_code: DEFAULT_CURRENCY_CODE.to_string(),
            expense_spike_threshold_pct: DEFAULT_EXPENSE_SPIKE_THRESHOLD_PCT
                .parse()
                .unwrap_or(Decimal::TWO),
            timezone: DEFAULT_CLUB_TZ.name().to_string(),
        }
    }
}

impl NavSettings {
    pub fn club_tz(&self) -> Tz {
        self.timezone.parse().unwrap_or(DEFAULT_CLUB_TZ)
    }
}
