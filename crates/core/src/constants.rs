use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Fractional digits kept on every monetary amount
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// Fractional digits kept on ownership percentages
pub const PERCENT_DECIMAL_PLACES: u32 = 6;

/// Largest magnitude accepted for any single amount or opening NAV
pub const MAX_AMOUNT: Decimal = dec!(1000000000000000);

/// Currency label used when no club currency is configured
pub const DEFAULT_CURRENCY_CODE: &str = "UGX";

/// Expense-to-opening-NAV ratio (in percent) above which an expense spike is reported
pub const DEFAULT_EXPENSE_SPIKE_THRESHOLD_PCT: &str = "2";

/// Category assigned to ledger entries posted without one
pub const DEFAULT_LEDGER_CATEGORY: &str = "general";

/// Ledger text field limits
pub const LEDGER_DESCRIPTION_MIN_LEN: usize = 2;
pub const LEDGER_DESCRIPTION_MAX_LEN: usize = 1000;
pub const LEDGER_CATEGORY_MAX_LEN: usize = 100;
pub const LEDGER_NOTE_MAX_LEN: usize = 3000;
pub const LEDGER_REFERENCE_MAX_LEN: usize = 100;

/// Earliest and latest calendar years accepted for accounting periods
pub const MIN_PERIOD_YEAR: i32 = 1900;
pub const MAX_PERIOD_YEAR: i32 = 9999;
