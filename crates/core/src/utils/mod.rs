pub mod decimal_math;
pub mod time_utils;

pub use decimal_math::{format_money, money, pct, sum_money, zero_money, Money, Percentage};
