//! The single rounding primitive of the engine.
//!
//! Every monetary amount is quantized to two fractional digits and every
//! ownership percentage to six, both rounding half away from zero. Nothing
//! else in the crate rounds on its own: aggregation, allocation and
//! reconciliation all route through [`money`] and [`pct`], so the same inputs
//! always produce the same cent-exact outputs.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::{MONEY_DECIMAL_PLACES, PERCENT_DECIMAL_PLACES};

/// A decimal amount quantized to [`MONEY_DECIMAL_PLACES`].
pub type Money = Decimal;

/// An ownership share in `[0, 100]` quantized to [`PERCENT_DECIMAL_PLACES`].
pub type Percentage = Decimal;

fn quantize(value: Decimal, places: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(places);
    if rounded.is_zero() {
        // -0.00 compares equal to 0.00 but renders with a sign
        rounded.set_sign_positive(true);
    }
    rounded
}

/// Quantizes a value to Money: two decimals, half-up.
pub fn money(value: Decimal) -> Money {
    quantize(value, MONEY_DECIMAL_PLACES)
}

/// Quantizes a value to a Percentage: six decimals, half-up.
pub fn pct(value: Decimal) -> Percentage {
    quantize(value, PERCENT_DECIMAL_PLACES)
}

/// Money zero with its canonical scale.
pub fn zero_money() -> Money {
    money(Decimal::ZERO)
}

/// Sums amounts, re-quantizing after every addition.
pub fn sum_money<'a, I>(values: I) -> Money
where
    I: IntoIterator<Item = &'a Money>,
{
    values
        .into_iter()
        .fold(zero_money(), |acc, value| money(acc + money(*value)))
}

/// Renders an amount with thousands separators, e.g. `1,234,567.80`.
pub fn format_money(value: Money) -> String {
    let rendered = money(value).to_string();
    let (sign, digits) = match rendered.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rendered.as_str()),
    };
    let (integer, fraction) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (index, ch) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}{}.{}", sign, grouped, fraction)
}
