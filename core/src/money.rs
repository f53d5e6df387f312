//! Monetary amount helpers.
//!
//! Internally all amounts are full-precision [`Decimal`]s so that portfolio
//! totals stay exactly additive. Rounding to cents happens only at the edge,
//! when an amount is rendered or serialized for an external consumer.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serializer;

/// Number of decimal places in every external representation.
pub const MONEY_SCALE: u32 = 2;

/// Rounds to cents (half away from zero) with a fixed scale of two, so
/// `14560` renders as `14560.00`.
pub fn to_cents(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}

/// `serialize_with` adapter emitting a two-decimal string, e.g. `"260000.00"`.
pub fn serialize_cents<S>(amount: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&to_cents(*amount).to_string())
}

/// Formats an amount as `$1,234.56` for reports.
pub fn format_usd(amount: Decimal) -> String {
    let cents = to_cents(amount);
    let text = cents.abs().to_string();
    let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if cents.is_sign_negative() && !cents.is_zero() { "-" } else { "" };
    format!("{sign}${grouped}.{frac}")
}

/// Formats a percentage with two decimals, e.g. `4.00%`.
pub fn format_percent(percent: Decimal) -> String {
    format!("{}%", to_cents(percent))
}
