//! Decimal arithmetic utilities for money handling.

use rust_decimal::Decimal;

/// Convert integer cents to exact decimal dollars.
pub fn cents_to_dollars(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Dollar price of a contract quoted at `cents`.
pub fn price_from_cents(cents: u32) -> Decimal {
    cents_to_dollars(cents as i64)
}

/// Safe division that returns zero if the divisor is zero.
pub fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator == Decimal::ZERO {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}
