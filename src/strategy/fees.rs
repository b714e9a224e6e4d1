//! Kalshi trading-fee schedule and fee-aware position sizing.
//!
//! All arithmetic is `Decimal`; the budget inequality is never evaluated
//! in floating point.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Exchange fee coefficient from the published schedule.
pub const FEE_RATE: Decimal = dec!(0.07);

/// Per-order trading fee: `round(0.07 * C * P * (1 - P), 2)`.
///
/// `price` is dollars per contract (cents / 100). Rounding is
/// round-half-even on the cent, matching the exchange's published
/// schedule.
pub fn trading_fee(contracts: u32, price: Decimal) -> Decimal {
    (FEE_RATE * Decimal::from(contracts) * price * (Decimal::ONE - price)).round_dp(2)
}

/// Total cash needed to buy `contracts` at `price`: premium plus fee.
pub fn total_cost(contracts: u32, price: Decimal) -> Decimal {
    Decimal::from(contracts) * price + trading_fee(contracts, price)
}

/// Largest contract count whose total cost fits inside `budget`.
///
/// Starts from the closed-form guess `floor(B / (P * (1 + 0.07*(1-P))))`,
/// which models the fee as exactly linear in the count. Cent rounding
/// makes the real fee deviate by up to half a cent either way, so the
/// guess is corrected against the exact inequality in both directions.
pub fn max_affordable_contracts(budget: Decimal, price: Decimal) -> u32 {
    if budget <= Decimal::ZERO || price <= Decimal::ZERO || price >= Decimal::ONE {
        return 0;
    }

    let per_contract = price * (Decimal::ONE + FEE_RATE * (Decimal::ONE - price));
    let mut count = (budget / per_contract).floor().to_u32().unwrap_or(0);

    while total_cost(count + 1, price) <= budget {
        count += 1;
    }
    while count > 0 && total_cost(count, price) > budget {
        count -= 1;
    }

    count
}
