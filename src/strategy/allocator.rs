//! Equal-weight capital allocation across eligible markets.

use rust_decimal::Decimal;
use tracing::debug;

use crate::exchange::Market;
use crate::strategy::fees;
use crate::utils::decimal::{price_from_cents, safe_div};

/// One market's slice of the portfolio for this run.
#[derive(Debug, Clone)]
pub struct TradeIntent {
    pub ticker: String,
    /// Dollar budget allocated to this market
    pub budget: Decimal,
    /// Observed best "yes" ask in cents, used as the limit price
    pub yes_ask: u32,
    /// Fee-aware contract count; zero when the budget buys nothing
    pub contracts: u32,
}

/// Split `balance` equally across `markets` and size each slice.
///
/// Every market receives weight 1/N. Contract counts satisfy
/// `count * price + fee(count, price) <= budget` exactly; intents with
/// zero contracts are kept so callers can see why nothing was bought.
pub fn allocate(balance: Decimal, markets: &[Market]) -> Vec<TradeIntent> {
    if markets.is_empty() {
        return Vec::new();
    }

    // Dividing the balance directly keeps exact budgets where 1/N has
    // no finite decimal expansion.
    let budget = safe_div(balance, Decimal::from(markets.len()));

    let intents: Vec<TradeIntent> = markets
        .iter()
        .map(|market| {
            let price = price_from_cents(market.yes_ask);
            let contracts = fees::max_affordable_contracts(budget, price);
            TradeIntent {
                ticker: market.ticker.clone(),
                budget,
                yes_ask: market.yes_ask,
                contracts,
            }
        })
        .collect();

    debug!(
        markets = markets.len(),
        %balance,
        %budget,
        sized = intents.iter().filter(|i| i.contracts > 0).count(),
        "Allocated portfolio"
    );

    intents
}
