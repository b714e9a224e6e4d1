//! The fetch-allocate-submit pipeline.

use chrono::{DateTime, Utc};
use std::fmt;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::StrategyConfig;
use crate::error::Result;
use crate::exchange::{Action, ExchangeApi, OrderRequest, Series, Side};
use crate::strategy::allocator::{allocate, TradeIntent};
use crate::strategy::scanner::MarketScanner;

/// Why a run placed no orders without failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Today's weekday is outside the configured trading window.
    OutsideTradingWindow,
    /// No open market passed the eligibility filter.
    NoEligibleMarkets,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::OutsideTradingWindow => write!(f, "outside trading window"),
            SkipReason::NoEligibleMarkets => write!(f, "no eligible markets"),
        }
    }
}

/// What one invocation did.
#[derive(Debug)]
pub enum RunOutcome {
    /// Clean no-op; not an error.
    Skipped(SkipReason),
    /// Orders were sized (and, unless dry-run, submitted).
    Traded(RunReport),
}

/// Submission tally for one run. There is no cross-order rollback;
/// each market's exposure stands on its own.
#[derive(Debug)]
pub struct RunReport {
    pub intents: Vec<TradeIntent>,
    pub submitted: u32,
    pub rejected: u32,
    pub dry_run: bool,
}

/// Drives one fetch-allocate-submit cycle against the exchange.
pub struct StrategyRunner {
    scanner: MarketScanner,
    series: Series,
    dry_run: bool,
}

impl StrategyRunner {
    /// Create a runner. With `dry_run` set, intents are computed and
    /// logged but no orders are submitted.
    pub fn new(config: StrategyConfig, dry_run: bool) -> Result<Self> {
        let series = config.series;
        let scanner = MarketScanner::new(config)?;

        Ok(Self {
            scanner,
            series,
            dry_run,
        })
    }

    /// Run one cycle at the current instant.
    pub async fn run<E: ExchangeApi>(&self, exchange: &E) -> Result<RunOutcome> {
        self.run_at(exchange, Utc::now()).await
    }

    /// Run one cycle, with the clock injected for determinism.
    pub async fn run_at<E: ExchangeApi>(
        &self,
        exchange: &E,
        now: DateTime<Utc>,
    ) -> Result<RunOutcome> {
        // The day gate comes before any network call: an out-of-window
        // invocation performs zero requests.
        if !self.scanner.is_trading_day(now) {
            info!(%now, "Outside trading window, nothing to do");
            return Ok(RunOutcome::Skipped(SkipReason::OutsideTradingWindow));
        }

        let balance = exchange.get_portfolio_balance().await?;
        info!(%balance, "Fetched portfolio balance");

        let markets = exchange.get_open_markets(Some(self.series)).await?;
        let eligible = self.scanner.eligible_markets(markets, now);

        if eligible.is_empty() {
            info!(series = %self.series, "No eligible markets today");
            return Ok(RunOutcome::Skipped(SkipReason::NoEligibleMarkets));
        }

        let intents = allocate(balance, &eligible);

        let mut submitted = 0u32;
        let mut rejected = 0u32;

        for intent in intents.iter().filter(|intent| intent.contracts > 0) {
            let order = OrderRequest {
                action: Action::Buy,
                side: Side::Yes,
                ticker: intent.ticker.clone(),
                count: intent.contracts,
                yes_price: intent.yes_ask,
                client_order_id: Uuid::new_v4().to_string(),
            };

            if self.dry_run {
                info!(
                    ticker = %order.ticker,
                    count = order.count,
                    yes_price = order.yes_price,
                    "Dry run: order not submitted"
                );
                continue;
            }

            // One rejection must not block the remaining markets.
            match exchange.create_order(&order).await {
                Ok(confirmation) => {
                    submitted += 1;
                    info!(
                        ticker = %order.ticker,
                        order_id = %confirmation.order_id,
                        count = order.count,
                        yes_price = order.yes_price,
                        "Order accepted"
                    );
                }
                Err(e) => {
                    rejected += 1;
                    error!(ticker = %order.ticker, error = %e, "Order rejected");
                }
            }
        }

        if rejected > 0 {
            warn!(submitted, rejected, "Run finished with rejected orders");
        } else {
            info!(submitted, "Run finished");
        }

        Ok(RunOutcome::Traded(RunReport {
            intents,
            submitted,
            rejected,
            dry_run: self.dry_run,
        }))
    }
}
