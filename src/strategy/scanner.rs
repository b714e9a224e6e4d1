//! Market eligibility filtering and the trading-day gate.

use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::config::StrategyConfig;
use crate::error::{Error, Result};
use crate::exchange::Market;

/// Filters open markets down to the ones the strategy may trade today.
///
/// "Today" and "game day" are both evaluated in the configured reference
/// timezone; a late game can expire after midnight UTC and still belong
/// to the current trading date.
pub struct MarketScanner {
    config: StrategyConfig,
    timezone: Tz,
}

impl MarketScanner {
    /// Create a new scanner with the given configuration.
    pub fn new(config: StrategyConfig) -> Result<Self> {
        let timezone = config
            .timezone
            .parse::<Tz>()
            .map_err(|_| Error::Config(format!("unknown timezone: {}", config.timezone)))?;

        Ok(Self { config, timezone })
    }

    /// Whether the strategy trades at all on this instant's local weekday.
    pub fn is_trading_day(&self, now: DateTime<Utc>) -> bool {
        let weekday = now.with_timezone(&self.timezone).weekday().number_from_monday();
        self.config.trading_days.contains(&weekday)
    }

    /// Keep markets whose ask sits inside the configured band and whose
    /// expiration falls on today's date in the reference timezone.
    /// Returned markets are sorted by expiration time.
    pub fn eligible_markets(&self, markets: Vec<Market>, now: DateTime<Utc>) -> Vec<Market> {
        let today = now.with_timezone(&self.timezone).date_naive();
        let total = markets.len();
        let mut price_rejects = 0usize;
        let mut day_rejects = 0usize;

        let mut eligible: Vec<Market> = markets
            .into_iter()
            .filter(|market| {
                let in_band = (self.config.min_yes_ask..=self.config.max_yes_ask)
                    .contains(&market.yes_ask);
                if !in_band {
                    price_rejects += 1;
                    return false;
                }

                let game_day = market
                    .expected_expiration_time
                    .with_timezone(&self.timezone)
                    .date_naive();
                if game_day != today {
                    day_rejects += 1;
                    return false;
                }

                true
            })
            .collect();

        eligible.sort_by_key(|market| market.expected_expiration_time);

        debug!(
            total,
            eligible = eligible.len(),
            price_rejects,
            day_rejects,
            %today,
            "Filtered open markets"
        );

        eligible
    }
}
