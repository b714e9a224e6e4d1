//! Type definitions for Kalshi API requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Series whose markets the harvester understands.
///
/// Closed set of series tickers so an unsupported series is a
/// construction-time error rather than a typo that silently matches
/// nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Series {
    /// NFL game winner markets
    #[serde(rename = "KXNFLGAME")]
    NflGame,
    /// College football game winner markets
    #[serde(rename = "KXNCAAFGAME")]
    CollegeFootballGame,
}

impl Series {
    /// Series ticker as the exchange expects it in query parameters.
    pub fn ticker(&self) -> &'static str {
        match self {
            Series::NflGame => "KXNFLGAME",
            Series::CollegeFootballGame => "KXNCAAFGAME",
        }
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ticker())
    }
}

impl FromStr for Series {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "KXNFLGAME" => Ok(Series::NflGame),
            "KXNCAAFGAME" => Ok(Series::CollegeFootballGame),
            other => Err(format!("unsupported series ticker: {other}")),
        }
    }
}

/// Open-market snapshot as returned by the markets endpoint.
///
/// Prices are integer cents. A "yes" contract bought at `yes_ask` cents
/// pays out 100 cents if the market settles yes.
#[derive(Debug, Clone, Deserialize)]
pub struct Market {
    pub ticker: String,
    pub event_ticker: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub yes_sub_title: Option<String>,
    /// Expected settlement time, UTC second precision
    pub expected_expiration_time: DateTime<Utc>,
    /// Best "yes" ask in cents
    pub yes_ask: u32,
}

/// Envelope for the markets endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketsResponse {
    pub markets: Vec<Market>,
    /// Pagination cursor; a single page covers this strategy's universe
    #[serde(default)]
    pub cursor: Option<String>,
}

/// Envelope for the portfolio balance endpoint. Balance is integer cents.
#[derive(Debug, Clone, Deserialize)]
pub struct BalanceResponse {
    pub balance: i64,
}

/// Contract side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Yes,
    No,
}

/// Order action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Buy,
    Sell,
}

/// Order submission payload.
#[derive(Debug, Clone, Serialize)]
pub struct OrderRequest {
    pub action: Action,
    pub side: Side,
    pub ticker: String,
    pub count: u32,
    /// Limit price for the "yes" side, in cents
    pub yes_price: u32,
    /// Caller-generated idempotency token, unique per submission attempt
    pub client_order_id: String,
}

/// Order as echoed back by the exchange on acceptance.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderConfirmation {
    pub order_id: String,
    pub client_order_id: String,
    pub ticker: String,
    pub status: String,
    #[serde(default)]
    pub yes_price: Option<u32>,
    #[serde(default)]
    pub count: Option<u32>,
}

/// Envelope for the order creation endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderResponse {
    pub order: OrderConfirmation,
}
