//! Exchange-facing trait for the strategy pipeline.
//!
//! The strategy only needs three operations; putting them behind a trait
//! keeps the allocation and execution logic testable against a scripted
//! exchange.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::Result;
use crate::exchange::types::{Market, OrderConfirmation, OrderRequest, Series};

/// The three operations the strategy drives.
#[async_trait]
pub trait ExchangeApi: Send + Sync {
    /// Fetch open markets, optionally filtered to one series. A fresh
    /// snapshot every call.
    async fn get_open_markets(&self, series: Option<Series>) -> Result<Vec<Market>>;

    /// Spendable balance in dollars (the exchange reports integer cents).
    async fn get_portfolio_balance(&self) -> Result<Decimal>;

    /// Submit one order. Errors here are rejections of this order only.
    async fn create_order(&self, order: &OrderRequest) -> Result<OrderConfirmation>;
}
