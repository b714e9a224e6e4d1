//! Scripted exchange for strategy tests.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::exchange::traits::ExchangeApi;
use crate::exchange::types::{Market, OrderConfirmation, OrderRequest, Series};

/// In-memory exchange with a fixed balance and market list.
///
/// Records every submitted order and counts read calls, so tests can
/// assert both what was traded and that gated runs touched nothing.
pub struct MockExchange {
    balance: Decimal,
    markets: Vec<Market>,
    rejected_tickers: HashSet<String>,
    orders: Mutex<Vec<OrderRequest>>,
    market_fetches: AtomicU32,
    balance_fetches: AtomicU32,
}

impl MockExchange {
    pub fn new(balance: Decimal) -> Self {
        Self {
            balance,
            markets: Vec::new(),
            rejected_tickers: HashSet::new(),
            orders: Mutex::new(Vec::new()),
            market_fetches: AtomicU32::new(0),
            balance_fetches: AtomicU32::new(0),
        }
    }

    pub fn with_markets(mut self, markets: Vec<Market>) -> Self {
        self.markets = markets;
        self
    }

    /// Orders for this ticker will be rejected with an upstream error.
    pub fn with_rejected_ticker(mut self, ticker: &str) -> Self {
        self.rejected_tickers.insert(ticker.to_string());
        self
    }

    pub fn submitted_orders(&self) -> Vec<OrderRequest> {
        self.orders.lock().unwrap().clone()
    }

    pub fn market_fetches(&self) -> u32 {
        self.market_fetches.load(Ordering::SeqCst)
    }

    pub fn balance_fetches(&self) -> u32 {
        self.balance_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExchangeApi for MockExchange {
    async fn get_open_markets(&self, _series: Option<Series>) -> Result<Vec<Market>> {
        self.market_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.markets.clone())
    }

    async fn get_portfolio_balance(&self) -> Result<Decimal> {
        self.balance_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.balance)
    }

    async fn create_order(&self, order: &OrderRequest) -> Result<OrderConfirmation> {
        if self.rejected_tickers.contains(&order.ticker) {
            return Err(Error::Upstream {
                method: "POST",
                path: "/portfolio/orders".to_string(),
                status: 400,
                body: format!("order rejected for {}", order.ticker),
            });
        }

        self.orders.lock().unwrap().push(order.clone());

        Ok(OrderConfirmation {
            order_id: format!("mock-{}", order.client_order_id),
            client_order_id: order.client_order_id.clone(),
            ticker: order.ticker.clone(),
            status: "resting".to_string(),
            yes_price: Some(order.yes_price),
            count: Some(order.count),
        })
    }
}
