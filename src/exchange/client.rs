//! Kalshi REST API client.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use crate::config::{ExecutionConfig, KalshiConfig};
use crate::error::{Error, Result};
use crate::exchange::signer::{
    RequestSigner, ACCESS_KEY_HEADER, ACCESS_SIGNATURE_HEADER, ACCESS_TIMESTAMP_HEADER,
};
use crate::exchange::traits::ExchangeApi;
use crate::exchange::types::*;

const PROD_BASE_URL: &str = "https://api.elections.kalshi.com/trade-api/v2";
const DEMO_BASE_URL: &str = "https://demo-api.kalshi.co/trade-api/v2";

const MARKETS_PATH: &str = "/markets";
const BALANCE_PATH: &str = "/portfolio/balance";
const ORDERS_PATH: &str = "/portfolio/orders";

/// Kalshi API client. Signs every request fresh with RSA-PSS.
pub struct KalshiClient {
    http: Client,
    base_url: String,
    signer: RequestSigner,
    markets_page_limit: u32,
}

impl KalshiClient {
    /// Create a new Kalshi client from configuration.
    pub fn new(kalshi: &KalshiConfig, execution: &ExecutionConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(execution.http_timeout_secs))
            .build()?;

        let base_url = kalshi
            .base_url
            .clone()
            .unwrap_or_else(|| {
                if kalshi.demo {
                    DEMO_BASE_URL.to_string()
                } else {
                    PROD_BASE_URL.to_string()
                }
            })
            .trim_end_matches('/')
            .to_string();

        let signer = RequestSigner::from_pem(&kalshi.api_key_id, &kalshi.private_key)?;

        Ok(Self {
            http,
            base_url,
            signer,
            markets_page_limit: execution.markets_page_limit,
        })
    }

    /// Sign and send a request, mapping non-success statuses to
    /// `Error::Upstream` with the response body attached.
    async fn dispatch(
        &self,
        method: &'static str,
        path: &str,
        builder: reqwest::RequestBuilder,
    ) -> Result<String> {
        let auth = self.signer.sign(method, path)?;

        let response = builder
            .header(CONTENT_TYPE, "application/json")
            .header(ACCESS_KEY_HEADER, auth.api_key_id.as_str())
            .header(ACCESS_SIGNATURE_HEADER, auth.signature.as_str())
            .header(ACCESS_TIMESTAMP_HEADER, auth.timestamp.as_str())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Error::Upstream {
                method,
                path: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl ExchangeApi for KalshiClient {
    /// Fetch open markets, optionally filtered to one series.
    #[instrument(skip(self))]
    async fn get_open_markets(&self, series: Option<Series>) -> Result<Vec<Market>> {
        let url = format!("{}{}", self.base_url, MARKETS_PATH);
        let mut query = vec![
            ("limit", self.markets_page_limit.to_string()),
            ("status", "open".to_string()),
        ];
        if let Some(series) = series {
            query.push(("series_ticker", series.ticker().to_string()));
        }
        let builder = self.http.get(&url).query(&query);

        let body = self.dispatch("GET", MARKETS_PATH, builder).await?;
        let response: MarketsResponse = serde_json::from_str(&body)?;

        debug!(count = response.markets.len(), ?series, "Fetched open markets");
        Ok(response.markets)
    }

    /// Fetch the spendable balance in dollars.
    #[instrument(skip(self))]
    async fn get_portfolio_balance(&self) -> Result<Decimal> {
        let url = format!("{}{}", self.base_url, BALANCE_PATH);
        let builder = self.http.get(&url);

        let body = self.dispatch("GET", BALANCE_PATH, builder).await?;
        let response: BalanceResponse = serde_json::from_str(&body)?;

        // The exchange reports cents; two decimal places keeps it exact.
        Ok(Decimal::new(response.balance, 2))
    }

    /// Submit one order.
    #[instrument(skip(self, order), fields(ticker = %order.ticker, count = order.count))]
    async fn create_order(&self, order: &OrderRequest) -> Result<OrderConfirmation> {
        let url = format!("{}{}", self.base_url, ORDERS_PATH);
        let builder = self.http.post(&url).json(order);

        let body = self.dispatch("POST", ORDERS_PATH, builder).await?;
        let response: CreateOrderResponse = serde_json::from_str(&body)?;

        debug!(order_id = %response.order.order_id, "Order accepted");
        Ok(response.order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::signer::{signing_message, verify_signature};
    use rsa::pkcs8::{EncodePrivateKey, LineEnding};
    use rsa::{RsaPrivateKey, RsaPublicKey};
    use rust_decimal_macros::dec;
    use std::sync::OnceLock;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_key() -> &'static RsaPrivateKey {
        static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
        KEY.get_or_init(|| RsaPrivateKey::new(&mut rand::thread_rng(), 2048).expect("keygen"))
    }

    fn test_client(base_url: &str) -> (KalshiClient, RsaPublicKey) {
        let pem = test_key().to_pkcs8_pem(LineEnding::LF).unwrap();
        let kalshi = KalshiConfig {
            api_key_id: "test-key-id".to_string(),
            private_key: pem.to_string(),
            demo: false,
            base_url: Some(base_url.to_string()),
        };
        let client = KalshiClient::new(&kalshi, &ExecutionConfig::default()).unwrap();
        (client, test_key().to_public_key())
    }

    fn markets_body() -> serde_json::Value {
        serde_json::json!({
            "markets": [
                {
                    "ticker": "KXNFLGAME-25SEP05DENPHI-DEN",
                    "event_ticker": "KXNFLGAME-25SEP05DENPHI",
                    "title": "Broncos at Eagles winner?",
                    "yes_sub_title": "Broncos",
                    "expected_expiration_time": "2025-09-06T02:00:00Z",
                    "yes_ask": 94
                }
            ],
            "cursor": null
        })
    }

    #[tokio::test]
    async fn test_get_open_markets_signs_and_parses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/markets"))
            .and(query_param("status", "open"))
            .and(query_param("series_ticker", "KXNFLGAME"))
            .respond_with(ResponseTemplate::new(200).set_body_json(markets_body()))
            .expect(1)
            .mount(&server)
            .await;

        let (client, public_key) = test_client(&server.uri());
        let markets = client.get_open_markets(Some(Series::NflGame)).await.unwrap();

        assert_eq!(markets.len(), 1);
        assert_eq!(markets[0].yes_ask, 94);

        // The captured request must carry a verifiable signature over
        // timestamp + method + path (query string excluded).
        let requests = server.received_requests().await.unwrap();
        let request = &requests[0];
        let timestamp = request.headers.get(ACCESS_TIMESTAMP_HEADER).unwrap().to_str().unwrap();
        let signature = request.headers.get(ACCESS_SIGNATURE_HEADER).unwrap().to_str().unwrap();
        let key_id = request.headers.get(ACCESS_KEY_HEADER).unwrap().to_str().unwrap();

        assert_eq!(key_id, "test-key-id");
        let message = signing_message(timestamp, "GET", "/markets");
        verify_signature(&public_key, &message, signature).unwrap();
    }

    #[tokio::test]
    async fn test_get_open_markets_without_series_filter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/markets"))
            .and(query_param("status", "open"))
            .and(query_param_is_missing("series_ticker"))
            .respond_with(ResponseTemplate::new(200).set_body_json(markets_body()))
            .expect(1)
            .mount(&server)
            .await;

        let (client, _) = test_client(&server.uri());
        let markets = client.get_open_markets(None).await.unwrap();
        assert_eq!(markets.len(), 1);
    }

    #[tokio::test]
    async fn test_balance_converts_cents_to_dollars() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/portfolio/balance"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "balance": 10000
            })))
            .mount(&server)
            .await;

        let (client, _) = test_client(&server.uri());
        let balance = client.get_portfolio_balance().await.unwrap();
        assert_eq!(balance, dec!(100.00));
    }

    #[tokio::test]
    async fn test_upstream_error_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/portfolio/balance"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance window"))
            .mount(&server)
            .await;

        let (client, _) = test_client(&server.uri());
        let err = client.get_portfolio_balance().await.unwrap_err();
        match err {
            Error::Upstream { status, body, .. } => {
                assert_eq!(status, 503);
                assert_eq!(body, "maintenance window");
            }
            other => panic!("expected Upstream, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_order_posts_wire_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/portfolio/orders"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "order": {
                    "order_id": "ord-1",
                    "client_order_id": "token-1",
                    "ticker": "KXNFLGAME-25SEP05DENPHI-DEN",
                    "status": "resting"
                }
            })))
            .mount(&server)
            .await;

        let (client, _) = test_client(&server.uri());
        let order = OrderRequest {
            action: Action::Buy,
            side: Side::Yes,
            ticker: "KXNFLGAME-25SEP05DENPHI-DEN".to_string(),
            count: 52,
            yes_price: 95,
            client_order_id: "token-1".to_string(),
        };

        let confirmation = client.create_order(&order).await.unwrap();
        assert_eq!(confirmation.order_id, "ord-1");

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["action"], "buy");
        assert_eq!(body["side"], "yes");
        assert_eq!(body["count"], 52);
        assert_eq!(body["yes_price"], 95);
        assert_eq!(body["client_order_id"], "token-1");
    }

    #[tokio::test]
    async fn test_order_rejection_surfaces_exchange_reason() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/portfolio/orders"))
            .respond_with(ResponseTemplate::new(400).set_body_string(
                r#"{"error":{"code":"insufficient_balance"}}"#,
            ))
            .mount(&server)
            .await;

        let (client, _) = test_client(&server.uri());
        let order = OrderRequest {
            action: Action::Buy,
            side: Side::Yes,
            ticker: "KXNFLGAME-25SEP05DENPHI-DEN".to_string(),
            count: 1,
            yes_price: 95,
            client_order_id: "token-2".to_string(),
        };

        let err = client.create_order(&order).await.unwrap_err();
        assert!(err.is_order_rejection());
        assert!(err.to_string().contains("insufficient_balance"));
    }
}
