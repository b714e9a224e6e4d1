//! Unified error types for the harvester.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the harvester.
///
/// Read-path failures (`Upstream` on markets/balance, `Http`, `Json`)
/// abort the run. Write-path failures are caught per order by the
/// executor and counted instead of propagated.
#[derive(Error, Debug)]
pub enum Error {
    /// Required credential or setting is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Non-success HTTP response from the exchange.
    ///
    /// Carries the response body so order rejections and API errors stay
    /// diagnosable from the logs alone.
    #[error("upstream error: {method} {path} returned {status}: {body}")]
    Upstream {
        method: &'static str,
        path: String,
        status: u16,
        body: String,
    },

    /// Private key could not be parsed or a signature could not be produced.
    #[error("signing error: {0}")]
    Signing(String),

    /// Transport-level HTTP failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be decoded.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for errors produced by the order-submission path, which the
    /// executor isolates per order.
    pub fn is_order_rejection(&self) -> bool {
        matches!(
            self,
            Error::Upstream { method: "POST", .. }
        )
    }
}
