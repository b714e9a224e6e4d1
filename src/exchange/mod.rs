//! Kalshi exchange integration.
//!
//! REST connectivity for:
//! - Market data (open markets by series)
//! - Account operations (balance, order placement)
//!
//! Every request is authenticated with a fresh RSA-PSS signature over
//! `timestamp + method + path`.

mod client;
pub mod mock;
mod signer;
mod traits;
mod types;

pub use client::KalshiClient;
pub use mock::MockExchange;
pub use signer::{
    signing_message, verify_signature, AuthHeaders, RequestSigner, ACCESS_KEY_HEADER,
    ACCESS_SIGNATURE_HEADER, ACCESS_TIMESTAMP_HEADER,
};
pub use traits::ExchangeApi;
pub use types::*;
