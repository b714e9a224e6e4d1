//! # Gameday Harvester
//!
//! A Rust application for harvesting settlement premium on Kalshi sports
//! markets: buy deep-favorite "yes" contracts in markets that settle on
//! the current trading day and collect the spread to $1 at expiration.
//!
//! ## Architecture
//!
//! - `config`: Configuration management and validation
//! - `error`: Error taxonomy shared across the crate
//! - `exchange`: Signed Kalshi REST client (RSA-PSS request authentication)
//! - `strategy`: Eligibility filtering, fee-aware allocation, order execution
//! - `utils`: Shared decimal arithmetic helpers

pub mod config;
pub mod error;
pub mod exchange;
pub mod strategy;
pub mod utils;

pub use config::Config;
pub use error::{Error, Result};
