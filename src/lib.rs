//! Binance spot REST and market-stream client.
//!
//! The crate is split in two layers. [`core`] is exchange-agnostic plumbing:
//! errors, configuration, the HMAC signer, the ordered query encoder, the
//! REST executor and the per-topic stream manager. [`exchanges::binance`]
//! puts endpoints, typed requests, responses and stream events on top.
//!
//! ```rust,no_run
//! use spotlink::exchanges::binance::{self, requests::DepthRequest};
//! use spotlink::ExchangeConfig;
//!
//! # async fn example() -> Result<(), spotlink::ExchangeError> {
//! let connector = binance::build_connector(&ExchangeConfig::read_only())?;
//! let depth = connector.get_depth(&DepthRequest::new("BTCUSDT").with_limit(5)).await?;
//! println!("best bid: {:?}", depth.bids.first());
//! # Ok(())
//! # }
//! ```
pub mod core;
pub mod exchanges;

pub use crate::core::config::ExchangeConfig;
pub use crate::core::errors::{ExchangeError, ValidationError};
pub use crate::core::types::*;
pub use crate::exchanges::binance::{BinanceConnector, BinanceStreams};
