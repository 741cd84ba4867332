//! Exchange-agnostic transport kernel
//!
//! Everything in here is pure plumbing: it knows how to encode a query, sign
//! it, send it over HTTP and hold a WebSocket open, but nothing about which
//! endpoints or topics exist.
//!
//! ## REST
//! ```rust,no_run
//! use spotlink::core::kernel::*;
//! use reqwest::Method;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), spotlink::ExchangeError> {
//! let config = RestClientConfig::new("https://api.binance.com".to_string(), "binance".to_string());
//! let rest = RestClientBuilder::new(config)
//!     .with_signer(Arc::new(HmacSigner::new("api_key".to_string(), "secret".to_string())))
//!     .build()?;
//!
//! let query = QueryBuilder::new().required("symbol", "BTCUSDT").build();
//! let depth: serde_json::Value = rest
//!     .execute_json(RequestSpec::new(Method::GET, "/api/v3/depth", query, Security::None))
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Streams
//! A [`StreamManager`] opens one socket per topic; the [`WsCodec`] handed to
//! `subscribe` turns each frame into a typed event for the handler, and the
//! returned [`Subscription`] is the cancellation handle.
pub mod codec;
pub mod params;
pub mod rest;
pub mod signer;
pub mod ws;

pub use codec::{frame_payload, WsCodec};
pub use params::{QueryBuilder, ToQuery};
pub use rest::{ReqwestRest, RequestSpec, RestClient, RestClientBuilder, RestClientConfig, Security};
pub use signer::{sign, HmacSigner, Signer, API_KEY_HEADER, SIGNATURE_PARAM};
pub use ws::{StreamManager, StreamState, Subscription, WsConfig};
