pub mod codec;
pub mod connector;
pub mod converters;
pub mod endpoints;
pub mod events;
pub mod requests;
pub mod streams;
pub mod types;

use crate::core::config::ExchangeConfig;
use crate::core::errors::ExchangeError;
use crate::core::kernel::{HmacSigner, ReqwestRest, RestClientBuilder, RestClientConfig};
use std::sync::Arc;
use tracing::debug;

pub use connector::BinanceConnector;
pub use streams::{BinanceStreams, DepthSpeed};

/// Create a REST connector from `config`.
///
/// Without credentials only public endpoints work; keyed and signed calls
/// fail with [`ExchangeError::Auth`] before any request is sent.
pub fn build_connector(
    config: &ExchangeConfig,
) -> Result<BinanceConnector<ReqwestRest>, ExchangeError> {
    let rest_config = RestClientConfig::new(config.rest_base_url(), "binance".to_string())
        .with_timeout(config.timeout_seconds);

    let mut rest_builder = RestClientBuilder::new(rest_config);

    if config.has_credentials() {
        let signer = Arc::new(HmacSigner::new(
            config.api_key().to_string(),
            config.secret_key().to_string(),
        ));
        rest_builder = rest_builder.with_signer(signer);
    } else {
        debug!("No credentials configured, signed endpoints disabled");
    }

    Ok(BinanceConnector::new(rest_builder.build()?))
}

/// Create the market stream entry point from `config`
pub fn build_streams(config: &ExchangeConfig) -> BinanceStreams {
    BinanceStreams::new(config.stream_base_url())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_connector_uses_configured_host() {
        let config = ExchangeConfig::read_only().base_url("http://localhost:8080/".to_string());
        let connector = build_connector(&config).unwrap();
        assert_eq!(connector.rest().config().base_url, "http://localhost:8080");
    }

    #[test]
    fn test_build_streams_testnet() {
        let config = ExchangeConfig::read_only().testnet(true);
        let streams = build_streams(&config);
        assert_eq!(streams.manager().base_url(), "wss://testnet.binance.vision/ws/");
    }
}
