use super::codec::{agg_trade_codec, depth_codec, kline_codec, trade_codec};
use super::endpoints::{AGG_TRADE_STREAM, DEPTH_STREAM, KLINE_STREAM, TRADE_STREAM};
use super::events::{AggTradeEvent, DepthUpdate, KlineEvent, TradeEvent};
use crate::core::errors::{ExchangeError, ValidationError};
use crate::core::kernel::{StreamManager, Subscription, WsConfig};
use crate::core::types::KlineInterval;
use tracing::instrument;

/// Push interval of the diff depth stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DepthSpeed {
    /// 1000ms
    #[default]
    Standard,
    /// 100ms
    Fast,
}

impl DepthSpeed {
    const fn suffix(self) -> &'static str {
        match self {
            Self::Standard => "",
            Self::Fast => "@100ms",
        }
    }
}

/// Typed subscriptions to the single-topic market streams
#[derive(Debug, Clone)]
pub struct BinanceStreams {
    manager: StreamManager,
}

/// `<symbol lowercased><suffix>`, the path appended to the stream host
pub fn topic(symbol: &str, suffix: &str) -> String {
    format!("{}{}", symbol.to_lowercase(), suffix)
}

fn checked_symbol(operation: &'static str, symbol: &str) -> Result<(), ExchangeError> {
    if symbol.trim().is_empty() {
        return Err(ExchangeError::Validation {
            operation,
            reason: ValidationError::MissingField("symbol"),
        });
    }
    Ok(())
}

impl BinanceStreams {
    pub fn new(stream_base_url: String) -> Self {
        Self {
            manager: StreamManager::new(stream_base_url, "binance".to_string()),
        }
    }

    pub fn with_config(mut self, config: WsConfig) -> Self {
        self.manager = self.manager.with_config(config);
        self
    }

    pub fn manager(&self) -> &StreamManager {
        &self.manager
    }

    pub fn depth_topic(symbol: &str, speed: DepthSpeed) -> String {
        topic(symbol, &format!("{}{}", DEPTH_STREAM, speed.suffix()))
    }

    pub fn agg_trade_topic(symbol: &str) -> String {
        topic(symbol, AGG_TRADE_STREAM)
    }

    pub fn trade_topic(symbol: &str) -> String {
        topic(symbol, TRADE_STREAM)
    }

    pub fn kline_topic(symbol: &str, interval: KlineInterval) -> String {
        topic(symbol, &format!("{}{}", KLINE_STREAM, interval))
    }

    /// Diff depth updates for `symbol`
    #[instrument(skip(self, handler), fields(operation = "subscribe_depth"))]
    pub async fn subscribe_depth<F>(
        &self,
        symbol: &str,
        speed: DepthSpeed,
        handler: F,
    ) -> Result<Subscription, ExchangeError>
    where
        F: FnMut(DepthUpdate) -> Result<(), ExchangeError> + Send + 'static,
    {
        checked_symbol("subscribe_depth", symbol)?;
        self.manager
            .subscribe(&Self::depth_topic(symbol, speed), depth_codec(), handler)
            .await
    }

    #[instrument(skip(self, handler), fields(operation = "subscribe_agg_trade"))]
    pub async fn subscribe_agg_trade<F>(
        &self,
        symbol: &str,
        handler: F,
    ) -> Result<Subscription, ExchangeError>
    where
        F: FnMut(AggTradeEvent) -> Result<(), ExchangeError> + Send + 'static,
    {
        checked_symbol("subscribe_agg_trade", symbol)?;
        self.manager
            .subscribe(&Self::agg_trade_topic(symbol), agg_trade_codec(), handler)
            .await
    }

    #[instrument(skip(self, handler), fields(operation = "subscribe_trade"))]
    pub async fn subscribe_trade<F>(
        &self,
        symbol: &str,
        handler: F,
    ) -> Result<Subscription, ExchangeError>
    where
        F: FnMut(TradeEvent) -> Result<(), ExchangeError> + Send + 'static,
    {
        checked_symbol("subscribe_trade", symbol)?;
        self.manager
            .subscribe(&Self::trade_topic(symbol), trade_codec(), handler)
            .await
    }

    #[instrument(skip(self, handler), fields(operation = "subscribe_kline"))]
    pub async fn subscribe_kline<F>(
        &self,
        symbol: &str,
        interval: KlineInterval,
        handler: F,
    ) -> Result<Subscription, ExchangeError>
    where
        F: FnMut(KlineEvent) -> Result<(), ExchangeError> + Send + 'static,
    {
        checked_symbol("subscribe_kline", symbol)?;
        self.manager
            .subscribe(&Self::kline_topic(symbol, interval), kline_codec(), handler)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topics() {
        assert_eq!(BinanceStreams::depth_topic("BTCUSDT", DepthSpeed::Standard), "btcusdt@depth");
        assert_eq!(BinanceStreams::depth_topic("BTCUSDT", DepthSpeed::Fast), "btcusdt@depth@100ms");
        assert_eq!(BinanceStreams::agg_trade_topic("BnbBtc"), "bnbbtc@aggTrade");
        assert_eq!(BinanceStreams::trade_topic("ETHUSDT"), "ethusdt@trade");
        assert_eq!(
            BinanceStreams::kline_topic("ETHUSDT", KlineInterval::Months1),
            "ethusdt@kline_1M"
        );
    }

    #[test]
    fn test_topic_url_appends_to_base() {
        let streams = BinanceStreams::new("wss://stream.binance.com:9443/ws/".to_string());
        let url = streams
            .manager()
            .topic_url(&BinanceStreams::depth_topic("btcusdt", DepthSpeed::Standard));
        assert_eq!(url, "wss://stream.binance.com:9443/ws/btcusdt@depth");
    }

    #[tokio::test]
    async fn test_empty_symbol_rejected_before_connecting() {
        let streams = BinanceStreams::new("ws://127.0.0.1:1/ws/".to_string());
        let err = streams
            .subscribe_trade("", |_| Ok(()))
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }
}
