use super::BinanceConnector;
use crate::core::errors::ExchangeError;
use crate::core::kernel::{RestClient, Security};
use crate::exchanges::binance::endpoints;
use crate::exchanges::binance::requests::{
    AggTradesRequest, DepthRequest, ExchangeInfoRequest, HistoricalTradesRequest, KlinesRequest,
    RecentTradesRequest,
};
use crate::exchanges::binance::types::{AggTrade, DepthSnapshot, ExchangeInfo, Kline, Trade};
use reqwest::Method;
use tracing::instrument;

impl<R: RestClient> BinanceConnector<R> {
    /// Trading rules and symbol metadata
    #[instrument(skip(self, request), fields(exchange = "binance", operation = "get_exchange_info"))]
    pub async fn get_exchange_info(
        &self,
        request: &ExchangeInfoRequest,
    ) -> Result<ExchangeInfo, ExchangeError> {
        self.call(
            "get_exchange_info",
            Method::GET,
            endpoints::EXCHANGE_INFO,
            request,
            Security::None,
        )
        .await
    }

    /// Order book snapshot
    #[instrument(skip(self, request), fields(exchange = "binance", operation = "get_depth", symbol = %request.symbol))]
    pub async fn get_depth(&self, request: &DepthRequest) -> Result<DepthSnapshot, ExchangeError> {
        self.call(
            "get_depth",
            Method::GET,
            endpoints::DEPTH,
            request,
            Security::None,
        )
        .await
    }

    #[instrument(skip(self, request), fields(exchange = "binance", operation = "get_recent_trades", symbol = %request.symbol))]
    pub async fn get_recent_trades(
        &self,
        request: &RecentTradesRequest,
    ) -> Result<Vec<Trade>, ExchangeError> {
        self.call(
            "get_recent_trades",
            Method::GET,
            endpoints::TRADES,
            request,
            Security::None,
        )
        .await
    }

    /// Older trades; needs the API key header but no signature
    #[instrument(skip(self, request), fields(exchange = "binance", operation = "get_historical_trades", symbol = %request.symbol))]
    pub async fn get_historical_trades(
        &self,
        request: &HistoricalTradesRequest,
    ) -> Result<Vec<Trade>, ExchangeError> {
        self.call(
            "get_historical_trades",
            Method::GET,
            endpoints::HISTORICAL_TRADES,
            request,
            Security::ApiKey,
        )
        .await
    }

    #[instrument(skip(self, request), fields(exchange = "binance", operation = "get_agg_trades", symbol = %request.symbol))]
    pub async fn get_agg_trades(
        &self,
        request: &AggTradesRequest,
    ) -> Result<Vec<AggTrade>, ExchangeError> {
        self.call(
            "get_agg_trades",
            Method::GET,
            endpoints::AGG_TRADES,
            request,
            Security::None,
        )
        .await
    }

    #[instrument(skip(self, request), fields(exchange = "binance", operation = "get_klines", symbol = %request.symbol, interval = %request.interval))]
    pub async fn get_klines(&self, request: &KlinesRequest) -> Result<Vec<Kline>, ExchangeError> {
        self.call(
            "get_klines",
            Method::GET,
            endpoints::KLINES,
            request,
            Security::None,
        )
        .await
    }

    /// Klines tuned for chart display; same shape as [`Self::get_klines`]
    #[instrument(skip(self, request), fields(exchange = "binance", operation = "get_ui_klines", symbol = %request.symbol, interval = %request.interval))]
    pub async fn get_ui_klines(&self, request: &KlinesRequest) -> Result<Vec<Kline>, ExchangeError> {
        self.call(
            "get_ui_klines",
            Method::GET,
            endpoints::UI_KLINES,
            request,
            Security::None,
        )
        .await
    }
}
