use super::BinanceConnector;
use crate::core::errors::ExchangeError;
use crate::core::kernel::RestClient;
use crate::exchanges::binance::endpoints;
use crate::exchanges::binance::requests::{
    AllOcoRequest, AllOrdersRequest, CancelOcoRequest, CancelOpenOrdersRequest,
    CancelOrderRequest, CancelReplaceRequest, NewOcoRequest, NewOrderRequest, NewSorOrderRequest,
    OpenOcoRequest, OpenOrdersRequest, QueryOcoRequest, QueryOrderRequest,
};
use crate::exchanges::binance::types::{
    CancelReplaceResponse, CanceledEntry, OrderInfo, OrderList, OrderResponse, SorOrderResponse,
    TestOrderResponse,
};
use reqwest::Method;
use tracing::instrument;

/// Signed order operations. Requests without a timestamp are stamped at send time.
impl<R: RestClient> BinanceConnector<R> {
    #[instrument(skip(self, request), fields(exchange = "binance", operation = "new_order", symbol = %request.symbol))]
    pub async fn new_order(&self, request: &NewOrderRequest) -> Result<OrderResponse, ExchangeError> {
        self.signed("new_order", Method::POST, endpoints::ORDER, request)
            .await
    }

    /// Validates the order on the exchange without sending it to the matching engine
    #[instrument(skip(self, request), fields(exchange = "binance", operation = "test_new_order", symbol = %request.symbol))]
    pub async fn test_new_order(
        &self,
        request: &NewOrderRequest,
    ) -> Result<TestOrderResponse, ExchangeError> {
        self.signed("test_new_order", Method::POST, endpoints::TEST_ORDER, request)
            .await
    }

    #[instrument(skip(self, request), fields(exchange = "binance", operation = "get_order", symbol = %request.symbol))]
    pub async fn get_order(&self, request: &QueryOrderRequest) -> Result<OrderInfo, ExchangeError> {
        self.signed("get_order", Method::GET, endpoints::ORDER, request)
            .await
    }

    #[instrument(skip(self, request), fields(exchange = "binance", operation = "cancel_order", symbol = %request.symbol))]
    pub async fn cancel_order(
        &self,
        request: &CancelOrderRequest,
    ) -> Result<OrderInfo, ExchangeError> {
        self.signed("cancel_order", Method::DELETE, endpoints::ORDER, request)
            .await
    }

    /// Cancels every open order on the symbol, order lists included
    #[instrument(skip(self, request), fields(exchange = "binance", operation = "cancel_open_orders", symbol = %request.symbol))]
    pub async fn cancel_open_orders(
        &self,
        request: &CancelOpenOrdersRequest,
    ) -> Result<Vec<CanceledEntry>, ExchangeError> {
        self.signed(
            "cancel_open_orders",
            Method::DELETE,
            endpoints::OPEN_ORDERS,
            request,
        )
        .await
    }

    #[instrument(skip(self, request), fields(exchange = "binance", operation = "get_open_orders"))]
    pub async fn get_open_orders(
        &self,
        request: &OpenOrdersRequest,
    ) -> Result<Vec<OrderInfo>, ExchangeError> {
        self.signed("get_open_orders", Method::GET, endpoints::OPEN_ORDERS, request)
            .await
    }

    #[instrument(skip(self, request), fields(exchange = "binance", operation = "get_all_orders", symbol = %request.symbol))]
    pub async fn get_all_orders(
        &self,
        request: &AllOrdersRequest,
    ) -> Result<Vec<OrderInfo>, ExchangeError> {
        self.signed("get_all_orders", Method::GET, endpoints::ALL_ORDERS, request)
            .await
    }

    /// Cancel an order and place a new one in a single call.
    ///
    /// A partial failure comes back as an `Api` error whose body holds both
    /// the cancel and the new-order outcome.
    #[instrument(skip(self, request), fields(exchange = "binance", operation = "cancel_replace", symbol = %request.symbol))]
    pub async fn cancel_replace(
        &self,
        request: &CancelReplaceRequest,
    ) -> Result<CancelReplaceResponse, ExchangeError> {
        self.signed(
            "cancel_replace",
            Method::POST,
            endpoints::CANCEL_REPLACE,
            request,
        )
        .await
    }

    #[instrument(skip(self, request), fields(exchange = "binance", operation = "new_oco", symbol = %request.symbol))]
    pub async fn new_oco(&self, request: &NewOcoRequest) -> Result<OrderList, ExchangeError> {
        self.signed("new_oco", Method::POST, endpoints::OCO, request)
            .await
    }

    #[instrument(skip(self, request), fields(exchange = "binance", operation = "cancel_oco", symbol = %request.symbol))]
    pub async fn cancel_oco(&self, request: &CancelOcoRequest) -> Result<OrderList, ExchangeError> {
        self.signed("cancel_oco", Method::DELETE, endpoints::ORDER_LIST, request)
            .await
    }

    #[instrument(skip(self, request), fields(exchange = "binance", operation = "get_oco"))]
    pub async fn get_oco(&self, request: &QueryOcoRequest) -> Result<OrderList, ExchangeError> {
        self.signed("get_oco", Method::GET, endpoints::ORDER_LIST, request)
            .await
    }

    #[instrument(skip(self, request), fields(exchange = "binance", operation = "get_all_oco"))]
    pub async fn get_all_oco(&self, request: &AllOcoRequest) -> Result<Vec<OrderList>, ExchangeError> {
        self.signed("get_all_oco", Method::GET, endpoints::ALL_ORDER_LIST, request)
            .await
    }

    #[instrument(skip(self, request), fields(exchange = "binance", operation = "get_open_oco"))]
    pub async fn get_open_oco(
        &self,
        request: &OpenOcoRequest,
    ) -> Result<Vec<OrderList>, ExchangeError> {
        self.signed("get_open_oco", Method::GET, endpoints::OPEN_ORDER_LIST, request)
            .await
    }

    #[instrument(skip(self, request), fields(exchange = "binance", operation = "new_sor_order", symbol = %request.symbol))]
    pub async fn new_sor_order(
        &self,
        request: &NewSorOrderRequest,
    ) -> Result<SorOrderResponse, ExchangeError> {
        self.signed("new_sor_order", Method::POST, endpoints::SOR_ORDER, request)
            .await
    }

    #[instrument(skip(self, request), fields(exchange = "binance", operation = "test_new_sor_order", symbol = %request.symbol))]
    pub async fn test_new_sor_order(
        &self,
        request: &NewSorOrderRequest,
    ) -> Result<TestOrderResponse, ExchangeError> {
        self.signed(
            "test_new_sor_order",
            Method::POST,
            endpoints::TEST_SOR_ORDER,
            request,
        )
        .await
    }
}
