//! One request type per endpoint.
//!
//! Each type owns two pure functions: [`Validate::validate`], which rejects a
//! malformed value before anything touches the network, and
//! [`ToQuery::to_query`], which renders the fields in declaration order. That
//! order is what gets signed, so do not reorder pushes casually.

use crate::core::errors::ValidationError;
use crate::core::kernel::{QueryBuilder, ToQuery};
use crate::core::types::{
    CancelReplaceMode, CancelRestrictions, KlineInterval, OrderResponseType, OrderSide, OrderType,
    SelfTradePreventionMode, TimeInForce,
};
use rust_decimal::Decimal;

pub const MAX_RECV_WINDOW: u64 = 60_000;
pub const MAX_DEPTH_LIMIT: u32 = 5_000;
pub const MAX_LIMIT: u32 = 1_000;
pub const MIN_STRATEGY_TYPE: u32 = 1_000_000;
const MAX_ALL_ORDERS_SPAN_MS: u64 = 24 * 60 * 60 * 1_000;

/// Structural checks run before a request is encoded
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Requests carrying a `timestamp` that may be left for the client to fill in
pub trait Timestamped {
    fn timestamp_mut(&mut self) -> &mut Option<u64>;

    /// Fill the timestamp from `now` unless the caller already set one
    fn stamp_with(&mut self, now: impl FnOnce() -> u64) {
        self.timestamp_mut().get_or_insert_with(now);
    }
}

macro_rules! timestamped {
    ($($request:ty),+ $(,)?) => {
        $(
            impl Timestamped for $request {
                fn timestamp_mut(&mut self) -> &mut Option<u64> {
                    &mut self.timestamp
                }
            }
        )+
    };
}

fn require_symbol(symbol: &str) -> Result<(), ValidationError> {
    if symbol.trim().is_empty() {
        return Err(ValidationError::MissingField("symbol"));
    }
    Ok(())
}

fn require<T>(field: &'static str, value: Option<&T>) -> Result<(), ValidationError> {
    value.map(|_| ()).ok_or(ValidationError::MissingField(field))
}

fn check_timing(recv_window: Option<u64>, timestamp: Option<u64>) -> Result<(), ValidationError> {
    if recv_window.is_some_and(|window| window > MAX_RECV_WINDOW) {
        return Err(ValidationError::OutOfRange {
            field: "recvWindow",
            rule: "at most 60000",
        });
    }
    if timestamp == Some(0) {
        return Err(ValidationError::OutOfRange {
            field: "timestamp",
            rule: "greater than 0",
        });
    }
    Ok(())
}

fn check_limit(limit: Option<u32>, max: u32, rule: &'static str) -> Result<(), ValidationError> {
    match limit {
        Some(0) => Err(ValidationError::OutOfRange {
            field: "limit",
            rule: "greater than 0",
        }),
        Some(limit) if limit > max => Err(ValidationError::OutOfRange {
            field: "limit",
            rule,
        }),
        _ => Ok(()),
    }
}

fn check_time_range(start: Option<u64>, end: Option<u64>) -> Result<(), ValidationError> {
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(ValidationError::Rule("startTime must not be after endTime"));
        }
    }
    Ok(())
}

fn check_positive(field: &'static str, value: Option<Decimal>) -> Result<(), ValidationError> {
    if value.is_some_and(|v| v <= Decimal::ZERO) {
        return Err(ValidationError::OutOfRange {
            field,
            rule: "greater than 0",
        });
    }
    Ok(())
}

fn check_strategy_type(strategy_type: Option<u32>) -> Result<(), ValidationError> {
    if strategy_type.is_some_and(|t| t < MIN_STRATEGY_TYPE) {
        return Err(ValidationError::OutOfRange {
            field: "strategyType",
            rule: "at least 1000000",
        });
    }
    Ok(())
}

/// Fields every order placement shares, checked against the order type's
/// mandatory set.
struct OrderShape {
    order_type: OrderType,
    time_in_force: Option<TimeInForce>,
    quantity: Option<Decimal>,
    quote_order_qty: Option<Decimal>,
    price: Option<Decimal>,
    stop_price: Option<Decimal>,
    trailing_delta: Option<u64>,
    iceberg_qty: Option<Decimal>,
}

impl OrderShape {
    fn validate(&self) -> Result<(), ValidationError> {
        check_positive("quantity", self.quantity)?;
        check_positive("quoteOrderQty", self.quote_order_qty)?;
        check_positive("price", self.price)?;
        check_positive("stopPrice", self.stop_price)?;
        check_positive("icebergQty", self.iceberg_qty)?;
        if self.trailing_delta == Some(0) {
            return Err(ValidationError::OutOfRange {
                field: "trailingDelta",
                rule: "greater than 0",
            });
        }

        let has_trigger = self.stop_price.is_some() || self.trailing_delta.is_some();

        match self.order_type {
            OrderType::Limit => {
                require("timeInForce", self.time_in_force.as_ref())?;
                require("quantity", self.quantity.as_ref())?;
                require("price", self.price.as_ref())?;
            }
            OrderType::Market => match (self.quantity, self.quote_order_qty) {
                (None, None) => return Err(ValidationError::MissingField("quantity")),
                (Some(_), Some(_)) => {
                    return Err(ValidationError::Rule(
                        "MARKET orders take quantity or quoteOrderQty, not both",
                    ))
                }
                _ => {}
            },
            OrderType::StopLoss | OrderType::TakeProfit => {
                require("quantity", self.quantity.as_ref())?;
                if !has_trigger {
                    return Err(ValidationError::MissingField("stopPrice"));
                }
            }
            OrderType::StopLossLimit | OrderType::TakeProfitLimit => {
                require("timeInForce", self.time_in_force.as_ref())?;
                require("quantity", self.quantity.as_ref())?;
                require("price", self.price.as_ref())?;
                if !has_trigger {
                    return Err(ValidationError::MissingField("stopPrice"));
                }
            }
            OrderType::LimitMaker => {
                require("quantity", self.quantity.as_ref())?;
                require("price", self.price.as_ref())?;
            }
        }

        if self.iceberg_qty.is_some()
            && !matches!(
                self.order_type,
                OrderType::Limit
                    | OrderType::LimitMaker
                    | OrderType::StopLossLimit
                    | OrderType::TakeProfitLimit
            )
        {
            return Err(ValidationError::Rule("icebergQty is only valid on limit orders"));
        }
        if self.quote_order_qty.is_some() && self.order_type != OrderType::Market {
            return Err(ValidationError::Rule("quoteOrderQty is only valid on MARKET orders"));
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Market data
// ----------------------------------------------------------------------------

/// `GET /api/v3/exchangeInfo`. The default value asks for everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExchangeInfoRequest {
    pub symbol: Option<String>,
    pub symbols: Vec<String>,
}

impl ExchangeInfoRequest {
    pub fn for_symbol(symbol: impl Into<String>) -> Self {
        Self {
            symbol: Some(symbol.into()),
            symbols: Vec::new(),
        }
    }

    pub fn for_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            symbol: None,
            symbols: symbols.into_iter().map(Into::into).collect(),
        }
    }
}

impl Validate for ExchangeInfoRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.symbol.is_some() && !self.symbols.is_empty() {
            return Err(ValidationError::Rule("symbol and symbols are mutually exclusive"));
        }
        if let Some(symbol) = &self.symbol {
            require_symbol(symbol)?;
        }
        for symbol in &self.symbols {
            require_symbol(symbol)?;
        }
        Ok(())
    }
}

impl ToQuery for ExchangeInfoRequest {
    fn to_query(&self) -> String {
        let symbols = (!self.symbols.is_empty()).then(|| {
            let quoted: Vec<String> = self.symbols.iter().map(|s| format!("\"{}\"", s)).collect();
            format!("[{}]", quoted.join(","))
        });
        QueryBuilder::new()
            .optional("symbol", self.symbol.as_deref())
            .optional("symbols", symbols)
            .build()
    }
}

/// `GET /api/v3/depth`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepthRequest {
    pub symbol: String,
    pub limit: Option<u32>,
}

impl DepthRequest {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl Validate for DepthRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require_symbol(&self.symbol)?;
        check_limit(self.limit, MAX_DEPTH_LIMIT, "at most 5000")
    }
}

impl ToQuery for DepthRequest {
    fn to_query(&self) -> String {
        QueryBuilder::new()
            .required("symbol", &self.symbol)
            .optional("limit", self.limit)
            .build()
    }
}

/// `GET /api/v3/trades`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecentTradesRequest {
    pub symbol: String,
    pub limit: Option<u32>,
}

impl RecentTradesRequest {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            limit: None,
        }
    }
}

impl Validate for RecentTradesRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require_symbol(&self.symbol)?;
        check_limit(self.limit, MAX_LIMIT, "at most 1000")
    }
}

impl ToQuery for RecentTradesRequest {
    fn to_query(&self) -> String {
        QueryBuilder::new()
            .required("symbol", &self.symbol)
            .optional("limit", self.limit)
            .build()
    }
}

/// `GET /api/v3/historicalTrades`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoricalTradesRequest {
    pub symbol: String,
    pub limit: Option<u32>,
    pub from_id: Option<u64>,
}

impl HistoricalTradesRequest {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }
}

impl Validate for HistoricalTradesRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require_symbol(&self.symbol)?;
        check_limit(self.limit, MAX_LIMIT, "at most 1000")
    }
}

impl ToQuery for HistoricalTradesRequest {
    fn to_query(&self) -> String {
        QueryBuilder::new()
            .required("symbol", &self.symbol)
            .optional("limit", self.limit)
            .optional("fromId", self.from_id)
            .build()
    }
}

/// `GET /api/v3/aggTrades`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggTradesRequest {
    pub symbol: String,
    pub from_id: Option<u64>,
    pub start_time: Option<u64>,
    pub end_time: Option<u64>,
    pub limit: Option<u32>,
}

impl AggTradesRequest {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }
}

impl Validate for AggTradesRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require_symbol(&self.symbol)?;
        check_limit(self.limit, MAX_LIMIT, "at most 1000")?;
        check_time_range(self.start_time, self.end_time)?;
        if self.from_id.is_some() && (self.start_time.is_some() || self.end_time.is_some()) {
            return Err(ValidationError::Rule(
                "fromId cannot be combined with startTime/endTime",
            ));
        }
        Ok(())
    }
}

impl ToQuery for AggTradesRequest {
    fn to_query(&self) -> String {
        QueryBuilder::new()
            .required("symbol", &self.symbol)
            .optional("fromId", self.from_id)
            .optional("startTime", self.start_time)
            .optional("endTime", self.end_time)
            .optional("limit", self.limit)
            .build()
    }
}

/// `GET /api/v3/klines` and `GET /api/v3/uiKlines`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KlinesRequest {
    pub symbol: String,
    pub interval: KlineInterval,
    pub start_time: Option<u64>,
    pub end_time: Option<u64>,
    pub time_zone: Option<String>,
    pub limit: Option<u32>,
}

impl KlinesRequest {
    pub fn new(symbol: impl Into<String>, interval: KlineInterval) -> Self {
        Self {
            symbol: symbol.into(),
            interval,
            start_time: None,
            end_time: None,
            time_zone: None,
            limit: None,
        }
    }
}

impl Validate for KlinesRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require_symbol(&self.symbol)?;
        check_limit(self.limit, MAX_LIMIT, "at most 1000")?;
        check_time_range(self.start_time, self.end_time)
    }
}

impl ToQuery for KlinesRequest {
    fn to_query(&self) -> String {
        QueryBuilder::new()
            .required("symbol", &self.symbol)
            .required("interval", self.interval)
            .optional("startTime", self.start_time)
            .optional("endTime", self.end_time)
            .optional("timeZone", self.time_zone.as_deref())
            .optional("limit", self.limit)
            .build()
    }
}

// ----------------------------------------------------------------------------
// Orders
// ----------------------------------------------------------------------------

/// `POST /api/v3/order` and `POST /api/v3/order/test`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderRequest {
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub time_in_force: Option<TimeInForce>,
    pub quantity: Option<Decimal>,
    pub quote_order_qty: Option<Decimal>,
    pub price: Option<Decimal>,
    pub new_client_order_id: Option<String>,
    pub stop_price: Option<Decimal>,
    pub iceberg_qty: Option<Decimal>,
    pub new_order_resp_type: Option<OrderResponseType>,
    pub recv_window: Option<u64>,
    pub timestamp: Option<u64>,
    pub strategy_id: Option<u64>,
    pub strategy_type: Option<u32>,
    pub trailing_delta: Option<u64>,
    pub self_trade_prevention_mode: Option<SelfTradePreventionMode>,
}

impl NewOrderRequest {
    pub fn new(symbol: impl Into<String>, side: OrderSide, order_type: OrderType) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type,
            time_in_force: None,
            quantity: None,
            quote_order_qty: None,
            price: None,
            new_client_order_id: None,
            stop_price: None,
            iceberg_qty: None,
            new_order_resp_type: None,
            recv_window: None,
            timestamp: None,
            strategy_id: None,
            strategy_type: None,
            trailing_delta: None,
            self_trade_prevention_mode: None,
        }
    }

    pub fn limit(
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: Decimal,
        price: Decimal,
        time_in_force: TimeInForce,
    ) -> Self {
        Self {
            time_in_force: Some(time_in_force),
            quantity: Some(quantity),
            price: Some(price),
            ..Self::new(symbol, side, OrderType::Limit)
        }
    }

    pub fn market(symbol: impl Into<String>, side: OrderSide, quantity: Decimal) -> Self {
        Self {
            quantity: Some(quantity),
            ..Self::new(symbol, side, OrderType::Market)
        }
    }

    fn shape(&self) -> OrderShape {
        OrderShape {
            order_type: self.order_type,
            time_in_force: self.time_in_force,
            quantity: self.quantity,
            quote_order_qty: self.quote_order_qty,
            price: self.price,
            stop_price: self.stop_price,
            trailing_delta: self.trailing_delta,
            iceberg_qty: self.iceberg_qty,
        }
    }
}

impl Validate for NewOrderRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require_symbol(&self.symbol)?;
        check_timing(self.recv_window, self.timestamp)?;
        check_strategy_type(self.strategy_type)?;
        self.shape().validate()
    }
}

impl ToQuery for NewOrderRequest {
    fn to_query(&self) -> String {
        QueryBuilder::new()
            .required("symbol", &self.symbol)
            .required("side", self.side)
            .required("type", self.order_type)
            .optional("timeInForce", self.time_in_force)
            .optional("quantity", self.quantity)
            .optional("quoteOrderQty", self.quote_order_qty)
            .optional("price", self.price)
            .optional("newClientOrderId", self.new_client_order_id.as_deref())
            .optional("stopPrice", self.stop_price)
            .optional("icebergQty", self.iceberg_qty)
            .optional("newOrderRespType", self.new_order_resp_type)
            .optional("recvWindow", self.recv_window)
            .optional("timestamp", self.timestamp)
            .optional("strategyId", self.strategy_id)
            .optional("strategyType", self.strategy_type)
            .optional("trailingDelta", self.trailing_delta)
            .optional("selfTradePreventionMode", self.self_trade_prevention_mode)
            .build()
    }
}

/// Identifies one order by exchange id or client id
fn require_order_ref(
    order_id: Option<u64>,
    client_id: Option<&str>,
    rule: &'static str,
) -> Result<(), ValidationError> {
    let has_client_id = client_id.is_some_and(|id| !id.is_empty());
    if order_id.is_none() && !has_client_id {
        return Err(ValidationError::Rule(rule));
    }
    Ok(())
}

/// `GET /api/v3/order`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOrderRequest {
    pub symbol: String,
    pub order_id: Option<u64>,
    pub orig_client_order_id: Option<String>,
    pub recv_window: Option<u64>,
    pub timestamp: Option<u64>,
}

impl QueryOrderRequest {
    pub fn by_id(symbol: impl Into<String>, order_id: u64) -> Self {
        Self {
            symbol: symbol.into(),
            order_id: Some(order_id),
            ..Self::default()
        }
    }

    pub fn by_client_id(symbol: impl Into<String>, client_order_id: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            orig_client_order_id: Some(client_order_id.into()),
            ..Self::default()
        }
    }
}

impl Validate for QueryOrderRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require_symbol(&self.symbol)?;
        check_timing(self.recv_window, self.timestamp)?;
        require_order_ref(
            self.order_id,
            self.orig_client_order_id.as_deref(),
            "orderId or origClientOrderId is required",
        )
    }
}

impl ToQuery for QueryOrderRequest {
    fn to_query(&self) -> String {
        QueryBuilder::new()
            .required("symbol", &self.symbol)
            .optional("orderId", self.order_id)
            .optional("origClientOrderId", self.orig_client_order_id.as_deref())
            .optional("recvWindow", self.recv_window)
            .optional("timestamp", self.timestamp)
            .build()
    }
}

/// `DELETE /api/v3/order`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CancelOrderRequest {
    pub symbol: String,
    pub order_id: Option<u64>,
    pub orig_client_order_id: Option<String>,
    pub new_client_order_id: Option<String>,
    pub cancel_restrictions: Option<CancelRestrictions>,
    pub recv_window: Option<u64>,
    pub timestamp: Option<u64>,
}

impl CancelOrderRequest {
    pub fn by_id(symbol: impl Into<String>, order_id: u64) -> Self {
        Self {
            symbol: symbol.into(),
            order_id: Some(order_id),
            ..Self::default()
        }
    }

    pub fn by_client_id(symbol: impl Into<String>, client_order_id: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            orig_client_order_id: Some(client_order_id.into()),
            ..Self::default()
        }
    }
}

impl Validate for CancelOrderRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require_symbol(&self.symbol)?;
        check_timing(self.recv_window, self.timestamp)?;
        require_order_ref(
            self.order_id,
            self.orig_client_order_id.as_deref(),
            "orderId or origClientOrderId is required",
        )
    }
}

impl ToQuery for CancelOrderRequest {
    fn to_query(&self) -> String {
        QueryBuilder::new()
            .required("symbol", &self.symbol)
            .optional("orderId", self.order_id)
            .optional("origClientOrderId", self.orig_client_order_id.as_deref())
            .optional("newClientOrderId", self.new_client_order_id.as_deref())
            .optional("cancelRestrictions", self.cancel_restrictions)
            .optional("recvWindow", self.recv_window)
            .optional("timestamp", self.timestamp)
            .build()
    }
}

/// `DELETE /api/v3/openOrders`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CancelOpenOrdersRequest {
    pub symbol: String,
    pub recv_window: Option<u64>,
    pub timestamp: Option<u64>,
}

impl CancelOpenOrdersRequest {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }
}

impl Validate for CancelOpenOrdersRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require_symbol(&self.symbol)?;
        check_timing(self.recv_window, self.timestamp)
    }
}

impl ToQuery for CancelOpenOrdersRequest {
    fn to_query(&self) -> String {
        QueryBuilder::new()
            .required("symbol", &self.symbol)
            .optional("recvWindow", self.recv_window)
            .optional("timestamp", self.timestamp)
            .build()
    }
}

/// `GET /api/v3/openOrders`; no symbol means every symbol
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenOrdersRequest {
    pub symbol: Option<String>,
    pub recv_window: Option<u64>,
    pub timestamp: Option<u64>,
}

impl OpenOrdersRequest {
    pub fn for_symbol(symbol: impl Into<String>) -> Self {
        Self {
            symbol: Some(symbol.into()),
            ..Self::default()
        }
    }
}

impl Validate for OpenOrdersRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(symbol) = &self.symbol {
            require_symbol(symbol)?;
        }
        check_timing(self.recv_window, self.timestamp)
    }
}

impl ToQuery for OpenOrdersRequest {
    fn to_query(&self) -> String {
        QueryBuilder::new()
            .optional("symbol", self.symbol.as_deref())
            .optional("recvWindow", self.recv_window)
            .optional("timestamp", self.timestamp)
            .build()
    }
}

/// `GET /api/v3/allOrders`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllOrdersRequest {
    pub symbol: String,
    pub order_id: Option<u64>,
    pub start_time: Option<u64>,
    pub end_time: Option<u64>,
    pub limit: Option<u32>,
    pub recv_window: Option<u64>,
    pub timestamp: Option<u64>,
}

impl AllOrdersRequest {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }
}

impl Validate for AllOrdersRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require_symbol(&self.symbol)?;
        check_timing(self.recv_window, self.timestamp)?;
        check_limit(self.limit, MAX_LIMIT, "at most 1000")?;
        check_time_range(self.start_time, self.end_time)?;
        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            if end - start > MAX_ALL_ORDERS_SPAN_MS {
                return Err(ValidationError::Rule(
                    "startTime and endTime can be at most 24 hours apart",
                ));
            }
        }
        Ok(())
    }
}

impl ToQuery for AllOrdersRequest {
    fn to_query(&self) -> String {
        QueryBuilder::new()
            .required("symbol", &self.symbol)
            .optional("orderId", self.order_id)
            .optional("startTime", self.start_time)
            .optional("endTime", self.end_time)
            .optional("limit", self.limit)
            .optional("recvWindow", self.recv_window)
            .optional("timestamp", self.timestamp)
            .build()
    }
}

/// `POST /api/v3/order/cancelReplace`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelReplaceRequest {
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub cancel_replace_mode: CancelReplaceMode,
    pub time_in_force: Option<TimeInForce>,
    pub quantity: Option<Decimal>,
    pub quote_order_qty: Option<Decimal>,
    pub price: Option<Decimal>,
    pub cancel_new_client_order_id: Option<String>,
    pub cancel_orig_client_order_id: Option<String>,
    pub cancel_order_id: Option<u64>,
    pub new_client_order_id: Option<String>,
    pub strategy_id: Option<u64>,
    pub strategy_type: Option<u32>,
    pub stop_price: Option<Decimal>,
    pub trailing_delta: Option<u64>,
    pub iceberg_qty: Option<Decimal>,
    pub new_order_resp_type: Option<OrderResponseType>,
    pub self_trade_prevention_mode: Option<SelfTradePreventionMode>,
    pub cancel_restrictions: Option<CancelRestrictions>,
    pub recv_window: Option<u64>,
    pub timestamp: Option<u64>,
}

impl CancelReplaceRequest {
    pub fn new(
        symbol: impl Into<String>,
        side: OrderSide,
        order_type: OrderType,
        cancel_replace_mode: CancelReplaceMode,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type,
            cancel_replace_mode,
            time_in_force: None,
            quantity: None,
            quote_order_qty: None,
            price: None,
            cancel_new_client_order_id: None,
            cancel_orig_client_order_id: None,
            cancel_order_id: None,
            new_client_order_id: None,
            strategy_id: None,
            strategy_type: None,
            stop_price: None,
            trailing_delta: None,
            iceberg_qty: None,
            new_order_resp_type: None,
            self_trade_prevention_mode: None,
            cancel_restrictions: None,
            recv_window: None,
            timestamp: None,
        }
    }
}

impl Validate for CancelReplaceRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require_symbol(&self.symbol)?;
        check_timing(self.recv_window, self.timestamp)?;
        check_strategy_type(self.strategy_type)?;
        require_order_ref(
            self.cancel_order_id,
            self.cancel_orig_client_order_id.as_deref(),
            "cancelOrderId or cancelOrigClientOrderId is required",
        )?;
        OrderShape {
            order_type: self.order_type,
            time_in_force: self.time_in_force,
            quantity: self.quantity,
            quote_order_qty: self.quote_order_qty,
            price: self.price,
            stop_price: self.stop_price,
            trailing_delta: self.trailing_delta,
            iceberg_qty: self.iceberg_qty,
        }
        .validate()
    }
}

impl ToQuery for CancelReplaceRequest {
    fn to_query(&self) -> String {
        QueryBuilder::new()
            .required("symbol", &self.symbol)
            .required("side", self.side)
            .required("type", self.order_type)
            .required("cancelReplaceMode", self.cancel_replace_mode)
            .optional("timeInForce", self.time_in_force)
            .optional("quantity", self.quantity)
            .optional("quoteOrderQty", self.quote_order_qty)
            .optional("price", self.price)
            .optional("cancelNewClientOrderId", self.cancel_new_client_order_id.as_deref())
            .optional("cancelOrigClientOrderId", self.cancel_orig_client_order_id.as_deref())
            .optional("cancelOrderId", self.cancel_order_id)
            .optional("newClientOrderId", self.new_client_order_id.as_deref())
            .optional("strategyId", self.strategy_id)
            .optional("strategyType", self.strategy_type)
            .optional("stopPrice", self.stop_price)
            .optional("trailingDelta", self.trailing_delta)
            .optional("icebergQty", self.iceberg_qty)
            .optional("newOrderRespType", self.new_order_resp_type)
            .optional("selfTradePreventionMode", self.self_trade_prevention_mode)
            .optional("cancelRestrictions", self.cancel_restrictions)
            .optional("recvWindow", self.recv_window)
            .optional("timestamp", self.timestamp)
            .build()
    }
}

// ----------------------------------------------------------------------------
// Order lists (OCO)
// ----------------------------------------------------------------------------

/// `POST /api/v3/order/oco`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOcoRequest {
    pub symbol: String,
    pub list_client_order_id: Option<String>,
    pub side: OrderSide,
    pub quantity: Decimal,
    pub limit_client_order_id: Option<String>,
    pub price: Decimal,
    pub limit_iceberg_qty: Option<Decimal>,
    pub trailing_delta: Option<u64>,
    pub stop_client_order_id: Option<String>,
    pub stop_price: Decimal,
    pub stop_limit_price: Option<Decimal>,
    pub stop_iceberg_qty: Option<Decimal>,
    pub stop_limit_time_in_force: Option<TimeInForce>,
    pub new_order_resp_type: Option<OrderResponseType>,
    pub self_trade_prevention_mode: Option<SelfTradePreventionMode>,
    pub recv_window: Option<u64>,
    pub timestamp: Option<u64>,
}

impl NewOcoRequest {
    pub fn new(
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: Decimal,
        price: Decimal,
        stop_price: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            list_client_order_id: None,
            side,
            quantity,
            limit_client_order_id: None,
            price,
            limit_iceberg_qty: None,
            trailing_delta: None,
            stop_client_order_id: None,
            stop_price,
            stop_limit_price: None,
            stop_iceberg_qty: None,
            stop_limit_time_in_force: None,
            new_order_resp_type: None,
            self_trade_prevention_mode: None,
            recv_window: None,
            timestamp: None,
        }
    }

    /// Turn the stop leg into a stop-limit order
    pub fn with_stop_limit(mut self, stop_limit_price: Decimal, time_in_force: TimeInForce) -> Self {
        self.stop_limit_price = Some(stop_limit_price);
        self.stop_limit_time_in_force = Some(time_in_force);
        self
    }
}

impl Validate for NewOcoRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require_symbol(&self.symbol)?;
        check_timing(self.recv_window, self.timestamp)?;
        check_positive("quantity", Some(self.quantity))?;
        check_positive("price", Some(self.price))?;
        check_positive("stopPrice", Some(self.stop_price))?;
        check_positive("stopLimitPrice", self.stop_limit_price)?;
        check_positive("limitIcebergQty", self.limit_iceberg_qty)?;
        check_positive("stopIcebergQty", self.stop_iceberg_qty)?;

        match self.side {
            OrderSide::Sell if self.price <= self.stop_price => {
                return Err(ValidationError::Rule(
                    "SELL OCO requires limit price above stop price",
                ))
            }
            OrderSide::Buy if self.price >= self.stop_price => {
                return Err(ValidationError::Rule(
                    "BUY OCO requires limit price below stop price",
                ))
            }
            _ => {}
        }

        match (self.stop_limit_price, self.stop_limit_time_in_force) {
            (Some(_), None) => Err(ValidationError::MissingField("stopLimitTimeInForce")),
            (None, Some(_)) => Err(ValidationError::MissingField("stopLimitPrice")),
            _ => Ok(()),
        }
    }
}

impl ToQuery for NewOcoRequest {
    fn to_query(&self) -> String {
        QueryBuilder::new()
            .required("symbol", &self.symbol)
            .optional("listClientOrderId", self.list_client_order_id.as_deref())
            .required("side", self.side)
            .required("quantity", self.quantity)
            .optional("limitClientOrderId", self.limit_client_order_id.as_deref())
            .required("price", self.price)
            .optional("limitIcebergQty", self.limit_iceberg_qty)
            .optional("trailingDelta", self.trailing_delta)
            .optional("stopClientOrderId", self.stop_client_order_id.as_deref())
            .required("stopPrice", self.stop_price)
            .optional("stopLimitPrice", self.stop_limit_price)
            .optional("stopIcebergQty", self.stop_iceberg_qty)
            .optional("stopLimitTimeInForce", self.stop_limit_time_in_force)
            .optional("newOrderRespType", self.new_order_resp_type)
            .optional("selfTradePreventionMode", self.self_trade_prevention_mode)
            .optional("recvWindow", self.recv_window)
            .optional("timestamp", self.timestamp)
            .build()
    }
}

/// `DELETE /api/v3/orderList`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CancelOcoRequest {
    pub symbol: String,
    pub order_list_id: Option<u64>,
    pub list_client_order_id: Option<String>,
    pub new_client_order_id: Option<String>,
    pub recv_window: Option<u64>,
    pub timestamp: Option<u64>,
}

impl CancelOcoRequest {
    pub fn by_id(symbol: impl Into<String>, order_list_id: u64) -> Self {
        Self {
            symbol: symbol.into(),
            order_list_id: Some(order_list_id),
            ..Self::default()
        }
    }
}

impl Validate for CancelOcoRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require_symbol(&self.symbol)?;
        check_timing(self.recv_window, self.timestamp)?;
        require_order_ref(
            self.order_list_id,
            self.list_client_order_id.as_deref(),
            "orderListId or listClientOrderId is required",
        )
    }
}

impl ToQuery for CancelOcoRequest {
    fn to_query(&self) -> String {
        QueryBuilder::new()
            .required("symbol", &self.symbol)
            .optional("orderListId", self.order_list_id)
            .optional("listClientOrderId", self.list_client_order_id.as_deref())
            .optional("newClientOrderId", self.new_client_order_id.as_deref())
            .optional("recvWindow", self.recv_window)
            .optional("timestamp", self.timestamp)
            .build()
    }
}

/// `GET /api/v3/orderList`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOcoRequest {
    pub order_list_id: Option<u64>,
    pub orig_client_order_id: Option<String>,
    pub recv_window: Option<u64>,
    pub timestamp: Option<u64>,
}

impl QueryOcoRequest {
    pub fn by_id(order_list_id: u64) -> Self {
        Self {
            order_list_id: Some(order_list_id),
            ..Self::default()
        }
    }
}

impl Validate for QueryOcoRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        check_timing(self.recv_window, self.timestamp)?;
        require_order_ref(
            self.order_list_id,
            self.orig_client_order_id.as_deref(),
            "orderListId or origClientOrderId is required",
        )
    }
}

impl ToQuery for QueryOcoRequest {
    fn to_query(&self) -> String {
        QueryBuilder::new()
            .optional("orderListId", self.order_list_id)
            .optional("origClientOrderId", self.orig_client_order_id.as_deref())
            .optional("recvWindow", self.recv_window)
            .optional("timestamp", self.timestamp)
            .build()
    }
}

/// `GET /api/v3/allOrderList`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllOcoRequest {
    pub from_id: Option<u64>,
    pub start_time: Option<u64>,
    pub end_time: Option<u64>,
    pub limit: Option<u32>,
    pub recv_window: Option<u64>,
    pub timestamp: Option<u64>,
}

impl Validate for AllOcoRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        check_timing(self.recv_window, self.timestamp)?;
        check_limit(self.limit, MAX_LIMIT, "at most 1000")?;
        check_time_range(self.start_time, self.end_time)?;
        if self.from_id.is_some() && (self.start_time.is_some() || self.end_time.is_some()) {
            return Err(ValidationError::Rule(
                "fromId cannot be combined with startTime/endTime",
            ));
        }
        Ok(())
    }
}

impl ToQuery for AllOcoRequest {
    fn to_query(&self) -> String {
        QueryBuilder::new()
            .optional("fromId", self.from_id)
            .optional("startTime", self.start_time)
            .optional("endTime", self.end_time)
            .optional("limit", self.limit)
            .optional("recvWindow", self.recv_window)
            .optional("timestamp", self.timestamp)
            .build()
    }
}

/// `GET /api/v3/openOrderList`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenOcoRequest {
    pub recv_window: Option<u64>,
    pub timestamp: Option<u64>,
}

impl Validate for OpenOcoRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        check_timing(self.recv_window, self.timestamp)
    }
}

impl ToQuery for OpenOcoRequest {
    fn to_query(&self) -> String {
        QueryBuilder::new()
            .optional("recvWindow", self.recv_window)
            .optional("timestamp", self.timestamp)
            .build()
    }
}

// ----------------------------------------------------------------------------
// Smart order routing
// ----------------------------------------------------------------------------

/// `POST /api/v3/sor/order` and `POST /api/v3/sor/order/test`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSorOrderRequest {
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub time_in_force: Option<TimeInForce>,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
    pub new_client_order_id: Option<String>,
    pub strategy_id: Option<u64>,
    pub strategy_type: Option<u32>,
    pub iceberg_qty: Option<Decimal>,
    pub new_order_resp_type: Option<OrderResponseType>,
    pub self_trade_prevention_mode: Option<SelfTradePreventionMode>,
    pub recv_window: Option<u64>,
    pub timestamp: Option<u64>,
}

impl NewSorOrderRequest {
    pub fn new(
        symbol: impl Into<String>,
        side: OrderSide,
        order_type: OrderType,
        quantity: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type,
            time_in_force: None,
            quantity,
            price: None,
            new_client_order_id: None,
            strategy_id: None,
            strategy_type: None,
            iceberg_qty: None,
            new_order_resp_type: None,
            self_trade_prevention_mode: None,
            recv_window: None,
            timestamp: None,
        }
    }
}

impl Validate for NewSorOrderRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require_symbol(&self.symbol)?;
        check_timing(self.recv_window, self.timestamp)?;
        check_strategy_type(self.strategy_type)?;
        if !matches!(self.order_type, OrderType::Limit | OrderType::Market) {
            return Err(ValidationError::invalid("type", self.order_type.as_str()));
        }
        OrderShape {
            order_type: self.order_type,
            time_in_force: self.time_in_force,
            quantity: Some(self.quantity),
            quote_order_qty: None,
            price: self.price,
            stop_price: None,
            trailing_delta: None,
            iceberg_qty: self.iceberg_qty,
        }
        .validate()
    }
}

impl ToQuery for NewSorOrderRequest {
    fn to_query(&self) -> String {
        QueryBuilder::new()
            .required("symbol", &self.symbol)
            .required("side", self.side)
            .required("type", self.order_type)
            .optional("timeInForce", self.time_in_force)
            .required("quantity", self.quantity)
            .optional("price", self.price)
            .optional("newClientOrderId", self.new_client_order_id.as_deref())
            .optional("strategyId", self.strategy_id)
            .optional("strategyType", self.strategy_type)
            .optional("icebergQty", self.iceberg_qty)
            .optional("newOrderRespType", self.new_order_resp_type)
            .optional("selfTradePreventionMode", self.self_trade_prevention_mode)
            .optional("recvWindow", self.recv_window)
            .optional("timestamp", self.timestamp)
            .build()
    }
}

timestamped!(
    NewOrderRequest,
    QueryOrderRequest,
    CancelOrderRequest,
    CancelOpenOrdersRequest,
    OpenOrdersRequest,
    AllOrdersRequest,
    CancelReplaceRequest,
    NewOcoRequest,
    CancelOcoRequest,
    QueryOcoRequest,
    AllOcoRequest,
    OpenOcoRequest,
    NewSorOrderRequest,
);
