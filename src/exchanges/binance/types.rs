use crate::core::types::{OrderSide, PriceLevel};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ----------------------------------------------------------------------------
// Exchange metadata
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeInfo {
    pub timezone: String,
    pub server_time: u64,
    #[serde(default)]
    pub rate_limits: Vec<RateLimit>,
    #[serde(default)]
    pub exchange_filters: Vec<Value>,
    pub symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimit {
    pub rate_limit_type: String,
    pub interval: String,
    pub interval_num: u32,
    pub limit: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    pub symbol: String,
    pub status: String,
    pub base_asset: String,
    pub base_asset_precision: u32,
    pub quote_asset: String,
    #[serde(default)]
    pub quote_asset_precision: u32,
    #[serde(default)]
    pub order_types: Vec<String>,
    #[serde(default)]
    pub iceberg_allowed: bool,
    #[serde(default)]
    pub oco_allowed: bool,
    #[serde(default)]
    pub is_spot_trading_allowed: bool,
    #[serde(default)]
    pub is_margin_trading_allowed: bool,
    /// Filters vary by `filterType`; kept untyped
    #[serde(default)]
    pub filters: Vec<SymbolFilter>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolFilter {
    pub filter_type: String,
    #[serde(flatten)]
    pub values: serde_json::Map<String, Value>,
}

impl SymbolInfo {
    pub fn filter(&self, filter_type: &str) -> Option<&SymbolFilter> {
        self.filters.iter().find(|f| f.filter_type == filter_type)
    }
}

// ----------------------------------------------------------------------------
// Market data
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepthSnapshot {
    pub last_update_id: u64,
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}

/// Entry of `/trades` and `/historicalTrades`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: u64,
    pub price: Decimal,
    pub qty: Decimal,
    pub quote_qty: Decimal,
    pub time: u64,
    pub is_buyer_maker: bool,
    pub is_best_match: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AggTrade {
    #[serde(rename = "a")]
    pub agg_trade_id: u64,
    #[serde(rename = "p")]
    pub price: Decimal,
    #[serde(rename = "q")]
    pub quantity: Decimal,
    #[serde(rename = "f")]
    pub first_trade_id: u64,
    #[serde(rename = "l")]
    pub last_trade_id: u64,
    #[serde(rename = "T")]
    pub timestamp: u64,
    #[serde(rename = "m")]
    pub is_buyer_maker: bool,
    #[serde(rename = "M")]
    pub is_best_match: bool,
}

/// One candle, sent by the exchange as a positional array
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "KlineRow")]
pub struct Kline {
    pub open_time: u64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    pub close_time: u64,
    pub quote_asset_volume: Decimal,
    pub number_of_trades: u64,
    pub taker_buy_base_asset_volume: Decimal,
    pub taker_buy_quote_asset_volume: Decimal,
}

#[derive(Deserialize)]
struct KlineRow(
    u64,
    Decimal,
    Decimal,
    Decimal,
    Decimal,
    Decimal,
    u64,
    Decimal,
    u64,
    Decimal,
    Decimal,
    #[allow(dead_code)] Value,
);

impl From<KlineRow> for Kline {
    fn from(row: KlineRow) -> Self {
        Self {
            open_time: row.0,
            open: row.1,
            high: row.2,
            low: row.3,
            close: row.4,
            volume: row.5,
            close_time: row.6,
            quote_asset_volume: row.7,
            number_of_trades: row.8,
            taker_buy_base_asset_volume: row.9,
            taker_buy_quote_asset_volume: row.10,
        }
    }
}

// ----------------------------------------------------------------------------
// Orders
// ----------------------------------------------------------------------------

/// Response to order placement.
///
/// Which fields are present depends on `newOrderRespType`: ACK carries only
/// the identifiers, RESULT adds the order state, FULL adds `fills`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub symbol: String,
    pub order_id: u64,
    #[serde(default)]
    pub order_list_id: i64,
    pub client_order_id: String,
    pub transact_time: u64,
    pub price: Option<Decimal>,
    pub orig_qty: Option<Decimal>,
    pub executed_qty: Option<Decimal>,
    pub cummulative_quote_qty: Option<Decimal>,
    pub status: Option<String>,
    pub time_in_force: Option<String>,
    #[serde(rename = "type")]
    pub order_type: Option<String>,
    pub side: Option<OrderSide>,
    pub working_time: Option<u64>,
    pub self_trade_prevention_mode: Option<String>,
    #[serde(default)]
    pub fills: Vec<Fill>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fill {
    pub price: Decimal,
    pub qty: Decimal,
    pub commission: Decimal,
    pub commission_asset: String,
    pub trade_id: u64,
}

/// Order state as reported by query, cancel and list endpoints
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderInfo {
    pub symbol: String,
    pub order_id: u64,
    #[serde(default)]
    pub order_list_id: i64,
    pub client_order_id: String,
    #[serde(default)]
    pub orig_client_order_id: Option<String>,
    pub price: Decimal,
    pub orig_qty: Decimal,
    pub executed_qty: Decimal,
    pub cummulative_quote_qty: Decimal,
    pub status: String,
    pub time_in_force: String,
    #[serde(rename = "type")]
    pub order_type: String,
    pub side: OrderSide,
    pub stop_price: Option<Decimal>,
    pub iceberg_qty: Option<Decimal>,
    pub time: Option<u64>,
    pub update_time: Option<u64>,
    pub transact_time: Option<u64>,
    pub is_working: Option<bool>,
    pub working_time: Option<u64>,
    pub orig_quote_order_qty: Option<Decimal>,
    pub self_trade_prevention_mode: Option<String>,
}

/// `/order/test` answers `{}` unless commission rates were requested
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TestOrderResponse {
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// `DELETE /openOrders` mixes plain orders and whole order lists
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CanceledEntry {
    OrderList(OrderList),
    Order(OrderInfo),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelReplaceResponse {
    pub cancel_result: String,
    pub new_order_result: String,
    pub cancel_response: Value,
    pub new_order_response: Option<Value>,
}

// ----------------------------------------------------------------------------
// Order lists
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderList {
    pub order_list_id: i64,
    pub contingency_type: String,
    pub list_status_type: String,
    pub list_order_status: String,
    pub list_client_order_id: String,
    pub transaction_time: u64,
    pub symbol: String,
    pub orders: Vec<OrderListMember>,
    #[serde(default)]
    pub order_reports: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListMember {
    pub symbol: String,
    pub order_id: u64,
    pub client_order_id: String,
}

// ----------------------------------------------------------------------------
// Smart order routing
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SorOrderResponse {
    pub symbol: String,
    pub order_id: u64,
    #[serde(default)]
    pub order_list_id: i64,
    pub client_order_id: String,
    pub transact_time: u64,
    pub price: Option<Decimal>,
    pub orig_qty: Option<Decimal>,
    pub executed_qty: Option<Decimal>,
    pub cummulative_quote_qty: Option<Decimal>,
    pub status: Option<String>,
    pub time_in_force: Option<String>,
    #[serde(rename = "type")]
    pub order_type: Option<String>,
    pub side: Option<OrderSide>,
    pub working_floor: Option<String>,
    #[serde(default)]
    pub used_sor: bool,
    #[serde(default)]
    pub fills: Vec<SorFill>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SorFill {
    pub match_type: String,
    pub price: Decimal,
    pub qty: Decimal,
    pub commission: Decimal,
    pub commission_asset: String,
    pub trade_id: u64,
    pub alloc_id: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(raw: &str) -> Decimal {
        raw.parse().unwrap()
    }

    #[test]
    fn test_depth_snapshot_decodes_string_pairs() {
        let body = r#"{"lastUpdateId":1,"bids":[["1.23","4.56"]],"asks":[]}"#;
        let depth: DepthSnapshot = serde_json::from_str(body).unwrap();

        assert_eq!(depth.last_update_id, 1);
        assert_eq!(depth.bids[0].price, dec("1.23"));
        assert_eq!(depth.bids[0].quantity, dec("4.56"));
        assert!(depth.asks.is_empty());
    }

    #[test]
    fn test_kline_decodes_from_array() {
        let body = r#"[[1499040000000,"0.01634790","0.80000000","0.01575800","0.01577100","148976.11427815",1499644799999,"2434.19055334",308,"1756.87402397","28.46694368","0"]]"#;
        let klines: Vec<Kline> = serde_json::from_str(body).unwrap();

        assert_eq!(klines.len(), 1);
        assert_eq!(klines[0].open_time, 1_499_040_000_000);
        assert_eq!(klines[0].high, dec("0.8"));
        assert_eq!(klines[0].number_of_trades, 308);
    }

    #[test]
    fn test_ack_order_response() {
        let body = r#"{"symbol":"BTCUSDT","orderId":28,"orderListId":-1,"clientOrderId":"6gCrw2kRUAF9CvJDGP16IP","transactTime":1507725176595}"#;
        let response: OrderResponse = serde_json::from_str(body).unwrap();

        assert_eq!(response.order_id, 28);
        assert_eq!(response.order_list_id, -1);
        assert!(response.status.is_none());
        assert!(response.fills.is_empty());
    }

    #[test]
    fn test_full_order_response() {
        let body = r#"{
            "symbol":"BTCUSDT","orderId":28,"orderListId":-1,"clientOrderId":"abc",
            "transactTime":1507725176595,"price":"0.00000000","origQty":"10.00000000",
            "executedQty":"10.00000000","cummulativeQuoteQty":"10.00000000","status":"FILLED",
            "timeInForce":"GTC","type":"MARKET","side":"SELL","workingTime":1507725176595,
            "selfTradePreventionMode":"NONE",
            "fills":[{"price":"4000.00000000","qty":"1.00000000","commission":"4.00000000","commissionAsset":"USDT","tradeId":56}]
        }"#;
        let response: OrderResponse = serde_json::from_str(body).unwrap();

        assert_eq!(response.side, Some(OrderSide::Sell));
        assert_eq!(response.fills.len(), 1);
        assert_eq!(response.fills[0].price, dec("4000"));
    }

    #[test]
    fn test_cancel_open_orders_mixed_entries() {
        let body = r#"[
            {"symbol":"BTCUSDT","origClientOrderId":"E6APeyTJvkMvLMYMqu1KQ4","orderId":11,"orderListId":-1,
             "clientOrderId":"pXLV6Hz6mprAcVYpVMTGgx","price":"0.089853","origQty":"0.178622",
             "executedQty":"0.000000","cummulativeQuoteQty":"0.000000","status":"CANCELED",
             "timeInForce":"GTC","type":"LIMIT","side":"BUY"},
            {"orderListId":1929,"contingencyType":"OCO","listStatusType":"ALL_DONE",
             "listOrderStatus":"ALL_DONE","listClientOrderId":"2inzWQdDvZLHbbAmAozX2N",
             "transactionTime":1585230948299,"symbol":"BTCUSDT",
             "orders":[{"symbol":"BTCUSDT","orderId":20,"clientOrderId":"CwOOIPHSmYywx6jZX77TdL"}]}
        ]"#;
        let entries: Vec<CanceledEntry> = serde_json::from_str(body).unwrap();

        assert!(matches!(entries[0], CanceledEntry::Order(_)));
        assert!(matches!(entries[1], CanceledEntry::OrderList(_)));
    }
}
