// Market data
pub const EXCHANGE_INFO: &str = "/api/v3/exchangeInfo";
pub const DEPTH: &str = "/api/v3/depth";
pub const TRADES: &str = "/api/v3/trades";
pub const HISTORICAL_TRADES: &str = "/api/v3/historicalTrades";
pub const AGG_TRADES: &str = "/api/v3/aggTrades";
pub const KLINES: &str = "/api/v3/klines";
pub const UI_KLINES: &str = "/api/v3/uiKlines";

// Trading
pub const ORDER: &str = "/api/v3/order";
pub const TEST_ORDER: &str = "/api/v3/order/test";
pub const OPEN_ORDERS: &str = "/api/v3/openOrders";
pub const CANCEL_REPLACE: &str = "/api/v3/order/cancelReplace";
pub const ALL_ORDERS: &str = "/api/v3/allOrders";
pub const OCO: &str = "/api/v3/order/oco";
pub const ORDER_LIST: &str = "/api/v3/orderList";
pub const ALL_ORDER_LIST: &str = "/api/v3/allOrderList";
pub const OPEN_ORDER_LIST: &str = "/api/v3/openOrderList";
pub const SOR_ORDER: &str = "/api/v3/sor/order";
pub const TEST_SOR_ORDER: &str = "/api/v3/sor/order/test";

// Stream suffixes, appended to the lowercased symbol
pub const DEPTH_STREAM: &str = "@depth";
pub const AGG_TRADE_STREAM: &str = "@aggTrade";
pub const TRADE_STREAM: &str = "@trade";
pub const KLINE_STREAM: &str = "@kline_";
