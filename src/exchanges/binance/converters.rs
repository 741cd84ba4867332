use super::events::{
    AggTradeEvent, AggTradeWire, DepthUpdate, DepthUpdateWire, KlineBar, KlineBarWire, KlineEvent,
    KlineWire, TradeEvent, TradeWire,
};
use crate::core::types::{conversion::decimal_or_zero, PriceLevel};

/// Wire-to-domain transformation for stream events.
///
/// Pure and total: a malformed decimal becomes zero (with a warning) and the
/// rest of the event is still produced.
pub trait ToDomain {
    type Domain;

    fn to_domain(&self) -> Self::Domain;
}

fn levels(side: &'static str, raw: &[[String; 2]]) -> Vec<PriceLevel> {
    raw.iter()
        .map(|[price, quantity]| PriceLevel {
            price: decimal_or_zero(side, price),
            quantity: decimal_or_zero(side, quantity),
        })
        .collect()
}

impl ToDomain for DepthUpdateWire {
    type Domain = DepthUpdate;

    fn to_domain(&self) -> DepthUpdate {
        DepthUpdate {
            event_type: self.event_type.clone(),
            event_time: self.event_time,
            symbol: self.symbol.clone(),
            first_update_id: self.first_update_id,
            final_update_id: self.final_update_id,
            bids: levels("bids", &self.bids),
            asks: levels("asks", &self.asks),
        }
    }
}

impl ToDomain for AggTradeWire {
    type Domain = AggTradeEvent;

    fn to_domain(&self) -> AggTradeEvent {
        AggTradeEvent {
            event_type: self.event_type.clone(),
            event_time: self.event_time,
            symbol: self.symbol.clone(),
            agg_trade_id: self.agg_trade_id,
            price: decimal_or_zero("price", &self.price),
            quantity: decimal_or_zero("quantity", &self.quantity),
            first_trade_id: self.first_trade_id,
            last_trade_id: self.last_trade_id,
            trade_time: self.trade_time,
            is_buyer_maker: self.is_buyer_maker,
            is_best_match: self.is_best_match,
        }
    }
}

impl ToDomain for TradeWire {
    type Domain = TradeEvent;

    fn to_domain(&self) -> TradeEvent {
        TradeEvent {
            event_type: self.event_type.clone(),
            event_time: self.event_time,
            symbol: self.symbol.clone(),
            trade_id: self.trade_id,
            price: decimal_or_zero("price", &self.price),
            quantity: decimal_or_zero("quantity", &self.quantity),
            buyer_order_id: self.buyer_order_id,
            seller_order_id: self.seller_order_id,
            trade_time: self.trade_time,
            is_buyer_maker: self.is_buyer_maker,
            is_best_match: self.is_best_match,
        }
    }
}

impl ToDomain for KlineBarWire {
    type Domain = KlineBar;

    fn to_domain(&self) -> KlineBar {
        KlineBar {
            start_time: self.start_time,
            close_time: self.close_time,
            symbol: self.symbol.clone(),
            interval: self.interval,
            first_trade_id: self.first_trade_id,
            last_trade_id: self.last_trade_id,
            open: decimal_or_zero("open", &self.open),
            close: decimal_or_zero("close", &self.close),
            high: decimal_or_zero("high", &self.high),
            low: decimal_or_zero("low", &self.low),
            volume: decimal_or_zero("volume", &self.volume),
            number_of_trades: self.number_of_trades,
            is_final: self.is_final,
            quote_volume: decimal_or_zero("quote_volume", &self.quote_volume),
            taker_buy_base_volume: decimal_or_zero("taker_buy_base_volume", &self.taker_buy_base_volume),
            taker_buy_quote_volume: decimal_or_zero(
                "taker_buy_quote_volume",
                &self.taker_buy_quote_volume,
            ),
        }
    }
}

impl ToDomain for KlineWire {
    type Domain = KlineEvent;

    fn to_domain(&self) -> KlineEvent {
        KlineEvent {
            event_type: self.event_type.clone(),
            event_time: self.event_time,
            symbol: self.symbol.clone(),
            kline: self.kline.to_domain(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn dec(raw: &str) -> Decimal {
        raw.parse().unwrap()
    }

    fn depth_wire() -> DepthUpdateWire {
        serde_json::from_str(
            r#"{"e":"depthUpdate","E":1672515782136,"s":"BNBBTC","U":157,"u":160,
                "b":[["0.0024","10"]],"a":[["0.0026","100"]]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_depth_transform() {
        let event = depth_wire().to_domain();

        assert_eq!(event.symbol, "BNBBTC");
        assert_eq!(event.first_update_id, 157);
        assert_eq!(event.final_update_id, 160);
        assert_eq!(event.bids, vec![PriceLevel { price: dec("0.0024"), quantity: dec("10") }]);
        assert_eq!(event.asks[0].quantity, dec("100"));
    }

    #[test]
    fn test_transform_is_idempotent() {
        let wire = depth_wire();
        assert_eq!(wire.to_domain(), wire.to_domain());

        let trade: AggTradeWire = serde_json::from_str(
            r#"{"e":"aggTrade","E":1672515782136,"s":"BNBBTC","a":12345,"p":"0.001","q":"100",
                "f":100,"l":105,"T":1672515782136,"m":true,"M":true}"#,
        )
        .unwrap();
        assert_eq!(trade.to_domain(), trade.to_domain());
    }

    #[test]
    fn test_malformed_decimal_becomes_zero() {
        let mut wire = depth_wire();
        wire.bids[0][0] = "not-a-number".to_string();

        let event = wire.to_domain();
        assert_eq!(event.bids[0].price, Decimal::ZERO);
        assert_eq!(event.bids[0].quantity, dec("10"));
        assert_eq!(event.asks[0].price, dec("0.0026"));
    }

    #[test]
    fn test_trade_transform_keeps_optional_ids() {
        let wire: TradeWire = serde_json::from_str(
            r#"{"e":"trade","E":1672515782136,"s":"BNBBTC","t":12345,"p":"0.001","q":"100",
                "T":1672515782136,"m":true,"M":true}"#,
        )
        .unwrap();
        let event = wire.to_domain();

        assert_eq!(event.trade_id, 12345);
        assert_eq!(event.price, dec("0.001"));
        assert_eq!(event.buyer_order_id, None);
    }

    #[test]
    fn test_kline_transform() {
        let wire: KlineWire = serde_json::from_str(
            r#"{"e":"kline","E":1672515782136,"s":"BNBBTC","k":{
                "t":1672515780000,"T":1672515839999,"s":"BNBBTC","i":"1m","f":100,"L":200,
                "o":"0.0010","c":"0.0020","h":"0.0025","l":"0.0015","v":"1000","n":100,
                "x":false,"q":"1.0000","V":"500","Q":"0.500","B":"123456"}}"#,
        )
        .unwrap();
        let event = wire.to_domain();

        assert_eq!(event.kline.interval, crate::core::types::KlineInterval::Minutes1);
        assert_eq!(event.kline.high, dec("0.0025"));
        assert!(!event.kline.is_final);
    }
}
