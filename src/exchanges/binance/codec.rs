use super::converters::ToDomain;
use super::events::{AggTradeWire, DepthUpdateWire, KlineWire, TradeWire};
use crate::core::errors::ExchangeError;
use crate::core::kernel::{frame_payload, WsCodec};
use serde::de::DeserializeOwned;
use std::fmt;
use std::marker::PhantomData;
use tokio_tungstenite::tungstenite::Message;

/// Decodes a single-topic stream: frame -> wire shape `W` -> domain event.
///
/// A frame that does not match `W` is a stream error. Individual malformed
/// decimals inside an otherwise valid frame are tolerated by the transform.
pub struct EventCodec<W> {
    kind: &'static str,
    _wire: PhantomData<fn() -> W>,
}

impl<W> EventCodec<W> {
    pub const fn new(kind: &'static str) -> Self {
        Self {
            kind,
            _wire: PhantomData,
        }
    }

    pub const fn kind(&self) -> &'static str {
        self.kind
    }
}

impl<W> fmt::Debug for EventCodec<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventCodec").field("kind", &self.kind).finish()
    }
}

impl<W> WsCodec for EventCodec<W>
where
    W: DeserializeOwned + ToDomain + 'static,
    W::Domain: Send + 'static,
{
    type Message = W::Domain;

    fn decode_message(&self, message: Message) -> Result<Option<Self::Message>, ExchangeError> {
        let Some(payload) = frame_payload(&message) else {
            return Ok(None);
        };

        let wire: W = serde_json::from_slice(payload).map_err(|e| {
            ExchangeError::Stream(format!(
                "Failed to parse {} event: {}: {}",
                self.kind,
                e,
                String::from_utf8_lossy(payload)
            ))
        })?;

        Ok(Some(wire.to_domain()))
    }
}

pub type DepthCodec = EventCodec<DepthUpdateWire>;
pub type AggTradeCodec = EventCodec<AggTradeWire>;
pub type TradeCodec = EventCodec<TradeWire>;
pub type KlineCodec = EventCodec<KlineWire>;

pub const fn depth_codec() -> DepthCodec {
    EventCodec::new("depthUpdate")
}

pub const fn agg_trade_codec() -> AggTradeCodec {
    EventCodec::new("aggTrade")
}

pub const fn trade_codec() -> TradeCodec {
    EventCodec::new("trade")
}

pub const fn kline_codec() -> KlineCodec {
    EventCodec::new("kline")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    const DEPTH_FRAME: &str = r#"{"e":"depthUpdate","E":1,"s":"BTCUSDT","U":1,"u":2,"b":[["1.23","4.56"]],"a":[]}"#;

    #[test]
    fn test_decodes_text_frame() {
        let event = depth_codec()
            .decode_message(Message::Text(DEPTH_FRAME.to_string()))
            .unwrap()
            .unwrap();

        assert_eq!(event.symbol, "BTCUSDT");
        assert_eq!(event.bids[0].price, "1.23".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_decodes_binary_frame() {
        let event = depth_codec()
            .decode_message(Message::Binary(DEPTH_FRAME.as_bytes().to_vec()))
            .unwrap();
        assert!(event.is_some());
    }

    #[test]
    fn test_control_frames_carry_no_event() {
        let decoded = depth_codec().decode_message(Message::Pong(Vec::new())).unwrap();
        assert!(decoded.is_none());
    }

    #[test]
    fn test_wrong_shape_is_stream_error() {
        let err = trade_codec()
            .decode_message(Message::Text(DEPTH_FRAME.to_string()))
            .unwrap_err();
        assert!(matches!(err, ExchangeError::Stream(msg) if msg.contains("trade")));

        let err = depth_codec()
            .decode_message(Message::Text("not json".to_string()))
            .unwrap_err();
        assert!(matches!(err, ExchangeError::Stream(_)));
    }

    #[test]
    fn test_malformed_decimal_still_delivers() {
        let frame = DEPTH_FRAME.replace("1.23", "1.2.3");
        let event = depth_codec()
            .decode_message(Message::Text(frame))
            .unwrap()
            .unwrap();

        assert_eq!(event.bids[0].price, Decimal::ZERO);
        assert_eq!(event.bids[0].quantity, "4.56".parse::<Decimal>().unwrap());
    }
}
