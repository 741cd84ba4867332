use crate::core::errors::ExchangeError;
use tokio_tungstenite::tungstenite::Message;

/// Codec trait for turning raw WebSocket frames into typed events
///
/// One codec instance serves one subscription, so it only has to understand
/// the payload shape of that topic.
pub trait WsCodec: Send + Sync + 'static {
    /// The type representing decoded events for this topic
    type Message: Send + 'static;

    /// Decode a data frame
    ///
    /// Control frames (ping, pong, close) never reach the codec.
    ///
    /// # Returns
    /// - `Ok(Some(message))` - Successfully decoded event
    /// - `Ok(None)` - Frame was recognised but carries no event
    /// - `Err(error)` - Frame could not be decoded; terminal for the subscription
    fn decode_message(&self, message: Message) -> Result<Option<Self::Message>, ExchangeError>;
}

/// Payload bytes of a text or binary frame
pub fn frame_payload(message: &Message) -> Option<&[u8]> {
    match message {
        Message::Text(text) => Some(text.as_bytes()),
        Message::Binary(data) => Some(data),
        _ => None,
    }
}
