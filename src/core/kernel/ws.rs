use crate::core::errors::ExchangeError;
use crate::core::kernel::codec::WsCodec;
use futures_util::{SinkExt, StreamExt};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use futures_util::stream::SplitSink;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, instrument};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;
type Sink = SplitSink<Socket, Message>;

/// Lifecycle of a single subscription
///
/// `Connecting` only exists while [`StreamManager::subscribe`] is opening the
/// socket. A [`Subscription`] handle is returned after the connection succeeds,
/// so callers observe `Streaming`, `Closing` and `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamState {
    Connecting,
    Streaming,
    Closing,
    Closed,
}

impl fmt::Display for StreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone)]
pub struct WsConfig {
    /// Connection timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// Upper bound on the close handshake once a subscription is cancelled
    pub close_timeout_ms: u64,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 10_000,
            close_timeout_ms: 1_000,
        }
    }
}

/// Opens one socket per subscription and runs its read loop on a spawned task.
///
/// Subscriptions share nothing: each owns its socket, its codec, its handler and
/// its cancellation signal. The handler runs on a dedicated OS thread fed through
/// a one-slot channel, so a handler that blocks only holds back its own socket
/// and never a runtime worker. Any tokio runtime flavour works.
///
/// A failed or closed connection is terminal; there is no reconnection.
#[derive(Debug, Clone)]
pub struct StreamManager {
    base_url: String,
    exchange_name: String,
    config: WsConfig,
}

impl StreamManager {
    /// # Arguments
    /// * `base_url` - Stream host prefix; topics are appended verbatim
    /// * `exchange_name` - Name of the exchange for logging/tracing
    pub fn new(base_url: String, exchange_name: String) -> Self {
        Self {
            base_url,
            exchange_name,
            config: WsConfig::default(),
        }
    }

    pub fn with_config(mut self, config: WsConfig) -> Self {
        self.config = config;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn topic_url(&self, topic: &str) -> String {
        format!("{}{}", self.base_url, topic)
    }

    /// Connect to `topic` and start delivering decoded events to `handler`.
    ///
    /// Returns once the socket is established. An error returned by `handler`
    /// (or a panic inside it) ends the subscription. Events are handed over one
    /// at a time: while the handler is busy the socket is not read.
    #[instrument(skip(self, codec, handler), fields(exchange = %self.exchange_name))]
    pub async fn subscribe<C, F>(
        &self,
        topic: &str,
        codec: C,
        handler: F,
    ) -> Result<Subscription, ExchangeError>
    where
        C: WsCodec,
        F: FnMut(C::Message) -> Result<(), ExchangeError> + Send + 'static,
    {
        let url = self.topic_url(topic);
        let (state_tx, state_rx) = watch::channel(StreamState::Connecting);

        let connect_timeout = Duration::from_millis(self.config.connect_timeout_ms);
        let (socket, _) = tokio::time::timeout(connect_timeout, connect_async(url.as_str()))
            .await
            .map_err(|_| {
                ExchangeError::Transport(format!("WebSocket connection to {} timed out", url))
            })?
            .map_err(|e| {
                ExchangeError::Transport(format!("WebSocket connection to {} failed: {}", url, e))
            })?;

        let (events_tx, events_rx) = mpsc::channel::<C::Message>(1);
        let (done_tx, handler_done) = oneshot::channel();
        let stopped = Arc::new(AtomicBool::new(false));
        let worker = HandlerWorker {
            events_rx,
            done_tx,
            stopped: stopped.clone(),
        };
        thread::Builder::new()
            .name(format!("stream-{}", topic))
            .spawn(move || worker.run(handler))
            .map_err(|e| {
                ExchangeError::Stream(format!("Failed to start handler thread for {}: {}", topic, e))
            })?;

        state_tx.send_replace(StreamState::Streaming);
        info!(topic, url = %url, "Subscription streaming");

        let (cancel_tx, cancel_rx) = oneshot::channel();
        let read_loop = ReadLoop {
            topic: topic.to_string(),
            close_timeout: Duration::from_millis(self.config.close_timeout_ms),
            state_tx,
            events_tx,
            handler_done,
            stopped,
        };
        let task = tokio::spawn(read_loop.run(socket, codec, cancel_rx));

        Ok(Subscription {
            topic: topic.to_string(),
            url,
            cancel_tx: Mutex::new(Some(cancel_tx)),
            state_rx,
            task,
        })
    }
}

/// Owns the handler on its own thread and reports how it ended
struct HandlerWorker<M> {
    events_rx: mpsc::Receiver<M>,
    done_tx: oneshot::Sender<Result<(), ExchangeError>>,
    stopped: Arc<AtomicBool>,
}

impl<M> HandlerWorker<M> {
    fn run<F>(mut self, mut handler: F)
    where
        F: FnMut(M) -> Result<(), ExchangeError>,
    {
        let mut result = Ok(());
        while let Some(event) = self.events_rx.blocking_recv() {
            // Events buffered before cancellation are discarded
            if self.stopped.load(Ordering::Acquire) {
                break;
            }
            result = match catch_unwind(AssertUnwindSafe(|| handler(event))) {
                Ok(outcome) => outcome,
                Err(_) => Err(ExchangeError::Stream("Stream handler panicked".to_string())),
            };
            if result.is_err() {
                break;
            }
        }
        let _ = self.done_tx.send(result);
    }
}

struct ReadLoop<M> {
    topic: String,
    close_timeout: Duration,
    state_tx: watch::Sender<StreamState>,
    events_tx: mpsc::Sender<M>,
    handler_done: oneshot::Receiver<Result<(), ExchangeError>>,
    stopped: Arc<AtomicBool>,
}

impl<M: Send + 'static> ReadLoop<M> {
    async fn run<C>(
        mut self,
        socket: Socket,
        codec: C,
        mut cancel_rx: oneshot::Receiver<()>,
    ) -> Result<(), ExchangeError>
    where
        C: WsCodec<Message = M>,
    {
        let (mut write, mut read) = socket.split();
        let mut handler_finished = false;

        let outcome = loop {
            tokio::select! {
                biased;

                // A dropped handle counts as cancellation
                _ = &mut cancel_rx => break self.close(&mut write).await,

                result = &mut self.handler_done => {
                    handler_finished = true;
                    break result.unwrap_or_else(|_| {
                        Err(ExchangeError::Stream("Stream handler thread exited".to_string()))
                    });
                }

                frame = read.next() => match frame {
                    Some(Ok(Message::Ping(payload))) => {
                        if let Err(e) = write.send(Message::Pong(payload)).await {
                            break Err(ExchangeError::Stream(format!("Failed to answer ping: {}", e)));
                        }
                    }
                    Some(Ok(Message::Pong(_) | Message::Frame(_))) => {}
                    Some(Ok(Message::Close(frame))) => {
                        debug!(topic = %self.topic, ?frame, "Close frame received");
                        break Err(ExchangeError::Stream("Connection closed by server".to_string()));
                    }
                    Some(Ok(message)) => {
                        let event = match codec.decode_message(message) {
                            Ok(Some(event)) => event,
                            Ok(None) => continue,
                            Err(e) => break Err(e),
                        };
                        // A busy handler holds back this socket only
                        tokio::select! {
                            biased;
                            _ = &mut cancel_rx => break self.close(&mut write).await,
                            sent = self.events_tx.send(event) => {
                                // On failure the handler has ended; its result arrives next turn
                                if sent.is_err() {
                                    debug!(topic = %self.topic, "Handler no longer accepting events");
                                }
                            }
                        }
                    }
                    Some(Err(e)) => {
                        break Err(ExchangeError::Stream(format!("WebSocket read failed: {}", e)));
                    }
                    None => {
                        break Err(ExchangeError::Stream("Connection dropped".to_string()));
                    }
                }
            }
        };

        drop(write);
        drop(read);

        // Closed means the handler will not be called again
        self.stopped.store(true, Ordering::Release);
        let Self {
            topic,
            state_tx,
            events_tx,
            handler_done,
            ..
        } = self;
        drop(events_tx);
        if !handler_finished {
            let _ = handler_done.await;
        }
        state_tx.send_replace(StreamState::Closed);

        match &outcome {
            Ok(()) => info!(topic = %topic, "Subscription closed"),
            Err(e) => error!(topic = %topic, error = %e, "Subscription terminated"),
        }
        outcome
    }

    async fn close(&self, write: &mut Sink) -> Result<(), ExchangeError> {
        self.stopped.store(true, Ordering::Release);
        self.state_tx.send_replace(StreamState::Closing);
        info!(topic = %self.topic, "Subscription cancelled");
        let _ = tokio::time::timeout(self.close_timeout, write.send(Message::Close(None))).await;
        Ok(())
    }
}

/// Handle to a running subscription
///
/// [`Subscription::cancel`] is the way to stop it; dropping the handle has the
/// same effect. Cancelling more than once is a no-op.
pub struct Subscription {
    topic: String,
    url: String,
    cancel_tx: Mutex<Option<oneshot::Sender<()>>>,
    state_rx: watch::Receiver<StreamState>,
    task: JoinHandle<Result<(), ExchangeError>>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .field("url", &self.url)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Subscription {
    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> StreamState {
        *self.state_rx.borrow()
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state(), StreamState::Streaming)
    }

    /// Signal the read loop to release the socket and stop.
    pub fn cancel(&self) {
        let sender = self
            .cancel_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match sender {
            Some(tx) => {
                if tx.send(()).is_err() {
                    debug!(topic = %self.topic, "Read loop already finished");
                }
            }
            None => debug!(topic = %self.topic, "Subscription already cancelled"),
        }
    }

    /// Wait until the read loop has reached [`StreamState::Closed`].
    ///
    /// A handler call already in progress is allowed to finish first.
    pub async fn closed(&self) {
        let mut state_rx = self.state_rx.clone();
        // The sender only disappears once the loop has finished
        let _ = state_rx.wait_for(|state| *state == StreamState::Closed).await;
    }

    /// Wait for the read loop to finish and return how it ended.
    ///
    /// `Ok(())` after cancellation, the terminal error otherwise.
    pub async fn join(self) -> Result<(), ExchangeError> {
        let Self {
            task, cancel_tx, ..
        } = self;
        let result = task.await;
        drop(cancel_tx);
        result.map_err(|e| ExchangeError::Stream(format!("Read loop aborted: {}", e)))?
    }
}
