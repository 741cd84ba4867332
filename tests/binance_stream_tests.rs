#![allow(clippy::unwrap_used)]

use futures_util::{SinkExt, StreamExt};
use rust_decimal::Decimal;
use spotlink::core::kernel::StreamState;
use spotlink::exchanges::binance::{BinanceStreams, DepthSpeed};
use spotlink::ExchangeError;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_hdr_async, WebSocketStream};

const DEPTH_FRAME: &str = r#"{"e":"depthUpdate","E":1672515782136,"s":"BTCUSDT","U":157,"u":160,"b":[["1.23","4.56"]],"a":[["1.25","0.5"]]}"#;
const BOUND: Duration = Duration::from_secs(2);

type ServerSocket = WebSocketStream<TcpStream>;

/// Accept one client on an ephemeral port and run `session` on it.
///
/// Returns the stream base URL and the request path the client connected to.
async fn spawn_server<F, Fut>(session: F) -> (String, oneshot::Receiver<String>)
where
    F: FnOnce(ServerSocket) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (path_tx, path_rx) = oneshot::channel();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let socket = accept_hdr_async(
            stream,
            |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
                let _ = path_tx.send(request.uri().path().to_string());
                Ok(response)
            },
        )
        .await
        .unwrap();
        session(socket).await;
    });

    (format!("ws://{}/ws/", addr), path_rx)
}

/// Push `frame` every 20ms until the client goes away
async fn stream_frames(mut socket: ServerSocket, frame: &'static str) {
    loop {
        tokio::select! {
            incoming = socket.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                _ => {}
            },
            () = tokio::time::sleep(Duration::from_millis(20)) => {
                if socket.send(Message::Text(frame.to_string())).await.is_err() {
                    break;
                }
            }
        }
    }
}

/// Keep the connection open without sending data until the client leaves
async fn drain(mut socket: ServerSocket) {
    while let Some(Ok(message)) = socket.next().await {
        if message.is_close() {
            break;
        }
    }
}

#[cfg(test)]
mod subscription_tests {
    use super::*;

    #[tokio::test]
    async fn test_depth_topic_url_and_cancel() {
        let (base_url, path_rx) = spawn_server(|socket| stream_frames(socket, DEPTH_FRAME)).await;
        let streams = BinanceStreams::new(base_url);

        let delivered = Arc::new(AtomicUsize::new(0));
        let counter = delivered.clone();
        let (first_tx, mut first_rx) = mpsc::unbounded_channel();

        let subscription = streams
            .subscribe_depth("BTCUSDT", DepthSpeed::Standard, move |update| {
                counter.fetch_add(1, Ordering::SeqCst);
                let _ = first_tx.send(update);
                Ok(())
            })
            .await
            .unwrap();

        assert!(subscription.url().ends_with("btcusdt@depth"));
        assert_eq!(subscription.topic(), "btcusdt@depth");
        assert_eq!(path_rx.await.unwrap(), "/ws/btcusdt@depth");

        let update = timeout(BOUND, first_rx.recv()).await.unwrap().unwrap();
        assert_eq!(update.symbol, "BTCUSDT");
        assert_eq!(update.bids[0].price, "1.23".parse::<Decimal>().unwrap());
        assert!(subscription.is_active());

        subscription.cancel();
        timeout(BOUND, subscription.closed()).await.unwrap();
        assert_eq!(subscription.state(), StreamState::Closed);

        let after_close = delivered.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(delivered.load(Ordering::SeqCst), after_close);

        assert!(timeout(BOUND, subscription.join()).await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_cancel_twice_is_noop() {
        let (base_url, _path) = spawn_server(drain).await;
        let subscription = BinanceStreams::new(base_url)
            .subscribe_trade("BTCUSDT", |_| Ok(()))
            .await
            .unwrap();

        subscription.cancel();
        subscription.cancel();
        assert!(timeout(BOUND, subscription.join()).await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_dropping_handle_cancels() {
        let (closed_tx, closed_rx) = oneshot::channel();
        let (base_url, _path) = spawn_server(|socket| async move {
            drain(socket).await;
            let _ = closed_tx.send(());
        })
        .await;

        let subscription = BinanceStreams::new(base_url)
            .subscribe_agg_trade("BTCUSDT", |_| Ok(()))
            .await
            .unwrap();
        drop(subscription);

        timeout(BOUND, closed_rx).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_handler_error_terminates_subscription() {
        let (base_url, _path) = spawn_server(|socket| stream_frames(socket, DEPTH_FRAME)).await;
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let subscription = BinanceStreams::new(base_url)
            .subscribe_depth("BTCUSDT", DepthSpeed::Fast, move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(ExchangeError::Stream("handler gave up".to_string()))
            })
            .await
            .unwrap();

        let result = timeout(BOUND, subscription.join()).await.unwrap();
        assert!(matches!(result, Err(ExchangeError::Stream(msg)) if msg == "handler gave up"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_handler_panic_terminates_subscription() {
        let (base_url, _path) = spawn_server(|socket| stream_frames(socket, DEPTH_FRAME)).await;

        let subscription = BinanceStreams::new(base_url)
            .subscribe_depth("BTCUSDT", DepthSpeed::Standard, |_| panic!("boom"))
            .await
            .unwrap();

        let result = timeout(BOUND, subscription.join()).await.unwrap();
        assert!(matches!(result, Err(ExchangeError::Stream(_))));
    }

    #[tokio::test]
    async fn test_malformed_decimal_delivered_as_zero() {
        const FRAME: &str = r#"{"e":"depthUpdate","E":1,"s":"BTCUSDT","U":1,"u":2,"b":[["1.2.3","4.56"]],"a":[]}"#;
        let (base_url, _path) = spawn_server(|socket| stream_frames(socket, FRAME)).await;
        let (tx, mut rx) = mpsc::unbounded_channel();

        let subscription = BinanceStreams::new(base_url)
            .subscribe_depth("BTCUSDT", DepthSpeed::Standard, move |update| {
                let _ = tx.send(update);
                Ok(())
            })
            .await
            .unwrap();

        let update = timeout(BOUND, rx.recv()).await.unwrap().unwrap();
        assert_eq!(update.bids[0].price, Decimal::ZERO);
        assert_eq!(update.bids[0].quantity, "4.56".parse::<Decimal>().unwrap());

        subscription.cancel();
        assert!(timeout(BOUND, subscription.join()).await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_undecodable_frame_is_terminal() {
        let (base_url, _path) = spawn_server(|socket| stream_frames(socket, "not json")).await;

        let subscription = BinanceStreams::new(base_url)
            .subscribe_depth("BTCUSDT", DepthSpeed::Standard, |_| Ok(()))
            .await
            .unwrap();

        let result = timeout(BOUND, subscription.join()).await.unwrap();
        assert!(matches!(result, Err(ExchangeError::Stream(_))));
    }

    #[tokio::test]
    async fn test_server_close_is_terminal() {
        let (base_url, _path) = spawn_server(|mut socket| async move {
            let _ = socket.send(Message::Close(None)).await;
            drain(socket).await;
        })
        .await;

        let subscription = BinanceStreams::new(base_url)
            .subscribe_trade("BTCUSDT", |_| Ok(()))
            .await
            .unwrap();

        let result = timeout(BOUND, subscription.join()).await.unwrap();
        assert!(matches!(result, Err(ExchangeError::Stream(_))));
    }

    #[tokio::test]
    async fn test_ping_is_answered() {
        let (pong_tx, pong_rx) = oneshot::channel();
        let (base_url, _path) = spawn_server(|mut socket| async move {
            socket.send(Message::Ping(vec![7, 7, 7])).await.unwrap();
            while let Some(Ok(message)) = socket.next().await {
                if let Message::Pong(payload) = message {
                    let _ = pong_tx.send(payload);
                    break;
                }
            }
            drain(socket).await;
        })
        .await;

        let subscription = BinanceStreams::new(base_url)
            .subscribe_trade("BTCUSDT", |_| Ok(()))
            .await
            .unwrap();

        let payload = timeout(BOUND, pong_rx).await.unwrap().unwrap();
        assert_eq!(payload, vec![7, 7, 7]);

        subscription.cancel();
        assert!(timeout(BOUND, subscription.join()).await.unwrap().is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_blocking_handlers_do_not_stall_other_subscriptions() {
        let (started_tx, mut started_rx) = mpsc::unbounded_channel();
        let mut slow = Vec::new();
        for _ in 0..2 {
            let (base_url, _path) = spawn_server(|socket| stream_frames(socket, DEPTH_FRAME)).await;
            let started_tx = started_tx.clone();
            let subscription = BinanceStreams::new(base_url)
                .subscribe_depth("BTCUSDT", DepthSpeed::Standard, move |_| {
                    let _ = started_tx.send(());
                    std::thread::sleep(Duration::from_millis(1500));
                    Ok(())
                })
                .await
                .unwrap();
            slow.push(subscription);
        }
        for _ in 0..2 {
            timeout(BOUND, started_rx.recv()).await.unwrap().unwrap();
        }

        let (base_url, _path) = spawn_server(|socket| stream_frames(socket, DEPTH_FRAME)).await;
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let fast = timeout(
            Duration::from_millis(500),
            BinanceStreams::new(base_url).subscribe_depth("BTCUSDT", DepthSpeed::Standard, move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        )
        .await
        .unwrap()
        .unwrap();

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(calls.load(Ordering::SeqCst) >= 3);

        fast.cancel();
        assert!(timeout(BOUND, fast.join()).await.unwrap().is_ok());
        drop(slow);
    }

    #[tokio::test]
    async fn test_connect_failure_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = BinanceStreams::new(format!("ws://{}/ws/", addr))
            .subscribe_trade("BTCUSDT", |_| Ok(()))
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::Transport(_)));
    }
}
