//! WsTransport - the production push channel over WebSocket.
//!
//! Wraps a tokio-tungstenite client connection. The session token rides
//! in the connect URL's query string (the channel endpoint does not
//! support header auth), so implementations here never log URLs.

use super::{Transport, TransportError};
use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use notify_types::{SubscribeFrame, SubscriptionId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tokio_tungstenite::tungstenite::{Bytes, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsSource = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Configuration for WsTransport.
#[derive(Clone, Debug)]
pub struct WsTransportConfig {
    /// Connection establishment timeout.
    pub connect_timeout: Duration,
    /// Interval between client pings; server pings are answered
    /// regardless. Zero disables client pings.
    pub heartbeat_interval: Duration,
}

impl Default for WsTransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            heartbeat_interval: Duration::from_millis(4000),
        }
    }
}

/// Reader half plus its heartbeat clock.
struct Reader {
    source: WsSource,
    heartbeat: Option<Interval>,
}

/// WsTransport implements the Transport trait over a WebSocket client
/// connection.
///
/// The writer and reader halves live behind separate locks so `close()`
/// and `subscribe()` stay responsive while `recv()` is parked waiting
/// for traffic.
pub struct WsTransport {
    config: WsTransportConfig,
    writer: Mutex<Option<WsSink>>,
    reader: Mutex<Option<Reader>>,
    connected: AtomicBool,
}

impl WsTransport {
    /// Create a WsTransport with default configuration.
    pub fn new() -> Self {
        Self::with_config(WsTransportConfig::default())
    }

    /// Create a WsTransport with custom configuration.
    pub fn with_config(config: WsTransportConfig) -> Self {
        Self {
            config,
            writer: Mutex::new(None),
            reader: Mutex::new(None),
            connected: AtomicBool::new(false),
        }
    }

    async fn send_message(&self, message: Message) -> Result<(), TransportError> {
        let mut guard = self.writer.lock().await;
        let sink = guard.as_mut().ok_or(TransportError::NotConnected)?;
        sink.send(message)
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }
}

impl Default for WsTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn connect(&self, url: &str) -> Result<(), TransportError> {
        // Replace any existing connection.
        self.close().await.ok();

        let (stream, _response) =
            tokio::time::timeout(self.config.connect_timeout, connect_async(url))
                .await
                .map_err(|_| TransportError::Timeout)?
                .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        let (sink, source) = stream.split();
        let heartbeat = (self.config.heartbeat_interval > Duration::ZERO).then(|| {
            let period = self.config.heartbeat_interval;
            let mut clock = interval_at(Instant::now() + period, period);
            clock.set_missed_tick_behavior(MissedTickBehavior::Delay);
            clock
        });

        *self.writer.lock().await = Some(sink);
        *self.reader.lock().await = Some(Reader { source, heartbeat });
        self.connected.store(true, Ordering::SeqCst);
        tracing::debug!("websocket channel established");
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<SubscriptionId, TransportError> {
        let frame = SubscribeFrame::new(topic);
        let body = frame
            .to_json()
            .map_err(|e| TransportError::SubscribeFailed(e.to_string()))?;
        self.send_message(Message::text(body))
            .await
            .map_err(|e| TransportError::SubscribeFailed(e.to_string()))?;
        Ok(frame.id)
    }

    async fn recv(&self) -> Result<Vec<u8>, TransportError> {
        let mut guard = self.reader.lock().await;
        let reader = guard.as_mut().ok_or(TransportError::NotConnected)?;
        let Reader { source, heartbeat } = reader;

        loop {
            let tick = async {
                match heartbeat.as_mut() {
                    Some(clock) => {
                        clock.tick().await;
                    }
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                _ = tick => {
                    self.send_message(Message::Ping(Bytes::new())).await?;
                }
                message = source.next() => match message {
                    Some(Ok(Message::Text(text))) => return Ok(text.as_bytes().to_vec()),
                    Some(Ok(Message::Binary(body))) => return Ok(body.to_vec()),
                    Some(Ok(Message::Ping(payload))) => {
                        self.send_message(Message::Pong(payload)).await?;
                    }
                    Some(Ok(Message::Pong(_))) => {}
                    Some(Ok(Message::Frame(_))) => {}
                    Some(Ok(Message::Close(_))) | None => {
                        self.connected.store(false, Ordering::SeqCst);
                        return Err(TransportError::ConnectionClosed);
                    }
                    Some(Err(e)) => {
                        self.connected.store(false, Ordering::SeqCst);
                        return Err(TransportError::ReceiveFailed(e.to_string()));
                    }
                },
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.connected.store(false, Ordering::SeqCst);

        if let Some(mut sink) = self.writer.lock().await.take() {
            sink.send(Message::Close(None)).await.ok();
            sink.close().await.ok();
        }

        // A recv() parked on the reader half sees the close frame (or
        // stream end) and errors out on its own; only clear the slot if
        // nobody holds it.
        if let Ok(mut guard) = self.reader.try_lock() {
            guard.take();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use notify_types::{Notification, NotificationId};
    use tokio::net::TcpListener;

    fn sample_notification() -> Notification {
        Notification {
            id: NotificationId::new(1),
            kind: Some("comment".into()),
            title: "hello".into(),
            content: "body".into(),
            is_read: false,
            created_at: Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn ws_transport_implements_transport_trait() {
        fn assert_transport<T: Transport>() {}
        assert_transport::<WsTransport>();
    }

    #[tokio::test]
    async fn not_connected_initially() {
        let transport = WsTransport::new();
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn subscribe_without_connect_fails() {
        let transport = WsTransport::new();
        let result = transport.subscribe("/user/queue/notifications").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn recv_without_connect_fails() {
        let transport = WsTransport::new();
        let result = transport.recv().await;
        assert!(matches!(result, Err(TransportError::NotConnected)));
    }

    #[tokio::test]
    async fn close_without_connect_succeeds() {
        let transport = WsTransport::new();
        transport.close().await.unwrap();
        transport.close().await.unwrap();
    }

    #[tokio::test]
    async fn connect_to_unreachable_endpoint_fails() {
        let transport = WsTransport::with_config(WsTransportConfig {
            connect_timeout: Duration::from_millis(500),
            heartbeat_interval: Duration::ZERO,
        });
        let result = transport.connect("ws://127.0.0.1:1/ws?satoken=t").await;
        assert!(result.is_err());
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn subscribes_and_receives_pushed_frames() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let pushed = sample_notification();
        let expected = pushed.clone();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();

            // First inbound frame is the subscription bind.
            let msg = ws.next().await.unwrap().unwrap();
            let frame = SubscribeFrame::from_bytes(&msg.into_data()).unwrap();
            assert_eq!(frame.destination, "/user/queue/notifications");

            // Push one notification, then close.
            let body = String::from_utf8(pushed.to_frame().unwrap()).unwrap();
            ws.send(Message::text(body)).await.unwrap();
            ws.close(None).await.unwrap();
        });

        let transport = WsTransport::with_config(WsTransportConfig {
            connect_timeout: Duration::from_secs(5),
            heartbeat_interval: Duration::ZERO,
        });
        transport
            .connect(&format!("ws://{addr}/ws?satoken=tok"))
            .await
            .unwrap();
        assert!(transport.is_connected());

        transport
            .subscribe("/user/queue/notifications")
            .await
            .unwrap();

        let body = transport.recv().await.unwrap();
        let received = Notification::from_frame(&body).unwrap();
        assert_eq!(received, expected);

        // Server closed; the channel reports the drop.
        let result = transport.recv().await;
        assert!(matches!(result, Err(TransportError::ConnectionClosed)));
        assert!(!transport.is_connected());

        server.await.unwrap();
    }

    #[tokio::test]
    async fn client_heartbeat_pings_at_interval() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            loop {
                match ws.next().await {
                    Some(Ok(Message::Ping(_))) => return true,
                    Some(Ok(_)) => continue,
                    _ => return false,
                }
            }
        });

        let transport = WsTransport::with_config(WsTransportConfig {
            connect_timeout: Duration::from_secs(5),
            heartbeat_interval: Duration::from_millis(20),
        });
        transport
            .connect(&format!("ws://{addr}/ws?satoken=tok"))
            .await
            .unwrap();

        // Park in recv; the heartbeat clock inside it must fire.
        let recv = tokio::time::timeout(Duration::from_secs(2), transport.recv());
        let server = tokio::time::timeout(Duration::from_secs(2), server);

        let (_, saw_ping) = tokio::join!(recv, server);
        assert!(saw_ping.unwrap().unwrap(), "server never saw a ping");
    }

    #[tokio::test]
    async fn answers_server_pings_with_pongs() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            ws.send(Message::Ping(Bytes::from_static(b"hb"))).await.unwrap();
            loop {
                match ws.next().await {
                    Some(Ok(Message::Pong(payload))) => return payload == Bytes::from_static(b"hb"),
                    Some(Ok(_)) => continue,
                    _ => return false,
                }
            }
        });

        let transport = WsTransport::with_config(WsTransportConfig {
            connect_timeout: Duration::from_secs(5),
            heartbeat_interval: Duration::ZERO,
        });
        transport
            .connect(&format!("ws://{addr}/ws?satoken=tok"))
            .await
            .unwrap();

        let recv = tokio::time::timeout(Duration::from_secs(2), transport.recv());
        let server = tokio::time::timeout(Duration::from_secs(2), server);

        let (_, got_pong) = tokio::join!(recv, server);
        assert!(got_pong.unwrap().unwrap(), "server never saw the pong");
    }
}
