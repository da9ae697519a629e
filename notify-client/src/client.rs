//! NotifyClient - the notification sync facade.
//!
//! Pure composition over the transport, the subscription router, the
//! REST gateway, and the notify-core state: `connect`/`disconnect`
//! drive the channel lifecycle, clear operations go server-first, and
//! everything readable is exposed as an [`InboxView`] snapshot behind a
//! `watch` channel.
//!
//! # Concurrency model
//!
//! One background session task owns the channel: it connects, binds the
//! subscription, refreshes the snapshot, pumps frames, and rides the
//! fixed-delay retry cycle until `disconnect()` signals shutdown. Inbox
//! mutations happen either on that task (push ingestion, refresh
//! completions) or after an awaited REST acknowledgment (clears); the
//! idempotency guards in [`Inbox`] are what make overlapping calls
//! safe, not mutual exclusion.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use notify_core::{Inbox, LinkEvent, LinkState};
use notify_types::{Notification, NotificationId};

use crate::config::SyncConfig;
use crate::error::ClientError;
use crate::rest::{HttpGateway, NotificationGateway};
use crate::router;
use crate::token::TokenProvider;
use crate::transport::{Transport, TransportError, WsTransport, WsTransportConfig};

/// Read-only snapshot of the synchronized state.
#[derive(Debug, Clone, Default)]
pub struct InboxView {
    /// Loaded notifications, newest first.
    pub notifications: Vec<Notification>,
    /// Authoritative unread counter.
    pub unread_count: u64,
    /// Whether the push channel is currently established.
    pub connected: bool,
}

impl InboxView {
    /// Whether anything is unread.
    pub fn has_unread(&self) -> bool {
        self.unread_count > 0
    }
}

/// Collaborators and state shared with the session task.
struct Shared<T, G> {
    config: SyncConfig,
    transport: T,
    gateway: G,
    tokens: Arc<dyn TokenProvider>,
    inbox: Mutex<Inbox>,
    link: Mutex<LinkState>,
    /// Session epoch for the stale-response guard: bumped on every
    /// established connection and on disconnect. REST completions that
    /// captured an older epoch discard their result.
    epoch: AtomicU64,
    view_tx: watch::Sender<InboxView>,
}

/// The running session: its shutdown signal and task handle.
struct Session {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// The notification sync engine facade.
///
/// Generic over the channel transport and the REST gateway so tests run
/// against [`MockTransport`](crate::MockTransport) and
/// [`MockGateway`](crate::MockGateway).
pub struct NotifyClient<T: Transport, G: NotificationGateway> {
    shared: Arc<Shared<T, G>>,
    session: Mutex<Option<Session>>,
}

impl<T, G> NotifyClient<T, G>
where
    T: Transport + 'static,
    G: NotificationGateway + 'static,
{
    /// Create a client from injected collaborators.
    pub fn new(config: SyncConfig, transport: T, gateway: G, tokens: Arc<dyn TokenProvider>) -> Self {
        let (view_tx, _) = watch::channel(InboxView::default());
        Self {
            shared: Arc::new(Shared {
                config,
                transport,
                gateway,
                tokens,
                inbox: Mutex::new(Inbox::new()),
                link: Mutex::new(LinkState::new()),
                epoch: AtomicU64::new(0),
                view_tx,
            }),
            session: Mutex::new(None),
        }
    }

    /// Start the push channel session.
    ///
    /// Silent no-op without a session token or while a session is
    /// already connecting, connected, or reconnecting. Channel failures
    /// never surface here; they feed the retry cycle.
    pub async fn connect(&self) {
        if self.shared.tokens.token().is_none() {
            tracing::debug!("connect skipped: no session token");
            return;
        }

        let mut session = self.session.lock().await;
        {
            let mut link = self.shared.link.lock().await;
            if link.is_active() {
                return;
            }
            let (next, _actions) = link.clone().on_event(LinkEvent::ConnectRequested);
            *link = next;
        }

        let (shutdown, shutdown_rx) = watch::channel(false);
        let shared = Arc::clone(&self.shared);
        let task = tokio::spawn(session_loop(shared, shutdown_rx));
        *session = Some(Session { shutdown, task });
    }

    /// Stop the session and tear the channel down. Idempotent.
    ///
    /// Cancels a pending retry timer, invalidates the subscription with
    /// the connection, and marks any in-flight REST result stale.
    pub async fn disconnect(&self) {
        let mut session = self.session.lock().await;
        let Some(Session { shutdown, task }) = session.take() else {
            return;
        };

        shutdown.send(true).ok();
        // Unblock a pump parked in recv(), then settle whatever the
        // task may have re-opened in the shutdown race window.
        self.shared.transport.close().await.ok();
        task.await.ok();
        self.shared.transport.close().await.ok();

        self.shared
            .apply_link_event(LinkEvent::DisconnectRequested)
            .await;
        self.shared.epoch.fetch_add(1, Ordering::SeqCst);
        self.shared.publish_view().await;
        tracing::info!("notification session closed");
    }

    /// Fetch a page of notifications into the local list.
    ///
    /// Full replace of the list; the unread counter is not touched.
    /// Failures are logged and local state keeps its last value.
    pub async fn fetch(&self, page: u32, size: u32) {
        self.shared.refresh_list(page, size).await;
    }

    /// Overwrite the unread counter with the server's value.
    pub async fn refresh_unread_count(&self) {
        self.shared.refresh_unread_count().await;
    }

    /// Mark every notification read, server-first.
    ///
    /// Local state mutates only after the server acknowledges; on any
    /// failure it is left untouched and the error surfaces.
    pub async fn clear_all(&self) -> Result<(), ClientError> {
        let epoch = self.shared.epoch.load(Ordering::SeqCst);
        let accepted = self.shared.gateway.clear_unread().await?;
        if !accepted {
            return Err(ClientError::Rejected);
        }
        if !self.shared.epoch_current(epoch) {
            tracing::debug!("discarding stale clear-all result");
            return Ok(());
        }
        self.shared.inbox.lock().await.mark_all_read();
        self.shared.publish_view().await;
        Ok(())
    }

    /// Mark one notification read, server-first.
    ///
    /// After the server acknowledges, the local entry transitions only
    /// if it exists and was unread; clearing an already-read or unknown
    /// id is a safe no-op.
    pub async fn clear_one(&self, id: NotificationId) -> Result<(), ClientError> {
        let epoch = self.shared.epoch.load(Ordering::SeqCst);
        let accepted = self.shared.gateway.clear_one(id).await?;
        if !accepted {
            return Err(ClientError::Rejected);
        }
        if !self.shared.epoch_current(epoch) {
            tracing::debug!("discarding stale clear result for {id}");
            return Ok(());
        }
        let changed = self.shared.inbox.lock().await.mark_read(id);
        if changed {
            self.shared.publish_view().await;
        }
        Ok(())
    }

    /// The loaded notifications, newest first.
    pub async fn notifications(&self) -> Vec<Notification> {
        self.shared.inbox.lock().await.items().to_vec()
    }

    /// The unread counter.
    pub async fn unread_count(&self) -> u64 {
        self.shared.inbox.lock().await.unread()
    }

    /// Whether anything is unread.
    pub async fn has_unread(&self) -> bool {
        self.shared.inbox.lock().await.has_unread()
    }

    /// Whether the push channel is currently established.
    pub async fn is_connected(&self) -> bool {
        self.shared.link.lock().await.is_connected()
    }

    /// The current lifecycle state.
    pub async fn link_state(&self) -> LinkState {
        self.shared.link.lock().await.clone()
    }

    /// Subscribe to snapshot updates.
    pub fn watch(&self) -> watch::Receiver<InboxView> {
        self.shared.view_tx.subscribe()
    }
}

impl NotifyClient<WsTransport, HttpGateway> {
    /// Create a client wired to the production WebSocket transport and
    /// reqwest gateway.
    pub fn with_defaults(
        config: SyncConfig,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, ClientError> {
        let transport = WsTransport::with_config(WsTransportConfig {
            connect_timeout: Duration::from_secs(30),
            heartbeat_interval: config.heartbeat_interval,
        });
        let gateway = HttpGateway::new(
            config.api_url.clone(),
            config.request_timeout,
            Arc::clone(&tokens),
        )?;
        Ok(Self::new(config, transport, gateway, tokens))
    }
}

impl<T, G> Shared<T, G>
where
    T: Transport,
    G: NotificationGateway,
{
    async fn apply_link_event(&self, event: LinkEvent) {
        let mut link = self.link.lock().await;
        let (next, _actions) = link.clone().on_event(event);
        *link = next;
    }

    fn epoch_current(&self, epoch: u64) -> bool {
        self.epoch.load(Ordering::SeqCst) == epoch
    }

    async fn publish_view(&self) {
        let (notifications, unread_count) = {
            let inbox = self.inbox.lock().await;
            (inbox.items().to_vec(), inbox.unread())
        };
        let connected = self.link.lock().await.is_connected();
        self.view_tx.send_replace(InboxView {
            notifications,
            unread_count,
            connected,
        });
    }

    async fn ingest_push(&self, notification: Notification) {
        let applied = self.inbox.lock().await.apply_push(notification);
        if applied {
            self.publish_view().await;
        }
    }

    async fn refresh_list(&self, page: u32, size: u32) {
        let epoch = self.epoch.load(Ordering::SeqCst);
        match self.gateway.list(page, size).await {
            Ok(items) => {
                if !self.epoch_current(epoch) {
                    tracing::debug!("discarding stale notification page");
                    return;
                }
                self.inbox.lock().await.replace(items);
                self.publish_view().await;
            }
            Err(e) => tracing::warn!("notification list refresh failed: {e}"),
        }
    }

    async fn refresh_unread_count(&self) {
        let epoch = self.epoch.load(Ordering::SeqCst);
        match self.gateway.unread_count().await {
            Ok(count) => {
                if !self.epoch_current(epoch) {
                    tracing::debug!("discarding stale unread count");
                    return;
                }
                self.inbox.lock().await.set_unread(count);
                self.publish_view().await;
            }
            Err(e) => tracing::warn!("unread count refresh failed: {e}"),
        }
    }
}

/// Build the channel URL for one attempt. The token is a query
/// parameter (the channel endpoint has no header auth) and must never
/// be logged.
fn channel_url(base: &str, token: &str) -> String {
    format!("{}/ws?satoken={}", base.trim_end_matches('/'), token)
}

/// The session task: connect, bind, refresh, pump, retry — until the
/// shutdown signal fires.
async fn session_loop<T, G>(shared: Arc<Shared<T, G>>, mut shutdown: watch::Receiver<bool>)
where
    T: Transport + 'static,
    G: NotificationGateway + 'static,
{
    loop {
        if *shutdown.borrow() {
            break;
        }

        // The token is read fresh for every attempt; tokens rotate
        // between retries.
        let attempt = match shared.tokens.token() {
            Some(token) => {
                let url = channel_url(&shared.config.channel_url, &token);
                shared.transport.connect(&url).await
            }
            None => Err(TransportError::ConnectionFailed(
                "no session token".into(),
            )),
        };

        match attempt {
            Ok(()) => {
                shared.apply_link_event(LinkEvent::ConnectSucceeded).await;
                shared.epoch.fetch_add(1, Ordering::SeqCst);
                tracing::info!("notification channel connected");
                shared.publish_view().await;

                // One subscription per session; failure is non-fatal
                // and only a reconnect re-binds.
                router::bind(&shared.transport).await;

                // Refresh both halves of the snapshot. The counter is
                // authoritative and corrects for events missed while
                // disconnected.
                shared.refresh_list(1, shared.config.page_size).await;
                shared.refresh_unread_count().await;

                // Pump frames until the channel drops or we shut down.
                let drop_reason = loop {
                    tokio::select! {
                        _ = shutdown.changed() => break None,
                        event = router::next_event(&shared.transport) => match event {
                            Ok(notification) => shared.ingest_push(notification).await,
                            Err(e) => break Some(e.to_string()),
                        },
                    }
                };

                let Some(reason) = drop_reason else { break };
                if *shutdown.borrow() {
                    break;
                }
                tracing::warn!("notification channel lost: {reason}");
                shared
                    .apply_link_event(LinkEvent::ConnectionLost { reason })
                    .await;
                shared.publish_view().await;
            }
            Err(e) => {
                tracing::warn!("notification channel connect failed: {e}");
                shared
                    .apply_link_event(LinkEvent::ConnectFailed {
                        error: e.to_string(),
                    })
                    .await;
                shared.publish_view().await;
            }
        }

        // Fixed-delay retry, cancelled by disconnect().
        tokio::select! {
            _ = tokio::time::sleep(shared.config.reconnect_delay) => {
                shared.apply_link_event(LinkEvent::RetryTimer).await;
            }
            _ = shutdown.changed() => break,
        }
    }
}
