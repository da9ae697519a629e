//! Subscription router: binds the per-session topic and turns raw
//! frames into typed notifications.
//!
//! Exactly one topic is subscribed per session. Subscription failures
//! are non-fatal and there is no mid-connection resubscribe; a full
//! reconnect is what re-binds. Malformed frames are dropped and logged,
//! never crashing the router or stalling the channel.

use notify_types::Notification;

use crate::transport::{Transport, TransportError};

/// The one topic a session subscribes to. The server scopes it to the
/// authenticated user.
pub const NOTIFICATION_TOPIC: &str = "/user/queue/notifications";

/// Bind the session's subscription on a freshly connected transport.
pub(crate) async fn bind<T: Transport>(transport: &T) {
    match transport.subscribe(NOTIFICATION_TOPIC).await {
        Ok(id) => tracing::debug!("notification subscription bound: {id}"),
        Err(e) => {
            // Pushes stay undelivered until the next reconnect; the
            // channel itself remains usable.
            tracing::warn!("notification subscription failed: {e}");
        }
    }
}

/// Decode a frame body, dropping (and logging) malformed input.
pub(crate) fn decode_frame(body: &[u8]) -> Option<Notification> {
    match Notification::from_frame(body) {
        Ok(notification) => Some(notification),
        Err(e) => {
            tracing::warn!("dropping malformed notification frame: {e}");
            None
        }
    }
}

/// Yield the next decodable notification from the channel.
///
/// Invoked once per frame, to completion, before the next frame is
/// read — handler invocations never overlap. Returns an error when the
/// connection drops or closes.
pub(crate) async fn next_event<T: Transport>(
    transport: &T,
) -> Result<Notification, TransportError> {
    loop {
        let body = transport.recv().await?;
        if let Some(notification) = decode_frame(&body) {
            return Ok(notification);
        }
    }
}
