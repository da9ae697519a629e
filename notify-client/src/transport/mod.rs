//! Transport abstraction for the push channel.
//!
//! This module provides a pluggable transport layer that abstracts the
//! underlying duplex connection (WebSocket in production, mock for
//! testing).
//!
//! # Design
//!
//! The transport trait is async and connection-oriented:
//! - `connect()` opens the channel against a token-parameterized URL
//! - `subscribe()` binds the per-session topic
//! - `recv()` yields the next inbound frame body
//! - `close()` tears the channel down
//!
//! Heartbeating is internal to implementations; callers only configure
//! the interval. One logical connection exists at a time — a second
//! `connect()` replaces the first.

mod mock;
mod ws;

pub use mock::MockTransport;
pub use ws::{WsTransport, WsTransportConfig};

use async_trait::async_trait;
use notify_types::SubscriptionId;
use thiserror::Error;

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Not connected.
    #[error("not connected")]
    NotConnected,

    /// Connection closed.
    #[error("connection closed")]
    ConnectionClosed,

    /// Subscription bind failed.
    #[error("subscribe failed: {0}")]
    SubscribeFailed(String),

    /// Send failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Receive failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// Connection timeout.
    #[error("connection timeout")]
    Timeout,
}

/// Transport trait for the duplex push channel.
///
/// Implementations handle the underlying connection mechanism
/// (WebSocket, mock, etc).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open the channel against the given URL.
    ///
    /// The URL carries the session token as a query parameter; it is
    /// built fresh for every attempt and must not be retained or
    /// logged by implementations.
    async fn connect(&self, url: &str) -> Result<(), TransportError>;

    /// Bind a subscription to a topic on the live connection.
    ///
    /// Returns the handle identifying the subscription; the handle dies
    /// with the connection.
    async fn subscribe(&self, topic: &str) -> Result<SubscriptionId, TransportError>;

    /// Receive the next inbound frame body.
    ///
    /// Blocks until a frame arrives or the connection closes.
    async fn recv(&self) -> Result<Vec<u8>, TransportError>;

    /// Check if currently connected.
    fn is_connected(&self) -> bool;

    /// Close the connection. Idempotent.
    async fn close(&self) -> Result<(), TransportError>;
}
