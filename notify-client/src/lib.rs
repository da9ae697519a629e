//! # notify-client
//!
//! The I/O half of the notify-sync notification engine: a reconnecting
//! push channel, the REST gateway, and the [`NotifyClient`] facade that
//! keeps a client-local notification view consistent with the server.
//!
//! # Architecture
//!
//! NotifyClient drives the pure state machine from notify-core and
//! interprets its actions as actual I/O via the [`Transport`] and
//! [`NotificationGateway`] traits.
//!
//! ```text
//! Application → NotifyClient → Transport / Gateway → Network
//!                    ↓
//!               notify-core (pure state machine + inbox)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use notify_sync_client::{NotifyClient, StaticToken, SyncConfig};
//! use std::sync::Arc;
//!
//! let config = SyncConfig::new("https://api.example.com", "wss://api.example.com");
//! let client = NotifyClient::with_defaults(config, Arc::new(StaticToken::new("tok")))?;
//!
//! client.connect().await;
//! let mut view = client.watch();
//! while view.changed().await.is_ok() {
//!     println!("unread: {}", view.borrow().unread_count);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod client;
mod config;
mod error;
mod rest;
mod router;
mod token;
pub mod transport;

pub use client::{InboxView, NotifyClient};
pub use config::SyncConfig;
pub use error::ClientError;
pub use rest::{GatewayCall, HttpGateway, MockGateway, NotificationGateway, RestError};
pub use router::NOTIFICATION_TOPIC;
pub use token::{StaticToken, TokenProvider};
pub use transport::{MockTransport, Transport, TransportError, WsTransport, WsTransportConfig};
