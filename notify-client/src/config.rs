//! Configuration for NotifyClient.

use std::time::Duration;

/// Configuration for the notification sync engine.
///
/// Only the two base URLs are required; everything else has the
/// service's documented defaults.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Base URL of the REST notification service.
    pub api_url: String,
    /// Base URL of the push channel endpoint (the `/ws` path is added).
    pub channel_url: String,
    /// Fixed delay between reconnect attempts (default: 5 s).
    ///
    /// Deliberately not an exponential backoff; attempts run until
    /// connect succeeds or `disconnect()` is called.
    pub reconnect_delay: Duration,
    /// Heartbeat interval, symmetric both directions (default: 4000 ms).
    pub heartbeat_interval: Duration,
    /// Page size for list refreshes (default: 10).
    pub page_size: u32,
    /// Timeout applied to each REST request (default: 20 s).
    pub request_timeout: Duration,
}

impl SyncConfig {
    /// Create a configuration with default timings.
    pub fn new(api_url: impl Into<String>, channel_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            channel_url: channel_url.into(),
            reconnect_delay: Duration::from_secs(5),
            heartbeat_interval: Duration::from_millis(4000),
            page_size: 10,
            request_timeout: Duration::from_secs(20),
        }
    }

    /// Set the fixed reconnect delay.
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Set the heartbeat interval (zero disables client heartbeats).
    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    /// Set the list page size.
    pub fn with_page_size(mut self, size: u32) -> Self {
        self.page_size = size;
        self
    }

    /// Set the REST request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
