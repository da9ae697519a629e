//! Mock transport for testing.
//!
//! Scriptable connect failures, recorded URLs and topics, and an
//! awaitable frame queue so `recv` parks like a live socket instead of
//! erroring when nothing is buffered.

use super::{Transport, TransportError};
use async_trait::async_trait;
use notify_types::SubscriptionId;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Mock transport for testing.
#[derive(Debug, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<Inner>>,
    wake: Arc<Notify>,
}

#[derive(Debug, Default)]
struct Inner {
    connected: bool,
    connect_attempts: u32,
    fail_connects: u32,
    fail_all_connects: bool,
    fail_next_subscribe: Option<String>,
    connect_urls: Vec<String>,
    subscribed_topics: Vec<String>,
    frames: VecDeque<Vec<u8>>,
}

impl MockTransport {
    /// Create a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a frame body to be yielded by `recv()`.
    pub fn queue_frame(&self, body: Vec<u8>) {
        self.inner.lock().unwrap().frames.push_back(body);
        self.wake.notify_one();
    }

    /// Simulate an unplanned connection drop.
    ///
    /// A parked `recv()` returns `ConnectionClosed`; queued frames
    /// delivered first.
    pub fn drop_connection(&self) {
        self.inner.lock().unwrap().connected = false;
        self.wake.notify_one();
    }

    /// Fail the next `count` connect attempts.
    pub fn fail_connects(&self, count: u32) {
        self.inner.lock().unwrap().fail_connects = count;
    }

    /// Fail every connect attempt until turned off again.
    pub fn fail_all_connects(&self, fail: bool) {
        self.inner.lock().unwrap().fail_all_connects = fail;
    }

    /// Cause the next `subscribe()` to fail with the given error.
    pub fn fail_next_subscribe(&self, error: &str) {
        self.inner.lock().unwrap().fail_next_subscribe = Some(error.to_string());
    }

    /// How many connect attempts were made (including failed ones).
    pub fn connect_attempts(&self) -> u32 {
        self.inner.lock().unwrap().connect_attempts
    }

    /// Every URL passed to `connect()`, in order.
    pub fn connect_urls(&self) -> Vec<String> {
        self.inner.lock().unwrap().connect_urls.clone()
    }

    /// Every topic passed to `subscribe()`, in order.
    pub fn subscribed_topics(&self) -> Vec<String> {
        self.inner.lock().unwrap().subscribed_topics.clone()
    }
}

impl Clone for MockTransport {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            wake: Arc::clone(&self.wake),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&self, url: &str) -> Result<(), TransportError> {
        let mut inner = self.inner.lock().unwrap();
        inner.connect_attempts = inner.connect_attempts.saturating_add(1);

        if inner.fail_all_connects {
            return Err(TransportError::ConnectionFailed("forced failure".into()));
        }
        if inner.fail_connects > 0 {
            inner.fail_connects -= 1;
            return Err(TransportError::ConnectionFailed("forced failure".into()));
        }

        inner.connected = true;
        inner.connect_urls.push(url.to_string());
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<SubscriptionId, TransportError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.connected {
            return Err(TransportError::NotConnected);
        }
        if let Some(error) = inner.fail_next_subscribe.take() {
            return Err(TransportError::SubscribeFailed(error));
        }
        inner.subscribed_topics.push(topic.to_string());
        Ok(SubscriptionId::new())
    }

    async fn recv(&self) -> Result<Vec<u8>, TransportError> {
        loop {
            {
                let mut inner = self.inner.lock().unwrap();
                if let Some(frame) = inner.frames.pop_front() {
                    return Ok(frame);
                }
                if !inner.connected {
                    return Err(TransportError::ConnectionClosed);
                }
            }
            self.wake.notified().await;
        }
    }

    fn is_connected(&self) -> bool {
        self.inner.lock().unwrap().connected
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.inner.lock().unwrap().connected = false;
        self.wake.notify_one();
        Ok(())
    }
}
