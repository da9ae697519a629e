//! REST gateway for the notification service.
//!
//! All four operations live under a configurable base URL and
//! authenticate with a per-request session header. Every response body
//! is wrapped in the service's `{status, message, data}` envelope.

use async_trait::async_trait;
use notify_types::{Notification, NotificationId};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

use crate::token::TokenProvider;

/// Header carrying the session token on REST requests.
pub const SESSION_HEADER: &str = "satoken";

/// REST gateway errors.
#[derive(Debug, Error)]
pub enum RestError {
    /// Request never produced a usable response (network, timeout,
    /// non-success HTTP status).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service reported the session as expired (envelope 401).
    #[error("session expired")]
    SessionExpired,

    /// The service reported a non-success envelope status.
    #[error("service returned {status}: {message}")]
    Status {
        /// Envelope status code.
        status: u16,
        /// Envelope message.
        message: String,
    },

    /// A success envelope arrived without its data payload.
    #[error("response missing data payload")]
    MissingData,
}

/// The four notification service operations.
///
/// Implemented by [`HttpGateway`] in production and [`MockGateway`] in
/// tests.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// Fetch one page of notifications, newest first.
    async fn list(&self, page: u32, size: u32) -> Result<Vec<Notification>, RestError>;

    /// Fetch the authoritative unread count.
    async fn unread_count(&self) -> Result<u64, RestError>;

    /// Mark every notification read. Returns the server's verdict.
    async fn clear_unread(&self) -> Result<bool, RestError>;

    /// Mark one notification read. Returns the server's verdict.
    async fn clear_one(&self, id: NotificationId) -> Result<bool, RestError>;
}

/// The `{status, message, data}` envelope around every response body.
///
/// A missing `status` means 200, matching the service's behavior.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    #[serde(default = "default_status")]
    status: u16,
    #[serde(default)]
    message: String,
    data: Option<T>,
}

fn default_status() -> u16 {
    200
}

impl<T> ApiResponse<T> {
    fn into_data(self) -> Result<T, RestError> {
        match self.status {
            200 => self.data.ok_or(RestError::MissingData),
            401 => Err(RestError::SessionExpired),
            status => Err(RestError::Status {
                status,
                message: self.message,
            }),
        }
    }
}

/// Production gateway over reqwest.
pub struct HttpGateway {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl HttpGateway {
    /// Create a gateway against a base URL.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, RestError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            tokens,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut request = self.http.request(method, self.endpoint(path));
        if let Some(token) = self.tokens.token() {
            request = request.header(SESSION_HEADER, token);
        }
        request
    }

    async fn execute<T: DeserializeOwned>(
        request: reqwest::RequestBuilder,
    ) -> Result<T, RestError> {
        let response = request.send().await?.error_for_status()?;
        let envelope: ApiResponse<T> = response.json().await?;
        envelope.into_data()
    }
}

#[async_trait]
impl NotificationGateway for HttpGateway {
    async fn list(&self, page: u32, size: u32) -> Result<Vec<Notification>, RestError> {
        let request = self
            .request(reqwest::Method::GET, "/notification/list")
            .query(&[("page", page), ("size", size)]);
        Self::execute(request).await
    }

    async fn unread_count(&self) -> Result<u64, RestError> {
        let request = self.request(reqwest::Method::GET, "/notification/unread-count");
        Self::execute(request).await
    }

    async fn clear_unread(&self) -> Result<bool, RestError> {
        let request = self.request(reqwest::Method::POST, "/notification/clear-unread");
        Self::execute(request).await
    }

    async fn clear_one(&self, id: NotificationId) -> Result<bool, RestError> {
        let request = self.request(
            reqwest::Method::POST,
            &format!("/notification/clear-one/{id}"),
        );
        Self::execute(request).await
    }
}

/// A recorded call against the mock gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    /// `list(page, size)`.
    List {
        /// Requested page.
        page: u32,
        /// Requested page size.
        size: u32,
    },
    /// `unread_count()`.
    UnreadCount,
    /// `clear_unread()`.
    ClearUnread,
    /// `clear_one(id)`.
    ClearOne(NotificationId),
}

/// Mock gateway for testing.
///
/// Results are scripted per operation; an exhausted queue yields a
/// benign default (empty page, zero count, accepted clear). Calls are
/// recorded for verification and an optional latency simulates
/// in-flight requests.
#[derive(Debug, Default)]
pub struct MockGateway {
    inner: Arc<Mutex<MockGatewayInner>>,
}

#[derive(Debug, Default)]
struct MockGatewayInner {
    list_results: VecDeque<Result<Vec<Notification>, RestError>>,
    count_results: VecDeque<Result<u64, RestError>>,
    clear_all_results: VecDeque<Result<bool, RestError>>,
    clear_one_results: VecDeque<Result<bool, RestError>>,
    latency: Option<Duration>,
    calls: Vec<GatewayCall>,
}

impl MockGateway {
    /// Create a new mock gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a result for the next `list` call.
    pub fn queue_list(&self, result: Result<Vec<Notification>, RestError>) {
        self.inner.lock().unwrap().list_results.push_back(result);
    }

    /// Queue a result for the next `unread_count` call.
    pub fn queue_unread_count(&self, result: Result<u64, RestError>) {
        self.inner.lock().unwrap().count_results.push_back(result);
    }

    /// Queue a result for the next `clear_unread` call.
    pub fn queue_clear_unread(&self, result: Result<bool, RestError>) {
        self.inner.lock().unwrap().clear_all_results.push_back(result);
    }

    /// Queue a result for the next `clear_one` call.
    pub fn queue_clear_one(&self, result: Result<bool, RestError>) {
        self.inner.lock().unwrap().clear_one_results.push_back(result);
    }

    /// Delay every subsequent operation by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.inner.lock().unwrap().latency = Some(latency);
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    async fn simulate_latency(&self) {
        let latency = self.inner.lock().unwrap().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn record(&self, call: GatewayCall) {
        self.inner.lock().unwrap().calls.push(call);
    }
}

impl Clone for MockGateway {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl NotificationGateway for MockGateway {
    async fn list(&self, page: u32, size: u32) -> Result<Vec<Notification>, RestError> {
        self.record(GatewayCall::List { page, size });
        self.simulate_latency().await;
        self.inner
            .lock()
            .unwrap()
            .list_results
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn unread_count(&self) -> Result<u64, RestError> {
        self.record(GatewayCall::UnreadCount);
        self.simulate_latency().await;
        self.inner
            .lock()
            .unwrap()
            .count_results
            .pop_front()
            .unwrap_or(Ok(0))
    }

    async fn clear_unread(&self) -> Result<bool, RestError> {
        self.record(GatewayCall::ClearUnread);
        self.simulate_latency().await;
        self.inner
            .lock()
            .unwrap()
            .clear_all_results
            .pop_front()
            .unwrap_or(Ok(true))
    }

    async fn clear_one(&self, id: NotificationId) -> Result<bool, RestError> {
        self.record(GatewayCall::ClearOne(id));
        self.simulate_latency().await;
        self.inner
            .lock()
            .unwrap()
            .clear_one_results
            .pop_front()
            .unwrap_or(Ok(true))
    }
}
