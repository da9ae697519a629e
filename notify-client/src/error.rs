//! Client errors.

use thiserror::Error;

use crate::rest::RestError;
use crate::transport::TransportError;

/// Errors surfaced by the [`NotifyClient`](crate::NotifyClient) facade.
///
/// Channel-lifecycle failures never appear here; they feed the
/// reconnect path internally. What callers see are the failures of
/// operations they explicitly invoked.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The notification service rejected or failed a request.
    #[error("notification service error: {0}")]
    Rest(#[from] RestError),

    /// The service answered a clear operation with `false`.
    #[error("clear operation refused by server")]
    Rejected,
}
