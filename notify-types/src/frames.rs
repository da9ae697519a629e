//! Client-to-server channel frames.
//!
//! The push channel is almost entirely server-to-client; the one frame a
//! client sends is the subscription bind after connect.

use serde::{Deserialize, Serialize};

use crate::{SubscriptionId, WireError};

/// Binds a subscription to a destination topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "subscribe", rename_all = "camelCase")]
pub struct SubscribeFrame {
    /// Client-minted handle for this subscription.
    pub id: SubscriptionId,
    /// Topic to subscribe to, scoped server-side to the session's user.
    pub destination: String,
}

impl SubscribeFrame {
    /// Create a subscribe frame for a destination with a fresh handle.
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            id: SubscriptionId::new(),
            destination: destination.into(),
        }
    }

    /// Serialize to a JSON frame body.
    pub fn to_bytes(&self) -> Result<Vec<u8>, WireError> {
        serde_json::to_vec(self).map_err(WireError::Encode)
    }

    /// Serialize to a JSON string (for text-frame transports).
    pub fn to_json(&self) -> Result<String, WireError> {
        serde_json::to_string(self).map_err(WireError::Encode)
    }

    /// Deserialize from a JSON frame body.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WireError> {
        serde_json::from_slice(bytes).map_err(WireError::Decode)
    }
}
