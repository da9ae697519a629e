//! The notification record pushed over the channel and fetched over REST.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{NotificationId, WireError};

/// A single notification as the service delivers it.
///
/// The same JSON shape arrives on both surfaces: as a REST list element
/// and as a channel frame body. Field names are camelCase on the wire.
/// Unknown fields are dropped; a missing `isRead` defaults to unread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Server-assigned identifier; identity across the local list.
    pub id: NotificationId,
    /// Notification category (comment, like, system, ...). Opaque here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Short display title.
    #[serde(default)]
    pub title: String,
    /// Body text.
    #[serde(default)]
    pub content: String,
    /// Whether the recipient has read this notification.
    ///
    /// Only ever transitions false to true client-side.
    #[serde(default)]
    pub is_read: bool,
    /// Server-side creation time.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Decode a notification from a channel frame body.
    pub fn from_frame(bytes: &[u8]) -> Result<Self, WireError> {
        serde_json::from_slice(bytes).map_err(WireError::Decode)
    }

    /// Encode this notification as a frame body (test fixtures, relays).
    pub fn to_frame(&self) -> Result<Vec<u8>, WireError> {
        serde_json::to_vec(self).map_err(WireError::Encode)
    }
}
