//! Error types for notify-sync wire codecs.

use thiserror::Error;

/// Errors from encoding or decoding wire payloads.
#[derive(Debug, Error)]
pub enum WireError {
    /// JSON serialization failed.
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// JSON deserialization failed.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<WireError>();
    }
}
