//! Session token access.
//!
//! The auth provider is an external collaborator; the engine only ever
//! asks it for the current token, synchronously, at the moment a
//! connection attempt or REST request is made. Nothing caches a token —
//! they rotate.

/// Supplies the current session token, if any.
///
/// `None` means no authenticated session: connect attempts become
/// silent no-ops and REST requests go out without a session header.
pub trait TokenProvider: Send + Sync {
    /// The current session token.
    fn token(&self) -> Option<String>;
}

impl<F> TokenProvider for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn token(&self) -> Option<String> {
        self()
    }
}

/// A fixed token (or fixed absence of one).
#[derive(Debug, Clone)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    /// A provider that always returns the given token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    /// A provider with no session.
    pub fn none() -> Self {
        Self(None)
    }
}

impl TokenProvider for StaticToken {
    fn token(&self) -> Option<String> {
        self.0.clone()
    }
}
