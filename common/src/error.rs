// common/src/error.rs
use thiserror::Error;

/// Login handshake rejections. These are terminal, user-facing outcomes of a
/// single handshake attempt and are never retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("malformed login token")]
    MalformedToken,

    #[error("login token outside the freshness window")]
    TokenExpired,

    #[error("signature does not verify against the embedded public key")]
    InvalidSignature,

    #[error("public key is not authorized for this account")]
    UnauthorizedKey,

    /// The wallet network could not be reached or returned garbage. Surfaced
    /// distinctly from the other rejections so a caller may retry the whole
    /// handshake with a fresh token.
    #[error("identity provider unavailable: {0}")]
    IdentityProviderUnavailable(String),
}

/// Faults raised inside a keyed actor. These are internal: handlers log them
/// with context and answer the external caller with an opaque failure.
#[derive(Debug, Clone, Error)]
pub enum ActorError {
    /// Loading durable state on first use failed. Not cached: the next
    /// operation against the same actor retries initialization.
    #[error("actor initialization failed: {0}")]
    Initialization(String),

    #[error("storage failure: {0}")]
    Storage(String),

    /// The actor's mailbox is gone (actor stopped or system shutting down)
    #[error("actor mailbox unavailable: {0}")]
    Mailbox(String),
}
