//! Error types for Gangway.

use thiserror::Error;

use crate::token::TokenSnapshot;

/// Primary error type for all credential operations.
///
/// Display messages say whether the on-disk cache is still usable:
/// [`AuthError::RefreshFailed`] means it is not and an interactive login is
/// required, while [`AuthError::PersistFailed`] means authentication itself
/// succeeded and only the disk write was lost.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid authority configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Authorization was declined")]
    AuthorizationDeclined,

    #[error("Device code expired before authorization completed")]
    AuthorizationTimeout,

    #[error("Login cancelled")]
    Cancelled,

    #[error("Consent declined; nothing was persisted")]
    ConsentDeclined,

    #[error("Cached token is unreadable: {0}")]
    CacheCorrupt(String),

    #[error("No cached token found; run login first")]
    NoCachedToken,

    #[error("Token refresh failed ({0}); the cached token can no longer be used, run login again")]
    RefreshFailed(String),

    #[error("Failed to {op}: {message}")]
    FileSystem { op: &'static str, message: String },

    #[error("Authentication succeeded but the token could not be persisted: {source}")]
    PersistFailed {
        /// The snapshot acquired before persistence failed; still valid for use.
        snapshot: Box<TokenSnapshot>,
        source: Box<AuthError>,
    },
}

impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(error: serde_json::Error) -> Self {
        Self::CacheCorrupt(error.to_string())
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, AuthError>;
