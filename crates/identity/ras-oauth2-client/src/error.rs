//! OAuth2 error types.

use std::fmt;
use thiserror::Error;

pub type OAuth2Result<T> = Result<T, OAuth2Error>;

/// Which rule of a provider's response check produced the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// The provider answered with an HTTP status of 400 or above.
    Client,
    /// The provider answered below 400 but the body carried an OAuth error.
    OAuth,
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderErrorKind::Client => f.write_str("client error"),
            ProviderErrorKind::OAuth => f.write_str("oauth error"),
        }
    }
}

/// Normalized error reported by an identity provider.
///
/// Carries the original status code and the raw body so callers can
/// inspect what the provider actually sent.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Identity provider {kind} (HTTP {status_code}): {message}")]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
    pub status_code: u16,
    pub raw_body: String,
}

impl ProviderError {
    pub fn new(
        kind: ProviderErrorKind,
        message: impl Into<String>,
        status_code: u16,
        raw_body: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code,
            raw_body: raw_body.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum OAuth2Error {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Invalid state parameter")]
    InvalidState,

    #[error("State not found or expired")]
    StateNotFound,

    #[error("Missing authorization code")]
    MissingAuthorizationCode,

    #[error("Invalid token response: {0}")]
    InvalidTokenResponse(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Access token has no expiration set")]
    NoExpiration,

    #[error("URL parsing error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Callback error: {0}")]
    CallbackError(String),
}
