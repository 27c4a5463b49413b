//! Translation of Disqus error payloads into provider errors.
//!
//! Disqus reports failures two ways: an HTTP error status with a `message`
//! field, or a successful status whose body carries an OAuth `error` field.
//! Both stop the flow.

use ras_oauth2_client::{ProviderError, ProviderErrorKind, ProviderResponse};
use serde_json::Value;

/// Classify a response. The first matching rule wins:
///
/// 1. status 400 or above is a client error,
/// 2. otherwise a non-null `error` in the body is an OAuth error,
/// 3. anything else is a success.
pub fn check_response(response: &ProviderResponse, data: &Value) -> Result<(), ProviderError> {
    if response.status_code >= 400 {
        return Err(client_error(response, data));
    }

    if data.get("error").is_some_and(|error| !error.is_null()) {
        return Err(oauth_error(response, data));
    }

    Ok(())
}

/// Error for an HTTP failure status. Prefers the body's `message`.
pub fn client_error(response: &ProviderResponse, data: &Value) -> ProviderError {
    from_response(ProviderErrorKind::Client, response, data, "message")
}

/// Error for an OAuth failure reported with a success status. Prefers the body's `error`.
pub fn oauth_error(response: &ProviderResponse, data: &Value) -> ProviderError {
    from_response(ProviderErrorKind::OAuth, response, data, "error")
}

fn from_response(
    kind: ProviderErrorKind,
    response: &ProviderResponse,
    data: &Value,
    message_key: &str,
) -> ProviderError {
    let message = match data.get(message_key) {
        Some(Value::String(message)) => message.clone(),
        Some(Value::Null) | None => response.reason_phrase.clone(),
        Some(other) => other.to_string(),
    };

    ProviderError::new(kind, message, response.status_code, response.body.clone())
}
