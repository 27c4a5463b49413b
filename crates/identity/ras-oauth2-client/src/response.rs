//! Transport-level view of provider responses.

use crate::error::{OAuth2Error, OAuth2Result};
use reqwest::header::CONTENT_TYPE;
use serde_json::{Map, Value};
use url::form_urlencoded;

/// Status line, content type and body of an HTTP response from the provider.
///
/// Provider adapters inspect this (together with the parsed body) when
/// deciding whether a response is an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderResponse {
    pub status_code: u16,
    pub reason_phrase: String,
    pub content_type: Option<String>,
    pub body: String,
}

impl ProviderResponse {
    /// Build a response with the canonical reason phrase for `status_code`.
    pub fn new(status_code: u16, content_type: Option<&str>, body: impl Into<String>) -> Self {
        let reason_phrase = reqwest::StatusCode::from_u16(status_code)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or_default()
            .to_string();

        Self {
            status_code,
            reason_phrase,
            content_type: content_type.map(String::from),
            body: body.into(),
        }
    }

    /// Drain a `reqwest` response into a `ProviderResponse`.
    pub async fn read(response: reqwest::Response) -> OAuth2Result<Self> {
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(String::from);
        let body = response.text().await?;

        Ok(Self {
            status_code: status.as_u16(),
            reason_phrase: status.canonical_reason().unwrap_or_default().to_string(),
            content_type,
            body,
        })
    }

    pub fn is_form_encoded(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|content_type| content_type.contains("urlencoded"))
    }

    /// Decode the body.
    ///
    /// Form-encoded bodies become an object of strings, everything else is
    /// read as JSON.
    pub fn parse_body(&self) -> OAuth2Result<Value> {
        if self.is_form_encoded() {
            let fields: Map<String, Value> = form_urlencoded::parse(self.body.as_bytes())
                .map(|(key, value)| (key.into_owned(), Value::String(value.into_owned())))
                .collect();
            return Ok(Value::Object(fields));
        }

        serde_json::from_str(&self.body).map_err(|e| {
            if self.status_code == 500 {
                OAuth2Error::UnexpectedResponse(
                    "An OAuth server error was encountered that did not contain a JSON body"
                        .to_string(),
                )
            } else {
                OAuth2Error::UnexpectedResponse(format!("Failed to parse JSON response: {}", e))
            }
        })
    }
}
