//! Access tokens issued by the token endpoint.

use crate::accessor::value_by_key;
use crate::error::{OAuth2Error, OAuth2Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Values of `expires` above this are absolute Unix timestamps, below it
/// they count seconds from now.
const ABSOLUTE_EXPIRY_THRESHOLD: i64 = 10 * 365 * 24 * 60 * 60;

const KNOWN_KEYS: [&str; 5] = [
    "access_token",
    "resource_owner_id",
    "refresh_token",
    "expires_in",
    "expires",
];

/// Access token plus whatever else the token endpoint returned
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessToken {
    token: String,
    expires_at: Option<DateTime<Utc>>,
    refresh_token: Option<String>,
    resource_owner_id: Option<String>,
    values: Map<String, Value>,
}

impl AccessToken {
    /// A bare token with no expiry, refresh token or owner.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            expires_at: None,
            refresh_token: None,
            resource_owner_id: None,
            values: Map::new(),
        }
    }

    /// Build a token from a parsed token-endpoint response.
    ///
    /// `resource_owner_id_key` names the response field holding the owner id,
    /// for providers that return one alongside the token.
    pub fn from_response(
        response: &Value,
        resource_owner_id_key: Option<&str>,
    ) -> OAuth2Result<Self> {
        Self::from_response_at(response, resource_owner_id_key, Utc::now())
    }

    pub(crate) fn from_response_at(
        response: &Value,
        resource_owner_id_key: Option<&str>,
        now: DateTime<Utc>,
    ) -> OAuth2Result<Self> {
        let object = response.as_object().ok_or_else(|| {
            OAuth2Error::InvalidTokenResponse("token response is not an object".to_string())
        })?;

        let token = object
            .get("access_token")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                OAuth2Error::InvalidTokenResponse(
                    "Required option not passed: \"access_token\"".to_string(),
                )
            })?
            .to_string();

        let expires_at = match (object.get("expires_in"), object.get("expires")) {
            (Some(expires_in), _) => {
                let seconds = integer_field("expires_in", expires_in)?;
                offset_from(now, seconds)
            }
            (None, Some(expires)) => {
                let value = integer_field("expires", expires)?;
                if value > ABSOLUTE_EXPIRY_THRESHOLD {
                    Utc.timestamp_opt(value, 0).single()
                } else {
                    offset_from(now, value)
                }
            }
            (None, None) => None,
        };

        let refresh_token = object
            .get("refresh_token")
            .and_then(Value::as_str)
            .map(String::from);

        let resource_owner_id = resource_owner_id_key
            .and_then(|key| value_by_key(response, key))
            .map(|value| match value {
                Value::String(id) => id.clone(),
                other => other.to_string(),
            });

        let values = object
            .iter()
            .filter(|(key, _)| !KNOWN_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(Self {
            token,
            expires_at,
            refresh_token,
            resource_owner_id,
            values,
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    pub fn resource_owner_id(&self) -> Option<&str> {
        self.resource_owner_id.as_deref()
    }

    /// Response fields other than the ones modelled above.
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn has_expired(&self) -> OAuth2Result<bool> {
        self.expires_at
            .map(|expires_at| expires_at <= Utc::now())
            .ok_or(OAuth2Error::NoExpiration)
    }
}

impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("resource_owner_id", &self.resource_owner_id)
            .field("values", &self.values)
            .finish()
    }
}

fn offset_from(now: DateTime<Utc>, seconds: i64) -> Option<DateTime<Utc>> {
    if seconds == 0 {
        return None;
    }
    Duration::try_seconds(seconds).and_then(|offset| now.checked_add_signed(offset))
}

// Form-encoded responses carry numbers as strings.
fn integer_field(name: &str, value: &Value) -> OAuth2Result<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| OAuth2Error::InvalidTokenResponse(format!("{} value must be an integer", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_json_response() {
        let response = json!({
            "access_token": "mock_access_token",
            "scope": "repo,gist",
            "token_type": "bearer"
        });

        let token = AccessToken::from_response(&response, None).unwrap();
        assert_eq!(token.token(), "mock_access_token");
        assert_eq!(token.expires_at(), None);
        assert_eq!(token.refresh_token(), None);
        assert_eq!(token.resource_owner_id(), None);
        assert_eq!(token.values().get("token_type"), Some(&json!("bearer")));
        assert!(!token.values().contains_key("access_token"));
        assert!(matches!(token.has_expired(), Err(OAuth2Error::NoExpiration)));
    }

    #[test]
    fn test_relative_and_absolute_expiry() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();

        let relative = json!({"access_token": "t", "expires": "3600"});
        let token = AccessToken::from_response_at(&relative, None, now).unwrap();
        assert_eq!(token.expires_at(), Some(now + Duration::seconds(3600)));

        let absolute = json!({"access_token": "t", "expires": 1_800_000_000});
        let token = AccessToken::from_response_at(&absolute, None, now).unwrap();
        assert_eq!(token.expires_at(), Utc.timestamp_opt(1_800_000_000, 0).single());

        let expires_in =
            json!({"access_token": "t", "expires_in": 60, "expires": 1_800_000_000});
        let token = AccessToken::from_response_at(&expires_in, None, now).unwrap();
        assert_eq!(token.expires_at(), Some(now + Duration::seconds(60)));
    }

    #[test]
    fn test_resource_owner_id_lookup() {
        let response = json!({"access_token": "t", "user": {"id": 99}});

        let token = AccessToken::from_response(&response, Some("user.id")).unwrap();
        assert_eq!(token.resource_owner_id(), Some("99"));
    }

    #[test]
    fn test_rejects_missing_token_and_bad_expiry() {
        let missing = json!({"token_type": "bearer"});
        assert!(matches!(
            AccessToken::from_response(&missing, None),
            Err(OAuth2Error::InvalidTokenResponse(_))
        ));

        let bad_expiry = json!({"access_token": "t", "expires_in": "soon"});
        assert!(matches!(
            AccessToken::from_response(&bad_expiry, None),
            Err(OAuth2Error::InvalidTokenResponse(_))
        ));
    }

    #[test]
    fn test_display_is_bare_token() {
        let token = AccessToken::new("abc");
        assert_eq!(token.to_string(), "abc");
        assert!(!format!("{:?}", token).contains("abc"));
    }
}
