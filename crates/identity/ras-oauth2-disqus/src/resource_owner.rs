//! The Disqus user behind an access token.

use ras_oauth2_client::ResourceOwner;
use ras_oauth2_client::accessor::{i64_by_key, str_by_key};
use serde_json::Value;

/// Read-only view of a `users/details.json` response.
///
/// Disqus nests the profile under `response`. Fields that are missing or of
/// an unexpected type read as `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct DisqusResourceOwner {
    response: Value,
}

impl DisqusResourceOwner {
    pub fn new(response: Value) -> Self {
        Self { response }
    }

    pub fn id(&self) -> Option<i64> {
        i64_by_key(&self.response, "response.id")
    }

    pub fn name(&self) -> Option<&str> {
        str_by_key(&self.response, "response.name")
    }

    pub fn username(&self) -> Option<&str> {
        str_by_key(&self.response, "response.username")
    }

    /// The full payload, for fields beyond the accessors above.
    pub fn to_structured(&self) -> &Value {
        &self.response
    }

    pub fn into_structured(self) -> Value {
        self.response
    }
}

impl Default for DisqusResourceOwner {
    fn default() -> Self {
        Self::new(Value::Object(Default::default()))
    }
}

impl ResourceOwner for DisqusResourceOwner {
    fn resource_owner_id(&self) -> Option<String> {
        self.id().map(|id| id.to_string())
    }

    fn to_structured(&self) -> &Value {
        &self.response
    }
}
