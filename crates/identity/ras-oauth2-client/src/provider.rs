//! Extension points a concrete identity provider implements.

use crate::config::ClientCredentials;
use crate::error::ProviderError;
use crate::pkce::PkceMethod;
use crate::response::ProviderResponse;
use crate::token::AccessToken;
use serde_json::Value;
use std::collections::HashMap;

/// The authenticated user as seen by a provider.
pub trait ResourceOwner: Send + Sync {
    /// Provider-side identifier of the user, if the payload carried one.
    fn resource_owner_id(&self) -> Option<String>;

    /// The raw payload the owner was built from.
    fn to_structured(&self) -> &Value;
}

/// Provider-specific behaviour plugged into [`AuthorizationCodeClient`].
///
/// Implementors supply endpoint URLs, scope handling, response validation and
/// the resource owner type. The client owns the flow itself.
///
/// [`AuthorizationCodeClient`]: crate::AuthorizationCodeClient
pub trait OAuth2Provider: Send + Sync {
    type ResourceOwner: ResourceOwner;

    /// Short identifier recorded with pending authorization state.
    fn provider_id(&self) -> &str;

    fn credentials(&self) -> &ClientCredentials;

    fn base_authorization_url(&self) -> String;

    /// Token endpoint. `params` are the grant parameters about to be sent.
    fn base_access_token_url(&self, params: &HashMap<String, String>) -> String;

    fn resource_owner_details_url(&self, token: &AccessToken) -> String;

    fn default_scopes(&self) -> Vec<String>;

    fn scope_separator(&self) -> &str {
        " "
    }

    /// Token response field holding the resource owner id, if any.
    fn access_token_resource_owner_id(&self) -> Option<&str> {
        None
    }

    fn pkce_method(&self) -> Option<PkceMethod> {
        None
    }

    /// Extra headers sent with authenticated requests.
    fn authorization_headers(&self, _token: &AccessToken) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Decide whether a response is an error. Runs on every response, before
    /// the body is used.
    fn check_response(&self, response: &ProviderResponse, data: &Value)
    -> Result<(), ProviderError>;

    fn create_resource_owner(&self, response: Value, token: &AccessToken) -> Self::ResourceOwner;
}
