//! Disqus endpoints and the provider implementation.

use crate::config::DisqusConfig;
use crate::error;
use crate::resource_owner::DisqusResourceOwner;
use ras_oauth2_client::{
    AccessToken, ClientCredentials, OAuth2Provider, ProviderError, ProviderResponse,
};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

pub const DEFAULT_SCOPES: [&str; 1] = ["read"];

/// Disqus expects comma-separated scopes.
pub const SCOPE_SEPARATOR: &str = ",";

pub fn authorization_url(config: &DisqusConfig) -> String {
    format!("{}/api/oauth/2.0/authorize/", config.domain)
}

/// Token endpoint. The grant parameters do not affect it.
pub fn token_url(config: &DisqusConfig, _params: &HashMap<String, String>) -> String {
    format!("{}/api/oauth/2.0/access_token/", config.domain)
}

/// Profile endpoint for the token's owner.
///
/// Disqus authenticates this call with the application key and secret in the
/// query string, so the returned URL must be handled as a secret.
pub fn resource_owner_details_url(config: &DisqusConfig, token: &AccessToken) -> String {
    format!(
        "{}/api/3.0/users/details.json?access_token={}&api_key={}&api_secret={}",
        config.domain,
        token,
        config.client_id(),
        config.client_secret()
    )
}

pub fn default_scopes() -> Vec<String> {
    DEFAULT_SCOPES.iter().map(|scope| scope.to_string()).collect()
}

/// Disqus identity provider
#[derive(Debug, Clone)]
pub struct Disqus {
    config: DisqusConfig,
}

impl Disqus {
    pub fn new(config: DisqusConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DisqusConfig {
        &self.config
    }
}

impl OAuth2Provider for Disqus {
    type ResourceOwner = DisqusResourceOwner;

    fn provider_id(&self) -> &str {
        "disqus"
    }

    fn credentials(&self) -> &ClientCredentials {
        &self.config.credentials
    }

    fn base_authorization_url(&self) -> String {
        authorization_url(&self.config)
    }

    fn base_access_token_url(&self, params: &HashMap<String, String>) -> String {
        token_url(&self.config, params)
    }

    fn resource_owner_details_url(&self, token: &AccessToken) -> String {
        debug!("Building Disqus user details URL for {}", self.config.domain);
        resource_owner_details_url(&self.config, token)
    }

    fn default_scopes(&self) -> Vec<String> {
        default_scopes()
    }

    fn scope_separator(&self) -> &str {
        SCOPE_SEPARATOR
    }

    fn check_response(
        &self,
        response: &ProviderResponse,
        data: &Value,
    ) -> Result<(), ProviderError> {
        error::check_response(response, data)
    }

    fn create_resource_owner(&self, response: Value, _token: &AccessToken) -> DisqusResourceOwner {
        DisqusResourceOwner::new(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DisqusConfig {
        DisqusConfig::new("mock_client_id", "mock_secret", "none")
    }

    #[test]
    fn test_authorization_url() {
        assert_eq!(
            authorization_url(&config()),
            "https://disqus.com/api/oauth/2.0/authorize/"
        );

        let local = config().with_domain("http://127.0.0.1:9000");
        assert_eq!(
            authorization_url(&local),
            "http://127.0.0.1:9000/api/oauth/2.0/authorize/"
        );
    }

    #[test]
    fn test_token_url_ignores_params() {
        let empty = HashMap::new();
        let mut filled = HashMap::new();
        filled.insert("code".to_string(), "mock_authorization_code".to_string());
        filled.insert("grant_type".to_string(), "authorization_code".to_string());

        assert_eq!(token_url(&config(), &empty), token_url(&config(), &filled));
        assert_eq!(
            token_url(&config(), &empty),
            "https://disqus.com/api/oauth/2.0/access_token/"
        );
    }

    #[test]
    fn test_resource_owner_details_url() {
        let token = AccessToken::new("mock_access_token");

        assert_eq!(
            resource_owner_details_url(&config(), &token),
            "https://disqus.com/api/3.0/users/details.json?access_token=mock_access_token&api_key=mock_client_id&api_secret=mock_secret"
        );
    }

    #[test]
    fn test_provider_hooks() {
        let provider = Disqus::new(config());

        assert_eq!(provider.provider_id(), "disqus");
        assert_eq!(provider.default_scopes(), vec!["read".to_string()]);
        assert_eq!(provider.scope_separator(), ",");
        assert_eq!(provider.access_token_resource_owner_id(), None);
        assert_eq!(provider.pkce_method(), None);
        assert!(
            provider
                .authorization_headers(&AccessToken::new("t"))
                .is_empty()
        );
        assert_eq!(provider.credentials().client_id, "mock_client_id");
    }
}
