//! Authorization-code flow driven through a pluggable provider.

use crate::config::ClientOptions;
use crate::error::{OAuth2Error, OAuth2Result};
use crate::pkce::PkceChallenge;
use crate::provider::OAuth2Provider;
use crate::response::ProviderResponse;
use crate::state::{OAuth2State, OAuth2StateStore};
use crate::token::AccessToken;
use crate::types::{AuthorizationOptions, AuthorizationResponse, AuthorizationUrl, Grant};
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde_json::Value;
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

/// OAuth2 client for handling authorization flows
pub struct AuthorizationCodeClient<P: OAuth2Provider> {
    provider: Arc<P>,
    http_client: Client,
    state_store: Arc<dyn OAuth2StateStore>,
    state_ttl_seconds: u64,
}

impl<P: OAuth2Provider> Clone for AuthorizationCodeClient<P> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            http_client: self.http_client.clone(),
            state_store: self.state_store.clone(),
            state_ttl_seconds: self.state_ttl_seconds,
        }
    }
}

impl<P: OAuth2Provider> AuthorizationCodeClient<P> {
    pub fn new(
        provider: P,
        state_store: Arc<dyn OAuth2StateStore>,
        options: &ClientOptions,
    ) -> OAuth2Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(options.http_timeout_seconds))
            .build()?;

        Ok(Self {
            provider: Arc::new(provider),
            http_client,
            state_store,
            state_ttl_seconds: options.state_ttl_seconds,
        })
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn state_store(&self) -> &Arc<dyn OAuth2StateStore> {
        &self.state_store
    }

    /// Build the URL the user is redirected to and remember its state.
    pub async fn authorization_url(
        &self,
        options: AuthorizationOptions,
    ) -> OAuth2Result<AuthorizationUrl> {
        let provider = &self.provider;
        let credentials = provider.credentials();

        let base_url = provider.base_authorization_url();
        Url::parse(&base_url)?;

        let state = options.state.unwrap_or_else(OAuth2State::random_state);
        let redirect_uri = options
            .redirect_uri
            .unwrap_or_else(|| credentials.redirect_uri.clone());
        let scopes = options.scopes.unwrap_or_else(|| provider.default_scopes());
        let pkce = provider.pkce_method().map(PkceChallenge::new);

        let mut query = vec![format!("state={}", urlencoding::encode(&state))];
        if !scopes.is_empty() {
            query.push(format!(
                "scope={}",
                encode_scopes(&scopes, provider.scope_separator())
            ));
        }
        query.push("response_type=code".to_string());
        match &options.prompt {
            Some(prompt) => query.push(format!("prompt={}", urlencoding::encode(prompt))),
            None => query.push("approval_prompt=auto".to_string()),
        }
        query.push(format!("redirect_uri={}", urlencoding::encode(&redirect_uri)));
        query.push(format!(
            "client_id={}",
            urlencoding::encode(&credentials.client_id)
        ));

        if let Some(pkce) = &pkce {
            query.push(format!("code_challenge={}", pkce.code_challenge));
            query.push(format!("code_challenge_method={}", pkce.method.as_str()));
        }

        for (key, value) in &options.additional_params {
            query.push(format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            ));
        }

        let separator = if base_url.contains('?') { '&' } else { '?' };
        let url = format!("{}{}{}", base_url, separator, query.join("&"));

        self.state_store
            .store(OAuth2State::with_state(
                state.clone(),
                provider.provider_id(),
                redirect_uri,
                pkce.map(|pkce| pkce.code_verifier),
                self.state_ttl_seconds,
            ))
            .await?;

        debug!(
            "Generated authorization URL for provider {}",
            provider.provider_id()
        );

        Ok(AuthorizationUrl { url, state })
    }

    /// Validate the redirect back from the provider and exchange its code.
    pub async fn handle_callback(
        &self,
        callback: AuthorizationResponse,
    ) -> OAuth2Result<AccessToken> {
        let pending = self.state_store.retrieve(&callback.state).await?;

        if pending.provider_id != self.provider.provider_id() {
            return Err(OAuth2Error::InvalidState);
        }

        if let Some(error) = &callback.error {
            let description = callback
                .error_description
                .as_deref()
                .unwrap_or("No description");
            return Err(OAuth2Error::CallbackError(format!(
                "{}: {}",
                error, description
            )));
        }

        if callback.code.is_empty() {
            return Err(OAuth2Error::MissingAuthorizationCode);
        }

        let grant = Grant::AuthorizationCode {
            code: callback.code,
            code_verifier: pending.code_verifier,
        };

        self.request_access_token(&grant, &pending.redirect_uri).await
    }

    /// Request a token from the token endpoint.
    pub async fn access_token(&self, grant: Grant) -> OAuth2Result<AccessToken> {
        let redirect_uri = self.provider.credentials().redirect_uri.clone();
        self.request_access_token(&grant, &redirect_uri).await
    }

    async fn request_access_token(
        &self,
        grant: &Grant,
        redirect_uri: &str,
    ) -> OAuth2Result<AccessToken> {
        let credentials = self.provider.credentials();

        let mut params = grant.params();
        params.insert("client_id".to_string(), credentials.client_id.clone());
        params.insert(
            "client_secret".to_string(),
            credentials.client_secret.clone(),
        );
        params.insert("redirect_uri".to_string(), redirect_uri.to_string());

        let url = self.provider.base_access_token_url(&params);

        let response = self
            .http_client
            .post(&url)
            .header(ACCEPT, "application/json")
            .form(&params)
            .send()
            .await?;
        let response = ProviderResponse::read(response).await?;

        let data = self.checked_body(&response)?;
        let token =
            AccessToken::from_response(&data, self.provider.access_token_resource_owner_id())?;

        info!(
            "Obtained access token from provider {} via {} grant",
            self.provider.provider_id(),
            grant.grant_type()
        );

        Ok(token)
    }

    /// Fetch the profile of the user the token belongs to.
    pub async fn resource_owner(&self, token: &AccessToken) -> OAuth2Result<P::ResourceOwner> {
        let data = self.resource_owner_details(token).await?;
        Ok(self.provider.create_resource_owner(data, token))
    }

    async fn resource_owner_details(&self, token: &AccessToken) -> OAuth2Result<Value> {
        // The details URL may embed credentials, so it never reaches logs or errors.
        let url = self.provider.resource_owner_details_url(token);

        let mut request = self
            .http_client
            .get(&url)
            .header(ACCEPT, "application/json");
        for (name, value) in self.provider.authorization_headers(token) {
            request = request.header(name, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| OAuth2Error::HttpError(e.without_url()))?;
        let response = ProviderResponse::read(response)
            .await
            .map_err(|e| match e {
                OAuth2Error::HttpError(e) => OAuth2Error::HttpError(e.without_url()),
                other => other,
            })?;

        let data = self.checked_body(&response)?;

        debug!(
            "Retrieved resource owner details from provider {}",
            self.provider.provider_id()
        );

        Ok(data)
    }

    /// Parse a response and run the provider's error check over it.
    ///
    /// Bodies that fail to parse are still checked (against `null`) so that
    /// an HTTP error status surfaces as a provider error.
    fn checked_body(&self, response: &ProviderResponse) -> OAuth2Result<Value> {
        let parsed = response.parse_body();
        let null = Value::Null;
        let data = parsed.as_ref().unwrap_or(&null);

        if let Err(provider_error) = self.provider.check_response(response, data) {
            error!(
                "Provider {} rejected request: {}",
                self.provider.provider_id(),
                provider_error
            );
            return Err(provider_error.into());
        }

        let data = parsed?;
        if !data.is_object() {
            return Err(OAuth2Error::UnexpectedResponse(
                "Invalid response received from Authorization Server. Expected JSON.".to_string(),
            ));
        }

        Ok(data)
    }
}

/// Join scopes for the `scope` parameter.
///
/// Separators that are legal unescaped in a query value stay literal, so a
/// comma-separated list reads `scope=a,b`.
fn encode_scopes(scopes: &[String], separator: &str) -> String {
    let separator = if separator.chars().all(|c| matches!(c, ',' | ';' | ':')) {
        Cow::Borrowed(separator)
    } else {
        urlencoding::encode(separator)
    };

    scopes
        .iter()
        .map(|scope| urlencoding::encode(scope))
        .collect::<Vec<_>>()
        .join(&*separator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::InMemoryStateStore;
    use crate::tests::TestProvider;
    use std::collections::HashMap;

    fn client(provider: TestProvider) -> AuthorizationCodeClient<TestProvider> {
        AuthorizationCodeClient::new(
            provider,
            Arc::new(InMemoryStateStore::new()),
            &ClientOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_encode_scopes() {
        let scopes = vec!["a".to_string(), "b c".to_string()];

        assert_eq!(encode_scopes(&scopes, ","), "a,b%20c");
        assert_eq!(encode_scopes(&scopes, " "), "a%20b%20c");
        assert_eq!(encode_scopes(&[], ","), "");
    }

    #[tokio::test]
    async fn test_authorization_url_generation() {
        let client = client(TestProvider::new("https://example.com"));

        let AuthorizationUrl { url, state } = client
            .authorization_url(AuthorizationOptions::default())
            .await
            .unwrap();

        let url = Url::parse(&url).unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
        assert_eq!(url.path(), "/authorize");

        let params: HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(params.get("response_type").map(String::as_str), Some("code"));
        assert_eq!(params.get("client_id").map(String::as_str), Some("mock_client_id"));
        assert_eq!(params.get("redirect_uri").map(String::as_str), Some("none"));
        assert_eq!(params.get("approval_prompt").map(String::as_str), Some("auto"));
        assert_eq!(params.get("scope").map(String::as_str), Some("basic"));
        assert_eq!(params.get("state"), Some(&state));
        assert!(!params.contains_key("code_challenge"));

        let pending = client.state_store().retrieve(&state).await.unwrap();
        assert_eq!(pending.provider_id, "test");
        assert_eq!(pending.redirect_uri, "none");
    }

    #[tokio::test]
    async fn test_authorization_url_caller_overrides() {
        let client = client(
            TestProvider::new("https://example.com")
                .with_authorize_url("https://example.com/oauth?tenant=1"),
        );

        let options = AuthorizationOptions::default()
            .with_scopes(["x", "y"])
            .with_state("fixed-state")
            .with_prompt("consent")
            .with_param("login_hint", "a b");
        let AuthorizationUrl { url, state } = client.authorization_url(options).await.unwrap();

        assert_eq!(state, "fixed-state");
        assert!(url.starts_with("https://example.com/oauth?tenant=1&state=fixed-state&"));
        assert!(url.contains("scope=x%20y"));
        assert!(url.contains("prompt=consent"));
        assert!(!url.contains("approval_prompt"));
        assert!(url.ends_with("login_hint=a%20b"));
    }

    #[tokio::test]
    async fn test_authorization_url_with_pkce() {
        let client = client(TestProvider::new("https://example.com").with_pkce());

        let AuthorizationUrl { url, state } = client
            .authorization_url(AuthorizationOptions::default())
            .await
            .unwrap();

        let params: HashMap<_, _> = Url::parse(&url).unwrap().query_pairs().into_owned().collect();
        assert!(params.contains_key("code_challenge"));
        assert_eq!(
            params.get("code_challenge_method").map(String::as_str),
            Some("S256")
        );

        let pending = client.state_store().retrieve(&state).await.unwrap();
        assert!(pending.code_verifier.is_some());
    }

    #[tokio::test]
    async fn test_unique_states_across_concurrent_requests() {
        let client = client(TestProvider::new("https://example.com"));

        let mut handles = vec![];
        for _ in 0..10 {
            let client = client.clone();
            handles.push(tokio::spawn(async move {
                client
                    .authorization_url(AuthorizationOptions::default())
                    .await
            }));
        }

        let mut states = std::collections::HashSet::new();
        for handle in handles {
            states.insert(handle.await.unwrap().unwrap().state);
        }
        assert_eq!(states.len(), 10);
    }

    #[tokio::test]
    async fn test_invalid_base_url() {
        let client = client(TestProvider::new("not a url"));

        let result = client
            .authorization_url(AuthorizationOptions::default())
            .await;
        assert!(matches!(result, Err(OAuth2Error::UrlError(_))));
    }
}
