//! Disqus application configuration.

use ras_oauth2_client::ClientCredentials;
use serde::{Deserialize, Serialize};

pub const DEFAULT_DOMAIN: &str = "https://disqus.com";

/// Credentials of a registered Disqus application plus the API host
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisqusConfig {
    #[serde(flatten)]
    pub credentials: ClientCredentials,
    /// Scheme and host every endpoint is built on, without a trailing slash
    #[serde(default = "default_domain")]
    pub domain: String,
}

fn default_domain() -> String {
    DEFAULT_DOMAIN.to_string()
}

impl DisqusConfig {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            credentials: ClientCredentials::new(client_id, client_secret, redirect_uri),
            domain: default_domain(),
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn client_id(&self) -> &str {
        &self.credentials.client_id
    }

    pub fn client_secret(&self) -> &str {
        &self.credentials.client_secret
    }

    pub fn redirect_uri(&self) -> &str {
        &self.credentials.redirect_uri
    }
}
