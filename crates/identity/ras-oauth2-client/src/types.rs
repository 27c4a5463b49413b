//! OAuth2 protocol types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Caller overrides for building an authorization URL
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorizationOptions {
    /// Scopes to request. The provider's default scopes when `None`.
    pub scopes: Option<Vec<String>>,
    /// Use this state value instead of generating one
    pub state: Option<String>,
    pub redirect_uri: Option<String>,
    /// OpenID-style `prompt`. Replaces `approval_prompt` when set.
    pub prompt: Option<String>,
    pub additional_params: Vec<(String, String)>,
}

impl AuthorizationOptions {
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = Some(scopes.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.additional_params.push((key.into(), value.into()));
        self
    }
}

/// Where to send the user, and the state to expect back
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationUrl {
    pub url: String,
    pub state: String,
}

/// Query parameters delivered to the redirect URI
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorizationResponse {
    #[serde(default)]
    pub code: String,
    pub state: String,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Grant presented to the token endpoint
#[derive(Debug, Clone)]
pub enum Grant {
    AuthorizationCode {
        code: String,
        code_verifier: Option<String>,
    },
    RefreshToken {
        refresh_token: String,
    },
    ClientCredentials,
    Password {
        username: String,
        password: String,
    },
}

impl Grant {
    pub fn authorization_code(code: impl Into<String>) -> Self {
        Grant::AuthorizationCode {
            code: code.into(),
            code_verifier: None,
        }
    }

    pub fn grant_type(&self) -> &'static str {
        match self {
            Grant::AuthorizationCode { .. } => "authorization_code",
            Grant::RefreshToken { .. } => "refresh_token",
            Grant::ClientCredentials => "client_credentials",
            Grant::Password { .. } => "password",
        }
    }

    /// Grant-specific request fields, `grant_type` included.
    pub fn params(&self) -> HashMap<String, String> {
        let mut params = HashMap::new();
        params.insert("grant_type".to_string(), self.grant_type().to_string());

        match self {
            Grant::AuthorizationCode {
                code,
                code_verifier,
            } => {
                params.insert("code".to_string(), code.clone());
                if let Some(verifier) = code_verifier {
                    params.insert("code_verifier".to_string(), verifier.clone());
                }
            }
            Grant::RefreshToken { refresh_token } => {
                params.insert("refresh_token".to_string(), refresh_token.clone());
            }
            Grant::ClientCredentials => {}
            Grant::Password { username, password } => {
                params.insert("username".to_string(), username.clone());
                params.insert("password".to_string(), password.clone());
            }
        }

        params
    }
}
