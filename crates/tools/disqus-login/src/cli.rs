use crate::config::Settings;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ras_oauth2_client::{
    AccessToken, AuthorizationCodeClient, AuthorizationOptions, Grant, InMemoryStateStore,
};
use ras_oauth2_disqus::{Disqus, DisqusResourceOwner};
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Run the Disqus OAuth2 login flow from a terminal
#[derive(Debug, Parser)]
#[command(name = "disqus-login")]
#[command(about = "Run the Disqus OAuth2 login flow from a terminal")]
#[command(version)]
pub struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Disqus API host (default: https://disqus.com)
    #[arg(long, value_name = "URL", global = true)]
    pub domain: Option<String>,

    #[arg(long, value_name = "ID", global = true)]
    pub client_id: Option<String>,

    #[arg(long, value_name = "SECRET", global = true)]
    pub client_secret: Option<String>,

    #[arg(long, value_name = "URL", global = true)]
    pub redirect_uri: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the URL to send the user to, and the state to expect back
    AuthorizeUrl {
        /// Scope to request, repeatable (default: read)
        #[arg(short, long = "scope", value_name = "SCOPE")]
        scopes: Vec<String>,

        #[arg(long)]
        state: Option<String>,
    },

    /// Exchange an authorization code for an access token
    Exchange {
        #[arg(long)]
        code: String,

        /// Print the access token instead of redacting it
        #[arg(long)]
        show_token: bool,
    },

    /// Exchange a refresh token for a new access token
    Refresh {
        #[arg(long)]
        refresh_token: String,

        #[arg(long)]
        show_token: bool,
    },

    /// Fetch the profile of the user an access token belongs to
    Profile {
        #[arg(long)]
        token: String,
    },

    /// Exchange an authorization code and fetch the profile
    Login {
        #[arg(long)]
        code: String,
    },
}

impl Args {
    /// Settings from file and environment, with flags applied on top.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::load(self.config.as_deref())?;

        if let Some(domain) = &self.domain {
            settings.disqus.domain = domain.clone();
        }
        if let Some(client_id) = &self.client_id {
            settings.disqus.credentials.client_id = client_id.clone();
        }
        if let Some(client_secret) = &self.client_secret {
            settings.disqus.credentials.client_secret = client_secret.clone();
        }
        if let Some(redirect_uri) = &self.redirect_uri {
            settings.disqus.credentials.redirect_uri = redirect_uri.clone();
        }

        settings.validate()?;
        Ok(settings)
    }

    pub async fn run(self) -> Result<()> {
        let settings = self.settings()?;
        info!("Using Disqus at {}", settings.disqus.domain);

        // Each invocation is its own process, so callback state cannot be
        // carried between `authorize-url` and `exchange`. Codes are exchanged
        // directly and the caller compares the returned state.
        let client = AuthorizationCodeClient::new(
            Disqus::new(settings.disqus),
            Arc::new(InMemoryStateStore::new()),
            &settings.client,
        )
        .context("Failed to create OAuth2 client")?;

        let output = match self.command {
            Command::AuthorizeUrl { scopes, state } => {
                let mut options = AuthorizationOptions::default();
                if !scopes.is_empty() {
                    options = options.with_scopes(scopes);
                }
                if let Some(state) = state {
                    options = options.with_state(state);
                }

                let authorization = client.authorization_url(options).await?;
                json!({"url": authorization.url, "state": authorization.state})
            }
            Command::Exchange { code, show_token } => {
                let token = client.access_token(Grant::authorization_code(code)).await?;
                token_summary(&token, show_token)
            }
            Command::Refresh {
                refresh_token,
                show_token,
            } => {
                let token = client
                    .access_token(Grant::RefreshToken { refresh_token })
                    .await?;
                token_summary(&token, show_token)
            }
            Command::Profile { token } => {
                let owner = client.resource_owner(&AccessToken::new(token)).await?;
                profile_summary(&owner)
            }
            Command::Login { code } => {
                let token = client.access_token(Grant::authorization_code(code)).await?;
                let owner = client.resource_owner(&token).await?;
                json!({
                    "token": token_summary(&token, false),
                    "profile": profile_summary(&owner),
                })
            }
        };

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}

fn token_summary(token: &AccessToken, show_token: bool) -> Value {
    json!({
        "access_token": if show_token { token.token() } else { "<redacted>" },
        "expires_at": token.expires_at().map(|expires_at| expires_at.to_rfc3339()),
        "has_refresh_token": token.refresh_token().is_some(),
        "resource_owner_id": token.resource_owner_id(),
        "values": token.values(),
    })
}

fn profile_summary(owner: &DisqusResourceOwner) -> Value {
    json!({
        "id": owner.id(),
        "name": owner.name(),
        "username": owner.username(),
        "raw": owner.to_structured(),
    })
}
