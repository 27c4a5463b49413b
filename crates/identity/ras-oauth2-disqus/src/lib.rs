//! Disqus identity provider.
//!
//! Plugs the Disqus OAuth2 endpoints into [`ras_oauth2_client`]:
//!
//! ```no_run
//! use ras_oauth2_client::{AuthorizationCodeClient, AuthorizationOptions, ClientOptions, InMemoryStateStore};
//! use ras_oauth2_disqus::{Disqus, DisqusConfig};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), ras_oauth2_client::OAuth2Error> {
//! let provider = Disqus::new(DisqusConfig::new("client-id", "client-secret", "https://example.com/cb"));
//! let client = AuthorizationCodeClient::new(
//!     provider,
//!     Arc::new(InMemoryStateStore::new()),
//!     &ClientOptions::default(),
//! )?;
//! let redirect = client.authorization_url(AuthorizationOptions::default()).await?;
//! println!("{}", redirect.url);
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod provider;
mod resource_owner;

pub use config::{DEFAULT_DOMAIN, DisqusConfig};
pub use error::{check_response, client_error, oauth_error};
pub use provider::{
    DEFAULT_SCOPES, Disqus, SCOPE_SEPARATOR, authorization_url, default_scopes,
    resource_owner_details_url, token_url,
};
pub use resource_owner::DisqusResourceOwner;
