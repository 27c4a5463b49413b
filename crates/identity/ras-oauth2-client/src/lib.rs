//! Generic OAuth2 authorization-code client.
//!
//! The flow itself (state generation, redirect validation, code exchange,
//! resource owner lookup) lives in [`AuthorizationCodeClient`]. Everything a
//! particular identity provider does differently (endpoint URLs, scopes, how
//! errors are reported, the shape of the user profile) is supplied by an
//! [`OAuth2Provider`] implementation handed to the client at construction.

pub mod accessor;
mod client;
mod config;
mod error;
mod pkce;
mod provider;
mod response;
mod state;
mod token;
mod types;


pub use client::AuthorizationCodeClient;
pub use config::{ClientCredentials, ClientOptions};
pub use error::{OAuth2Error, OAuth2Result, ProviderError, ProviderErrorKind};
pub use pkce::{PkceChallenge, PkceMethod};
pub use provider::{OAuth2Provider, ResourceOwner};
pub use response::ProviderResponse;
pub use state::{InMemoryStateStore, OAuth2State, OAuth2StateStore};
pub use token::AccessToken;
pub use types::{AuthorizationOptions, AuthorizationResponse, AuthorizationUrl, Grant};
