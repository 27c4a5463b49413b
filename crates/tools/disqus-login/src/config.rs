//! Settings for the login tool.
//!
//! Sources, lowest precedence first:
//! - defaults
//! - a TOML file (`--config`, `DISQUS_CONFIG_FILE`, or `disqus.toml` if present)
//! - environment variables prefixed with `DISQUS_`, e.g. `DISQUS_CLIENT_ID`,
//!   with `__` for nested keys (`DISQUS_CLIENT__HTTP_TIMEOUT_SECONDS`)
//! - command-line flags, applied by the caller

use anyhow::{Context, Result, bail};
use config::{Config, Environment, File, FileFormat};
use ras_oauth2_client::ClientOptions;
use ras_oauth2_disqus::DisqusConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

const DEFAULT_CONFIG_FILE: &str = "disqus.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(flatten)]
    pub disqus: DisqusConfig,

    #[serde(default)]
    pub client: ClientOptions,
}

impl Settings {
    /// Load settings from the config file and the process environment.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        Self::build(config_file, environment())
    }

    fn build(config_file: Option<&Path>, environment: Environment) -> Result<Self> {
        let mut builder = Config::builder();

        match config_file {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                builder = builder.add_source(File::from(path).format(FileFormat::Toml));
            }
            None => {
                let path = std::env::var("DISQUS_CONFIG_FILE")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

                if path.exists() {
                    info!("Loading configuration from {}", path.display());
                    builder = builder.add_source(File::from(path).format(FileFormat::Toml));
                } else {
                    debug!("No config file found at {}", path.display());
                }
            }
        }

        let settings: Settings = builder
            .add_source(environment)
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context(
                "Failed to deserialize configuration \
                 (DISQUS_CLIENT_ID, DISQUS_CLIENT_SECRET and DISQUS_REDIRECT_URI are required)",
            )?;

        Ok(settings)
    }

    /// Check required values and normalize the domain.
    pub fn validate(&mut self) -> Result<()> {
        if self.disqus.credentials.client_id.trim().is_empty() {
            bail!("client_id cannot be empty");
        }

        if self.disqus.credentials.client_secret.trim().is_empty() {
            bail!("client_secret cannot be empty");
        }

        let domain = Url::parse(&self.disqus.domain)
            .with_context(|| format!("Invalid domain: {}", self.disqus.domain))?;
        if !matches!(domain.scheme(), "http" | "https") {
            bail!("Domain must use http or https, got {}", domain.scheme());
        }

        self.disqus.domain = self.disqus.domain.trim_end_matches('/').to_string();

        if self.client.http_timeout_seconds == 0 {
            bail!("client.http_timeout_seconds cannot be 0");
        }

        Ok(())
    }
}

fn environment() -> Environment {
    Environment::with_prefix("DISQUS")
        .prefix_separator("_")
        .separator("__")
}
