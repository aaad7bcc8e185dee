//! Configuration types and loading
//!
//! Config precedence: env vars > config file > defaults. The config file is
//! optional so the demo can run from environment variables alone. The client
//! secret comes from ORY_CLIENT_SECRET or client_secret_file, never from the
//! TOML directly, to avoid leaking it through config repos.

use common::Secret;
use ory_auth::ProviderConfig;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub provider: ProviderSettings,
}

/// HTTP listener and outbound call settings
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
    /// Externally visible origin; the redirect URI is `{public_base_url}/callback`.
    /// Defaults to `http://localhost:{port}`.
    #[serde(default)]
    pub public_base_url: Option<String>,
    /// Timeout for each call to Ory (token exchange, userinfo)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            public_base_url: None,
            timeout_secs: default_timeout(),
            max_connections: default_max_connections(),
        }
    }
}

/// Ory project and OAuth2 client registration
#[derive(Debug, Default, Deserialize)]
pub struct ProviderSettings {
    /// Ory project URL (issuer root), e.g. `https://<slug>.projects.oryapis.com`
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(skip)]
    pub client_secret: Option<Secret<String>>,
    /// Path to a file containing the client secret (alternative to ORY_CLIENT_SECRET)
    #[serde(default)]
    pub client_secret_file: Option<PathBuf>,
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8787))
}

fn default_timeout() -> u64 {
    ory_auth::DEFAULT_TIMEOUT.as_secs()
}

fn default_max_connections() -> usize {
    1000
}

impl Config {
    /// Load configuration from an optional TOML file, then overlay
    /// environment variables and validate.
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = if path.exists() {
            Some(std::fs::read_to_string(path)?)
        } else {
            None
        };
        Self::from_sources(contents.as_deref(), |key| std::env::var(key).ok())
    }

    /// Build configuration from TOML text (if any) and an environment lookup.
    ///
    /// Environment overlay:
    /// - `ORY_PROJECT_URL`, `ORY_CLIENT_ID` replace the provider settings
    /// - `ORY_CLIENT_SECRET` takes precedence over `client_secret_file`
    /// - `LISTEN_ADDR`, `PUBLIC_BASE_URL` replace the server settings
    pub fn from_sources(
        toml_text: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> common::Result<Self> {
        let mut config: Config = match toml_text {
            Some(text) => toml::from_str(text)?,
            None => Config::default(),
        };

        if let Some(url) = env("ORY_PROJECT_URL") {
            config.provider.base_url = url;
        }
        if let Some(id) = env("ORY_CLIENT_ID") {
            config.provider.client_id = id;
        }
        if let Some(addr) = env("LISTEN_ADDR") {
            config.server.listen_addr = addr.parse().map_err(|e| {
                common::Error::Config(format!("LISTEN_ADDR is not a socket address ({addr}): {e}"))
            })?;
        }
        if let Some(url) = env("PUBLIC_BASE_URL") {
            config.server.public_base_url = Some(url);
        }

        // Resolve client secret: env var takes precedence over file
        if let Some(secret) = env("ORY_CLIENT_SECRET").and_then(|s| Secret::non_blank(&s)) {
            config.provider.client_secret = Some(secret);
        } else if let Some(ref secret_file) = config.provider.client_secret_file {
            let raw = std::fs::read_to_string(secret_file).map_err(|e| {
                common::Error::Config(format!(
                    "failed to read client_secret_file {}: {e}",
                    secret_file.display()
                ))
            })?;
            config.provider.client_secret = Secret::non_blank(&raw);
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&mut self) -> common::Result<()> {
        let base_url = self.provider.base_url.trim().trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            return Err(common::Error::Config(
                "provider base_url is required (set ORY_PROJECT_URL)".into(),
            ));
        }
        require_http_url("provider base_url", &base_url)?;
        self.provider.base_url = base_url;

        let client_id = self.provider.client_id.trim().to_owned();
        if client_id.is_empty() {
            return Err(common::Error::Config(
                "provider client_id is required (set ORY_CLIENT_ID)".into(),
            ));
        }
        self.provider.client_id = client_id;

        if let Some(ref url) = self.server.public_base_url {
            let url = url.trim().trim_end_matches('/').to_owned();
            require_http_url("public_base_url", &url)?;
            require_secure_cookie_origin(&url)?;
            self.server.public_base_url = Some(url);
        }

        if self.server.timeout_secs == 0 {
            return Err(common::Error::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if self.server.max_connections == 0 {
            return Err(common::Error::Config(
                "max_connections must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("ory-auth-demo.toml")
    }

    pub fn public_base_url(&self) -> String {
        match self.server.public_base_url {
            Some(ref url) => url.clone(),
            None => format!("http://localhost:{}", self.server.listen_addr.port()),
        }
    }

    /// Redirect URI registered with the Ory OAuth2 client
    pub fn redirect_uri(&self) -> String {
        format!("{}/callback", self.public_base_url())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.server.timeout_secs)
    }

    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig::new(
            self.provider.base_url.clone(),
            self.provider.client_id.clone(),
            self.provider.client_secret.clone(),
        )
    }
}

fn require_http_url(field: &str, url: &str) -> common::Result<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(common::Error::Config(format!(
            "{field} must start with http:// or https://, got: {url}"
        )))
    }
}

/// Flow cookies are `Secure`; browsers only store them over plain HTTP on
/// loopback hosts.
fn require_secure_cookie_origin(url: &str) -> common::Result<()> {
    let parsed = reqwest::Url::parse(url).map_err(|e| {
        common::Error::Config(format!("public_base_url is not a valid URL ({url}): {e}"))
    })?;
    if parsed.scheme() == "https" {
        return Ok(());
    }
    match parsed.host_str() {
        Some("localhost" | "127.0.0.1" | "[::1]") => Ok(()),
        _ => Err(common::Error::Config(format!(
            "public_base_url must use https:// unless the host is localhost, got: {url} \
             (browsers drop Secure cookies over plain HTTP)"
        ))),
    }
}
