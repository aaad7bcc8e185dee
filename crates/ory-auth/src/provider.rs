//! Ory project and client registration settings

use common::Secret;

use crate::constants::{AUTHORIZE_PATH, TOKEN_PATH, USERINFO_PATH};

/// Client registration at an Ory project.
///
/// Built once at startup and shared read-only. When `client_secret` is
/// `None` the client authenticates as a public client (PKCE only, with
/// `client_id` in the token request body).
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    base_url: String,
    client_id: String,
    client_secret: Option<Secret<String>>,
}

impl ProviderConfig {
    pub fn new(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: Option<Secret<String>>,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            client_id: client_id.into(),
            client_secret,
        }
    }

    /// Ory project URL without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> Option<&Secret<String>> {
        self.client_secret.as_ref()
    }

    pub fn has_client_secret(&self) -> bool {
        self.client_secret.is_some()
    }

    pub fn authorization_endpoint(&self) -> String {
        format!("{}{AUTHORIZE_PATH}", self.base_url)
    }

    pub fn token_endpoint(&self) -> String {
        format!("{}{TOKEN_PATH}", self.base_url)
    }

    pub fn userinfo_endpoint(&self) -> String {
        format!("{}{USERINFO_PATH}", self.base_url)
    }
}
