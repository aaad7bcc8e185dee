//! OIDC userinfo lookup
//!
//! Best-effort enrichment after a successful code exchange. Any failure
//! simply leaves the profile out of the result.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::outcome::BestEffort;
use crate::provider::ProviderConfig;

/// GET the userinfo endpoint with the access token as a Bearer credential.
pub async fn fetch_userinfo(
    client: &reqwest::Client,
    provider: &ProviderConfig,
    access_token: &str,
    timeout: Duration,
) -> Result<Value> {
    let response = client
        .get(provider.userinfo_endpoint())
        .bearer_auth(access_token)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| Error::Http(format!("userinfo request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::UserinfoStatus(status.as_u16()));
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| Error::InvalidUserinfo(e.to_string()))
}

/// Fetch the profile, degrading instead of failing.
pub async fn fetch_profile(
    client: &reqwest::Client,
    provider: &ProviderConfig,
    access_token: &str,
    timeout: Duration,
) -> BestEffort<Value> {
    let outcome =
        BestEffort::from_result(fetch_userinfo(client, provider, access_token, timeout).await);
    if let BestEffort::Degraded { reason } = &outcome {
        debug!(reason = %reason, "userinfo unavailable, continuing without profile");
    }
    outcome
}
