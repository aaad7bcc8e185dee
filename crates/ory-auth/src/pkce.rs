//! PKCE (Proof Key for Code Exchange) implementation per RFC 7636
//!
//! Generates the per-flow `state` and `code_verifier`, derives the S256
//! challenge and builds the authorization URL. The verifier never leaves
//! the server/client pair; only its challenge goes to Ory, so an intercepted
//! authorization code is useless without the verifier.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngExt;
use reqwest::Url;
use sha2::{Digest, Sha256};

use crate::constants::{SCOPES, STATE_BYTES, VERIFIER_BYTES};
use crate::error::{Error, Result};
use crate::provider::ProviderConfig;

/// Draw `byte_len` bytes from the thread CSPRNG and encode them as URL-safe
/// base64 without padding.
pub fn generate_random_token(byte_len: usize) -> String {
    let mut bytes = vec![0u8; byte_len];
    rand::rng().fill(bytes.as_mut_slice());
    URL_SAFE_NO_PAD.encode(bytes)
}

/// CSRF `state`: 16 random bytes, 22 characters.
pub fn generate_state() -> String {
    generate_random_token(STATE_BYTES)
}

/// PKCE `code_verifier`: 32 random bytes, 43 characters (the RFC 7636 minimum).
pub fn generate_verifier() -> String {
    generate_random_token(VERIFIER_BYTES)
}

/// Compute the S256 code challenge from a verifier.
///
/// `challenge = BASE64URL(SHA256(verifier))`
pub fn compute_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Values generated for one login attempt.
///
/// A new `FlowState` is generated for every `/login`; values are never
/// reused across flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowState {
    pub state: String,
    pub code_verifier: String,
}

impl FlowState {
    pub fn generate() -> Self {
        Self {
            state: generate_state(),
            code_verifier: generate_verifier(),
        }
    }

    pub fn code_challenge(&self) -> String {
        compute_challenge(&self.code_verifier)
    }
}

/// Build the authorization URL with all required OAuth parameters.
///
/// Parameter values are form-encoded by `Url`. Pure construction, no
/// network access.
pub fn build_authorization_url(
    provider: &ProviderConfig,
    redirect_uri: &str,
    state: &str,
    code_challenge: &str,
) -> Result<Url> {
    Url::parse_with_params(
        &provider.authorization_endpoint(),
        &[
            ("client_id", provider.client_id()),
            ("response_type", "code"),
            ("redirect_uri", redirect_uri),
            ("scope", SCOPES),
            ("state", state),
            ("code_challenge", code_challenge),
            ("code_challenge_method", "S256"),
        ],
    )
    .map_err(|e| Error::InvalidUrl(format!("authorization endpoint: {e}")))
}
