//! Ory OAuth2 constants
//!
//! Endpoint paths are relative to the Ory project URL (the issuer root).
//! Byte lengths are the amount of CSPRNG output before base64url encoding.

use std::time::Duration;

/// Authorization endpoint path (browser redirect target)
pub const AUTHORIZE_PATH: &str = "/oauth2/auth";

/// Token endpoint path for the back-channel code exchange
pub const TOKEN_PATH: &str = "/oauth2/token";

/// OIDC userinfo endpoint path
pub const USERINFO_PATH: &str = "/userinfo";

/// Scopes requested on every authorization. `offline_access` asks Ory for a
/// refresh token so the demo can show one was issued.
pub const SCOPES: &str = "openid offline_access";

/// Random bytes in a `state` value (22 chars encoded)
pub const STATE_BYTES: usize = 16;

/// Random bytes in a `code_verifier` (43 chars encoded, the RFC 7636 minimum)
pub const VERIFIER_BYTES: usize = 32;

/// Characters of a token kept in the redacted summary
pub const TOKEN_PREVIEW_CHARS: usize = 20;

/// Default timeout for each outbound call to Ory
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
