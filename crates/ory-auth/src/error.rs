//! Error types for Ory client operations

/// Errors from talking to Ory or decoding what it returns.
///
/// Flow-terminating failures are reported to users as `FlowError`; these are
/// the lower-level causes.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("token endpoint returned HTTP {status}: {body}")]
    TokenEndpoint { status: u16, body: String },

    #[error("invalid token response (HTTP {status}): {reason}")]
    InvalidTokenResponse {
        status: u16,
        body: String,
        reason: String,
    },

    #[error("undecodable id_token: {0}")]
    IdentityToken(String),

    #[error("userinfo endpoint returned HTTP {0}")]
    UserinfoStatus(u16),

    #[error("invalid userinfo response: {0}")]
    InvalidUserinfo(String),
}

/// Result alias for Ory client operations.
pub type Result<T> = std::result::Result<T, Error>;
