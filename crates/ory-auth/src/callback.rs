//! Callback inputs, results and the failure report

use serde::Deserialize;
use serde_json::Value;

use crate::error::Error;
use crate::outcome::BestEffort;
use crate::token::TokenSummary;

/// Query parameters of Ory's redirect back to `/callback`.
///
/// Empty values are treated the same as missing ones.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl CallbackParams {
    pub(crate) fn normalized(self) -> Self {
        Self {
            code: non_empty(self.code),
            state: non_empty(self.state),
            error: non_empty(self.error),
            error_description: non_empty(self.error_description),
        }
    }
}

/// Flow values echoed back by the client on the callback request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedFlow {
    pub state: Option<String>,
    pub code_verifier: Option<String>,
}

/// Result of a completed callback.
#[derive(Debug, Clone, PartialEq)]
pub struct CallbackOutcome {
    pub tokens: TokenSummary,
    pub claims: BestEffort<Value>,
    pub profile: BestEffort<Value>,
}

/// Why a callback ended in the Failed state.
///
/// `title()` and `detail()` form the human-readable report. The state
/// mismatch report deliberately never includes the compared values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error("provider error: {error}: {}", .description.as_deref().unwrap_or("no details"))]
    Provider {
        error: String,
        description: Option<String>,
    },

    #[error("state mismatch")]
    StateMismatch,

    #[error("missing PKCE verifier")]
    MissingVerifier,

    #[error("missing authorization code")]
    MissingCode,

    #[error("token exchange failed: {detail}")]
    TokenExchange { status: Option<u16>, detail: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl FlowError {
    /// Short stable label for logs
    pub fn category(&self) -> &'static str {
        match self {
            Self::Provider { .. } => "provider_error",
            Self::StateMismatch => "state_mismatch",
            Self::MissingVerifier => "missing_verifier",
            Self::MissingCode => "missing_code",
            Self::TokenExchange { .. } => "token_exchange",
            Self::Internal(_) => "internal",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Provider { .. } => "Ory returned an error",
            Self::StateMismatch => "Invalid state",
            Self::MissingVerifier => "Missing PKCE verifier",
            Self::MissingCode => "Missing authorization code",
            Self::TokenExchange { .. } => "Token exchange failed",
            Self::Internal(_) => "Server Error",
        }
    }

    pub fn detail(&self) -> String {
        match self {
            Self::Provider { error, description } => format!(
                "{error}: {}",
                description.as_deref().unwrap_or("no details")
            ),
            Self::StateMismatch => "State mismatch. Session may have expired. Try again.".into(),
            Self::MissingVerifier => "Session cookie lost. Try again.".into(),
            Self::MissingCode => "Ory redirected back without an authorization code.".into(),
            Self::TokenExchange { detail, .. } => detail.clone(),
            Self::Internal(message) => message.clone(),
        }
    }

    /// Whether the failure is the server's fault rather than the request's
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

impl From<Error> for FlowError {
    fn from(err: Error) -> Self {
        match err {
            Error::TokenEndpoint { status, body } => Self::TokenExchange {
                status: Some(status),
                detail: format!("HTTP {status}\n{}", pretty_body(&body)),
            },
            Error::InvalidTokenResponse {
                status,
                body,
                reason,
            } => Self::TokenExchange {
                status: Some(status),
                detail: format!("HTTP {status}\ninvalid token response: {reason}\n{body}"),
            },
            Error::Http(message) => Self::TokenExchange {
                status: None,
                detail: message,
            },
            other => Self::Internal(other.to_string()),
        }
    }
}

/// Pretty-print a JSON body, or return it unchanged if it is not JSON.
fn pretty_body(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| body.to_owned())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_detail_includes_code_and_description() {
        let err = FlowError::Provider {
            error: "access_denied".into(),
            description: Some("The resource owner denied the request".into()),
        };
        assert_eq!(
            err.detail(),
            "access_denied: The resource owner denied the request"
        );
        assert_eq!(
            err.to_string(),
            "provider error: access_denied: The resource owner denied the request"
        );
        assert_eq!(err.title(), "Ory returned an error");
    }

    #[test]
    fn provider_error_without_description() {
        let err = FlowError::Provider {
            error: "login_required".into(),
            description: None,
        };
        assert_eq!(err.detail(), "login_required: no details");
    }

    #[test]
    fn token_endpoint_error_keeps_status_and_pretty_body() {
        let err = FlowError::from(Error::TokenEndpoint {
            status: 400,
            body: r#"{"error":"invalid_grant"}"#.into(),
        });
        assert_eq!(
            err,
            FlowError::TokenExchange {
                status: Some(400),
                detail: "HTTP 400\n{\n  \"error\": \"invalid_grant\"\n}".into(),
            }
        );
    }

    #[test]
    fn non_json_error_body_is_kept_verbatim() {
        let err = FlowError::from(Error::TokenEndpoint {
            status: 502,
            body: "Bad Gateway".into(),
        });
        assert_eq!(err.detail(), "HTTP 502\nBad Gateway");
    }

    #[test]
    fn transport_failure_has_no_status() {
        let err = FlowError::from(Error::Http("connection refused".into()));
        assert!(matches!(err, FlowError::TokenExchange { status: None, .. }));
        assert_eq!(err.category(), "token_exchange");
    }

    #[test]
    fn state_mismatch_report_is_generic() {
        let err = FlowError::StateMismatch;
        assert_eq!(err.title(), "Invalid state");
        assert!(err.detail().contains("Try again"));
        assert!(!err.is_internal());
    }

    #[test]
    fn empty_params_are_normalized_to_none() {
        let params = CallbackParams {
            code: Some(String::new()),
            state: Some("s".into()),
            error: Some(String::new()),
            error_description: None,
        }
        .normalized();
        assert!(params.code.is_none());
        assert_eq!(params.state.as_deref(), Some("s"));
        assert!(params.error.is_none());
    }
}
