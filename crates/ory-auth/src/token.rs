//! OAuth token exchange
//!
//! POSTs the authorization code and PKCE verifier to Ory's token endpoint.
//! Confidential clients authenticate with HTTP Basic; public clients put
//! `client_id` in the form body instead.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::TOKEN_PREVIEW_CHARS;
use crate::error::{Error, Result};
use crate::provider::ProviderConfig;

/// Token endpoint response.
///
/// Treated as opaque apart from `id_token`. Ory omits `refresh_token` and
/// `id_token` when the matching scopes were not granted.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Seconds until the access token expires (delta, not absolute)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Redacted view of a `TokenResponse` that is safe to render.
///
/// Tokens are cut to their first `TOKEN_PREVIEW_CHARS` characters followed
/// by `...`. The id_token is left out; its claims are shown separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenSummary {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl From<&TokenResponse> for TokenSummary {
    fn from(tokens: &TokenResponse) -> Self {
        Self {
            access_token: Some(preview(&tokens.access_token)),
            refresh_token: tokens.refresh_token.as_deref().map(preview),
            token_type: tokens.token_type.clone(),
            expires_in: tokens.expires_in,
            scope: tokens.scope.clone(),
        }
    }
}

fn preview(token: &str) -> String {
    let head: String = token.chars().take(TOKEN_PREVIEW_CHARS).collect();
    format!("{head}...")
}

/// Exchange an authorization code for tokens.
///
/// `redirect_uri` must be the exact value sent in the authorization request.
/// The raw response body is kept on failure so the operator can see what
/// Ory rejected.
pub async fn exchange_code(
    client: &reqwest::Client,
    provider: &ProviderConfig,
    code: &str,
    redirect_uri: &str,
    code_verifier: &str,
    timeout: Duration,
) -> Result<TokenResponse> {
    let mut form = vec![
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", redirect_uri),
        ("code_verifier", code_verifier),
    ];

    let mut request = client.post(provider.token_endpoint()).timeout(timeout);
    match provider.client_secret() {
        Some(secret) => {
            request = request.basic_auth(provider.client_id(), Some(secret.expose()));
        }
        None => form.push(("client_id", provider.client_id())),
    }

    let response = request
        .form(&form)
        .send()
        .await
        .map_err(|e| Error::Http(format!("token exchange request failed: {e}")))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| Error::Http(format!("reading token response failed: {e}")))?;
    debug!(status = status.as_u16(), "token endpoint responded");

    if !status.is_success() {
        return Err(Error::TokenEndpoint {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str::<TokenResponse>(&body).map_err(|e| Error::InvalidTokenResponse {
        status: status.as_u16(),
        reason: e.to_string(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Form;
    use axum::http::{HeaderMap, StatusCode};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    #[derive(Debug, Clone)]
    struct CapturedRequest {
        authorization: Option<String>,
        form: HashMap<String, String>,
    }

    /// Start a mock token endpoint that records each request and replies
    /// with the given status and body.
    async fn start_token_server(
        status: StatusCode,
        body: &'static str,
    ) -> (String, Arc<Mutex<Vec<CapturedRequest>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let captured = Arc::new(Mutex::new(Vec::new()));
        let sink = captured.clone();

        let app = axum::Router::new().route(
            "/oauth2/token",
            axum::routing::post(
                move |headers: HeaderMap, Form(form): Form<HashMap<String, String>>| {
                    let sink = sink.clone();
                    async move {
                        sink.lock().unwrap().push(CapturedRequest {
                            authorization: headers
                                .get("authorization")
                                .and_then(|v| v.to_str().ok())
                                .map(str::to_owned),
                            form,
                        });
                        (status, [("content-type", "application/json")], body)
                    }
                },
            ),
        );
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        (url, captured)
    }

    #[test]
    fn token_response_deserializes_minimal_body() {
        let json = r#"{"access_token":"tok123","token_type":"bearer","expires_in":3600}"#;
        let tokens: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(tokens.access_token, "tok123");
        assert_eq!(tokens.token_type.as_deref(), Some("bearer"));
        assert_eq!(tokens.expires_in, Some(3600));
        assert!(tokens.refresh_token.is_none());
        assert!(tokens.id_token.is_none());
        assert!(tokens.scope.is_none());
    }

    #[test]
    fn token_response_requires_access_token() {
        let result = serde_json::from_str::<TokenResponse>(r#"{"token_type":"bearer"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn summary_truncates_tokens() {
        let tokens = TokenResponse {
            access_token: "ory_at_abcdefghijklmnopqrstuvwxyz".into(),
            refresh_token: Some("ory_rt_0123456789abcdefghij".into()),
            id_token: Some("a.b.c".into()),
            token_type: Some("bearer".into()),
            expires_in: Some(3599),
            scope: Some("openid offline_access".into()),
        };
        let summary = TokenSummary::from(&tokens);
        assert_eq!(
            summary.access_token.as_deref(),
            Some("ory_at_abcdefghijklm...")
        );
        assert_eq!(
            summary.refresh_token.as_deref(),
            Some("ory_rt_0123456789abc...")
        );
        assert_eq!(summary.scope.as_deref(), Some("openid offline_access"));

        let json = serde_json::to_string(&summary).unwrap();
        assert!(!json.contains("abcdefghijklmnopqrstuvwxyz"));
        assert!(!json.contains("id_token"));
    }

    #[test]
    fn summary_of_short_token_still_marks_truncation() {
        let tokens: TokenResponse = serde_json::from_str(r#"{"access_token":"tok123"}"#).unwrap();
        let summary = TokenSummary::from(&tokens);
        assert_eq!(summary.access_token.as_deref(), Some("tok123..."));
        assert!(summary.refresh_token.is_none());

        let json = serde_json::to_value(&summary).unwrap();
        assert!(json["refresh_token"].is_null());
        assert!(json.get("token_type").is_none());
    }

    #[tokio::test]
    async fn public_client_sends_client_id_in_body() {
        let (url, captured) = start_token_server(
            StatusCode::OK,
            r#"{"access_token":"at_public","token_type":"bearer","expires_in":3600}"#,
        )
        .await;
        let provider = ProviderConfig::new(url, "public-client", None);

        let tokens = exchange_code(
            &reqwest::Client::new(),
            &provider,
            "ABC123",
            "http://localhost:8787/callback",
            "verifier-xyz",
            DEFAULT_TEST_TIMEOUT,
        )
        .await
        .unwrap();
        assert_eq!(tokens.access_token, "at_public");

        let requests = captured.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let req = &requests[0];
        assert!(req.authorization.is_none(), "public client must not send Basic auth");
        assert_eq!(req.form["grant_type"], "authorization_code");
        assert_eq!(req.form["code"], "ABC123");
        assert_eq!(req.form["redirect_uri"], "http://localhost:8787/callback");
        assert_eq!(req.form["code_verifier"], "verifier-xyz");
        assert_eq!(req.form["client_id"], "public-client");
    }

    #[tokio::test]
    async fn confidential_client_uses_basic_auth() {
        use base64::Engine;
        use base64::engine::general_purpose::STANDARD;

        let (url, captured) =
            start_token_server(StatusCode::OK, r#"{"access_token":"at_conf"}"#).await;
        let provider = ProviderConfig::new(
            url,
            "conf-client",
            Some(common::Secret::new("s3cret".to_string())),
        );

        exchange_code(
            &reqwest::Client::new(),
            &provider,
            "code-1",
            "http://localhost:8787/callback",
            "verifier-1",
            DEFAULT_TEST_TIMEOUT,
        )
        .await
        .unwrap();

        let requests = captured.lock().unwrap();
        let expected = format!("Basic {}", STANDARD.encode("conf-client:s3cret"));
        assert_eq!(requests[0].authorization.as_deref(), Some(expected.as_str()));
        assert!(
            !requests[0].form.contains_key("client_id"),
            "confidential client authenticates via header only"
        );
    }

    #[tokio::test]
    async fn error_status_keeps_status_and_body() {
        let (url, _captured) = start_token_server(
            StatusCode::BAD_REQUEST,
            r#"{"error":"invalid_grant","error_description":"code expired"}"#,
        )
        .await;
        let provider = ProviderConfig::new(url, "client-1", None);

        let err = exchange_code(
            &reqwest::Client::new(),
            &provider,
            "stale",
            "http://localhost:8787/callback",
            "v",
            DEFAULT_TEST_TIMEOUT,
        )
        .await
        .unwrap_err();

        match err {
            Error::TokenEndpoint { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("invalid_grant"));
            }
            other => panic!("expected TokenEndpoint, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_success_body_is_rejected() {
        let (url, _captured) = start_token_server(StatusCode::OK, "<html>oops</html>").await;
        let provider = ProviderConfig::new(url, "client-1", None);

        let err = exchange_code(
            &reqwest::Client::new(),
            &provider,
            "c",
            "http://localhost:8787/callback",
            "v",
            DEFAULT_TEST_TIMEOUT,
        )
        .await
        .unwrap_err();

        match err {
            Error::InvalidTokenResponse { status, body, .. } => {
                assert_eq!(status, 200);
                assert_eq!(body, "<html>oops</html>");
            }
            other => panic!("expected InvalidTokenResponse, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_http_error() {
        let provider = ProviderConfig::new("http://127.0.0.1:1", "client-1", None);
        let err = exchange_code(
            &reqwest::Client::new(),
            &provider,
            "c",
            "http://localhost:8787/callback",
            "v",
            DEFAULT_TEST_TIMEOUT,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Http(_)), "got {err:?}");
    }

    const DEFAULT_TEST_TIMEOUT: Duration = Duration::from_secs(5);
}
