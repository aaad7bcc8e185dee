//! HTML pages served by the demo
//!
//! Every interpolated value goes through `escape_html`; provider error
//! descriptions and token endpoint bodies are attacker-influenced.

use ory_auth::{CallbackOutcome, ProviderConfig, SCOPES, claims_for_display};
use serde_json::Value;

const STYLE: &str = "body{font-family:system-ui,sans-serif;background:#f4f5f7;margin:0;padding:40px}\
.card{max-width:760px;margin:0 auto;background:#fff;border-radius:8px;padding:24px 32px;box-shadow:0 1px 3px rgba(0,0,0,.1)}\
.p{margin:6px 0}.warn{background:#fff4e5;border-left:4px solid #f59e0b;padding:8px 12px;margin:12px 0}\
pre{background:#f6f8fa;padding:12px;overflow-x:auto;white-space:pre-wrap;word-break:break-all}\
.btn{display:inline-block;margin-top:16px;padding:10px 18px;background:#4f46e5;color:#fff;border-radius:6px;text-decoration:none}";

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n  <meta charset=\"utf-8\"><title>{title}</title>\n  \
         <style>{STYLE}</style>\n</head>\n<body>\n  <div class=\"card\">\n{body}\n  </div>\n</body>\n</html>\n"
    )
}

/// Configuration summary with a login link.
pub fn home_page(provider: &ProviderConfig, redirect_uri: &str) -> String {
    let secret_status = if provider.has_client_secret() {
        "configured"
    } else {
        "NOT SET"
    };
    let warning = if provider.has_client_secret() {
        String::new()
    } else {
        "    <div class=\"warn\">No client secret configured. Set ORY_CLIENT_SECRET or \
         <code>client_secret_file</code>, or register the client as public (PKCE only).</div>\n"
            .to_owned()
    };

    let body = format!(
        "    <h1>Ory OAuth2 Demo</h1>\n\
         \x20   <div class=\"p\"><b>Ory Project:</b> {base_url}</div>\n\
         \x20   <div class=\"p\"><b>Client ID:</b> {client_id}</div>\n\
         \x20   <div class=\"p\"><b>Redirect URI:</b> {redirect_uri}</div>\n\
         \x20   <div class=\"p\"><b>Scopes:</b> {SCOPES}</div>\n\
         \x20   <div class=\"p\"><b>Client Secret:</b> {secret_status}</div>\n\
         {warning}\
         \x20   <a class=\"btn\" href=\"/login\">Login with Ory</a>",
        base_url = escape_html(provider.base_url()),
        client_id = escape_html(provider.client_id()),
        redirect_uri = escape_html(redirect_uri),
    );
    layout("Ory Auth Demo", &body)
}

/// Diagnostic page for a failed or broken callback.
pub fn error_page(title: &str, detail: &str) -> String {
    let title = escape_html(title);
    let body = format!(
        "    <h1>{title}</h1>\n    <pre>{detail}</pre>\n    <a href=\"/\">Try again</a>",
        detail = escape_html(detail),
    );
    layout("Auth Error", &body)
}

/// Result page: redacted tokens, identity claims and, if fetched, the profile.
pub fn success_page(outcome: &CallbackOutcome) -> String {
    let tokens = pretty(&serde_json::to_value(&outcome.tokens).unwrap_or(Value::Null));
    let claims = pretty(&claims_for_display(&outcome.claims));
    let profile = outcome
        .profile
        .value()
        .map(|profile| {
            format!(
                "    <h2>UserInfo endpoint</h2>\n    <pre>{}</pre>\n",
                escape_html(&pretty(profile))
            )
        })
        .unwrap_or_default();

    let body = format!(
        "    <h1>Authorization Successful</h1>\n\
         \x20   <p class=\"sub\">Ory OAuth2 flow completed.</p>\n\
         \x20   <h2>Tokens received</h2>\n    <pre>{tokens}</pre>\n\
         \x20   <h2>ID Token claims</h2>\n    <pre>{claims}</pre>\n\
         {profile}\
         \x20   <a href=\"/\">Back to home</a>",
        tokens = escape_html(&tokens),
        claims = escape_html(&claims),
    );
    layout("Auth Success", &body)
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
