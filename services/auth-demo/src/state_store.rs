//! Per-client flow state kept in cookies
//!
//! State and verifier survive exactly one round trip through Ory. Integrity
//! is not signed; the state comparison plus HttpOnly/Secure/SameSite=Lax
//! carry the security.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use ory_auth::{FlowState, PersistedFlow};

pub const STATE_COOKIE: &str = "ory_demo_state";
pub const VERIFIER_COOKIE: &str = "ory_demo_verifier";

/// Lifetime of an in-flight login attempt
pub const DEFAULT_TTL: time::Duration = time::Duration::seconds(600);

fn flow_cookie(name: &'static str, value: String, ttl: time::Duration) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(ttl)
        .build()
}

pub fn persist(jar: CookieJar, name: &'static str, value: &str, ttl: time::Duration) -> CookieJar {
    jar.add(flow_cookie(name, value.to_owned(), ttl))
}

/// Value sent back by the browser, if any. Empty values count as missing.
pub fn retrieve(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name)
        .map(|cookie| cookie.value().to_owned())
        .filter(|value| !value.is_empty())
}

/// Overwrite with an empty, already-expired cookie carrying the same attributes.
pub fn invalidate(jar: CookieJar, name: &'static str) -> CookieJar {
    jar.add(flow_cookie(name, String::new(), time::Duration::ZERO))
}

pub fn persist_flow(jar: CookieJar, flow: &FlowState) -> CookieJar {
    let jar = persist(jar, STATE_COOKIE, &flow.state, DEFAULT_TTL);
    persist(jar, VERIFIER_COOKIE, &flow.code_verifier, DEFAULT_TTL)
}

pub fn load_flow(jar: &CookieJar) -> PersistedFlow {
    PersistedFlow {
        state: retrieve(jar, STATE_COOKIE),
        code_verifier: retrieve(jar, VERIFIER_COOKIE),
    }
}

pub fn clear_flow(jar: CookieJar) -> CookieJar {
    invalidate(invalidate(jar, STATE_COOKIE), VERIFIER_COOKIE)
}
