//! Router and request handlers
//!
//! Three routes: `/` shows the configuration, `/login` starts a PKCE flow,
//! `/callback` finishes it. Everything else is 404.

use axum::Router;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum_extra::extract::cookie::CookieJar;
use ory_auth::{AuthClient, CallbackParams, FlowState};
use tracing::{info, instrument, warn};

use crate::error::AppError;
use crate::pages;
use crate::state_store;

/// Shared application state accessible from all handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthClient,
}

/// Build the axum router with all routes and shared state.
pub fn build_router(state: AppState, max_connections: usize) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/login", get(login_handler))
        .route("/callback", get(callback_handler))
        .fallback(not_found_handler)
        .method_not_allowed_fallback(not_found_handler)
        .layer(tower::limit::ConcurrencyLimitLayer::new(max_connections))
        .with_state(state)
}

fn new_request_id() -> String {
    format!("req_{}", uuid::Uuid::new_v4().as_simple())
}

async fn home_handler(State(state): State<AppState>) -> Html<String> {
    Html(pages::home_page(
        state.auth.provider(),
        state.auth.redirect_uri(),
    ))
}

async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    login(&state, jar, new_request_id())
}

/// Generate a fresh flow, persist it in cookies and send the browser to Ory.
#[instrument(skip_all, fields(request_id = %request_id))]
fn login(state: &AppState, jar: CookieJar, request_id: String) -> Result<Response, AppError> {
    let flow = FlowState::generate();
    let url = state.auth.authorization_url(&flow)?;
    let jar = state_store::persist_flow(jar, &flow);

    info!(
        authorization_endpoint = %state.auth.provider().authorization_endpoint(),
        "login initiated, redirecting to Ory"
    );

    // axum's Redirect helpers use 303/307; the flow expects a plain 302
    Ok((StatusCode::FOUND, jar, [(header::LOCATION, url.to_string())]).into_response())
}

async fn callback_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    query: Result<Query<CallbackParams>, QueryRejection>,
) -> Response {
    callback(&state, jar, query, new_request_id()).await
}

/// Finish the flow. Persisted values are cleared whatever the result.
#[instrument(skip_all, fields(request_id = %request_id))]
async fn callback(
    state: &AppState,
    jar: CookieJar,
    query: Result<Query<CallbackParams>, QueryRejection>,
    request_id: String,
) -> Response {
    let persisted = state_store::load_flow(&jar);
    let jar = state_store::clear_flow(jar);

    let params = match query {
        Ok(Query(params)) => params,
        Err(rejection) => {
            warn!(error = %rejection, "malformed callback query");
            return (
                StatusCode::BAD_REQUEST,
                jar,
                Html(pages::error_page(
                    "Invalid callback",
                    &rejection.body_text(),
                )),
            )
                .into_response();
        }
    };

    match state.auth.complete_callback(params, persisted).await {
        Ok(outcome) => {
            info!(
                has_claims = outcome.claims.value().is_some(),
                has_profile = outcome.profile.value().is_some(),
                "login completed"
            );
            (jar, Html(pages::success_page(&outcome))).into_response()
        }
        Err(e) if e.is_internal() => (jar, AppError::Flow(e.to_string())).into_response(),
        Err(e) => {
            warn!(category = e.category(), error = %e, "callback failed");
            (
                StatusCode::BAD_REQUEST,
                jar,
                Html(pages::error_page(e.title(), &e.detail())),
            )
                .into_response()
        }
    }
}

async fn not_found_handler() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found")
}
