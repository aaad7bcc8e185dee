//! Service-specific error types

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::pages;

/// Request-path failures that are the server's fault.
///
/// Expected callback failures are `ory_auth::FlowError` and render their
/// own 400 page. Anything here is logged and shown as a generic 500 page.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("failed to build authorization URL: {0}")]
    AuthorizationUrl(#[from] ory_auth::Error),

    #[error("callback flow failed internally: {0}")]
    Flow(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!(error = %self, "unhandled error while processing request");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(pages::error_page("Server Error", "Internal error. Check the server logs.")),
        )
            .into_response()
    }
}
