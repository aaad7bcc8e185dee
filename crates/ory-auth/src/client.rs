//! Ory client: login initiation and callback driver
//!
//! `AuthClient` bundles the HTTP client, client registration, redirect URI
//! and outbound timeout. Cloning is cheap (the reqwest client is an Arc).

use std::time::Duration;

use reqwest::Url;
use tracing::{debug, info, warn};

use crate::callback::{CallbackOutcome, CallbackParams, FlowError, PersistedFlow};
use crate::claims::identity_claims;
use crate::error::Result;
use crate::flow::{CallbackAction, CallbackEvent, CallbackState, handle_event};
use crate::pkce::{FlowState, build_authorization_url};
use crate::provider::ProviderConfig;
use crate::token::exchange_code;
use crate::userinfo::fetch_profile;

#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    provider: ProviderConfig,
    redirect_uri: String,
    timeout: Duration,
}

impl AuthClient {
    pub fn new(
        http: reqwest::Client,
        provider: ProviderConfig,
        redirect_uri: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            provider,
            redirect_uri: redirect_uri.into(),
            timeout,
        }
    }

    pub fn provider(&self) -> &ProviderConfig {
        &self.provider
    }

    /// Redirect URI registered with Ory; sent on both legs of the flow.
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Authorization URL for a freshly generated flow.
    pub fn authorization_url(&self, flow: &FlowState) -> Result<Url> {
        build_authorization_url(
            &self.provider,
            &self.redirect_uri,
            &flow.state,
            &flow.code_challenge(),
        )
    }

    /// Run the callback state machine to completion.
    ///
    /// The caller must discard the persisted flow values afterwards whatever
    /// the result, so they cannot be replayed.
    pub async fn complete_callback(
        &self,
        params: CallbackParams,
        persisted: PersistedFlow,
    ) -> std::result::Result<CallbackOutcome, FlowError> {
        let mut persisted = Some(persisted);
        let (mut state, mut action) =
            handle_event(CallbackState::ReceiveCallback, CallbackEvent::Received(params));

        while !state.is_terminal() {
            debug!(state = state.name(), "callback transition");
            let event = match action {
                CallbackAction::LoadPersistedFlow => {
                    CallbackEvent::PersistedFlowLoaded(persisted.take().unwrap_or_default())
                }
                CallbackAction::ExchangeCode {
                    code,
                    code_verifier,
                } => match exchange_code(
                    &self.http,
                    &self.provider,
                    &code,
                    &self.redirect_uri,
                    &code_verifier,
                    self.timeout,
                )
                .await
                {
                    Ok(tokens) => {
                        info!("authorization code exchanged");
                        CallbackEvent::TokensIssued(tokens)
                    }
                    Err(e) => {
                        warn!(error = %e, "token exchange failed");
                        CallbackEvent::ExchangeFailed(e.into())
                    }
                },
                CallbackAction::DecodeIdentity { id_token } => {
                    let claims = identity_claims(id_token.as_deref());
                    if let crate::BestEffort::Degraded { reason } = &claims {
                        warn!(reason = %reason, "id_token could not be decoded");
                    }
                    CallbackEvent::IdentityDecoded(claims)
                }
                CallbackAction::FetchProfile { access_token } => CallbackEvent::ProfileFetched(
                    fetch_profile(&self.http, &self.provider, &access_token, self.timeout).await,
                ),
                CallbackAction::ClearPersistedFlow | CallbackAction::None => {
                    // Only terminal states emit these
                    return Err(FlowError::Internal(format!(
                        "no action to take in state {}",
                        state.name()
                    )));
                }
            };
            (state, action) = handle_event(state, event);
        }

        match state {
            CallbackState::Complete(outcome) => Ok(*outcome),
            CallbackState::Failed(error) => Err(error),
            other => Err(FlowError::Internal(format!(
                "callback stopped in state {}",
                other.name()
            ))),
        }
    }
}
