//! Callback state machine
//!
//! Pure state machine: receives events, returns (new_state, action).
//! `AuthClient::complete_callback` executes the I/O implied by each action
//! and feeds the result back as the next event.
//!
//! ReceiveCallback -> ValidateState -> ExchangeCode -> DecodeIdentity
//!   -> FetchProfile -> Complete, with Failed reachable from the first three.

use serde_json::Value;

use crate::callback::{CallbackOutcome, CallbackParams, FlowError, PersistedFlow};
use crate::outcome::BestEffort;
use crate::token::{TokenResponse, TokenSummary};

/// Callback processing states
#[derive(Debug)]
pub enum CallbackState {
    /// Waiting for the redirect's query parameters
    ReceiveCallback,
    /// Parameters parsed, waiting for the persisted flow values
    ValidateState {
        code: Option<String>,
        returned_state: Option<String>,
    },
    /// Back-channel code exchange in flight
    ExchangeCode,
    /// Tokens issued, decoding the id_token
    DecodeIdentity { tokens: TokenResponse },
    /// Best-effort userinfo lookup in flight
    FetchProfile {
        tokens: TokenResponse,
        claims: BestEffort<Value>,
    },
    /// Terminal: flow succeeded
    Complete(Box<CallbackOutcome>),
    /// Terminal: flow failed, no usable tokens
    Failed(FlowError),
}

impl CallbackState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ReceiveCallback => "ReceiveCallback",
            Self::ValidateState { .. } => "ValidateState",
            Self::ExchangeCode => "ExchangeCode",
            Self::DecodeIdentity { .. } => "DecodeIdentity",
            Self::FetchProfile { .. } => "FetchProfile",
            Self::Complete(_) => "Complete",
            Self::Failed(_) => "Failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete(_) | Self::Failed(_))
    }
}

/// Events that drive state transitions
#[derive(Debug)]
pub enum CallbackEvent {
    /// Ory redirected back to `/callback`
    Received(CallbackParams),
    /// Persisted `state` / `code_verifier` read from the request
    PersistedFlowLoaded(PersistedFlow),
    /// Token endpoint returned a usable token response
    TokensIssued(TokenResponse),
    /// Token exchange failed (transport, status or body)
    ExchangeFailed(FlowError),
    /// id_token decoding finished (possibly degraded)
    IdentityDecoded(BestEffort<Value>),
    /// userinfo lookup finished (possibly degraded)
    ProfileFetched(BestEffort<Value>),
}

impl CallbackEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Received(_) => "Received",
            Self::PersistedFlowLoaded(_) => "PersistedFlowLoaded",
            Self::TokensIssued(_) => "TokensIssued",
            Self::ExchangeFailed(_) => "ExchangeFailed",
            Self::IdentityDecoded(_) => "IdentityDecoded",
            Self::ProfileFetched(_) => "ProfileFetched",
        }
    }
}

/// Actions the caller should execute after a state transition
#[derive(Debug, PartialEq)]
pub enum CallbackAction {
    /// Read the persisted flow values from the request
    LoadPersistedFlow,
    /// POST the code and verifier to the token endpoint
    ExchangeCode { code: String, code_verifier: String },
    /// Decode the id_token payload, if any
    DecodeIdentity { id_token: Option<String> },
    /// GET userinfo with the access token
    FetchProfile { access_token: String },
    /// Discard the persisted flow values; the flow is over.
    ///
    /// Only emitted alongside a terminal state, so `complete_callback`
    /// returns instead of executing it. Its caller owns the persisted values
    /// and must discard them on every outcome (the demo service clears both
    /// cookies before the flow runs).
    ClearPersistedFlow,
    /// No-op
    None,
}

/// Handle a state transition. Pure function: no I/O.
pub fn handle_event(state: CallbackState, event: CallbackEvent) -> (CallbackState, CallbackAction) {
    match (state, event) {
        // --- ReceiveCallback ---
        (CallbackState::ReceiveCallback, CallbackEvent::Received(params)) => {
            let params = params.normalized();
            match params.error {
                Some(error) => fail(FlowError::Provider {
                    error,
                    description: params.error_description,
                }),
                None => (
                    CallbackState::ValidateState {
                        code: params.code,
                        returned_state: params.state,
                    },
                    CallbackAction::LoadPersistedFlow,
                ),
            }
        }

        // --- ValidateState ---
        (
            CallbackState::ValidateState {
                code,
                returned_state,
            },
            CallbackEvent::PersistedFlowLoaded(persisted),
        ) => {
            let state_matches = match (returned_state.as_deref(), persisted.state.as_deref()) {
                (Some(returned), Some(saved)) => {
                    constant_time_eq(returned.as_bytes(), saved.as_bytes())
                }
                _ => false,
            };
            if !state_matches {
                return fail(FlowError::StateMismatch);
            }

            let Some(code_verifier) = persisted.code_verifier.filter(|v| !v.is_empty()) else {
                return fail(FlowError::MissingVerifier);
            };
            let Some(code) = code else {
                return fail(FlowError::MissingCode);
            };

            (
                CallbackState::ExchangeCode,
                CallbackAction::ExchangeCode {
                    code,
                    code_verifier,
                },
            )
        }

        // --- ExchangeCode ---
        (CallbackState::ExchangeCode, CallbackEvent::TokensIssued(tokens)) => {
            let id_token = tokens.id_token.clone();
            (
                CallbackState::DecodeIdentity { tokens },
                CallbackAction::DecodeIdentity { id_token },
            )
        }

        (CallbackState::ExchangeCode, CallbackEvent::ExchangeFailed(error)) => fail(error),

        // --- DecodeIdentity ---
        (CallbackState::DecodeIdentity { tokens }, CallbackEvent::IdentityDecoded(claims)) => {
            let access_token = tokens.access_token.clone();
            (
                CallbackState::FetchProfile { tokens, claims },
                CallbackAction::FetchProfile { access_token },
            )
        }

        // --- FetchProfile ---
        (CallbackState::FetchProfile { tokens, claims }, CallbackEvent::ProfileFetched(profile)) => (
            CallbackState::Complete(Box::new(CallbackOutcome {
                tokens: TokenSummary::from(&tokens),
                claims,
                profile,
            })),
            CallbackAction::ClearPersistedFlow,
        ),

        // --- Terminal states absorb everything ---
        (state, _event) if state.is_terminal() => (state, CallbackAction::None),

        // --- Out-of-order event: the driver has a bug ---
        (state, event) => fail(FlowError::Internal(format!(
            "unexpected event {} in state {}",
            event.name(),
            state.name()
        ))),
    }
}

fn fail(error: FlowError) -> (CallbackState, CallbackAction) {
    (
        CallbackState::Failed(error),
        CallbackAction::ClearPersistedFlow,
    )
}

/// Constant-time comparison for the CSRF state check.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
