//! OAuth2 Authorization Code + PKCE client for Ory
//!
//! Provides state/verifier generation, authorization URL construction, the
//! back-channel token exchange, identity-token decoding and the callback
//! state machine used by the demo service. This crate knows nothing about
//! HTTP serving or cookies; the service carries the flow state between
//! requests and renders the results.
//!
//! Flow:
//! 1. `FlowState::generate()` creates fresh `state` + `code_verifier`
//! 2. `build_authorization_url()` sends the user agent to Ory
//! 3. The service persists the `FlowState` client-side
//! 4. On callback, `AuthClient::complete_callback()` drives `flow::handle_event`
//!    through validation, code exchange, id_token decoding and userinfo
//! 5. The service discards the persisted `FlowState` whatever the outcome

pub mod callback;
pub mod claims;
pub mod client;
pub mod constants;
pub mod error;
pub mod flow;
pub mod outcome;
pub mod pkce;
pub mod provider;
pub mod token;
pub mod userinfo;

pub use callback::{CallbackOutcome, CallbackParams, FlowError, PersistedFlow};
pub use claims::{claims_for_display, decode_id_token};
pub use client::AuthClient;
pub use constants::*;
pub use error::{Error, Result};
pub use outcome::BestEffort;
pub use pkce::{
    FlowState, build_authorization_url, compute_challenge, generate_random_token, generate_state,
    generate_verifier,
};
pub use provider::ProviderConfig;
pub use token::{TokenResponse, TokenSummary};
