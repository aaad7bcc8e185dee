//! Result type for best-effort steps of the callback flow
//!
//! Identity-token decoding and the userinfo fetch never fail the flow. Their
//! outcome is kept explicit so callers and tests can tell "nothing to do"
//! apart from "tried and failed".

use std::fmt::Display;

#[derive(Debug, Clone, PartialEq)]
pub enum BestEffort<T> {
    /// Step succeeded
    Value(T),
    /// Step had no input to work with (e.g. no id_token issued)
    Absent,
    /// Step failed; the flow continues without the value
    Degraded { reason: String },
}

impl<T> BestEffort<T> {
    pub fn from_result<E: Display>(result: std::result::Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Value(value),
            Err(e) => Self::Degraded {
                reason: e.to_string(),
            },
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}
