//! Shared types for the Ory auth demo workspace

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
