//! Console error types
//!
//! Validation failures block a transition and are fully recoverable; client
//! failures carry the backend's `detail` when it sent one. Neither is ever
//! fatal to a page.

use mdp_client::ClientError;
use thiserror::Error;

/// A client-side validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Field-level errors, keyed by field name, in display order.
    #[error("{}", .0.first().map(|(_, msg)| msg.as_str()).unwrap_or("invalid input"))]
    Fields(Vec<(&'static str, String)>),

    /// Form-level error shown as a transient notice.
    #[error("{0}")]
    Form(String),
}

impl ValidationError {
    pub fn field(name: &'static str, message: impl Into<String>) -> Self {
        Self::Fields(vec![(name, message.into())])
    }

    /// Message for a specific field, if that field failed.
    pub fn field_message(&self, name: &str) -> Option<&str> {
        match self {
            Self::Fields(fields) => fields
                .iter()
                .find(|(field, _)| *field == name)
                .map(|(_, msg)| msg.as_str()),
            Self::Form(_) => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A submission for this action is already in flight.
    #[error("a request is already in progress")]
    AlreadyPending,

    #[error("action not available at step {0}")]
    WrongStep(usize),

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl ConsoleError {
    /// Text for a user-facing notice: validation text, server `detail`, or
    /// `fallback` when the server gave no usable message.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Validation(v) => v.to_string(),
            Self::Client(e) => e.detail().unwrap_or(fallback).to_string(),
            Self::AlreadyPending | Self::WrongStep(_) => fallback.to_string(),
        }
    }
}
