use thiserror::Error;

use crate::phase::{Event, Phase};

/// Generic text shown to the signer when the server or network fails.
pub const GENERIC_FAILURE: &str = "Failed to upload signature. Please try again.";

/// A capability call into the host page failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct AccessError(pub String);

impl AccessError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Reasons `Coordinator::initialize` refuses to start.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("required capability is not available: {0}")]
    MissingCapability(&'static str),

    #[error("required option is missing: {0}")]
    MissingOption(&'static str),

    #[error("form renderer failed: {0}")]
    Render(#[source] AccessError),
}

/// Injection into the embedded form was abandoned. The form keeps working
/// without a signature field.
#[derive(Debug, Error)]
pub enum InjectError {
    #[error("signature placeholder not found: {0}")]
    PlaceholderMissing(String),

    #[error("marker field not found: {0}")]
    MarkerFieldMissing(String),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Phase(#[from] CoordinatorError),
}

/// Failures talking to the signature server.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid service URL: {0}")]
    InvalidUrl(String),

    /// The server answered `{success: false, message}`.
    #[error("server rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("malformed server response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ServiceError {
    /// Text suitable for the signer. Server messages are already sanitized;
    /// transport detail is not shown.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Rejected { message, .. } if !message.is_empty() => message.clone(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("event {event:?} is not valid in phase {from}")]
    InvalidTransition { from: Phase, event: Event },

    #[error("the capture surface is empty")]
    EmptyCapture,

    #[error("no stored signature reference for this submission")]
    NoStoredReference,

    #[error("submission payload carries no embed identifier")]
    MissingEmbedId,

    #[error("carried submission is unreadable: {0}")]
    Carrier(String),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl CoordinatorError {
    pub fn user_message(&self) -> String {
        match self {
            CoordinatorError::Service(e) => e.user_message(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}
