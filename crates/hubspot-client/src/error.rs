use thiserror::Error;

#[derive(Debug, Error)]
pub enum HubSpotError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("response missing field '{0}'")]
    MissingField(&'static str),
}

impl HubSpotError {
    /// True when the request was abandoned because its deadline elapsed.
    pub fn is_timeout(&self) -> bool {
        matches!(self, HubSpotError::Transport(e) if e.is_timeout())
    }
}
