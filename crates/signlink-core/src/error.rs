use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignlinkError {
    #[error("Invalid image type")]
    InvalidImageType,

    #[error("Invalid image data")]
    InvalidImageData,

    #[error("Image too large: {size} bytes exceeds the {limit} byte limit")]
    ImageTooLarge { size: usize, limit: usize },

    #[error("invalid signature reference: {0}")]
    InvalidReference(String),

    #[error("signature not found (already linked or expired): {0}")]
    ReferenceNotFound(String),

    #[error("missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("upload failed: {0}")]
    Upload(String),

    #[error("contact update failed: {0}")]
    ContactUpdate(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SignlinkError {
    /// Errors caused by the caller's input rather than by this service or a
    /// remote dependency.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SignlinkError::InvalidImageType
                | SignlinkError::InvalidImageData
                | SignlinkError::ImageTooLarge { .. }
                | SignlinkError::InvalidReference(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SignlinkError>;
