//! JSON bodies exchanged between the coordinator and the server.

use serde::{Deserialize, Serialize};

use crate::image::ImageType;
use crate::link::LinkOutcome;
use crate::store::StoredImageReference;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreRequest {
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreResponse {
    pub success: bool,
    pub url: String,
    pub path: String,
    pub filename: String,
    pub size: usize,
    pub image_type: ImageType,
}

impl From<StoredImageReference> for StoreResponse {
    fn from(r: StoredImageReference) -> Self {
        Self {
            success: true,
            url: r.url,
            path: r.path.display().to_string(),
            filename: r.filename,
            size: r.size,
            image_type: r.image_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizeRequest {
    pub form_id: String,
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizeResponse {
    pub success: bool,
    pub form_id: String,
    pub file_id: String,
    pub file_url: String,
    pub contact_updated: bool,
    pub message: String,
}

impl From<LinkOutcome> for FinalizeResponse {
    fn from(o: LinkOutcome) -> Self {
        Self {
            success: true,
            message: o.message(),
            contact_updated: o.contact.is_updated(),
            form_id: o.form_id,
            file_id: o.file.id,
            file_url: o.file.url,
        }
    }
}

/// Uniform failure body for every operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::{ContactOutcome, RemoteFile};

    #[test]
    fn finalize_response_reflects_contact_failure() {
        let outcome = LinkOutcome {
            form_id: "F1".into(),
            file: RemoteFile {
                id: "9".into(),
                url: "https://f/9".into(),
            },
            contact: ContactOutcome::Failed("timeout".into()),
        };
        let resp = FinalizeResponse::from(outcome);
        assert!(resp.success);
        assert!(!resp.contact_updated);
        assert_eq!(resp.file_id, "9");
    }

    #[test]
    fn finalize_request_email_is_optional() {
        let req: FinalizeRequest =
            serde_json::from_str(r#"{"form_id":"F1","reference":"r"}"#).unwrap();
        assert_eq!(req.email, None);
    }

    #[test]
    fn error_response_is_unsuccessful() {
        let json = serde_json::to_value(ErrorResponse::new("nope")).unwrap();
        assert_eq!(json, serde_json::json!({ "success": false, "message": "nope" }));
    }
}
