use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use signlink_core::error::SignlinkError;
use signlink_core::wire::ErrorResponse;

// ---------------------------------------------------------------------------
// Internal sentinel for explicit 400 errors
// ---------------------------------------------------------------------------

/// Private sentinel error type used to carry a request-shape problem through
/// the `anyhow::Error` chain without touching the `SignlinkError` enum.
#[derive(Debug)]
struct BadRequestError(String);

impl std::fmt::Display for BadRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BadRequestError {}

// ---------------------------------------------------------------------------
// AppError: unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
///
/// Every failure renders as `{ "success": false, "message": … }`. Remote and
/// internal failures get a generic message; the detail goes to the log.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 400 Bad Request error with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(BadRequestError(msg.into()).into())
    }
}

const UPLOAD_FAILED: &str = "Failed to upload signature. Please try again.";
const STORAGE_FAILED: &str = "Failed to save signature.";
const NOT_CONFIGURED: &str = "Signature service is not configured.";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = if let Some(b) = self.0.downcast_ref::<BadRequestError>() {
            (StatusCode::BAD_REQUEST, b.0.clone())
        } else if let Some(e) = self.0.downcast_ref::<SignlinkError>() {
            match e {
                e if e.is_validation() => (StatusCode::BAD_REQUEST, e.to_string()),
                SignlinkError::ReferenceNotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
                SignlinkError::ConfigMissing(_) => {
                    (StatusCode::SERVICE_UNAVAILABLE, NOT_CONFIGURED.to_string())
                }
                SignlinkError::Upload(_) | SignlinkError::ContactUpdate(_) => {
                    (StatusCode::BAD_GATEWAY, UPLOAD_FAILED.to_string())
                }
                _ => (StatusCode::INTERNAL_SERVER_ERROR, STORAGE_FAILED.to_string()),
            }
        } else {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        };

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %format!("{:#}", self.0), "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self.0, "request rejected");
        }

        (status, axum::Json(ErrorResponse::new(message))).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
