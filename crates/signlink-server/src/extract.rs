use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::Json;

use crate::error::AppError;

/// JSON body extractor whose rejections render through [`AppError`], so a
/// malformed or oversized body gets the same `{success, message}` shape as
/// every other failure.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(rejected(rejection)),
        }
    }
}

fn rejected(rejection: JsonRejection) -> AppError {
    // Only the base64 image can push a body past the limit.
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::bad_request("Image too large");
    }
    AppError::bad_request(format!("Invalid request body: {}", rejection.body_text()))
}
