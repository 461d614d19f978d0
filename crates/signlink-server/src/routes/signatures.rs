use axum::{extract::State, Json};
use signlink_core::link::LinkRequest;
use signlink_core::wire::{FinalizeRequest, FinalizeResponse, StoreRequest, StoreResponse};

use crate::error::AppError;
use crate::extract::ApiJson;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// POST /api/signatures: validate and persist a captured signature.
pub async fn store_signature(
    State(app): State<AppState>,
    ApiJson(body): ApiJson<StoreRequest>,
) -> Result<Json<StoreResponse>, AppError> {
    let storage = app.linker.storage().clone();
    let reference = tokio::task::spawn_blocking(move || storage.store(&body.image))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(reference.into()))
}

// ---------------------------------------------------------------------------
// Finalize
// ---------------------------------------------------------------------------

/// POST /api/signatures/finalize: upload a stored signature and link it to
/// the submission's contact.
pub async fn finalize_signature(
    State(app): State<AppState>,
    ApiJson(body): ApiJson<FinalizeRequest>,
) -> Result<Json<FinalizeResponse>, AppError> {
    if body.form_id.trim().is_empty() {
        return Err(AppError::bad_request("form_id is required"));
    }
    if body.reference.trim().is_empty() {
        return Err(AppError::bad_request("reference is required"));
    }

    let outcome = app
        .linker
        .finalize(LinkRequest {
            form_id: body.form_id,
            reference: body.reference,
            email: body.email,
        })
        .await?;
    Ok(Json(outcome.into()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
