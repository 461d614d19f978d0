use axum::{extract::State, Json};

use crate::state::AppState;

/// GET /api/health: liveness plus whether finalize can run.
pub async fn health(State(app): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "finalize_configured": app.config().require_remote().is_ok(),
    }))
}
