use axum::{extract::State, http::StatusCode, Json};
use tracing::error;

use super::AppState;
use crate::store::ExportRun;

pub async fn get_export_status(
    State(state): State<AppState>,
) -> Result<Json<Option<ExportRun>>, StatusCode> {
    state.store.latest_export().await.map(Json).map_err(|e| {
        error!("Failed to load export status: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}
