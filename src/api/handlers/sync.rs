use axum::extract::State;
use axum::Json;

use super::ApiResponse;
use crate::services::sync::{self, SyncReport};
use crate::AppState;

/// POST /api/sync — run one discovery-and-sync pass on demand. Best-effort
/// by design; the report says what was reached, never an error.
pub async fn run(State(state): State<AppState>) -> Json<ApiResponse<SyncReport>> {
    let report = sync::run_sync_once(&state.chain, &state.db).await;
    ApiResponse::ok(report)
}
