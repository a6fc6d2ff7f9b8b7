use axum::Json;
use axum::extract::State;

use crate::auth::Caller;
use crate::error::AppError;
use crate::services::{DashboardService, DashboardSummary};
use crate::state::AppState;

pub async fn summary(State(state): State<AppState>, caller: Caller) -> Result<Json<DashboardSummary>, AppError> {
    let summary = DashboardService::new(state.db.clone()).summary(&caller).await?;
    Ok(Json(summary))
}
