use axum::Json;
use axum::extract::{Path, State};
use chrono::Utc;
use serde::Deserialize;

use super::{ApiJson, ApiQuery};
use crate::auth::Caller;
use crate::error::AppError;
use crate::models::{Category, PartUsed, Service};
use crate::services::{MaintenanceService, MonthFilter};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ServiceQueryParams {
    #[serde(default)]
    month: MonthFilter,
    category: Option<Category>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteBody {
    #[serde(default)]
    parts_used: Vec<PartUsed>,
}

pub async fn list(
    State(state): State<AppState>,
    caller: Caller,
    ApiQuery(params): ApiQuery<ServiceQueryParams>,
) -> Result<Json<Vec<Service>>, AppError> {
    let list = MaintenanceService::new(state.db.clone())
        .list_pending(&caller, params.month, params.category, Utc::now().date_naive())
        .await?;
    Ok(Json(list))
}

pub async fn get(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<Service>, AppError> {
    let service = MaintenanceService::new(state.db.clone()).get(&caller, &id).await?;
    Ok(Json(service))
}

pub async fn complete(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<CompleteBody>,
) -> Result<Json<Service>, AppError> {
    let service = MaintenanceService::new(state.db.clone())
        .complete(&caller, &id, body.parts_used)
        .await?;
    Ok(Json(service))
}
