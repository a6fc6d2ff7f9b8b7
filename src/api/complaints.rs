use axum::extract::{Path, State};
use axum::{Json, http::StatusCode};
use serde::Deserialize;

use super::{ApiJson, ApiQuery};
use crate::auth::Caller;
use crate::error::AppError;
use crate::models::{Complaint, ComplaintStatus, NewComplaintRequest};
use crate::services::ComplaintService;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ComplaintQueryParams {
    status: Option<ComplaintStatus>,
}

#[derive(Deserialize)]
pub struct StatusBody {
    status: ComplaintStatus,
}

pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    ApiJson(req): ApiJson<NewComplaintRequest>,
) -> Result<(StatusCode, Json<Complaint>), AppError> {
    let complaint = ComplaintService::new(state.db.clone()).create(&caller, req).await?;
    Ok((StatusCode::CREATED, Json(complaint)))
}

pub async fn list(
    State(state): State<AppState>,
    caller: Caller,
    ApiQuery(params): ApiQuery<ComplaintQueryParams>,
) -> Result<Json<Vec<Complaint>>, AppError> {
    let list = ComplaintService::new(state.db.clone()).list(&caller, params.status).await?;
    Ok(Json(list))
}

pub async fn get(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<Complaint>, AppError> {
    let complaint = ComplaintService::new(state.db.clone()).get(&caller, &id).await?;
    Ok(Json(complaint))
}

pub async fn update_status(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<StatusBody>,
) -> Result<Json<Complaint>, AppError> {
    let complaint = ComplaintService::new(state.db.clone())
        .update_status(&caller, &id, body.status)
        .await?;
    Ok(Json(complaint))
}

pub async fn remove(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    ComplaintService::new(state.db.clone()).delete(&caller, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
