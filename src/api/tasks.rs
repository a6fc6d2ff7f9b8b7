use axum::extract::{Path, State};
use axum::{Json, http::StatusCode};
use serde::Deserialize;

use super::{ApiJson, ApiQuery};
use crate::auth::Caller;
use crate::error::AppError;
use crate::models::*;
use crate::services::TaskService;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct TaskQueryParams {
    status: Option<TaskStatus>,
    #[serde(default)]
    shared: bool,
}

#[derive(Deserialize)]
pub struct StatusBody {
    status: TaskStatus,
}

fn tasks(state: &AppState) -> TaskService {
    TaskService::new(state.db.clone(), state.notifier.clone())
}

pub async fn create_batch(
    State(state): State<AppState>,
    caller: Caller,
    ApiJson(req): ApiJson<CreateBatchTaskRequest>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    let task = tasks(&state).create_batch(&caller, req).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn list(
    State(state): State<AppState>,
    caller: Caller,
    ApiQuery(params): ApiQuery<TaskQueryParams>,
) -> Result<Json<Vec<Task>>, AppError> {
    let list = tasks(&state).list(&caller, params.status, params.shared).await?;
    Ok(Json(list))
}

pub async fn get(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<Task>, AppError> {
    let task = tasks(&state).get(&caller, &id).await?;
    Ok(Json(task))
}

pub async fn member_services(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<Vec<Service>>, AppError> {
    let list = tasks(&state).services(&caller, &id).await?;
    Ok(Json(list))
}

pub async fn rename(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateTaskRequest>,
) -> Result<Json<Task>, AppError> {
    let task = tasks(&state).rename(&caller, &id, req).await?;
    Ok(Json(task))
}

pub async fn update_status(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<StatusBody>,
) -> Result<Json<Task>, AppError> {
    let task = tasks(&state).update_status(&caller, &id, body.status).await?;
    Ok(Json(task))
}

pub async fn share(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<ShareTaskRequest>,
) -> Result<Json<Task>, AppError> {
    let task = tasks(&state).share(&caller, &id, &req.phone_number).await?;
    Ok(Json(task))
}

pub async fn add_services(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<TaskServicesRequest>,
) -> Result<Json<Task>, AppError> {
    let task = tasks(&state).add_services(&caller, &id, req.service_ids).await?;
    Ok(Json(task))
}

pub async fn remove_services(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<TaskServicesRequest>,
) -> Result<Json<Task>, AppError> {
    let task = tasks(&state).remove_services(&caller, &id, req.service_ids).await?;
    Ok(Json(task))
}

pub async fn remove(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    tasks(&state).delete(&caller, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
