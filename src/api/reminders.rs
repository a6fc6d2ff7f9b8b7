use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use super::ApiJson;
use crate::auth::Caller;
use crate::error::AppError;
use crate::models::{NewReminderRequest, Reminder, ReminderEntity};
use crate::services::ReminderService;
use crate::state::AppState;

pub async fn add_to_customer(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<NewReminderRequest>,
) -> Result<(StatusCode, Json<Vec<Reminder>>), AppError> {
    let reminders = ReminderService::new(state.db.clone())
        .add(&caller, ReminderEntity::Customer, &id, req)
        .await?;
    Ok((StatusCode::CREATED, Json(reminders)))
}

pub async fn add_to_service(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<NewReminderRequest>,
) -> Result<(StatusCode, Json<Vec<Reminder>>), AppError> {
    let reminders = ReminderService::new(state.db.clone())
        .add(&caller, ReminderEntity::Service, &id, req)
        .await?;
    Ok((StatusCode::CREATED, Json(reminders)))
}

pub async fn remove_from_customer(
    State(state): State<AppState>,
    caller: Caller,
    Path((id, index)): Path<(String, usize)>,
) -> Result<Json<Vec<Reminder>>, AppError> {
    let reminders = ReminderService::new(state.db.clone())
        .delete(&caller, ReminderEntity::Customer, &id, index)
        .await?;
    Ok(Json(reminders))
}

pub async fn remove_from_service(
    State(state): State<AppState>,
    caller: Caller,
    Path((id, index)): Path<(String, usize)>,
) -> Result<Json<Vec<Reminder>>, AppError> {
    let reminders = ReminderService::new(state.db.clone())
        .delete(&caller, ReminderEntity::Service, &id, index)
        .await?;
    Ok(Json(reminders))
}

pub async fn list(
    State(state): State<AppState>,
    caller: Caller,
    Path((entity_type, entity_id)): Path<(String, String)>,
) -> Result<Json<Vec<Reminder>>, AppError> {
    let entity_type: ReminderEntity = entity_type.parse().map_err(AppError::InvalidInput)?;
    let reminders = ReminderService::new(state.db.clone())
        .list(&caller, entity_type, &entity_id)
        .await?;
    Ok(Json(reminders))
}
