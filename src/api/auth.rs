use axum::extract::State;
use axum::{Json, http::StatusCode};
use serde::Deserialize;

use super::{ApiJson, ApiQuery};
use crate::auth::Caller;
use crate::error::AppError;
use crate::models::{LoginRequest, LoginResponse, NewTechnicianRequest, Technician, TechnicianPage};
use crate::services::AccountService;
use crate::state::AppState;

fn accounts(state: &AppState) -> AccountService {
    AccountService::new(state.db.clone(), state.auth.clone())
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<NewTechnicianRequest>,
) -> Result<(StatusCode, Json<Technician>), AppError> {
    let technician = accounts(&state).register(req).await?;
    Ok((StatusCode::CREATED, Json(technician)))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = accounts(&state).login(req).await?;
    Ok(Json(response))
}

pub async fn logout(State(state): State<AppState>, caller: Caller) -> Result<StatusCode, AppError> {
    accounts(&state).logout(&caller).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct TechnicianQueryParams {
    page: Option<u32>,
    limit: Option<u32>,
    search: Option<String>,
}

pub async fn list_technicians(
    State(state): State<AppState>,
    _caller: Caller,
    ApiQuery(params): ApiQuery<TechnicianQueryParams>,
) -> Result<Json<TechnicianPage>, AppError> {
    let page = accounts(&state)
        .list(params.page, params.limit, params.search.as_deref())
        .await?;
    Ok(Json(page))
}
