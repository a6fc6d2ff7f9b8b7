use axum::extract::{Path, State};
use axum::{Json, http::StatusCode};
use serde::Deserialize;

use super::{ApiJson, ApiQuery};
use crate::auth::Caller;
use crate::error::AppError;
use crate::models::*;
use crate::services::CustomerService;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CustomerQueryParams {
    status: Option<CustomerStatus>,
}

#[derive(Deserialize)]
pub struct StatusBody {
    status: CustomerStatus,
}

fn customers(state: &AppState) -> CustomerService {
    CustomerService::new(state.db.clone(), state.notifier.clone())
}

pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    ApiJson(req): ApiJson<NewCustomerRequest>,
) -> Result<(StatusCode, Json<Customer>), AppError> {
    let customer = customers(&state).create(&caller, req).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn list(
    State(state): State<AppState>,
    caller: Caller,
    ApiQuery(params): ApiQuery<CustomerQueryParams>,
) -> Result<Json<Vec<Customer>>, AppError> {
    let list = customers(&state).list(&caller, params.status).await?;
    Ok(Json(list))
}

pub async fn get(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<Customer>, AppError> {
    let customer = customers(&state).get(&caller, &id).await?;
    Ok(Json(customer))
}

pub async fn update(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateCustomerRequest>,
) -> Result<Json<Customer>, AppError> {
    let customer = customers(&state).update(&caller, &id, req).await?;
    Ok(Json(customer))
}

pub async fn update_status(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<StatusBody>,
) -> Result<Json<Customer>, AppError> {
    let customer = customers(&state).update_status(&caller, &id, body.status).await?;
    Ok(Json(customer))
}

pub async fn remove(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    customers(&state).delete(&caller, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
