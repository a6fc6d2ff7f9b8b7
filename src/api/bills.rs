use axum::extract::{Path, State};
use axum::{Json, http::StatusCode};
use chrono::NaiveDate;
use serde::Deserialize;

use super::{ApiJson, ApiQuery};
use crate::auth::Caller;
use crate::db::bills::BillFilter;
use crate::error::AppError;
use crate::models::*;
use crate::services::BillingService;
use crate::services::billing::with_dates;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillQueryParams {
    status: Option<BillStatus>,
    customer_id: Option<String>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

fn billing(state: &AppState) -> BillingService {
    BillingService::new(state.db.clone(), state.notifier.clone())
}

pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    ApiJson(req): ApiJson<NewBillRequest>,
) -> Result<(StatusCode, Json<Bill>), AppError> {
    let bill = billing(&state).create(&caller, req).await?;
    Ok((StatusCode::CREATED, Json(bill)))
}

pub async fn list(
    State(state): State<AppState>,
    caller: Caller,
    ApiQuery(params): ApiQuery<BillQueryParams>,
) -> Result<Json<Vec<Bill>>, AppError> {
    let filter = BillFilter {
        status: params.status,
        customer_id: params.customer_id,
        ..Default::default()
    };
    let filter = with_dates(filter, params.start_date, params.end_date);
    let list = billing(&state).list(&caller, &filter).await?;
    Ok(Json(list))
}

pub async fn list_for_customer(
    State(state): State<AppState>,
    caller: Caller,
    Path(customer_id): Path<String>,
) -> Result<Json<Vec<Bill>>, AppError> {
    let list = billing(&state).list_for_customer(&caller, &customer_id).await?;
    Ok(Json(list))
}

pub async fn get(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<Bill>, AppError> {
    let bill = billing(&state).get(&caller, &id).await?;
    Ok(Json(bill))
}

pub async fn update(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateBillRequest>,
) -> Result<Json<Bill>, AppError> {
    let bill = billing(&state).update(&caller, &id, req).await?;
    Ok(Json(bill))
}

pub async fn remove(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    billing(&state).delete(&caller, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
