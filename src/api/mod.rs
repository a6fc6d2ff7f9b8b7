mod auth;
mod bills;
mod complaints;
mod customers;
mod dashboard;
mod reminders;
mod services;
mod tasks;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Query, Request, State};
use axum::http::request::Parts;
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router, http::StatusCode};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::state::AppState;

/// `Json` whose rejections surface as [`AppError::InvalidInput`], so malformed
/// bodies and unknown enum values share the error body of every other failure.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::InvalidInput(rejection.body_text()))?;
        Ok(ApiJson(value))
    }
}

/// `Query` counterpart of [`ApiJson`].
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::InvalidInput(rejection.body_text()))?;
        Ok(ApiQuery(value))
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/customers", get(customers::list).post(customers::create))
        .route(
            "/customers/{id}",
            get(customers::get).put(customers::update).delete(customers::remove),
        )
        .route("/customers/{id}/status", patch(customers::update_status))
        .route("/customers/{id}/bills", get(bills::list_for_customer))
        .route("/customers/{id}/reminders", post(reminders::add_to_customer))
        .route("/customers/{id}/reminders/{index}", delete(reminders::remove_from_customer))
        .route("/services", get(services::list))
        .route("/services/batch-task", post(tasks::create_batch))
        .route("/services/{id}", get(services::get))
        .route("/services/{id}/complete", post(services::complete))
        .route("/services/{id}/reminders", post(reminders::add_to_service))
        .route("/services/{id}/reminders/{index}", delete(reminders::remove_from_service))
        .route("/reminders/{entity_type}/{entity_id}", get(reminders::list))
        .route("/tasks", get(tasks::list))
        .route("/tasks/{id}", get(tasks::get).put(tasks::rename).delete(tasks::remove))
        .route("/tasks/{id}/status", patch(tasks::update_status))
        .route("/tasks/{id}/share", post(tasks::share))
        .route(
            "/tasks/{id}/services",
            get(tasks::member_services)
                .post(tasks::add_services)
                .delete(tasks::remove_services),
        )
        .route("/bills", get(bills::list).post(bills::create))
        .route("/bills/{id}", get(bills::get).patch(bills::update).delete(bills::remove))
        .route("/complaints", get(complaints::list).post(complaints::create))
        .route("/complaints/{id}", get(complaints::get).delete(complaints::remove))
        .route("/complaints/{id}/status", patch(complaints::update_status))
        .route("/dashboard", get(dashboard::summary))
        .route("/technicians", get(auth::list_technicians));

    Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}
