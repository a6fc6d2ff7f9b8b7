use chrono::{Datelike, Months, NaiveDate, Utc};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::info;

use crate::auth::Caller;
use crate::db::services;
use crate::error::AppError;
use crate::models::{Category, PartUsed, Service, ServiceStatus};

/// Which scheduled dates a service listing covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonthFilter {
    #[default]
    Current,
    All,
}

/// First and last day of the month containing `today`.
pub fn month_window(today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let start = today.with_day(1)?;
    let end = start.checked_add_months(Months::new(1))?.pred_opt()?;
    Some((start, end))
}

pub struct MaintenanceService {
    db: SqlitePool,
}

impl MaintenanceService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Pending services of the caller in scheduled-date order.
    pub async fn list_pending(
        &self,
        caller: &Caller,
        month: MonthFilter,
        category: Option<Category>,
        today: NaiveDate,
    ) -> Result<Vec<Service>, AppError> {
        let window = match month {
            MonthFilter::All => None,
            MonthFilter::Current => Some(
                month_window(today)
                    .ok_or_else(|| AppError::Internal(format!("no month window for {}", today)))?,
            ),
        };

        let list = services::fetch_pending_services(&self.db, &caller.technician_id, category, window).await?;
        Ok(list)
    }

    pub async fn get(&self, caller: &Caller, id: &str) -> Result<Service, AppError> {
        services::find_service(&self.db, id, &caller.technician_id)
            .await?
            .ok_or(AppError::NotFound("Service"))
    }

    /// Marks a pending service completed. The owning task, if any, keeps its
    /// own status.
    pub async fn complete(&self, caller: &Caller, id: &str, parts_used: Vec<PartUsed>) -> Result<Service, AppError> {
        for part in &parts_used {
            if part.part_name.trim().is_empty() {
                return Err(AppError::InvalidInput("partName must not be empty".to_string()));
            }
            if part.quantity < 1 {
                return Err(AppError::InvalidInput(format!(
                    "quantity for {} must be at least 1",
                    part.part_name
                )));
            }
        }

        let service = self.get(caller, id).await?;
        if service.status == ServiceStatus::Completed {
            return Err(AppError::Conflict("Service is already completed".to_string()));
        }

        if !services::mark_completed(&self.db, id, &caller.technician_id, &parts_used, Utc::now()).await? {
            return Err(AppError::Conflict("Service is already completed".to_string()));
        }

        info!("service {} completed with {} parts", id, parts_used.len());
        self.get(caller, id).await
    }
}
