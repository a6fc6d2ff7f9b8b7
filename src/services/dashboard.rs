use serde::Serialize;
use sqlx::SqlitePool;

use crate::auth::Caller;
use crate::db::stats;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaCount {
    pub area: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_customers: i64,
    pub active_customers: i64,
    pub pending_services: i64,
    /// Whole-number percentage of completed services.
    pub completion_rate: i64,
    pub services_by_area: Vec<AreaCount>,
}

pub struct DashboardService {
    db: SqlitePool,
}

impl DashboardService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn summary(&self, caller: &Caller) -> Result<DashboardSummary, AppError> {
        let (total_customers, active_customers) = stats::customer_counts(&self.db, &caller.technician_id).await?;
        let (pending, completed) = stats::service_counts(&self.db, &caller.technician_id).await?;
        let services_by_area = stats::services_by_area(&self.db, &caller.technician_id)
            .await?
            .into_iter()
            .map(|(area, count)| AreaCount { area, count })
            .collect();

        Ok(DashboardSummary {
            total_customers,
            active_customers,
            pending_services: pending,
            completion_rate: completion_rate(completed, pending + completed),
            services_by_area,
        })
    }
}

pub fn completion_rate(completed: i64, total: i64) -> i64 {
    if total == 0 {
        return 0;
    }
    (completed as f64 / total as f64 * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::services;
    use crate::test_support::{seed_customer_with_services, seed_technician, setup_test_db};
    use chrono::Utc;

    #[test]
    fn completion_rate_rounds_and_handles_empty() {
        assert_eq!(completion_rate(0, 0), 0);
        assert_eq!(completion_rate(1, 3), 33);
        assert_eq!(completion_rate(2, 3), 67);
        assert_eq!(completion_rate(4, 4), 100);
    }

    #[tokio::test]
    async fn summary_counts_only_the_callers_data() {
        let pool = setup_test_db().await;
        let tech = seed_technician(&pool, "9700000001").await;
        let other = seed_technician(&pool, "9700000002").await;
        let (_, ids) = seed_customer_with_services(&pool, &tech.id, 3).await;
        seed_customer_with_services(&pool, &other.id, 5).await;

        sqlx::query("UPDATE customers SET area = NULL WHERE technician_id = ?1")
            .bind(&tech.id)
            .execute(&pool)
            .await
            .expect("clear area");
        services::mark_completed(&pool, &ids[0], &tech.id, &[], Utc::now())
            .await
            .expect("complete");

        let summary = DashboardService::new(pool.clone())
            .summary(&Caller::new(&tech.id))
            .await
            .expect("summary");
        assert_eq!(
            summary,
            DashboardSummary {
                total_customers: 1,
                active_customers: 1,
                pending_services: 2,
                completion_rate: 33,
                services_by_area: vec![AreaCount {
                    area: "Unknown Area".to_string(),
                    count: 3,
                }],
            }
        );
    }
}
