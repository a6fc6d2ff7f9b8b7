use sqlx::{Executor, Sqlite};

/// Active customers of a technician as `(total, with ACTIVE status)`.
pub async fn customer_counts<'e, E>(db: E, technician_id: &str) -> Result<(i64, i64), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, (i64, i64)>(
        r#"
        SELECT COUNT(*), COALESCE(SUM(CASE WHEN status = 'ACTIVE' THEN 1 ELSE 0 END), 0)
        FROM customers
        WHERE technician_id = ?1 AND deleted_at IS NULL
        "#,
    )
    .bind(technician_id)
    .fetch_one(db)
    .await
}

/// Active services of a technician as `(pending, completed)`.
pub async fn service_counts<'e, E>(db: E, technician_id: &str) -> Result<(i64, i64), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, (i64, i64)>(
        r#"
        SELECT
            COALESCE(SUM(CASE WHEN status = 'PENDING' THEN 1 ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN status = 'COMPLETED' THEN 1 ELSE 0 END), 0)
        FROM services
        WHERE technician_id = ?1 AND deleted_at IS NULL
        "#,
    )
    .bind(technician_id)
    .fetch_one(db)
    .await
}

/// Active services per customer area, largest group first.
pub async fn services_by_area<'e, E>(db: E, technician_id: &str) -> Result<Vec<(String, i64)>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT COALESCE(NULLIF(TRIM(c.area), ''), 'Unknown Area') AS area_name, COUNT(*) AS total
        FROM services s
        JOIN customers c ON c.id = s.customer_id
        WHERE s.technician_id = ?1 AND s.deleted_at IS NULL
        GROUP BY area_name
        ORDER BY total DESC, area_name ASC
        "#,
    )
    .bind(technician_id)
    .fetch_all(db)
    .await
}
