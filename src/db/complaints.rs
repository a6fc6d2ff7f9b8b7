use chrono::{DateTime, Utc};
use sqlx::{Executor, QueryBuilder, Sqlite};

use crate::models::{Complaint, ComplaintStatus};

pub async fn insert_complaint<'e, E>(db: E, complaint: &Complaint) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO complaints
            (id, customer_id, technician_id, text, status, deleted_at, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, NULL, ?6, ?7)
        "#,
    )
    .bind(&complaint.id)
    .bind(&complaint.customer_id)
    .bind(&complaint.technician_id)
    .bind(&complaint.text)
    .bind(complaint.status)
    .bind(complaint.created_at)
    .bind(complaint.updated_at)
    .execute(db)
    .await?;

    Ok(())
}

pub async fn find_complaint<'e, E>(
    db: E,
    id: &str,
    technician_id: &str,
) -> Result<Option<Complaint>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Complaint>(
        "SELECT * FROM complaints WHERE id = ?1 AND technician_id = ?2 AND deleted_at IS NULL",
    )
    .bind(id)
    .bind(technician_id)
    .fetch_optional(db)
    .await
}

pub async fn fetch_complaints<'e, E>(
    db: E,
    technician_id: &str,
    status: Option<ComplaintStatus>,
) -> Result<Vec<Complaint>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM complaints WHERE technician_id = ");
    query.push_bind(technician_id);
    query.push(" AND deleted_at IS NULL");
    if let Some(status) = status {
        query.push(" AND status = ").push_bind(status);
    }
    query.push(" ORDER BY created_at DESC");

    query.build_query_as::<Complaint>().fetch_all(db).await
}

pub async fn set_status<'e, E>(
    db: E,
    id: &str,
    technician_id: &str,
    status: ComplaintStatus,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        UPDATE complaints
        SET status = ?3, updated_at = ?4
        WHERE id = ?1 AND technician_id = ?2 AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .bind(technician_id)
    .bind(status)
    .bind(Utc::now())
    .execute(db)
    .await?
    .rows_affected();

    Ok(result > 0)
}

pub async fn soft_delete_complaint<'e, E>(
    db: E,
    id: &str,
    technician_id: &str,
    now: DateTime<Utc>,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        UPDATE complaints
        SET deleted_at = ?3, updated_at = ?3
        WHERE id = ?1 AND technician_id = ?2 AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .bind(technician_id)
    .bind(now)
    .execute(db)
    .await?
    .rows_affected();

    Ok(result > 0)
}
