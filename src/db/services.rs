use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::{Executor, QueryBuilder, Sqlite, SqliteConnection};

use super::{ID_CHUNK, INSERT_CHUNK_ROWS};
use crate::models::{Category, PartUsed, Reminder, Service};

/// Inserts rows in slice order, `INSERT_CHUNK_ROWS` rows per statement.
/// Run it inside a transaction to get all rows or none.
pub async fn insert_services(conn: &mut SqliteConnection, services: &[Service]) -> Result<(), sqlx::Error> {
    for chunk in services.chunks(INSERT_CHUNK_ROWS) {
        insert_service_chunk(&mut *conn, chunk).await?;
    }
    Ok(())
}

async fn insert_service_chunk(conn: &mut SqliteConnection, services: &[Service]) -> Result<(), sqlx::Error> {
    let mut query = QueryBuilder::<Sqlite>::new(
        "INSERT INTO services (id, customer_id, technician_id, service_number, category, status, \
         scheduled_date, completed_date, parts_used, task_id, reminders, deleted_at, created_at, updated_at) ",
    );
    query.push_values(services, |mut row, service| {
        row.push_bind(&service.id)
            .push_bind(&service.customer_id)
            .push_bind(&service.technician_id)
            .push_bind(service.service_number)
            .push_bind(service.category)
            .push_bind(service.status)
            .push_bind(service.scheduled_date)
            .push_bind(service.completed_date)
            .push_bind(&service.parts_used)
            .push_bind(&service.task_id)
            .push_bind(&service.reminders)
            .push_bind(service.deleted_at)
            .push_bind(service.created_at)
            .push_bind(service.updated_at);
    });

    query.build().execute(conn).await?;
    Ok(())
}

/// Ids of a customer's active services in service-number order.
pub async fn service_ids_for_customer<'e, E>(db: E, customer_id: &str) -> Result<Vec<String>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar::<_, String>(
        r#"
        SELECT id FROM services
        WHERE customer_id = ?1 AND deleted_at IS NULL
        ORDER BY service_number ASC
        "#,
    )
    .bind(customer_id)
    .fetch_all(db)
    .await
}

pub async fn find_service<'e, E>(
    db: E,
    id: &str,
    technician_id: &str,
) -> Result<Option<Service>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Service>(
        "SELECT * FROM services WHERE id = ?1 AND technician_id = ?2 AND deleted_at IS NULL",
    )
    .bind(id)
    .bind(technician_id)
    .fetch_optional(db)
    .await
}

/// Services with the given ids, ordered by scheduled date then number.
pub async fn fetch_services_by_ids<'e, E>(db: E, ids: &[String]) -> Result<Vec<Service>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite> + Copy,
{
    let mut found = Vec::with_capacity(ids.len());
    for chunk in ids.chunks(ID_CHUNK) {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM services WHERE id IN (");
        let mut separated = query.separated(", ");
        for id in chunk {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");
        found.extend(query.build_query_as::<Service>().fetch_all(db).await?);
    }

    found.sort_by(|a, b| {
        (a.scheduled_date, a.service_number).cmp(&(b.scheduled_date, b.service_number))
    });
    Ok(found)
}

/// Pending, active services of a technician ordered by scheduled date.
pub async fn fetch_pending_services<'e, E>(
    db: E,
    technician_id: &str,
    category: Option<Category>,
    window: Option<(NaiveDate, NaiveDate)>,
) -> Result<Vec<Service>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM services WHERE technician_id = ");
    query.push_bind(technician_id);
    query.push(" AND status = 'PENDING' AND deleted_at IS NULL");
    if let Some(category) = category {
        query.push(" AND category = ").push_bind(category);
    }
    if let Some((start, end)) = window {
        query.push(" AND scheduled_date >= ").push_bind(start);
        query.push(" AND scheduled_date <= ").push_bind(end);
    }
    query.push(" ORDER BY scheduled_date ASC, service_number ASC");

    query.build_query_as::<Service>().fetch_all(db).await
}

/// Flips a pending service to completed. Returns false when the row is not
/// pending, so two concurrent completions cannot both succeed.
pub async fn mark_completed<'e, E>(
    db: E,
    id: &str,
    technician_id: &str,
    parts_used: &[PartUsed],
    now: DateTime<Utc>,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        UPDATE services
        SET status = 'COMPLETED',
            parts_used = ?3,
            completed_date = ?4,
            updated_at = ?4
        WHERE id = ?1 AND technician_id = ?2 AND status = 'PENDING' AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .bind(technician_id)
    .bind(Json(parts_used))
    .bind(now)
    .execute(db)
    .await?
    .rows_affected();

    Ok(result > 0)
}

pub async fn set_reminders<'e, E>(db: E, id: &str, reminders: &[Reminder]) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("UPDATE services SET reminders = ?2, updated_at = ?3 WHERE id = ?1")
        .bind(id)
        .bind(Json(reminders))
        .bind(Utc::now())
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

/// Of `ids`, the ones that exist, belong to `technician_id`, are active and
/// sit in no task.
pub async fn fetch_assignable_ids(
    conn: &mut SqliteConnection,
    ids: &[String],
    technician_id: &str,
) -> Result<Vec<String>, sqlx::Error> {
    let mut assignable = Vec::with_capacity(ids.len());
    for chunk in ids.chunks(ID_CHUNK) {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT id FROM services WHERE technician_id = ");
        query.push_bind(technician_id);
        query.push(" AND deleted_at IS NULL AND task_id IS NULL AND id IN (");
        let mut separated = query.separated(", ");
        for id in chunk {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");
        assignable.extend(query.build_query_scalar::<String>().fetch_all(&mut *conn).await?);
    }
    Ok(assignable)
}

pub async fn soft_delete_for_customer<'e, E>(
    db: E,
    customer_id: &str,
    now: DateTime<Utc>,
) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        UPDATE services
        SET deleted_at = ?2, updated_at = ?2
        WHERE customer_id = ?1 AND deleted_at IS NULL
        "#,
    )
    .bind(customer_id)
    .bind(now)
    .execute(db)
    .await?
    .rows_affected();

    Ok(result)
}
