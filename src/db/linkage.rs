//! Task ↔ Service link maintenance.
//!
//! A task's membership list lives in `task_services`; each service carries
//! the back-reference in `services.task_id`. Every write that touches one side
//! goes through this module and updates the other side on the same
//! connection, so callers holding a transaction get both or neither.
//!
//! Invariant: `(task_id, service_id)` is in `task_services` exactly when
//! `services.task_id = task_id` for that service.

use chrono::Utc;
use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use super::{ID_CHUNK, INSERT_CHUNK_ROWS};

fn push_id_list<'args>(query: &mut QueryBuilder<'args, Sqlite>, ids: &'args [String]) {
    query.push(" (");
    let mut separated = query.separated(", ");
    for id in ids {
        separated.push_bind(id);
    }
    separated.push_unseparated(")");
}

/// Appends `service_ids` to the task's list and points each service at it.
///
/// Callers validate that the services are assignable first.
pub async fn attach(
    conn: &mut SqliteConnection,
    task_id: &str,
    service_ids: &[String],
) -> Result<(), sqlx::Error> {
    if service_ids.is_empty() {
        return Ok(());
    }

    let last_position: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(position), 0) FROM task_services WHERE task_id = ?1",
    )
    .bind(task_id)
    .fetch_one(&mut *conn)
    .await?;

    let mut position = last_position;
    for chunk in service_ids.chunks(INSERT_CHUNK_ROWS) {
        let mut members = QueryBuilder::<Sqlite>::new("INSERT INTO task_services (task_id, service_id, position) ");
        members.push_values(chunk, |mut row, service_id| {
            position += 1;
            row.push_bind(task_id).push_bind(service_id).push_bind(position);
        });
        members.build().execute(&mut *conn).await?;
    }

    let now = Utc::now();
    for chunk in service_ids.chunks(ID_CHUNK) {
        let mut back_refs = QueryBuilder::<Sqlite>::new("UPDATE services SET task_id = ");
        back_refs.push_bind(task_id);
        back_refs.push(", updated_at = ").push_bind(now);
        back_refs.push(" WHERE id IN");
        push_id_list(&mut back_refs, chunk);
        back_refs.build().execute(&mut *conn).await?;
    }

    Ok(())
}

/// Removes the given services from the task. Ids that are not members of
/// this task are ignored. Returns the ids actually released.
pub async fn detach(
    conn: &mut SqliteConnection,
    task_id: &str,
    service_ids: &[String],
) -> Result<Vec<String>, sqlx::Error> {
    let mut released = Vec::new();
    for chunk in service_ids.chunks(ID_CHUNK) {
        let mut lookup = QueryBuilder::<Sqlite>::new("SELECT service_id FROM task_services WHERE task_id = ");
        lookup.push_bind(task_id);
        lookup.push(" AND service_id IN");
        push_id_list(&mut lookup, chunk);
        let members: Vec<String> = lookup.build_query_scalar().fetch_all(&mut *conn).await?;
        released.extend(members);
    }

    let now = Utc::now();
    for chunk in released.chunks(ID_CHUNK) {
        let mut members = QueryBuilder::<Sqlite>::new("DELETE FROM task_services WHERE task_id = ");
        members.push_bind(task_id);
        members.push(" AND service_id IN");
        push_id_list(&mut members, chunk);
        members.build().execute(&mut *conn).await?;

        let mut back_refs = QueryBuilder::<Sqlite>::new("UPDATE services SET task_id = NULL, updated_at = ");
        back_refs.push_bind(now);
        back_refs.push(" WHERE task_id = ").push_bind(task_id);
        back_refs.push(" AND id IN");
        push_id_list(&mut back_refs, chunk);
        back_refs.build().execute(&mut *conn).await?;
    }

    Ok(released)
}

/// Releases every service of the task, including stray back-references to it.
/// Returns how many services were unlinked.
pub async fn detach_all(conn: &mut SqliteConnection, task_id: &str) -> Result<u64, sqlx::Error> {
    sqlx::query("DELETE FROM task_services WHERE task_id = ?1")
        .bind(task_id)
        .execute(&mut *conn)
        .await?;

    let unlinked = sqlx::query("UPDATE services SET task_id = NULL, updated_at = ?2 WHERE task_id = ?1")
        .bind(task_id)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?
        .rows_affected();

    Ok(unlinked)
}

/// Releases the listed services from whatever task holds them.
pub async fn detach_services(conn: &mut SqliteConnection, service_ids: &[String]) -> Result<(), sqlx::Error> {
    let now = Utc::now();
    for chunk in service_ids.chunks(ID_CHUNK) {
        let mut members = QueryBuilder::<Sqlite>::new("DELETE FROM task_services WHERE service_id IN");
        push_id_list(&mut members, chunk);
        members.build().execute(&mut *conn).await?;

        let mut back_refs = QueryBuilder::<Sqlite>::new("UPDATE services SET task_id = NULL, updated_at = ");
        back_refs.push_bind(now);
        back_refs.push(" WHERE task_id IS NOT NULL AND id IN");
        push_id_list(&mut back_refs, chunk);
        back_refs.build().execute(&mut *conn).await?;
    }

    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LinkViolation {
    /// Listed by a task whose id the service does not carry.
    #[serde(rename_all = "camelCase")]
    MemberNotLinked {
        task_id: String,
        service_id: String,
        linked_to: Option<String>,
    },
    /// Service points at a task that does not list it.
    #[serde(rename_all = "camelCase")]
    StrayBackReference { service_id: String, task_id: String },
}

pub async fn find_violations(conn: &mut SqliteConnection) -> Result<Vec<LinkViolation>, sqlx::Error> {
    let unlinked: Vec<(String, String, Option<String>)> = sqlx::query_as(
        r#"
        SELECT ts.task_id, ts.service_id, s.task_id
        FROM task_services ts
        JOIN services s ON s.id = ts.service_id
        WHERE s.task_id IS NULL OR s.task_id != ts.task_id
        ORDER BY ts.task_id, ts.position
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    let stray: Vec<(String, String)> = sqlx::query_as(
        r#"
        SELECT s.id, s.task_id
        FROM services s
        WHERE s.task_id IS NOT NULL
          AND NOT EXISTS (
              SELECT 1 FROM task_services ts
              WHERE ts.service_id = s.id AND ts.task_id = s.task_id
          )
        ORDER BY s.id
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    let mut violations: Vec<LinkViolation> = unlinked
        .into_iter()
        .map(|(task_id, service_id, linked_to)| LinkViolation::MemberNotLinked {
            task_id,
            service_id,
            linked_to,
        })
        .collect();
    violations.extend(
        stray
            .into_iter()
            .map(|(service_id, task_id)| LinkViolation::StrayBackReference { service_id, task_id }),
    );

    Ok(violations)
}

/// Rewrites back-references from the membership lists. Idempotent: a second
/// run on the same data changes nothing. Returns the number of services fixed.
pub async fn repair(conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let now = Utc::now();

    let relinked = sqlx::query(
        r#"
        UPDATE services
        SET task_id = (SELECT ts.task_id FROM task_services ts WHERE ts.service_id = services.id),
            updated_at = ?1
        WHERE EXISTS (
            SELECT 1 FROM task_services ts
            WHERE ts.service_id = services.id
              AND (services.task_id IS NULL OR services.task_id != ts.task_id)
        )
        "#,
    )
    .bind(now)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    let cleared = sqlx::query(
        r#"
        UPDATE services
        SET task_id = NULL, updated_at = ?1
        WHERE task_id IS NOT NULL
          AND NOT EXISTS (SELECT 1 FROM task_services ts WHERE ts.service_id = services.id)
        "#,
    )
    .bind(now)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    Ok(relinked + cleared)
}
