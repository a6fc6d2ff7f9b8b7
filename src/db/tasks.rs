use chrono::{DateTime, Utc};
use sqlx::{Executor, QueryBuilder, Sqlite, SqliteConnection};

use crate::models::{Task, TaskStatus};

/// Inserts the task row only. Membership goes through [`super::linkage`].
pub async fn insert_task(conn: &mut SqliteConnection, task: &Task) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO tasks (id, title, technician_id, shared_with, status, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&task.id)
    .bind(&task.title)
    .bind(&task.technician_id)
    .bind(&task.shared_with)
    .bind(task.status)
    .bind(task.created_at)
    .bind(task.updated_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Task owned by `technician_id`. The `services` list is left empty.
pub async fn find_owned_task<'e, E>(
    db: E,
    id: &str,
    technician_id: &str,
) -> Result<Option<Task>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = ?1 AND technician_id = ?2")
        .bind(id)
        .bind(technician_id)
        .fetch_optional(db)
        .await
}

/// Task owned by or shared with `technician_id`.
pub async fn find_visible_task<'e, E>(
    db: E,
    id: &str,
    technician_id: &str,
) -> Result<Option<Task>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Task>(
        "SELECT * FROM tasks WHERE id = ?1 AND (technician_id = ?2 OR shared_with = ?2)",
    )
    .bind(id)
    .bind(technician_id)
    .fetch_optional(db)
    .await
}

pub async fn fetch_tasks<'e, E>(
    db: E,
    technician_id: &str,
    status: Option<TaskStatus>,
    shared_with_me: bool,
) -> Result<Vec<Task>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM tasks WHERE ");
    if shared_with_me {
        query.push("shared_with = ");
    } else {
        query.push("technician_id = ");
    }
    query.push_bind(technician_id);
    if let Some(status) = status {
        query.push(" AND status = ").push_bind(status);
    }
    query.push(" ORDER BY created_at DESC");

    query.build_query_as::<Task>().fetch_all(db).await
}

/// Member service ids in the order they were added.
pub async fn member_ids<'e, E>(db: E, task_id: &str) -> Result<Vec<String>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar::<_, String>(
        "SELECT service_id FROM task_services WHERE task_id = ?1 ORDER BY position ASC",
    )
    .bind(task_id)
    .fetch_all(db)
    .await
}

/// Writes the status column only, leaving a concurrent rename intact.
pub async fn set_task_status<'e, E>(
    db: E,
    id: &str,
    status: TaskStatus,
    now: DateTime<Utc>,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("UPDATE tasks SET status = ?2, updated_at = ?3 WHERE id = ?1")
        .bind(id)
        .bind(status)
        .bind(now)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

pub async fn set_task_title<'e, E>(db: E, id: &str, title: &str, now: DateTime<Utc>) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("UPDATE tasks SET title = ?2, updated_at = ?3 WHERE id = ?1")
        .bind(id)
        .bind(title)
        .bind(now)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

/// Sets `shared_with` only while it is still empty.
pub async fn set_shared_with<'e, E>(
    db: E,
    id: &str,
    target_id: &str,
    now: DateTime<Utc>,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        UPDATE tasks
        SET shared_with = ?2, updated_at = ?3
        WHERE id = ?1 AND shared_with IS NULL
        "#,
    )
    .bind(id)
    .bind(target_id)
    .bind(now)
    .execute(db)
    .await?
    .rows_affected();

    Ok(result > 0)
}

pub async fn touch_task<'e, E>(db: E, id: &str, now: DateTime<Utc>) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("UPDATE tasks SET updated_at = ?2 WHERE id = ?1")
        .bind(id)
        .bind(now)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn delete_task_row<'e, E>(db: E, id: &str) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM tasks WHERE id = ?1")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}
