use chrono::Utc;
use sqlx::{Executor, QueryBuilder, Sqlite};
use uuid::Uuid;

use crate::models::{NewTechnicianRequest, Technician};

pub async fn insert_technician<'e, E>(
    db: E,
    req: NewTechnicianRequest,
) -> Result<Technician, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let technician = Technician {
        id: Uuid::new_v4().to_string(),
        full_name: req.full_name,
        contact_number: req.contact_number,
        address: req.address,
        email_address: req.email_address,
        company_name: req.company_name,
        auth_token: None,
        deleted_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO technicians
            (id, full_name, contact_number, address, email_address, company_name,
            auth_token, deleted_at, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL, NULL, ?7, ?8)
        "#,
    )
    .bind(&technician.id)
    .bind(&technician.full_name)
    .bind(&technician.contact_number)
    .bind(&technician.address)
    .bind(&technician.email_address)
    .bind(&technician.company_name)
    .bind(technician.created_at)
    .bind(technician.updated_at)
    .execute(db)
    .await?;

    Ok(technician)
}

/// Looks a technician up by id, including soft-deleted rows.
pub async fn find_technician_by_id<'e, E>(db: E, id: &str) -> Result<Option<Technician>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Technician>("SELECT * FROM technicians WHERE id = ?1")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_active_by_contact<'e, E>(
    db: E,
    contact_number: &str,
) -> Result<Option<Technician>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Technician>(
        "SELECT * FROM technicians WHERE contact_number = ?1 AND deleted_at IS NULL",
    )
    .bind(contact_number)
    .fetch_optional(db)
    .await
}

/// Stores (or clears, with `None`) the token currently accepted for a technician.
pub async fn set_auth_token<'e, E>(db: E, id: &str, token: Option<&str>) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("UPDATE technicians SET auth_token = ?2, updated_at = ?3 WHERE id = ?1")
        .bind(id)
        .bind(token)
        .bind(Utc::now())
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

/// `LIKE` pattern matching `search` anywhere, with wildcards escaped.
fn contains_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn push_search_filter<'args>(query: &mut QueryBuilder<'args, Sqlite>, search: Option<&str>) {
    query.push(" WHERE deleted_at IS NULL");
    if let Some(search) = search {
        let pattern = contains_pattern(search);
        query.push(" AND (");
        let mut separated = query.separated(" OR ");
        for column in ["full_name", "contact_number", "email_address", "company_name", "address"] {
            separated.push(column);
            separated.push_unseparated(" LIKE ");
            separated.push_bind_unseparated(pattern.clone());
            separated.push_unseparated(" ESCAPE '\\'");
        }
        query.push(")");
    }
}

/// One page of active technicians, newest first. `search` matches name,
/// contact number, email, company or address, case-insensitively.
pub async fn search_technicians<'e, E>(
    db: E,
    search: Option<&str>,
    limit: u32,
    offset: u32,
) -> Result<Vec<Technician>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM technicians");
    push_search_filter(&mut query, search);
    query.push(" ORDER BY created_at DESC, id ASC LIMIT ").push_bind(limit);
    query.push(" OFFSET ").push_bind(offset);

    query.build_query_as::<Technician>().fetch_all(db).await
}

pub async fn count_technicians<'e, E>(db: E, search: Option<&str>) -> Result<u32, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let mut query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM technicians");
    push_search_filter(&mut query, search);

    query.build_query_scalar::<u32>().fetch_one(db).await
}
