use chrono::{DateTime, Utc};
use sqlx::{Executor, QueryBuilder, Sqlite};

use crate::models::{Bill, BillStatus};

/// Optional narrowing for bill listings.
#[derive(Debug, Clone, Default)]
pub struct BillFilter {
    pub status: Option<BillStatus>,
    pub customer_id: Option<String>,
    /// Inclusive lower bound on `bill_date`.
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `bill_date`.
    pub until: Option<DateTime<Utc>>,
}

pub async fn insert_bill<'e, E>(db: E, bill: &Bill) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO bills
            (id, customer_id, technician_id, items, total, bill_date, status,
            payment_method, notes, deleted_at, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, NULL, ?10, ?11)
        "#,
    )
    .bind(&bill.id)
    .bind(&bill.customer_id)
    .bind(&bill.technician_id)
    .bind(&bill.items)
    .bind(bill.total)
    .bind(bill.bill_date)
    .bind(bill.status)
    .bind(bill.payment_method)
    .bind(&bill.notes)
    .bind(bill.created_at)
    .bind(bill.updated_at)
    .execute(db)
    .await?;

    Ok(())
}

pub async fn find_bill<'e, E>(db: E, id: &str, technician_id: &str) -> Result<Option<Bill>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Bill>(
        "SELECT * FROM bills WHERE id = ?1 AND technician_id = ?2 AND deleted_at IS NULL",
    )
    .bind(id)
    .bind(technician_id)
    .fetch_optional(db)
    .await
}

pub async fn fetch_bills<'e, E>(
    db: E,
    technician_id: &str,
    filter: &BillFilter,
) -> Result<Vec<Bill>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM bills WHERE technician_id = ");
    query.push_bind(technician_id);
    query.push(" AND deleted_at IS NULL");
    if let Some(status) = filter.status {
        query.push(" AND status = ").push_bind(status);
    }
    if let Some(customer_id) = &filter.customer_id {
        query.push(" AND customer_id = ").push_bind(customer_id);
    }
    if let Some(from) = filter.from {
        query.push(" AND bill_date >= ").push_bind(from);
    }
    if let Some(until) = filter.until {
        query.push(" AND bill_date < ").push_bind(until);
    }
    query.push(" ORDER BY created_at DESC");

    query.build_query_as::<Bill>().fetch_all(db).await
}

pub async fn update_bill<'e, E>(db: E, bill: &Bill) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        UPDATE bills
        SET status = ?1,
            payment_method = ?2,
            notes = ?3,
            updated_at = ?4
        WHERE id = ?5 AND deleted_at IS NULL
        "#,
    )
    .bind(bill.status)
    .bind(bill.payment_method)
    .bind(&bill.notes)
    .bind(bill.updated_at)
    .bind(&bill.id)
    .execute(db)
    .await?
    .rows_affected();

    Ok(result > 0)
}

pub async fn soft_delete_bill<'e, E>(
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
        UPDATE bills
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
