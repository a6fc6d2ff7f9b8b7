use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{Executor, QueryBuilder, Sqlite, SqliteConnection};

use crate::models::{Customer, CustomerStatus, Reminder};

pub async fn insert_customer(conn: &mut SqliteConnection, customer: &Customer) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO customers
            (id, technician_id, full_name, contact_number, address, area, tds, ro_model,
            category, number_of_services, joining_date, remark, status, reminders,
            deleted_at, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, NULL, ?15, ?16)
        "#,
    )
    .bind(&customer.id)
    .bind(&customer.technician_id)
    .bind(&customer.full_name)
    .bind(&customer.contact_number)
    .bind(&customer.address)
    .bind(&customer.area)
    .bind(customer.tds)
    .bind(&customer.ro_model)
    .bind(customer.category)
    .bind(customer.number_of_services)
    .bind(customer.joining_date)
    .bind(&customer.remark)
    .bind(customer.status)
    .bind(&customer.reminders)
    .bind(customer.created_at)
    .bind(customer.updated_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Active customer owned by `technician_id`. The `services` list is left empty.
pub async fn find_customer<'e, E>(
    db: E,
    id: &str,
    technician_id: &str,
) -> Result<Option<Customer>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Customer>(
        "SELECT * FROM customers WHERE id = ?1 AND technician_id = ?2 AND deleted_at IS NULL",
    )
    .bind(id)
    .bind(technician_id)
    .fetch_optional(db)
    .await
}

pub async fn fetch_customers<'e, E>(
    db: E,
    technician_id: &str,
    status: Option<CustomerStatus>,
) -> Result<Vec<Customer>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM customers WHERE technician_id = ");
    query.push_bind(technician_id);
    query.push(" AND deleted_at IS NULL");
    if let Some(status) = status {
        query.push(" AND status = ").push_bind(status);
    }
    query.push(" ORDER BY created_at DESC");

    query.build_query_as::<Customer>().fetch_all(db).await
}

/// Writes the editable profile fields of `customer` back to its row.
pub async fn update_customer<'e, E>(db: E, customer: &Customer) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        UPDATE customers
        SET full_name = ?1,
            contact_number = ?2,
            address = ?3,
            area = ?4,
            tds = ?5,
            ro_model = ?6,
            remark = ?7,
            status = ?8,
            updated_at = ?9
        WHERE id = ?10 AND deleted_at IS NULL
        "#,
    )
    .bind(&customer.full_name)
    .bind(&customer.contact_number)
    .bind(&customer.address)
    .bind(&customer.area)
    .bind(customer.tds)
    .bind(&customer.ro_model)
    .bind(&customer.remark)
    .bind(customer.status)
    .bind(customer.updated_at)
    .bind(&customer.id)
    .execute(db)
    .await?
    .rows_affected();

    Ok(result > 0)
}

pub async fn set_reminders<'e, E>(db: E, id: &str, reminders: &[Reminder]) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("UPDATE customers SET reminders = ?2, updated_at = ?3 WHERE id = ?1")
        .bind(id)
        .bind(Json(reminders))
        .bind(Utc::now())
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

pub async fn soft_delete_customer<'e, E>(
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
        UPDATE customers
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
