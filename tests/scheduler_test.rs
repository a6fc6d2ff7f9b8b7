use std::time::Duration;

use purifier_backend::db;
use purifier_backend::services::{ReconcileScheduler, ReconcileStats};
use sqlx::SqlitePool;

async fn seed_broken_links(pool: &SqlitePool) {
    sqlx::query(
        "INSERT INTO technicians (id, full_name, contact_number, address, created_at, updated_at) \
         VALUES ('tech', 'Tech', '9222200001', 'Road', '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z')",
    )
    .execute(pool)
    .await
    .expect("Failed to insert technician");

    sqlx::query(
        "INSERT INTO customers (id, technician_id, full_name, contact_number, address, category, \
         number_of_services, joining_date, status, created_at, updated_at) \
         VALUES ('cust', 'tech', 'Cust', '1', 'Road', 'NEW', 2, '2024-01-01', 'ACTIVE', \
         '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z')",
    )
    .execute(pool)
    .await
    .expect("Failed to insert customer");

    for (id, number, task_id) in [("svc-1", 1, None), ("svc-2", 2, Some("ghost"))] {
        sqlx::query(
            "INSERT INTO services (id, customer_id, technician_id, service_number, category, status, \
             scheduled_date, task_id, created_at, updated_at) \
             VALUES (?1, 'cust', 'tech', ?2, 'NEW', 'PENDING', '2024-01-01', ?3, \
             '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z')",
        )
        .bind(id)
        .bind(number)
        .bind(task_id)
        .execute(pool)
        .await
        .expect("Failed to insert service");
    }

    sqlx::query(
        "INSERT INTO tasks (id, title, technician_id, status, created_at, updated_at) \
         VALUES ('task', 'Route', 'tech', 'PENDING', '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z')",
    )
    .execute(pool)
    .await
    .expect("Failed to insert task");

    // Listed by the task, but the back-reference was never written.
    sqlx::query("INSERT INTO task_services (task_id, service_id, position) VALUES ('task', 'svc-1', 1)")
        .execute(pool)
        .await
        .expect("Failed to insert membership");
}

#[tokio::test]
async fn run_once_repairs_and_second_run_is_clean() {
    let pool = db::connect_in_memory().await.expect("Failed to create database");
    seed_broken_links(&pool).await;

    let scheduler = ReconcileScheduler::new(pool.clone(), 3600);

    let first = scheduler.run_once().await.expect("first run");
    assert_eq!(
        first,
        ReconcileStats {
            violations_found: 2,
            rows_fixed: 2,
        }
    );

    let links: Vec<(String, Option<String>)> =
        sqlx::query_as("SELECT id, task_id FROM services ORDER BY service_number")
            .fetch_all(&pool)
            .await
            .expect("links");
    assert_eq!(
        links,
        vec![
            ("svc-1".to_string(), Some("task".to_string())),
            ("svc-2".to_string(), None),
        ]
    );

    let second = scheduler.run_once().await.expect("second run");
    assert_eq!(
        second,
        ReconcileStats {
            violations_found: 0,
            rows_fixed: 0,
        }
    );
}

#[tokio::test]
async fn scheduler_loop_repairs_in_background() {
    let pool = db::connect_in_memory().await.expect("Failed to create database");
    seed_broken_links(&pool).await;

    let scheduler = ReconcileScheduler::new(pool.clone(), 1);
    let handle = tokio::spawn(async move {
        scheduler.start().await;
    });

    tokio::time::sleep(Duration::from_millis(1500)).await;
    handle.abort();

    let stray: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM services WHERE task_id = 'ghost'")
        .fetch_one(&pool)
        .await
        .expect("count");
    assert_eq!(stray, 0);
}
