//! Row-level access to the SQLite store.
//!
//! Single-statement helpers are generic over [`sqlx::Executor`] so they can run
//! against the pool or inside an open transaction. Helpers that issue several
//! statements take `&mut SqliteConnection`; pass `&mut *tx` to keep them in a
//! transaction.

pub mod bills;
pub mod complaints;
pub mod customers;
pub mod linkage;
pub mod services;
pub mod stats;
pub mod tasks;
pub mod technicians;

use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

/// Rows per multi-row `INSERT`. Keeps every statement under SQLite's
/// bound-parameter limit (999 on older builds).
pub(crate) const INSERT_CHUNK_ROWS: usize = 64;

/// Ids per `IN (...)` list, leaving room for a few extra binds.
pub(crate) const ID_CHUNK: usize = 500;

/// Opens a pool and applies the embedded migrations.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Migrated single-connection in-memory database.
///
/// One connection only, never recycled: every connection to `sqlite::memory:`
/// is a separate database.
pub async fn connect_in_memory() -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}
