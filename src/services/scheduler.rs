use std::time::Duration;

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::db::linkage;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileStats {
    pub violations_found: usize,
    pub rows_fixed: u64,
}

/// Periodically re-aligns service back-references with task membership.
pub struct ReconcileScheduler {
    db: SqlitePool,
    interval: Duration,
}

impl ReconcileScheduler {
    pub fn new(db: SqlitePool, interval_secs: u64) -> Self {
        Self {
            db,
            interval: Duration::from_secs(interval_secs),
        }
    }

    /// Runs forever, sleeping one interval before each pass.
    pub async fn start(self) {
        info!("Starting link reconciliation (interval: {:?})", self.interval);

        loop {
            tokio::time::sleep(self.interval).await;

            match self.run_once().await {
                Ok(stats) if stats.rows_fixed > 0 => {
                    warn!(
                        "Reconciliation repaired {} services ({} violations found)",
                        stats.rows_fixed, stats.violations_found
                    );
                }
                Ok(_) => info!("Reconciliation found no broken links"),
                Err(e) => warn!("Reconciliation failed: {:?}", e),
            }
        }
    }

    /// One detect-and-repair pass inside a single transaction.
    pub async fn run_once(&self) -> Result<ReconcileStats, AppError> {
        let mut tx = self.db.begin().await?;
        let violations = linkage::find_violations(&mut tx).await?;
        let rows_fixed = if violations.is_empty() {
            0
        } else {
            linkage::repair(&mut tx).await?
        };
        tx.commit().await?;

        Ok(ReconcileStats {
            violations_found: violations.len(),
            rows_fixed,
        })
    }
}
