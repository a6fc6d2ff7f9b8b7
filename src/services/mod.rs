pub mod accounts;
pub mod billing;
pub mod complaints;
pub mod customers;
pub mod dashboard;
pub mod maintenance;
pub mod reminders;
pub mod schedule;
pub mod scheduler;
pub mod tasks;

pub use accounts::AccountService;
pub use billing::BillingService;
pub use complaints::ComplaintService;
pub use customers::CustomerService;
pub use dashboard::{DashboardService, DashboardSummary};
pub use maintenance::{MaintenanceService, MonthFilter};
pub use reminders::ReminderService;
pub use scheduler::{ReconcileScheduler, ReconcileStats};
pub use tasks::TaskService;

use crate::error::AppError;

/// Rejects missing or whitespace-only text fields.
pub(crate) fn require_text(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidInput(format!("{} is required", field)));
    }
    Ok(())
}
