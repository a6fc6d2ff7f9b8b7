use std::sync::Arc;

use chrono::{Days, NaiveDate, NaiveTime, Utc};
use serde_json::json;
use sqlx::SqlitePool;
use sqlx::types::Json;
use tracing::info;
use uuid::Uuid;

use crate::auth::Caller;
use crate::db::bills::{self, BillFilter};
use crate::db::customers;
use crate::error::AppError;
use crate::models::*;
use crate::notify::{NotificationKind, NotificationPayload, Notifier, notify_quietly};

pub struct BillingService {
    db: SqlitePool,
    notifier: Arc<dyn Notifier>,
}

impl BillingService {
    pub fn new(db: SqlitePool, notifier: Arc<dyn Notifier>) -> Self {
        Self { db, notifier }
    }

    /// Creates a bill for an owned customer. The total is always the sum of
    /// the item amounts.
    pub async fn create(&self, caller: &Caller, req: NewBillRequest) -> Result<Bill, AppError> {
        validate_items(&req.items)?;

        let customer = customers::find_customer(&self.db, &req.customer_id, &caller.technician_id)
            .await?
            .ok_or(AppError::NotFound("Customer"))?;

        let now = Utc::now();
        let bill = Bill {
            id: Uuid::new_v4().to_string(),
            customer_id: customer.id.clone(),
            technician_id: caller.technician_id.clone(),
            total: bill_total(&req.items),
            items: Json(req.items),
            bill_date: now,
            status: BillStatus::Pending,
            payment_method: req.payment_method.unwrap_or_default(),
            notes: req.notes.unwrap_or_default(),
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        bills::insert_bill(&self.db, &bill).await?;
        info!("bill {} created for customer {} total {:.2}", bill.id, customer.id, bill.total);

        notify_quietly(
            self.notifier.as_ref(),
            NotificationPayload::new(
                &caller.technician_id,
                NotificationKind::BillGenerated,
                "Bill generated",
                format!("Bill of {:.2} generated for {}", bill.total, customer.full_name),
            )
            .with_data(json!({ "billId": bill.id, "customerId": customer.id })),
        )
        .await;

        Ok(bill)
    }

    pub async fn list(&self, caller: &Caller, filter: &BillFilter) -> Result<Vec<Bill>, AppError> {
        let list = bills::fetch_bills(&self.db, &caller.technician_id, filter).await?;
        Ok(list)
    }

    pub async fn list_for_customer(&self, caller: &Caller, customer_id: &str) -> Result<Vec<Bill>, AppError> {
        customers::find_customer(&self.db, customer_id, &caller.technician_id)
            .await?
            .ok_or(AppError::NotFound("Customer"))?;

        let filter = BillFilter {
            customer_id: Some(customer_id.to_string()),
            ..Default::default()
        };
        self.list(caller, &filter).await
    }

    pub async fn get(&self, caller: &Caller, id: &str) -> Result<Bill, AppError> {
        bills::find_bill(&self.db, id, &caller.technician_id)
            .await?
            .ok_or(AppError::NotFound("Bill"))
    }

    /// Status moves freely between pending, paid and cancelled.
    pub async fn update(&self, caller: &Caller, id: &str, req: UpdateBillRequest) -> Result<Bill, AppError> {
        let mut bill = self.get(caller, id).await?;
        if let Some(status) = req.status {
            bill.status = status;
        }
        if let Some(payment_method) = req.payment_method {
            bill.payment_method = payment_method;
        }
        if let Some(notes) = req.notes {
            bill.notes = notes;
        }
        bill.updated_at = Utc::now();

        if !bills::update_bill(&self.db, &bill).await? {
            return Err(AppError::NotFound("Bill"));
        }
        Ok(bill)
    }

    pub async fn delete(&self, caller: &Caller, id: &str) -> Result<(), AppError> {
        if !bills::soft_delete_bill(&self.db, id, &caller.technician_id, Utc::now()).await? {
            return Err(AppError::NotFound("Bill"));
        }
        Ok(())
    }
}

pub fn bill_total(items: &[BillItem]) -> f64 {
    items.iter().map(|item| item.amount).sum()
}

fn validate_items(items: &[BillItem]) -> Result<(), AppError> {
    if items.is_empty() {
        return Err(AppError::InvalidInput("A bill needs at least one item".to_string()));
    }
    for item in items {
        if item.description.trim().is_empty() {
            return Err(AppError::InvalidInput("Item description must not be empty".to_string()));
        }
        if !item.amount.is_finite() || item.amount <= 0.0 {
            return Err(AppError::InvalidInput(format!(
                "Amount for {} must be a positive number",
                item.description
            )));
        }
    }
    Ok(())
}

/// Narrows `filter` to bills dated within the inclusive calendar range.
pub fn with_dates(mut filter: BillFilter, start: Option<NaiveDate>, end: Option<NaiveDate>) -> BillFilter {
    filter.from = start.map(|d| d.and_time(NaiveTime::MIN).and_utc());
    filter.until = end
        .and_then(|d| d.checked_add_days(Days::new(1)))
        .map(|d| d.and_time(NaiveTime::MIN).and_utc());
    filter
}
