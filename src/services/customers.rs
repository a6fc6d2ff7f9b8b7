use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use sqlx::SqlitePool;
use sqlx::types::Json;
use tracing::info;
use uuid::Uuid;

use crate::auth::Caller;
use crate::db::{customers, linkage, services};
use crate::error::AppError;
use crate::models::*;
use crate::notify::{NotificationKind, NotificationPayload, Notifier, notify_quietly};
use crate::services::require_text;
use crate::services::schedule::{self, PlannedService};

pub struct CustomerService {
    db: SqlitePool,
    notifier: Arc<dyn Notifier>,
}

impl CustomerService {
    pub fn new(db: SqlitePool, notifier: Arc<dyn Notifier>) -> Self {
        Self { db, notifier }
    }

    /// Creates the customer together with its generated services. Either all
    /// rows are written or none are.
    pub async fn create(&self, caller: &Caller, req: NewCustomerRequest) -> Result<Customer, AppError> {
        require_text(&req.full_name, "fullName")?;
        require_text(&req.contact_number, "contactNumber")?;
        require_text(&req.address, "address")?;

        let joining_date = req.joining_date.unwrap_or_else(|| Utc::now().date_naive());
        let (requested_count, dates) = match req.service_generation_type {
            GenerationType::Automatic => {
                let count = req.number_of_services.ok_or_else(|| {
                    AppError::InvalidInput("numberOfServices is required for automatic generation".to_string())
                })?;
                (count, schedule::generate_automatic_schedule(joining_date, count)?)
            }
            GenerationType::Manual => {
                let dates = schedule::generate_manual_schedule(req.service_dates.unwrap_or_default())?;
                (dates.len() as i64, dates)
            }
        };
        let planned = schedule::number_services(&dates);

        let now = Utc::now();
        let mut customer = Customer {
            id: Uuid::new_v4().to_string(),
            technician_id: caller.technician_id.clone(),
            full_name: req.full_name.trim().to_string(),
            contact_number: req.contact_number.trim().to_string(),
            address: req.address.trim().to_string(),
            area: req.area,
            tds: req.tds,
            ro_model: req.ro_model,
            category: req.category.unwrap_or(Category::New),
            number_of_services: requested_count,
            joining_date,
            remark: req.remark,
            status: req.status.unwrap_or(CustomerStatus::Active),
            reminders: Json(Vec::new()),
            services: Vec::new(),
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        let rows = service_rows(&customer, &planned);

        let mut tx = self.db.begin().await?;
        customers::insert_customer(&mut tx, &customer).await?;
        services::insert_services(&mut tx, &rows).await?;
        customer.services = services::service_ids_for_customer(&mut *tx, &customer.id).await?;
        tx.commit().await?;

        info!(
            "created customer {} with {} services for technician {}",
            customer.id,
            customer.services.len(),
            caller.technician_id
        );

        notify_quietly(
            self.notifier.as_ref(),
            NotificationPayload::new(
                &caller.technician_id,
                NotificationKind::NewCustomer,
                "New customer added",
                format!("{} joined with {} scheduled services", customer.full_name, customer.services.len()),
            )
            .with_data(json!({ "customerId": customer.id })),
        )
        .await;

        Ok(customer)
    }

    pub async fn list(&self, caller: &Caller, status: Option<CustomerStatus>) -> Result<Vec<Customer>, AppError> {
        let mut list = customers::fetch_customers(&self.db, &caller.technician_id, status).await?;
        for customer in list.iter_mut() {
            customer.services = services::service_ids_for_customer(&self.db, &customer.id).await?;
        }
        Ok(list)
    }

    pub async fn get(&self, caller: &Caller, id: &str) -> Result<Customer, AppError> {
        let mut customer = customers::find_customer(&self.db, id, &caller.technician_id)
            .await?
            .ok_or(AppError::NotFound("Customer"))?;
        customer.services = services::service_ids_for_customer(&self.db, &customer.id).await?;
        Ok(customer)
    }

    pub async fn update(
        &self,
        caller: &Caller,
        id: &str,
        req: UpdateCustomerRequest,
    ) -> Result<Customer, AppError> {
        let mut customer = self.get(caller, id).await?;

        if let Some(full_name) = req.full_name {
            require_text(&full_name, "fullName")?;
            customer.full_name = full_name.trim().to_string();
        }
        if let Some(contact_number) = req.contact_number {
            require_text(&contact_number, "contactNumber")?;
            customer.contact_number = contact_number.trim().to_string();
        }
        if let Some(address) = req.address {
            require_text(&address, "address")?;
            customer.address = address.trim().to_string();
        }
        if req.area.is_some() {
            customer.area = req.area;
        }
        if req.tds.is_some() {
            customer.tds = req.tds;
        }
        if req.ro_model.is_some() {
            customer.ro_model = req.ro_model;
        }
        if req.remark.is_some() {
            customer.remark = req.remark;
        }
        if let Some(status) = req.status {
            customer.status = status;
        }
        customer.updated_at = Utc::now();

        if !customers::update_customer(&self.db, &customer).await? {
            return Err(AppError::NotFound("Customer"));
        }
        Ok(customer)
    }

    pub async fn update_status(
        &self,
        caller: &Caller,
        id: &str,
        status: CustomerStatus,
    ) -> Result<Customer, AppError> {
        self.update(
            caller,
            id,
            UpdateCustomerRequest {
                status: Some(status),
                ..Default::default()
            },
        )
        .await
    }

    /// Soft-deletes the customer and its services, releasing those services
    /// from any task.
    pub async fn delete(&self, caller: &Caller, id: &str) -> Result<(), AppError> {
        let now = Utc::now();
        let mut tx = self.db.begin().await?;

        customers::find_customer(&mut *tx, id, &caller.technician_id)
            .await?
            .ok_or(AppError::NotFound("Customer"))?;
        let service_ids = services::service_ids_for_customer(&mut *tx, id).await?;

        linkage::detach_services(&mut tx, &service_ids).await?;
        services::soft_delete_for_customer(&mut *tx, id, now).await?;
        customers::soft_delete_customer(&mut *tx, id, &caller.technician_id, now).await?;
        tx.commit().await?;

        info!("deleted customer {} and {} services", id, service_ids.len());
        Ok(())
    }
}

fn service_rows(customer: &Customer, planned: &[PlannedService]) -> Vec<Service> {
    planned
        .iter()
        .map(|plan| Service {
            id: Uuid::new_v4().to_string(),
            customer_id: customer.id.clone(),
            technician_id: customer.technician_id.clone(),
            service_number: plan.service_number,
            category: customer.category,
            status: ServiceStatus::Pending,
            scheduled_date: plan.scheduled_date,
            completed_date: None,
            parts_used: Json(Vec::new()),
            task_id: None,
            reminders: Json(Vec::new()),
            deleted_at: None,
            created_at: customer.created_at,
            updated_at: customer.created_at,
        })
        .collect()
}
