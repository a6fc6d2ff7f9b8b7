use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::auth::Caller;
use crate::db::{complaints, customers};
use crate::error::AppError;
use crate::models::{Complaint, ComplaintStatus, NewComplaintRequest};
use crate::services::require_text;

pub struct ComplaintService {
    db: SqlitePool,
}

impl ComplaintService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn create(&self, caller: &Caller, req: NewComplaintRequest) -> Result<Complaint, AppError> {
        require_text(&req.text, "text")?;
        customers::find_customer(&self.db, &req.customer_id, &caller.technician_id)
            .await?
            .ok_or(AppError::NotFound("Customer"))?;

        let now = Utc::now();
        let complaint = Complaint {
            id: Uuid::new_v4().to_string(),
            customer_id: req.customer_id,
            technician_id: caller.technician_id.clone(),
            text: req.text.trim().to_string(),
            status: ComplaintStatus::Open,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        complaints::insert_complaint(&self.db, &complaint).await?;
        info!("complaint {} opened for customer {}", complaint.id, complaint.customer_id);
        Ok(complaint)
    }

    pub async fn list(&self, caller: &Caller, status: Option<ComplaintStatus>) -> Result<Vec<Complaint>, AppError> {
        let list = complaints::fetch_complaints(&self.db, &caller.technician_id, status).await?;
        Ok(list)
    }

    pub async fn get(&self, caller: &Caller, id: &str) -> Result<Complaint, AppError> {
        complaints::find_complaint(&self.db, id, &caller.technician_id)
            .await?
            .ok_or(AppError::NotFound("Complaint"))
    }

    pub async fn update_status(&self, caller: &Caller, id: &str, status: ComplaintStatus) -> Result<Complaint, AppError> {
        if !complaints::set_status(&self.db, id, &caller.technician_id, status).await? {
            return Err(AppError::NotFound("Complaint"));
        }
        self.get(caller, id).await
    }

    pub async fn delete(&self, caller: &Caller, id: &str) -> Result<(), AppError> {
        if !complaints::soft_delete_complaint(&self.db, id, &caller.technician_id, Utc::now()).await? {
            return Err(AppError::NotFound("Complaint"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_customer_with_services, seed_technician, setup_test_db};

    #[tokio::test]
    async fn complaint_lifecycle() {
        let pool = setup_test_db().await;
        let tech = seed_technician(&pool, "9500000001").await;
        let (customer, _) = seed_customer_with_services(&pool, &tech.id, 1).await;
        let service = ComplaintService::new(pool.clone());
        let caller = Caller::new(&tech.id);

        let complaint = service
            .create(
                &caller,
                NewComplaintRequest {
                    customer_id: customer.id.clone(),
                    text: "Water tastes salty".to_string(),
                },
            )
            .await
            .expect("create");
        assert_eq!(complaint.status, ComplaintStatus::Open);

        let closed = service
            .update_status(&caller, &complaint.id, ComplaintStatus::Closed)
            .await
            .expect("close");
        assert_eq!(closed.status, ComplaintStatus::Closed);
        assert!(service.list(&caller, Some(ComplaintStatus::Open)).await.expect("list").is_empty());
        assert_eq!(service.list(&caller, None).await.expect("list").len(), 1);

        service.delete(&caller, &complaint.id).await.expect("delete");
        assert!(matches!(
            service.get(&caller, &complaint.id).await,
            Err(AppError::NotFound("Complaint"))
        ));
    }

    #[tokio::test]
    async fn complaint_needs_owned_customer_and_text() {
        let pool = setup_test_db().await;
        let owner = seed_technician(&pool, "9500000002").await;
        let other = seed_technician(&pool, "9500000003").await;
        let (customer, _) = seed_customer_with_services(&pool, &owner.id, 1).await;
        let service = ComplaintService::new(pool.clone());

        let err = service
            .create(
                &Caller::new(&other.id),
                NewComplaintRequest {
                    customer_id: customer.id.clone(),
                    text: "Leak".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound("Customer")));

        let err = service
            .create(
                &Caller::new(&owner.id),
                NewComplaintRequest {
                    customer_id: customer.id,
                    text: " ".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
