use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::info;

use crate::auth::{Caller, TokenAuth};
use crate::db::technicians;
use crate::error::AppError;
use crate::models::{LoginRequest, LoginResponse, NewTechnicianRequest, Pagination, Technician, TechnicianPage};
use crate::services::require_text;

const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 100;

pub struct AccountService {
    db: SqlitePool,
    auth: Arc<TokenAuth>,
}

impl AccountService {
    pub fn new(db: SqlitePool, auth: Arc<TokenAuth>) -> Self {
        Self { db, auth }
    }

    pub async fn register(&self, mut req: NewTechnicianRequest) -> Result<Technician, AppError> {
        require_text(&req.full_name, "fullName")?;
        require_text(&req.contact_number, "contactNumber")?;
        require_text(&req.address, "address")?;
        req.contact_number = req.contact_number.trim().to_string();

        match technicians::insert_technician(&self.db, req).await {
            Ok(technician) => {
                info!("registered technician {}", technician.id);
                Ok(technician)
            }
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::Conflict(
                "A technician with this contact number already exists".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Issues a fresh token. Any token handed out earlier stops working.
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, AppError> {
        require_text(&req.contact_number, "contactNumber")?;
        let technician = technicians::find_active_by_contact(&self.db, req.contact_number.trim())
            .await?
            .ok_or(AppError::NotFound("Technician"))?;

        let token = self.auth.issue(&technician.id)?;
        technicians::set_auth_token(&self.db, &technician.id, Some(&token)).await?;
        info!("technician {} logged in", technician.id);

        Ok(LoginResponse { token, technician })
    }

    pub async fn logout(&self, caller: &Caller) -> Result<(), AppError> {
        technicians::set_auth_token(&self.db, &caller.technician_id, None).await?;
        info!("technician {} logged out", caller.technician_id);
        Ok(())
    }

    /// Active technicians, newest first, `limit` per page (10 by default).
    pub async fn list(
        &self,
        page: Option<u32>,
        limit: Option<u32>,
        search: Option<&str>,
    ) -> Result<TechnicianPage, AppError> {
        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE);
        if page == 0 {
            return Err(AppError::InvalidInput("page starts at 1".to_string()));
        }
        if limit == 0 || limit > MAX_PAGE_SIZE {
            return Err(AppError::InvalidInput(format!("limit must be between 1 and {}", MAX_PAGE_SIZE)));
        }
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        let offset = (page - 1).saturating_mul(limit);

        let total = technicians::count_technicians(&self.db, search).await?;
        let list = technicians::search_technicians(&self.db, search, limit, offset).await?;

        Ok(TechnicianPage {
            technicians: list,
            pagination: Pagination::new(page, limit, total),
        })
    }
}
