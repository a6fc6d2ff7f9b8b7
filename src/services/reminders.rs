use sqlx::SqlitePool;

use crate::auth::Caller;
use crate::db::{customers, services};
use crate::error::AppError;
use crate::models::{NewReminderRequest, Reminder, ReminderEntity, ReminderKind};

/// Reminders live inline on their customer or service; they are addressed by
/// position in that list.
pub struct ReminderService {
    db: SqlitePool,
}

impl ReminderService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Appends a reminder and returns the owner's full list.
    pub async fn add(
        &self,
        caller: &Caller,
        entity_type: ReminderEntity,
        entity_id: &str,
        req: NewReminderRequest,
    ) -> Result<Vec<Reminder>, AppError> {
        let reminder = build_reminder(entity_type, entity_id, req)?;

        let mut tx = self.db.begin().await?;
        let mut reminders = match entity_type {
            ReminderEntity::Customer => customers::find_customer(&mut *tx, entity_id, &caller.technician_id)
                .await?
                .ok_or(AppError::NotFound("Customer"))?
                .reminders
                .0,
            ReminderEntity::Service => services::find_service(&mut *tx, entity_id, &caller.technician_id)
                .await?
                .ok_or(AppError::NotFound("Service"))?
                .reminders
                .0,
        };
        reminders.push(reminder);
        store(&mut tx, entity_type, entity_id, &reminders).await?;
        tx.commit().await?;

        Ok(reminders)
    }

    pub async fn list(&self, caller: &Caller, entity_type: ReminderEntity, entity_id: &str) -> Result<Vec<Reminder>, AppError> {
        let reminders = match entity_type {
            ReminderEntity::Customer => customers::find_customer(&self.db, entity_id, &caller.technician_id)
                .await?
                .ok_or(AppError::NotFound("Customer"))?
                .reminders
                .0,
            ReminderEntity::Service => services::find_service(&self.db, entity_id, &caller.technician_id)
                .await?
                .ok_or(AppError::NotFound("Service"))?
                .reminders
                .0,
        };
        Ok(reminders)
    }

    /// Removes the reminder at `index` and returns what is left.
    pub async fn delete(
        &self,
        caller: &Caller,
        entity_type: ReminderEntity,
        entity_id: &str,
        index: usize,
    ) -> Result<Vec<Reminder>, AppError> {
        let mut tx = self.db.begin().await?;
        let mut reminders = match entity_type {
            ReminderEntity::Customer => customers::find_customer(&mut *tx, entity_id, &caller.technician_id)
                .await?
                .ok_or(AppError::NotFound("Customer"))?
                .reminders
                .0,
            ReminderEntity::Service => services::find_service(&mut *tx, entity_id, &caller.technician_id)
                .await?
                .ok_or(AppError::NotFound("Service"))?
                .reminders
                .0,
        };
        if index >= reminders.len() {
            return Err(AppError::NotFound("Reminder"));
        }
        reminders.remove(index);
        store(&mut tx, entity_type, entity_id, &reminders).await?;
        tx.commit().await?;

        Ok(reminders)
    }
}

async fn store(
    conn: &mut sqlx::SqliteConnection,
    entity_type: ReminderEntity,
    entity_id: &str,
    reminders: &[Reminder],
) -> Result<(), AppError> {
    match entity_type {
        ReminderEntity::Customer => customers::set_reminders(&mut *conn, entity_id, reminders).await?,
        ReminderEntity::Service => services::set_reminders(&mut *conn, entity_id, reminders).await?,
    };
    Ok(())
}

fn build_reminder(entity_type: ReminderEntity, entity_id: &str, req: NewReminderRequest) -> Result<Reminder, AppError> {
    let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
    let message = non_empty(req.message);
    let audio_url = non_empty(req.audio_url);

    match req.kind {
        ReminderKind::Text if message.is_none() => {
            return Err(AppError::InvalidInput("A text reminder needs a message".to_string()));
        }
        ReminderKind::Audio if audio_url.is_none() => {
            return Err(AppError::InvalidInput("An audio reminder needs an audioUrl".to_string()));
        }
        _ => {}
    }

    Ok(Reminder {
        kind: req.kind,
        message,
        audio_url,
        date: req.date,
        entity_type,
        entity_id: entity_id.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_customer_with_services, seed_technician, setup_test_db};
    use chrono::Utc;

    fn text(message: &str) -> NewReminderRequest {
        NewReminderRequest {
            kind: ReminderKind::Text,
            message: Some(message.to_string()),
            audio_url: None,
            date: Utc::now(),
        }
    }

    #[tokio::test]
    async fn add_list_and_delete_by_index() {
        let pool = setup_test_db().await;
        let tech = seed_technician(&pool, "9600000001").await;
        let (customer, services) = seed_customer_with_services(&pool, &tech.id, 1).await;
        let service = ReminderService::new(pool.clone());
        let caller = Caller::new(&tech.id);

        service
            .add(&caller, ReminderEntity::Customer, &customer.id, text("call before visit"))
            .await
            .expect("add");
        let list = service
            .add(&caller, ReminderEntity::Customer, &customer.id, text("bring spare filter"))
            .await
            .expect("add");
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].entity_type, ReminderEntity::Customer);
        assert_eq!(list[1].entity_id, customer.id);

        let left = service
            .delete(&caller, ReminderEntity::Customer, &customer.id, 0)
            .await
            .expect("delete");
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].message.as_deref(), Some("bring spare filter"));

        let err = service
            .delete(&caller, ReminderEntity::Customer, &customer.id, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound("Reminder")));

        service
            .add(&caller, ReminderEntity::Service, &services[0], text("check tds"))
            .await
            .expect("add");
        assert_eq!(
            service.list(&caller, ReminderEntity::Service, &services[0]).await.expect("list").len(),
            1
        );
        assert_eq!(
            service.list(&caller, ReminderEntity::Customer, &customer.id).await.expect("list").len(),
            1
        );
    }

    #[tokio::test]
    async fn reminder_payload_must_match_kind() {
        let pool = setup_test_db().await;
        let tech = seed_technician(&pool, "9600000002").await;
        let (customer, _) = seed_customer_with_services(&pool, &tech.id, 1).await;
        let service = ReminderService::new(pool.clone());
        let caller = Caller::new(&tech.id);

        let audio_without_url = NewReminderRequest {
            kind: ReminderKind::Audio,
            message: Some("hello".to_string()),
            audio_url: None,
            date: Utc::now(),
        };
        let err = service
            .add(&caller, ReminderEntity::Customer, &customer.id, audio_without_url)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let err = service
            .add(&caller, ReminderEntity::Customer, &customer.id, text("  "))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
