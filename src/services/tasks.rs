use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;
use uuid::Uuid;

use crate::auth::Caller;
use crate::db::{linkage, services, tasks, technicians};
use crate::error::AppError;
use crate::models::*;
use crate::notify::{NotificationKind, NotificationPayload, Notifier, notify_quietly};
use crate::services::require_text;

const INVALID_BATCH: &str =
    "Some services are invalid, belong to another technician, or are already assigned to a task";

pub struct TaskService {
    db: SqlitePool,
    notifier: Arc<dyn Notifier>,
}

impl TaskService {
    pub fn new(db: SqlitePool, notifier: Arc<dyn Notifier>) -> Self {
        Self { db, notifier }
    }

    /// Groups unassigned services into a new task. One bad id fails the
    /// whole batch.
    pub async fn create_batch(&self, caller: &Caller, req: CreateBatchTaskRequest) -> Result<Task, AppError> {
        require_text(&req.title, "title")?;
        check_id_list(&req.service_ids)?;

        let now = Utc::now();
        let mut task = Task {
            id: Uuid::new_v4().to_string(),
            title: req.title.trim().to_string(),
            technician_id: caller.technician_id.clone(),
            shared_with: None,
            status: TaskStatus::Pending,
            services: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.db.begin().await?;
        ensure_assignable(&mut tx, &req.service_ids, &caller.technician_id).await?;
        tasks::insert_task(&mut tx, &task).await?;
        linkage::attach(&mut tx, &task.id, &req.service_ids).await?;
        tx.commit().await?;

        info!("created task {} with {} services", task.id, req.service_ids.len());
        task.services = req.service_ids;
        Ok(task)
    }

    pub async fn add_services(&self, caller: &Caller, task_id: &str, service_ids: Vec<String>) -> Result<Task, AppError> {
        check_id_list(&service_ids)?;

        let mut tx = self.db.begin().await?;
        tasks::find_owned_task(&mut *tx, task_id, &caller.technician_id)
            .await?
            .ok_or(AppError::NotFound("Task"))?;
        ensure_assignable(&mut tx, &service_ids, &caller.technician_id).await?;
        linkage::attach(&mut tx, task_id, &service_ids).await?;
        tasks::touch_task(&mut *tx, task_id, Utc::now()).await?;
        tx.commit().await?;

        info!("added {} services to task {}", service_ids.len(), task_id);
        self.get(caller, task_id).await
    }

    /// Releases the listed services from the task. Ids that are not members
    /// of this task are left alone.
    pub async fn remove_services(
        &self,
        caller: &Caller,
        task_id: &str,
        service_ids: Vec<String>,
    ) -> Result<Task, AppError> {
        if service_ids.is_empty() {
            return Err(AppError::InvalidInput("serviceIds must not be empty".to_string()));
        }

        let mut tx = self.db.begin().await?;
        tasks::find_owned_task(&mut *tx, task_id, &caller.technician_id)
            .await?
            .ok_or(AppError::NotFound("Task"))?;
        let released = linkage::detach(&mut tx, task_id, &service_ids).await?;
        tasks::touch_task(&mut *tx, task_id, Utc::now()).await?;
        tx.commit().await?;

        info!("removed {} services from task {}", released.len(), task_id);
        self.get(caller, task_id).await
    }

    /// Shares an owned task with the technician registered under `phone_number`.
    pub async fn share(&self, caller: &Caller, task_id: &str, phone_number: &str) -> Result<Task, AppError> {
        require_text(phone_number, "phoneNumber")?;

        let task = tasks::find_owned_task(&self.db, task_id, &caller.technician_id)
            .await?
            .ok_or(AppError::NotFound("Task"))?;
        if task.shared_with.is_some() {
            return Err(AppError::Conflict("Task is already shared".to_string()));
        }

        let target = technicians::find_active_by_contact(&self.db, phone_number.trim())
            .await?
            .ok_or(AppError::NotFound("Technician"))?;
        if target.id == caller.technician_id {
            return Err(AppError::InvalidInput("Cannot share a task with yourself".to_string()));
        }

        if !tasks::set_shared_with(&self.db, task_id, &target.id, Utc::now()).await? {
            return Err(AppError::Conflict("Task is already shared".to_string()));
        }
        info!("task {} shared with technician {}", task_id, target.id);

        notify_quietly(
            self.notifier.as_ref(),
            NotificationPayload::new(
                &target.id,
                NotificationKind::TaskAssigned,
                "Task shared with you",
                format!("{} was shared with you", task.title),
            )
            .with_data(json!({ "taskId": task.id })),
        )
        .await;

        self.get(caller, task_id).await
    }

    /// Sets the status by hand. Either technician on the task may do this;
    /// the other one is notified on completion.
    pub async fn update_status(&self, caller: &Caller, task_id: &str, status: TaskStatus) -> Result<Task, AppError> {
        let task = tasks::find_visible_task(&self.db, task_id, &caller.technician_id)
            .await?
            .ok_or(AppError::NotFound("Task"))?;
        tasks::set_task_status(&self.db, task_id, status, Utc::now()).await?;

        if status == TaskStatus::Completed {
            let counterpart = if task.technician_id == caller.technician_id {
                task.shared_with.clone()
            } else {
                Some(task.technician_id.clone())
            };
            if let Some(target) = counterpart {
                notify_quietly(
                    self.notifier.as_ref(),
                    NotificationPayload::new(
                        &target,
                        NotificationKind::TaskCompleted,
                        "Task completed",
                        format!("{} was marked completed", task.title),
                    )
                    .with_data(json!({ "taskId": task.id })),
                )
                .await;
            }
        }

        self.get(caller, task_id).await
    }

    pub async fn rename(&self, caller: &Caller, task_id: &str, req: UpdateTaskRequest) -> Result<Task, AppError> {
        tasks::find_owned_task(&self.db, task_id, &caller.technician_id)
            .await?
            .ok_or(AppError::NotFound("Task"))?;

        if let Some(title) = req.title {
            require_text(&title, "title")?;
            tasks::set_task_title(&self.db, task_id, title.trim(), Utc::now()).await?;
        }

        self.get(caller, task_id).await
    }

    /// Tasks owned by the caller, or shared with them when `shared_with_me`.
    pub async fn list(
        &self,
        caller: &Caller,
        status: Option<TaskStatus>,
        shared_with_me: bool,
    ) -> Result<Vec<Task>, AppError> {
        let mut list = tasks::fetch_tasks(&self.db, &caller.technician_id, status, shared_with_me).await?;
        for task in list.iter_mut() {
            task.services = tasks::member_ids(&self.db, &task.id).await?;
        }
        Ok(list)
    }

    pub async fn get(&self, caller: &Caller, task_id: &str) -> Result<Task, AppError> {
        let mut task = tasks::find_visible_task(&self.db, task_id, &caller.technician_id)
            .await?
            .ok_or(AppError::NotFound("Task"))?;
        task.services = tasks::member_ids(&self.db, &task.id).await?;
        Ok(task)
    }

    /// Member services of a visible task.
    pub async fn services(&self, caller: &Caller, task_id: &str) -> Result<Vec<Service>, AppError> {
        let task = self.get(caller, task_id).await?;
        let list = services::fetch_services_by_ids(&self.db, &task.services).await?;
        Ok(list)
    }

    /// Releases every member service, then deletes the task.
    pub async fn delete(&self, caller: &Caller, task_id: &str) -> Result<(), AppError> {
        let mut tx = self.db.begin().await?;
        tasks::find_owned_task(&mut *tx, task_id, &caller.technician_id)
            .await?
            .ok_or(AppError::NotFound("Task"))?;
        let released = linkage::detach_all(&mut tx, task_id).await?;
        tasks::delete_task_row(&mut *tx, task_id).await?;
        tx.commit().await?;

        info!("deleted task {} and released {} services", task_id, released);
        Ok(())
    }
}

fn check_id_list(ids: &[String]) -> Result<(), AppError> {
    if ids.is_empty() {
        return Err(AppError::InvalidInput("serviceIds must not be empty".to_string()));
    }
    let mut seen = HashSet::new();
    if let Some(dup) = ids.iter().find(|id| !seen.insert(id.as_str())) {
        return Err(AppError::InvalidInput(format!("Duplicate service id {}", dup)));
    }
    Ok(())
}

async fn ensure_assignable(conn: &mut SqliteConnection, ids: &[String], technician_id: &str) -> Result<(), AppError> {
    let assignable = services::fetch_assignable_ids(&mut *conn, ids, technician_id).await?;
    if assignable.len() != ids.len() {
        return Err(AppError::Conflict(INVALID_BATCH.to_string()));
    }
    Ok(())
}
