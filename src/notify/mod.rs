pub mod dto;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{info, warn};

use crate::error::AppError;

pub use dto::{NotificationKind, NotificationPayload};

#[derive(Clone, Debug)]
pub struct WebhookConfig {
    pub url: String,
}

/// Outbound notification channel. Delivery is best effort: callers log
/// failures and carry on.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, payload: &NotificationPayload) -> Result<(), AppError>;
}

/// Sends `payload` and swallows any failure after logging it.
pub async fn notify_quietly(notifier: &dyn Notifier, payload: NotificationPayload) {
    if let Err(e) = notifier.notify(&payload).await {
        warn!(
            "notification {:?} to {} failed: {}",
            payload.kind, payload.target_technician_id, e
        );
    }
}

/// Posts every notification as JSON to a single endpoint, which fans it out
/// to devices.
pub struct WebhookNotifier {
    client: Client,
    config: WebhookConfig,
}

impl WebhookNotifier {
    pub fn new(config: WebhookConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, payload: &NotificationPayload) -> Result<(), AppError> {
        let response = self
            .client
            .post(&self.config.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("webhook request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Internal(format!("webhook returned {}: {}", status, body)));
        }

        info!("notification {:?} delivered to {}", payload.kind, payload.target_technician_id);
        Ok(())
    }
}

pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, _payload: &NotificationPayload) -> Result<(), AppError> {
        Ok(())
    }
}

/// Keeps every payload in memory. Used by tests to observe what was sent.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: std::sync::Mutex<Vec<NotificationPayload>>,
    fail: bool,
}

impl RecordingNotifier {
    /// A recorder whose every delivery reports failure after recording.
    pub fn failing() -> Self {
        Self {
            sent: Default::default(),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<NotificationPayload> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, payload: &NotificationPayload) -> Result<(), AppError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(payload.clone());
        }
        if self.fail {
            return Err(AppError::Internal("delivery refused".to_string()));
        }
        Ok(())
    }
}
