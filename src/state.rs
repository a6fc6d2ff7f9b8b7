use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::TokenAuth;
use crate::notify::Notifier;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub notifier: Arc<dyn Notifier>,
    pub auth: Arc<TokenAuth>,
}
