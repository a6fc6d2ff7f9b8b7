use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use purifier_backend::api::router;
use purifier_backend::auth::TokenAuth;
use purifier_backend::config::AppConfig;
use purifier_backend::db;
use purifier_backend::notify::{NoopNotifier, Notifier, WebhookNotifier};
use purifier_backend::services::ReconcileScheduler;
use purifier_backend::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "purifier_backend=debug,tower_http=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let pool = db::connect(&config.database_url, config.max_connections).await?;

    let notifier: Arc<dyn Notifier> = match config.webhook.clone() {
        Some(webhook) => {
            info!("Notifications go to {}", webhook.url);
            Arc::new(WebhookNotifier::new(webhook)?)
        }
        None => {
            warn!("NOTIFY_WEBHOOK_URL not set, notifications are disabled");
            Arc::new(NoopNotifier)
        }
    };

    let auth = Arc::new(TokenAuth::new(
        config.jwt_secret.as_bytes(),
        chrono::Duration::hours(config.token_ttl_hours),
    ));

    if config.reconcile_interval_secs > 0 {
        let scheduler = ReconcileScheduler::new(pool.clone(), config.reconcile_interval_secs);
        tokio::spawn(async move {
            scheduler.start().await;
        });
    } else {
        info!("Link reconciliation disabled");
    }

    let state = AppState {
        db: pool.clone(),
        notifier,
        auth,
    };

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
