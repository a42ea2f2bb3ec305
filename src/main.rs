use std::sync::{Arc, Mutex};

use tracing_subscriber::EnvFilter;

use courtbook::config::AppConfig;
use courtbook::db;
use courtbook::handlers;
use courtbook::services::jobs::webhook::WebhookDispatcher;
use courtbook::services::jobs::{self, JobDispatcher, LogDispatcher};
use courtbook::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    let dispatcher: Box<dyn JobDispatcher> = match &config.jobs_webhook_url {
        Some(url) => {
            tracing::info!("posting booking jobs to {url}");
            Box::new(WebhookDispatcher::new(url.clone()))
        }
        None => {
            tracing::info!("JOBS_WEBHOOK_URL not set, booking jobs will only be logged");
            Box::new(LogDispatcher)
        }
    };
    let (job_queue, _worker) = jobs::spawn_worker(dispatcher);

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        jobs: Box::new(job_queue),
    });

    let app = handlers::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
