use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::services::jobs::JobQueue;

pub struct AppState {
    /// Single writer connection; booking writes also take an IMMEDIATE transaction.
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub jobs: Box<dyn JobQueue>,
}

impl AppState {
    pub fn conn(&self) -> Result<MutexGuard<'_, Connection>, AppError> {
        self.db
            .lock()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("database lock poisoned")))
    }
}
