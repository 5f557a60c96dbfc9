pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod models;
pub mod services;

use std::sync::Arc;

use services::notification::NotificationClient;
use services::storage::StorageService;

// Shared state for the whole application
#[derive(Clone)]
pub struct AppState {
    pub db: database::Database,
    pub config: config::Config,
    pub notifier: NotificationClient,
    pub storage: StorageService,
}

impl AppState {
    pub async fn new(config: config::Config) -> anyhow::Result<Arc<Self>> {
        let db = database::Database::connect(&config.database).await?;

        db.run_migrations().await?;

        let notifier = NotificationClient::from_config(&config.notification);
        let storage = StorageService::from_config(&config.storage);
        storage.init().await?;

        Ok(Arc::new(Self {
            db,
            config,
            notifier,
            storage,
        }))
    }
}
