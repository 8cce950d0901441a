use std::sync::Arc;

use tally_config::Config;
use tally_core::{CategoryStore, KeyValueStorage, LoadOutcome, TransactionStore};
use tally_storage_json::JsonFileStorage;
use tracing::info;

use crate::AppError;

/// Owns the stores for one data directory. Both stores share a single
/// storage handle and are created once per process.
pub struct App {
    config: Config,
    categories: CategoryStore,
    transactions: TransactionStore,
}

impl App {
    pub fn new(config: Config, storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            categories: CategoryStore::new(Arc::clone(&storage)),
            transactions: TransactionStore::new(storage),
            config,
        }
    }

    /// Opens JSON file storage in the configured data directory.
    pub fn open(config: Config) -> Result<Self, AppError> {
        let dir = config.resolve_data_dir();
        let storage = JsonFileStorage::new(&dir)?;
        info!(data_dir = %dir.display(), "opened data directory");
        Ok(Self::new(config, Arc::new(storage)))
    }

    /// Reads both lists from storage.
    pub async fn load(&self) -> (LoadOutcome, LoadOutcome) {
        let categories = self.categories.load().await;
        let transactions = self.transactions.load().await;
        (categories, transactions)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn categories(&self) -> &CategoryStore {
        &self.categories
    }

    pub fn transactions(&self) -> &TransactionStore {
        &self.transactions
    }
}
