use crate::model::{Config, ConfigPaths};
use crate::utils::FileLockManager;
use arc_swap::ArcSwap;
use std::sync::Arc;

/// Runtime configuration handed down to every component.
/// The config can be swapped while the daemon runs (hot reload).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub config: Arc<ArcSwap<Config>>,
    pub paths: ConfigPaths,
    pub file_locks: Arc<FileLockManager>,
}

impl AppConfig {
    pub fn new(config: Config, paths: ConfigPaths) -> Self {
        Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            paths,
            file_locks: Arc::new(FileLockManager::default()),
        }
    }

    pub fn set_config(&self, config: Config) {
        self.config.store(Arc::new(config));
    }

    pub fn current(&self) -> Arc<Config> {
        self.config.load_full()
    }
}
