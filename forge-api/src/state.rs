//! Shared application state for the API server.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use forge::client::ChatClient;
use forge::config::ForgeConfig;
use forge::registry::JobRegistry;

/// Shared state accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Directory holding one subdirectory per job plus cached archives.
    pub jobs_root: PathBuf,
    /// Job-id → phase store shared with the pipeline.
    pub registry: Arc<JobRegistry>,
    /// Chat-model backend used by the pipeline.
    pub client: Arc<dyn ChatClient + Send + Sync>,
    pub config: Arc<ForgeConfig>,
}

impl AppState {
    pub fn new(
        jobs_root: PathBuf,
        config: ForgeConfig,
        client: Arc<dyn ChatClient + Send + Sync>,
    ) -> Self {
        let registry = Arc::new(JobRegistry::new(Duration::from_secs(
            config.registry_ttl_secs,
        )));
        Self {
            jobs_root,
            registry,
            client,
            config: Arc::new(config),
        }
    }
}
