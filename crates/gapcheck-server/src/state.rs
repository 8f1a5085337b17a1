use gapcheck_core::config::Config;
use gapcheck_core::store::{open_store, ReportStore};
use std::path::PathBuf;
use std::sync::Arc;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub config: Arc<Config>,
    pub store: Arc<dyn ReportStore>,
}

impl AppState {
    /// Load the config under `root` (defaults when uninitialized) and open
    /// the configured store.
    pub fn open(root: PathBuf) -> gapcheck_core::Result<Self> {
        let config = Config::load_or_default(&root)?;
        let store: Arc<dyn ReportStore> = Arc::from(open_store(&root, &config)?);
        Ok(Self::with_store(root, config, store))
    }

    pub fn with_store(root: PathBuf, config: Config, store: Arc<dyn ReportStore>) -> Self {
        Self {
            root,
            config: Arc::new(config),
            store,
        }
    }
}
