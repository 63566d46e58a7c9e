use std::sync::Arc;

use crate::backend::ShareBackend;
use crate::config::Config;
use crate::observability::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub backend: Arc<dyn ShareBackend>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(config: Config, backend: Arc<dyn ShareBackend>) -> Self {
        Self {
            config: Arc::new(config),
            backend,
            metrics: Arc::new(Metrics::new()),
        }
    }
}
