use crate::config::ServerConfig;
use carprice_model::ModelLoader;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Effective configuration after all overrides
    pub config: Arc<ServerConfig>,

    /// Owner of the single cached model
    pub loader: Arc<ModelLoader>,

    /// Renders `/metrics`; absent when no recorder is installed
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let loader = ModelLoader::new(config.model.path.clone());
        Self {
            config: Arc::new(config),
            loader: Arc::new(loader),
            prometheus: None,
        }
    }

    /// Attach the Prometheus handle used by the metrics endpoint
    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}
