// orchestrator/src/state.rs

use std::sync::Arc;

use crate::cluster::Cluster;
use crate::config::OrchestratorConfig;

/// Estado compartido por los handlers. No hay estado mutable entre
/// requests: cada job vive sólo dentro de su propio request.
#[derive(Clone)]
pub struct AppState {
    pub cluster: Arc<dyn Cluster>,
    pub config: Arc<OrchestratorConfig>,
}

impl AppState {
    pub fn new(cluster: Arc<dyn Cluster>, config: OrchestratorConfig) -> Self {
        Self {
            cluster,
            config: Arc::new(config),
        }
    }
}
