use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::Arc;

use crate::services::orchestrator::JobOrchestrator;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: JobOrchestrator,
    pub output_dir: Arc<PathBuf>,
    /// Absent when no Prometheus recorder is installed (e.g. in tests).
    pub metrics: Option<Arc<PrometheusHandle>>,
}

impl AppState {
    pub fn new(orchestrator: JobOrchestrator, metrics: Option<PrometheusHandle>) -> Self {
        let output_dir = Arc::new(orchestrator.renderer().settings().output_dir.clone());
        Self {
            orchestrator,
            output_dir,
            metrics: metrics.map(Arc::new),
        }
    }
}
