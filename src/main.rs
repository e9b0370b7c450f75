use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use render_orchestrator::app_state::AppState;
use render_orchestrator::config::AppConfig;
use render_orchestrator::routes;
use render_orchestrator::services::orchestrator::JobOrchestrator;
use render_orchestrator::services::registry::JobRegistry;
use render_orchestrator::services::renderer::Renderer;

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing render orchestrator");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");

    // Register application metrics
    metrics::describe_counter!(
        "render_jobs_submitted_total",
        "Total render jobs submitted"
    );
    metrics::describe_counter!(
        "render_jobs_finished_total",
        "Total render jobs that reached a terminal status, by status"
    );
    metrics::describe_histogram!(
        "render_job_duration_seconds",
        "Wall-clock time of renderer processes that exited on their own"
    );
    metrics::describe_gauge!(
        "render_jobs_running",
        "Render processes currently in flight"
    );

    let settings = config.render_settings();
    let static_dir = config.static_dir();
    for dir in [&settings.output_dir, &static_dir] {
        std::fs::create_dir_all(dir).expect("Failed to create project directory");
    }

    tracing::info!(
        project_dir = %settings.project_dir.display(),
        output_dir = %settings.output_dir.display(),
        renderer = %settings.program.display(),
        timeout_s = settings.timeout.as_secs(),
        "Render settings loaded"
    );

    // The registry lives for the whole process; jobs are never evicted.
    let registry = Arc::new(JobRegistry::new());
    let orchestrator = JobOrchestrator::new(registry, Renderer::new(settings));
    let state = AppState::new(orchestrator, Some(prometheus_handle));

    let app = routes::router(state, &config.data_dir(), &static_dir);

    tracing::info!("Starting render orchestrator on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
