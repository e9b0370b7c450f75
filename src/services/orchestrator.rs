use chrono::Utc;
use std::sync::Arc;

use crate::error::JobError;
use crate::models::job::{JobId, JobStatus};
use crate::models::render::{JobStatusReport, RenderRequest};
use crate::services::job_id;
use crate::services::registry::{JobRecord, JobRegistry};
use crate::services::renderer::Renderer;

/// Accepts render submissions and answers status queries.
#[derive(Debug, Clone)]
pub struct JobOrchestrator {
    registry: Arc<JobRegistry>,
    renderer: Arc<Renderer>,
}

impl JobOrchestrator {
    pub fn new(registry: Arc<JobRegistry>, renderer: Renderer) -> Self {
        Self {
            registry,
            renderer: Arc::new(renderer),
        }
    }

    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Register a job and start rendering it in the background.
    ///
    /// The record is inserted before the render task is spawned, so the
    /// returned ID is immediately queryable. Must be called within a tokio runtime.
    pub async fn submit(&self, request: RenderRequest) -> Result<JobId, JobError> {
        let config = request.into_config()?;
        let submitted_at = Utc::now();
        let job_id = job_id::allocate(&config, submitted_at);

        let replaced = self
            .registry
            .insert(job_id.clone(), JobRecord::running(config.clone(), submitted_at))
            .await;
        if replaced.is_some() {
            tracing::warn!(job_id = %job_id, "Job ID collision, previous record replaced");
        }

        let registry = Arc::clone(&self.registry);
        let renderer = Arc::clone(&self.renderer);
        let task_id = job_id.clone();
        metrics::gauge!("render_jobs_running").increment(1.0);
        let handle = tokio::spawn(async move {
            renderer.execute(&registry, &task_id, &config).await;
            metrics::gauge!("render_jobs_running").decrement(1.0);
        });
        self.registry.attach_handle(&job_id, handle).await;

        metrics::counter!("render_jobs_submitted_total").increment(1);
        tracing::info!(job_id = %job_id, "Render job submitted");

        Ok(job_id)
    }

    /// Current status and elapsed runtime of a job.
    ///
    /// When the render task has finished but the record still reads `Running`,
    /// the status is inferred from the output artifact and written back. This
    /// heuristic reports `Completed` for a stale artifact left by an earlier run
    /// with the same save name, and `Failed` if the artifact lands after the
    /// task is observed finished.
    pub async fn query(&self, job_id: &JobId) -> Result<JobStatusReport, JobError> {
        let snapshot = self
            .registry
            .get(job_id)
            .await
            .ok_or_else(|| JobError::JobNotFound(job_id.clone()))?;

        let mut status = snapshot.status;
        if snapshot.task_finished && status == JobStatus::Running {
            let artifact = self
                .renderer
                .settings()
                .output_dir
                .join(snapshot.config.artifact_name());
            let inferred = if tokio::fs::try_exists(&artifact).await.unwrap_or(false) {
                JobStatus::Completed
            } else {
                JobStatus::Failed
            };
            self.registry.update_status(job_id, inferred).await;
            status = self
                .registry
                .get(job_id)
                .await
                .map_or(inferred, |current| current.status);
            tracing::info!(job_id = %job_id, status = %status, "Resolved status from output artifact");
        }

        let elapsed = Utc::now() - snapshot.started_at;
        Ok(JobStatusReport {
            job_id: job_id.clone(),
            status,
            runtime_seconds: (elapsed.num_milliseconds().max(0) as f64) / 1000.0,
        })
    }
}
