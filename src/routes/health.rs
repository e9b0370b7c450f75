use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::app_state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub checks: HealthChecks,
}

#[derive(Serialize)]
pub struct HealthChecks {
    pub output_dir: ComponentHealth,
    pub jobs: JobCounts,
}

#[derive(Serialize)]
pub struct ComponentHealth {
    pub status: String,
    pub path: String,
}

#[derive(Serialize)]
pub struct JobCounts {
    pub total: usize,
    pub by_status: BTreeMap<String, usize>,
}

/// GET /health — service status with output directory check and job counts.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let output_ok = tokio::fs::metadata(state.output_dir.as_path())
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);

    let counts = state.orchestrator.registry().status_counts().await;
    let by_status: BTreeMap<String, usize> = counts
        .into_iter()
        .map(|(status, n)| (status.to_string(), n))
        .collect();

    let response = HealthResponse {
        status: if output_ok { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            output_dir: ComponentHealth {
                status: if output_ok { "ok" } else { "missing" }.to_string(),
                path: state.output_dir.display().to_string(),
            },
            jobs: JobCounts {
                total: by_status.values().sum(),
                by_status,
            },
        },
    };

    Json(response)
}
