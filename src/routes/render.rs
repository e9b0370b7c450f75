use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use tokio_util::io::ReaderStream;

use crate::app_state::AppState;
use crate::error::JobError;
use crate::models::job::JobId;
use crate::models::render::{GenerateResponse, JobStatusReport, RenderRequest};
use crate::services::artifacts;

/// POST /api/generate — Start rendering an animation.
pub async fn generate_animation(
    State(state): State<AppState>,
    payload: Result<Json<RenderRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, JobError> {
    let Json(request) = payload?;
    let job_id = state.orchestrator.submit(request).await?;

    Ok(Json(GenerateResponse {
        success: true,
        job_id,
        message: "Animation generation started".to_string(),
    }))
}

/// GET /api/status/{job_id} — Check render job status.
pub async fn get_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<JobStatusReport>, JobError> {
    let report = state.orchestrator.query(&JobId::new(job_id)).await?;
    Ok(Json(report))
}

/// GET /api/download/{filename} — Stream a rendered video as an attachment.
pub async fn download_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, JobError> {
    let artifact = artifacts::open_artifact(&state.output_dir, &filename).await?;
    let disposition = format!("attachment; filename=\"{}\"", filename.replace('"', ""));

    Ok((
        [
            (header::CONTENT_TYPE, content_type(&filename).to_string()),
            (header::CONTENT_LENGTH, artifact.len.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from_stream(ReaderStream::new(artifact.file)),
    ))
}

fn content_type(filename: &str) -> &'static str {
    match filename.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()) {
        Some(ext) if ext == "mp4" => "video/mp4",
        Some(ext) if ext == "txt" => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}
