use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::models::job::JobId;

/// Errors reported synchronously to the caller of the orchestrator.
///
/// Render outcomes (failed, timed out, errored) are never surfaced here; they
/// only show up as job status.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("Missing required fields: {0}")]
    Validation(String),

    #[error("Job not found: {0}")]
    JobNotFound(JobId),

    #[error("File not found: {0}")]
    ArtifactNotFound(String),

    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl JobError {
    fn status_code(&self) -> StatusCode {
        match self {
            JobError::Validation(_) => StatusCode::BAD_REQUEST,
            JobError::JobNotFound(_) | JobError::ArtifactNotFound(_) => StatusCode::NOT_FOUND,
            JobError::InvalidBody(rejection) => rejection.status(),
            JobError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn presentation_message(&self) -> String {
        match self {
            JobError::Validation(_) => "Missing required fields".to_string(),
            JobError::JobNotFound(_) => "Job not found".to_string(),
            JobError::ArtifactNotFound(_) => "File not found".to_string(),
            JobError::InvalidBody(rejection) => rejection.body_text(),
            JobError::Io(e) => e.to_string(),
        }
    }
}

impl IntoResponse for JobError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }
        (status, Json(json!({ "error": self.presentation_message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_status_codes() {
        assert_eq!(
            JobError::Validation("camera".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            JobError::JobNotFound(JobId::new("x")).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            JobError::ArtifactNotFound("x.mp4".into()).presentation_message(),
            "File not found"
        );
    }
}
