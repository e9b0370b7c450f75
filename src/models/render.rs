use garde::Validate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::JobError;
use crate::models::job::{JobConfig, JobId, JobStatus};

/// A render parameter as sent by the browser: text or a bare JSON number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Text(String),
    Number(serde_json::Number),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Text(s) => f.write_str(s),
            ParamValue::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

/// Body of `POST /api/generate`. Every field is required; nothing else is checked.
/// An explicit `null` deserializes to `None` and is rejected like an absent field.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    #[garde(required)]
    pub participant: Option<ParamValue>,

    #[garde(required)]
    pub movement: Option<ParamValue>,

    #[garde(required)]
    pub set_type: Option<ParamValue>,

    #[garde(required)]
    pub camera: Option<ParamValue>,

    #[garde(required)]
    pub fps: Option<ParamValue>,

    #[garde(required)]
    pub save_name: Option<ParamValue>,
}

impl RenderRequest {
    /// Check presence of every field and coerce the values to text.
    pub fn into_config(self) -> Result<JobConfig, JobError> {
        self.validate()
            .map_err(|report| JobError::Validation(report.to_string()))?;

        let RenderRequest {
            participant: Some(participant),
            movement: Some(movement),
            set_type: Some(set_type),
            camera: Some(camera),
            fps: Some(fps),
            save_name: Some(save_name),
        } = self
        else {
            return Err(JobError::Validation("missing required fields".to_string()));
        };

        Ok(JobConfig {
            participant: participant.to_string(),
            movement: movement.to_string(),
            set_type: set_type.to_string(),
            camera: camera.to_string(),
            fps: fps.to_string(),
            save_name: save_name.to_string(),
        })
    }
}

/// Response after submitting a render job.
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub job_id: JobId,
    pub message: String,
}

/// Result of a status query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusReport {
    pub job_id: JobId,
    pub status: JobStatus,
    /// Seconds since the job was registered.
    #[serde(rename = "runtime")]
    pub runtime_seconds: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_request() -> RenderRequest {
        serde_json::from_value(serde_json::json!({
            "participant": "P1",
            "movement": "walk",
            "setType": "A",
            "camera": "cam1",
            "fps": 24,
            "saveName": "out1"
        }))
        .unwrap()
    }

    #[test]
    fn numbers_are_coerced_to_text() {
        let config = full_request().into_config().unwrap();
        assert_eq!(config.fps, "24");
        assert_eq!(config.set_type, "A");
        assert_eq!(config.artifact_name(), "out1.mp4");
    }

    #[test]
    fn fractional_fps_keeps_its_written_form() {
        let mut request = full_request();
        request.fps = Some(serde_json::from_str("23.976").unwrap());
        assert_eq!(request.into_config().unwrap().fps, "23.976");
    }

    #[test]
    fn missing_field_is_a_validation_error() {
        let mut request = full_request();
        request.camera = None;
        let err = request.into_config().unwrap_err();
        assert!(matches!(err, JobError::Validation(ref msg) if msg.contains("camera")));
    }

    #[test]
    fn null_field_counts_as_missing() {
        let request: RenderRequest = serde_json::from_value(serde_json::json!({
            "participant": "P1",
            "movement": "walk",
            "setType": "A",
            "camera": null,
            "fps": 24,
            "saveName": "out1"
        }))
        .unwrap();
        assert!(request.camera.is_none());
        let err = request.into_config().unwrap_err();
        assert!(matches!(err, JobError::Validation(ref msg) if msg.contains("camera")));
    }

    #[test]
    fn empty_body_fails_validation() {
        let request: RenderRequest = serde_json::from_str("{}").unwrap();
        assert!(matches!(
            request.into_config(),
            Err(JobError::Validation(_))
        ));
    }
}
