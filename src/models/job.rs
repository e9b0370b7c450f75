use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumString};

/// Lifecycle state of a render job.
///
/// `Running` is the only non-terminal state; a job leaves it exactly once.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Display, EnumString, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobStatus {
    Running,
    Completed,
    Failed,
    #[serde(rename = "timeout")]
    #[strum(serialize = "timeout")]
    TimedOut,
    #[serde(rename = "error")]
    #[strum(serialize = "error")]
    Errored,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::Running)
    }
}

/// Identifier a job is tracked under, e.g. `P1_walk_1760870400`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated render parameters, already coerced to the text the renderer receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobConfig {
    pub participant: String,
    pub movement: String,
    pub set_type: String,
    pub camera: String,
    pub fps: String,
    pub save_name: String,
}

impl JobConfig {
    /// File name the renderer is expected to write into the output directory.
    pub fn artifact_name(&self) -> String {
        format!("{}.mp4", self.save_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_wire_names_match_legacy_api() {
        assert_eq!(JobStatus::TimedOut.to_string(), "timeout");
        assert_eq!(JobStatus::Errored.to_string(), "error");
        assert_eq!(
            serde_json::to_string(&JobStatus::Completed).unwrap(),
            "\"completed\""
        );
        assert_eq!(JobStatus::from_str("timeout").unwrap(), JobStatus::TimedOut);
    }

    #[test]
    fn only_running_is_non_terminal() {
        assert!(!JobStatus::Running.is_terminal());
        for status in [
            JobStatus::Completed,
            JobStatus::Failed,
            JobStatus::TimedOut,
            JobStatus::Errored,
        ] {
            assert!(status.is_terminal());
        }
    }
}
