use chrono::{DateTime, Utc};

use crate::models::job::{JobConfig, JobId};

/// Derive the job identifier from participant, movement and submission second.
///
/// Two submissions for the same participant and movement within one second get
/// the same ID; the later one replaces the earlier in the registry.
pub fn allocate(config: &JobConfig, submitted_at: DateTime<Utc>) -> JobId {
    JobId::new(format!(
        "{}_{}_{}",
        config.participant,
        config.movement,
        submitted_at.timestamp()
    ))
}
