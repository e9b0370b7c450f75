use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::models::job::{JobConfig, JobId, JobStatus};

/// A job as held by the registry.
#[derive(Debug)]
pub struct JobRecord {
    pub config: JobConfig,
    pub status: JobStatus,
    pub started_at: DateTime<Utc>,
    /// Execution task, kept only to test liveness.
    handle: Option<JoinHandle<()>>,
}

impl JobRecord {
    /// A fresh record in the `Running` state with no task attached yet.
    pub fn running(config: JobConfig, started_at: DateTime<Utc>) -> Self {
        Self {
            config,
            status: JobStatus::Running,
            started_at,
            handle: None,
        }
    }

    /// A record with no attached task counts as live: its task is about to be spawned.
    fn task_finished(&self) -> bool {
        self.handle.as_ref().is_some_and(JoinHandle::is_finished)
    }
}

/// Point-in-time copy of a record handed out to readers.
#[derive(Debug, Clone)]
pub struct JobSnapshot {
    pub config: JobConfig,
    pub status: JobStatus,
    pub started_at: DateTime<Utc>,
    pub task_finished: bool,
}

/// In-memory job table shared by the orchestrator, runners and status queries.
///
/// Each operation takes the lock exactly once and never awaits while holding it.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: RwLock<HashMap<JobId, JobRecord>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, returning the one it replaced on an ID collision.
    pub async fn insert(&self, id: JobId, record: JobRecord) -> Option<JobRecord> {
        self.jobs.write().await.insert(id, record)
    }

    pub async fn get(&self, id: &JobId) -> Option<JobSnapshot> {
        let jobs = self.jobs.read().await;
        jobs.get(id).map(|record| JobSnapshot {
            config: record.config.clone(),
            status: record.status,
            started_at: record.started_at,
            task_finished: record.task_finished(),
        })
    }

    /// Move a job out of `Running`.
    ///
    /// Returns `false` without touching the record if the job is unknown or
    /// already terminal, so status never regresses or flips between terminal states.
    pub async fn update_status(&self, id: &JobId, status: JobStatus) -> bool {
        let mut jobs = self.jobs.write().await;
        match jobs.get_mut(id) {
            Some(record) if !record.status.is_terminal() => {
                record.status = status;
                true
            }
            _ => false,
        }
    }

    pub async fn attach_handle(&self, id: &JobId, handle: JoinHandle<()>) {
        if let Some(record) = self.jobs.write().await.get_mut(id) {
            record.handle = Some(handle);
        }
    }

    /// Number of jobs in each status, for health reporting.
    pub async fn status_counts(&self) -> HashMap<JobStatus, usize> {
        let jobs = self.jobs.read().await;
        let mut counts = HashMap::new();
        for record in jobs.values() {
            *counts.entry(record.status).or_insert(0) += 1;
        }
        counts
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}
