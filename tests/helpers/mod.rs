//! Test helper utilities: scratch projects, fake renderers and status polling

#![allow(dead_code)]

use render_orchestrator::models::job::{JobId, JobStatus};
use render_orchestrator::models::render::JobStatusReport;
use render_orchestrator::services::orchestrator::JobOrchestrator;
use render_orchestrator::services::registry::JobRegistry;
use render_orchestrator::services::renderer::{RenderSettings, Renderer};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::{sleep, Instant};

/// Scratch project root with an `output/` directory and a fake renderer.
pub struct TestProject {
    pub root: TempDir,
    pub renderer: PathBuf,
}

impl TestProject {
    /// Create a project whose renderer runs `body` as a bash script.
    ///
    /// Inside the script `$9` is the save name and `$OUT` the output directory.
    pub fn new(body: &str) -> Self {
        let root = tempfile::tempdir().expect("create project dir");
        let output = root.path().join("output");
        std::fs::create_dir_all(&output).expect("create output dir");

        let renderer = root.path().join("fake-blender");
        let script = format!("#!/bin/bash\nOUT='{}'\n{body}", output.display());
        std::fs::write(&renderer, script).expect("write fake renderer");
        std::fs::set_permissions(&renderer, std::fs::Permissions::from_mode(0o755))
            .expect("chmod fake renderer");

        Self { root, renderer }
    }

    /// Renderer that writes `<saveName>.mp4` and exits zero.
    pub fn succeeding() -> Self {
        Self::new("echo \"rendering $4 $5\"\ntouch \"$OUT/$9.mp4\"\nexit 0\n")
    }

    /// Renderer that writes nothing and exits with `code`.
    pub fn failing(code: i32) -> Self {
        Self::new(&format!("echo 'render error' >&2\nexit {code}\n"))
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn output_dir(&self) -> PathBuf {
        self.path().join("output")
    }

    pub fn settings(&self, timeout: Duration) -> RenderSettings {
        RenderSettings {
            program: self.renderer.clone(),
            script: self.path().join("scripts/process_one.py"),
            project_dir: self.path().to_path_buf(),
            output_dir: self.output_dir(),
            timeout,
        }
    }

    pub fn orchestrator(&self, timeout: Duration) -> JobOrchestrator {
        JobOrchestrator::new(
            Arc::new(JobRegistry::new()),
            Renderer::new(self.settings(timeout)),
        )
    }

    /// Number of `log_*.txt` files written into the project root.
    pub fn log_count(&self) -> usize {
        std::fs::read_dir(self.path())
            .expect("read project dir")
            .filter_map(Result::ok)
            .filter(|entry| {
                let name = entry.file_name();
                let name = name.to_string_lossy();
                name.starts_with("log_") && name.ends_with(".txt")
            })
            .count()
    }

    pub fn read_log(&self, job_id: &JobId) -> String {
        std::fs::read_to_string(self.path().join(format!("log_{job_id}.txt")))
            .expect("read job log")
    }
}

/// Poll the orchestrator until the job is terminal, returning every observed status.
pub async fn poll_until_terminal(
    orchestrator: &JobOrchestrator,
    job_id: &JobId,
    timeout: Duration,
) -> (JobStatusReport, Vec<JobStatus>) {
    let deadline = Instant::now() + timeout;
    let mut seen = Vec::new();

    loop {
        let report = orchestrator.query(job_id).await.expect("job exists");
        seen.push(report.status);
        if report.status.is_terminal() {
            return (report, seen);
        }
        assert!(
            Instant::now() < deadline,
            "job {job_id} still running after {timeout:?}"
        );
        sleep(Duration::from_millis(25)).await;
    }
}

/// Wait for a job with a generous default timeout.
pub async fn wait_for_job_completion(
    orchestrator: &JobOrchestrator,
    job_id: &JobId,
) -> JobStatusReport {
    poll_until_terminal(orchestrator, job_id, Duration::from_secs(30))
        .await
        .0
}

/// Alive means the pid exists and is not a zombie awaiting its reaper.
pub fn process_alive(pid: i32) -> bool {
    match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
        Ok(stat) => stat
            .rsplit_once(") ")
            .is_some_and(|(_, rest)| !rest.starts_with('Z')),
        Err(_) => false,
    }
}
