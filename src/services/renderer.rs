//! Process runner for the external renderer.
//!
//! A render is `<program> --python <script> -- <participant> <movement>
//! <setType> <camera> <fps> <saveName>`, run from the project root. The
//! child's output is captured, a hard deadline is enforced, and the outcome
//! is recorded in the [`JobRegistry`].

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};

use crate::models::job::{JobConfig, JobId, JobStatus};
use crate::services::registry::JobRegistry;

/// Default wall-clock limit for a single render (20 minutes).
pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(1200);

/// Maximum stdout or stderr size captured per stream (10 MiB).
const MAX_OUTPUT_BYTES: u64 = 10 * 1024 * 1024;

/// Where and how the renderer is invoked.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// Renderer executable, looked up on `PATH` when not absolute.
    pub program: PathBuf,
    /// Script passed after `--python`.
    pub script: PathBuf,
    /// Working directory of the child, also where job logs are written.
    pub project_dir: PathBuf,
    /// Directory the renderer writes `<saveName>.mp4` into.
    pub output_dir: PathBuf,
    pub timeout: Duration,
}

/// Captured result of a renderer process that exited on its own.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    /// Exit code, or the negated signal number if the process was killed by a signal.
    pub return_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

impl RenderOutput {
    pub fn success(&self) -> bool {
        self.return_code == 0
    }

    /// Contents of `log_<jobID>.txt`.
    pub fn log_contents(&self) -> String {
        format!(
            "Return code: {}\nSTDOUT:\n{}\nSTDERR:\n{}\n",
            self.return_code, self.stdout, self.stderr
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Render timed out after {}s", elapsed.as_secs())]
    Timeout { elapsed: Duration },

    #[error("Failed to run renderer: {0}")]
    Io(#[from] std::io::Error),
}

/// Runs render jobs against the configured external program.
#[derive(Debug, Clone)]
pub struct Renderer {
    settings: RenderSettings,
}

impl Renderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Arguments after the program name, in the order the render script expects.
    pub fn command_args(&self, config: &JobConfig) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--python".into(),
            self.settings.script.clone().into_os_string(),
            "--".into(),
        ];
        args.extend(
            [
                &config.participant,
                &config.movement,
                &config.set_type,
                &config.camera,
                &config.fps,
                &config.save_name,
            ]
            .into_iter()
            .map(OsString::from),
        );
        args
    }

    pub fn log_path(&self, job_id: &JobId) -> PathBuf {
        self.settings.project_dir.join(format!("log_{job_id}.txt"))
    }

    /// Run the renderer to completion or until the deadline.
    ///
    /// The deadline covers both the process and the collection of its output.
    /// Once the renderer exits, anything left in its process group is killed so
    /// a lingering helper can neither outlive the job nor hold the pipes open.
    /// On timeout the whole group is killed and the child reaped before returning.
    pub async fn run(&self, config: &JobConfig) -> Result<RenderOutput, RenderError> {
        let mut std_cmd = std::process::Command::new(&self.settings.program);
        std_cmd
            .args(self.command_args(config))
            .current_dir(&self.settings.project_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        detach_process_group(&mut std_cmd);

        let mut cmd = Command::from(std_cmd);
        cmd.kill_on_drop(true);

        let start = Instant::now();
        let mut child = cmd.spawn()?;
        let pid = child.id();

        let mut stdout_task = tokio::spawn(read_stream(child.stdout.take()));
        let mut stderr_task = tokio::spawn(read_stream(child.stderr.take()));

        let collected = tokio::time::timeout(self.settings.timeout, async {
            let status = child.wait().await?;
            kill_process_group(pid);
            let stdout = (&mut stdout_task).await.unwrap_or_default();
            let stderr = (&mut stderr_task).await.unwrap_or_default();
            Ok::<_, std::io::Error>((status, stdout, stderr))
        })
        .await;

        match collected {
            Ok(Ok((status, stdout, stderr))) => Ok(RenderOutput {
                return_code: return_code(status),
                stdout: String::from_utf8_lossy(&stdout).into_owned(),
                stderr: String::from_utf8_lossy(&stderr).into_owned(),
                duration: start.elapsed(),
            }),
            Ok(Err(e)) => {
                terminate(&mut child, pid).await;
                stdout_task.abort();
                stderr_task.abort();
                Err(RenderError::Io(e))
            }
            Err(_elapsed) => {
                terminate(&mut child, pid).await;
                stdout_task.abort();
                stderr_task.abort();
                Err(RenderError::Timeout {
                    elapsed: start.elapsed(),
                })
            }
        }
    }

    /// Run one job end to end and record its terminal status.
    ///
    /// Nothing is propagated to a caller; the outcome is only observable
    /// through the registry.
    pub async fn execute(
        &self,
        registry: &JobRegistry,
        job_id: &JobId,
        config: &JobConfig,
    ) -> JobStatus {
        tracing::info!(job_id = %job_id, program = %self.settings.program.display(), "Starting render");

        let status = match self.run(config).await {
            Ok(output) => {
                let log_path = self.log_path(job_id);
                if let Err(e) = tokio::fs::write(&log_path, output.log_contents()).await {
                    tracing::warn!(job_id = %job_id, path = %log_path.display(), error = %e, "Failed to write render log");
                }

                metrics::histogram!("render_job_duration_seconds")
                    .record(output.duration.as_secs_f64());

                if output.success() {
                    tracing::info!(
                        job_id = %job_id,
                        duration_ms = output.duration.as_millis() as u64,
                        "Render completed successfully"
                    );
                    JobStatus::Completed
                } else {
                    tracing::warn!(
                        job_id = %job_id,
                        return_code = output.return_code,
                        "Render failed"
                    );
                    JobStatus::Failed
                }
            }
            Err(RenderError::Timeout { elapsed }) => {
                tracing::warn!(job_id = %job_id, elapsed_s = elapsed.as_secs(), "Render timed out");
                JobStatus::TimedOut
            }
            Err(e) => {
                tracing::error!(job_id = %job_id, error = %e, "Render crashed");
                JobStatus::Errored
            }
        };

        if !registry.update_status(job_id, status).await {
            tracing::debug!(job_id = %job_id, status = %status, "Job already terminal, status not recorded");
        }
        metrics::counter!("render_jobs_finished_total", "status" => status.to_string()).increment(1);

        status
    }
}

/// Make the child lead a new process group so a timeout can kill its descendants too.
#[cfg(unix)]
fn detach_process_group(cmd: &mut std::process::Command) {
    use std::os::unix::process::CommandExt;
    cmd.process_group(0);
}

#[cfg(not(unix))]
fn detach_process_group(_cmd: &mut std::process::Command) {}

/// SIGKILL every process in the group led by `pid`.
///
/// Also called after the leader has been reaped: the group ID stays valid for
/// as long as any member is left, and a no-longer-existing group is a no-op.
#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    let Some(pid) = pid else {
        return;
    };
    // Safety: kill(2) has no memory-safety preconditions. The child was
    // spawned as leader of its own group, so -pid addresses only that group.
    let ret = unsafe { libc::kill(-(pid as libc::pid_t), libc::SIGKILL) };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::ESRCH) {
            tracing::debug!(pid, error = %err, "Process group kill failed");
        }
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}

/// Forcibly stop the child and everything it spawned, then reap it.
async fn terminate(child: &mut Child, pid: Option<u32>) {
    kill_process_group(pid);

    if let Err(e) = child.start_kill() {
        tracing::debug!(error = %e, "Child already exited");
    }
    if let Err(e) = child.wait().await {
        tracing::warn!(error = %e, "Failed to reap renderer process");
    }
}

fn return_code(status: ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    status.code().unwrap_or(-1)
}

/// Read an entire output stream, keeping at most [`MAX_OUTPUT_BYTES`].
///
/// Past the cap the stream is still drained so the renderer never sees a
/// closed pipe; the captured text ends with a truncation marker instead.
async fn read_stream<R: AsyncRead + Unpin>(handle: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    let Some(mut h) = handle else {
        return buf;
    };

    let drained: std::io::Result<u64> = async {
        (&mut h).take(MAX_OUTPUT_BYTES).read_to_end(&mut buf).await?;
        tokio::io::copy(&mut h, &mut tokio::io::sink()).await
    }
    .await;

    match drained {
        Ok(0) => {}
        Ok(dropped) => {
            buf.extend_from_slice(format!("\n[truncated: {dropped} more bytes]\n").as_bytes());
        }
        Err(e) => tracing::warn!(error = %e, "Failed to read renderer output"),
    }
    buf
}
