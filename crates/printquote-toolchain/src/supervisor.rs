//! Bounded-time execution of external tools.
//!
//! Every tool is started as the leader of a fresh process group. If the
//! deadline passes, or the future running the tool is dropped (for example
//! when an outer job deadline fires), the whole group is sent `SIGKILL`, so
//! helpers spawned by the tool die with it.

use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::Command;
use tracing::{debug, error, warn};

use crate::error::ToolchainError;

/// Maximum number of stderr characters kept in errors.
const STDERR_LIMIT: usize = 2000;

/// Captured result of a finished tool run.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Program that ran.
    pub program: String,
    /// Standard output (empty when capture is disabled).
    pub stdout: String,
    /// Standard error (empty when capture is disabled).
    pub stderr: String,
    /// Exit code, `None` when terminated by a signal.
    pub exit_code: Option<i32>,
    /// Wall-clock duration.
    pub duration_ms: u64,
}

impl ToolOutput {
    /// Whether the tool exited with status 0.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Turn a non-zero exit into [`ToolchainError::ProcessFailed`].
    pub fn into_success(self) -> Result<Self, ToolchainError> {
        if self.success() {
            return Ok(self);
        }
        Err(ToolchainError::ProcessFailed {
            program: self.program,
            code: self.exit_code.unwrap_or(-1),
            stderr: self.stderr.chars().take(STDERR_LIMIT).collect(),
        })
    }
}

/// Runs external programs under a wall-clock deadline.
#[derive(Debug, Clone)]
pub struct ProcessSupervisor {
    timeout: Duration,
    capture_output: bool,
}

impl ProcessSupervisor {
    /// Create a supervisor with the given per-run deadline.
    pub fn new(timeout: Duration, capture_output: bool) -> Self {
        Self {
            timeout,
            capture_output,
        }
    }

    /// The per-run deadline.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `program` with `args` and wait for it, killing its process group
    /// if the deadline passes.
    pub async fn run(
        &self,
        program: &str,
        args: &[OsString],
        working_dir: Option<&Path>,
    ) -> Result<ToolOutput, ToolchainError> {
        let start = Instant::now();
        debug!(program, ?args, "Starting external tool");

        let mut cmd = Command::new(program);
        cmd.args(args).stdin(Stdio::null()).kill_on_drop(true);
        if self.capture_output {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        } else {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }
        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        }
        #[cfg(unix)]
        cmd.process_group(0);

        let child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ToolchainError::CommandNotFound(program.to_string())
            } else {
                ToolchainError::Io(e)
            }
        })?;

        let mut group = ProcessGroupGuard::new(child.id());
        let result = tokio::time::timeout(self.timeout, child.wait_with_output()).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(Ok(output)) => {
                group.disarm();
                let tool_output = ToolOutput {
                    program: program.to_string(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                    exit_code: output.status.code(),
                    duration_ms,
                };
                if tool_output.success() {
                    debug!(program, duration_ms, "External tool finished");
                } else {
                    warn!(
                        program,
                        duration_ms,
                        exit_code = ?tool_output.exit_code,
                        stderr = %tool_output.stderr.chars().take(500).collect::<String>(),
                        "External tool exited unsuccessfully"
                    );
                }
                Ok(tool_output)
            }
            Ok(Err(e)) => {
                error!(program, error = %e, "Failed waiting for external tool");
                Err(ToolchainError::Io(e))
            }
            Err(_) => {
                error!(
                    program,
                    timeout_secs = self.timeout.as_secs(),
                    "External tool timed out, killing process group"
                );
                drop(group);
                Err(ToolchainError::Timeout {
                    program: program.to_string(),
                    seconds: self.timeout.as_secs(),
                })
            }
        }
    }
}

/// Kills a process group when dropped unless disarmed.
#[derive(Debug)]
pub struct ProcessGroupGuard {
    pgid: Option<u32>,
}

impl ProcessGroupGuard {
    /// Guard the group led by `pid` (the child started with `process_group(0)`).
    pub fn new(pid: Option<u32>) -> Self {
        Self { pgid: pid }
    }

    /// The process group led by the leader exited normally; leave it alone.
    pub fn disarm(&mut self) {
        self.pgid = None;
    }
}

impl Drop for ProcessGroupGuard {
    fn drop(&mut self) {
        let Some(pgid) = self.pgid.take() else {
            return;
        };
        kill_group(pgid);
    }
}

#[cfg(unix)]
fn kill_group(pgid: u32) {
    let Ok(raw) = libc::pid_t::try_from(pgid) else {
        return;
    };
    // Safety: killpg only sends a signal; `raw` is the pid of a child we
    // spawned as its own group leader.
    let rc = unsafe { libc::killpg(raw, libc::SIGKILL) };
    if rc == 0 {
        warn!(pgid, "Killed process group");
    } else {
        debug!(pgid, error = %std::io::Error::last_os_error(), "Process group already gone");
    }
}

#[cfg(not(unix))]
fn kill_group(_pgid: u32) {}
