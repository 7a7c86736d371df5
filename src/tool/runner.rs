//! Synchronous-per-call execution of external tools

use crate::tool::command::ToolCommand;
use async_trait::async_trait;
use std::fmt;
use std::io;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Split};
use tokio::process::{ChildStderr, ChildStdout, Command};
use tracing::{debug, error, info, warn};

/// Exit code reported for a tool that exceeded its time limit
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// Exit code reported for a tool that could not be started
pub const SPAWN_FAILED_EXIT_CODE: i32 = 127;

/// Outcome of one tool invocation
///
/// A failing tool is an expected, reportable result rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolStatus {
    /// Exited with code 0, or was skipped because its inputs are unchanged
    Success,
    /// Exited with a nonzero code; -1 when terminated by a signal
    Failed(i32),
    /// Killed after exceeding the configured timeout
    TimedOut,
    /// The executable could not be started
    SpawnFailed,
}

impl ToolStatus {
    /// Map a raw exit code
    pub fn from_code(code: i32) -> Self {
        if code == 0 {
            Self::Success
        } else {
            Self::Failed(code)
        }
    }

    pub fn success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Exit code to propagate from the bundle build
    pub fn code(&self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Failed(code) => *code,
            Self::TimedOut => TIMEOUT_EXIT_CODE,
            Self::SpawnFailed => SPAWN_FAILED_EXIT_CODE,
        }
    }
}

impl fmt::Display for ToolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failed(code) => write!(f, "exit code {}", code),
            Self::TimedOut => write!(f, "timed out"),
            Self::SpawnFailed => write!(f, "failed to start"),
        }
    }
}

/// Abstract tool execution interface
///
/// The bundle build runs tools strictly one at a time; implementations only
/// need to be usable from a single task.
#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Run a command to completion and report how it ended
    async fn run(&self, command: &ToolCommand) -> ToolStatus;
}

/// Runs tools as child processes
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
}

impl ProcessRunner {
    /// Create a runner; `None` waits for tools indefinitely
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    /// Run a command and return its status with stdout and stderr merged
    /// line by line in arrival order
    pub async fn run_captured(&self, command: &ToolCommand) -> (ToolStatus, String) {
        let program = command.program();
        info!("Executing: {}", command);

        let mut child = match Command::new(program)
            .args(command.argv())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                error!("Failed to start {}: {}", program.display(), e);
                return (ToolStatus::SpawnFailed, String::new());
            }
        };

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let finished = async {
            let output = merge_output(stdout, stderr).await;
            (output, child.wait().await)
        };

        let (output, wait_result) = match self.timeout {
            Some(limit) => {
                let result = tokio::time::timeout(limit, finished).await;
                match result {
                    Ok(done) => done,
                    Err(_) => {
                        error!("{} timed out after {:?}", program.display(), limit);
                        if let Err(e) = child.kill().await {
                            warn!("Failed to kill {}: {}", program.display(), e);
                        }
                        return (ToolStatus::TimedOut, String::new());
                    }
                }
            }
            None => finished.await,
        };

        let status = match wait_result {
            Ok(exit) => exit.code().map(ToolStatus::from_code).unwrap_or(ToolStatus::Failed(-1)),
            Err(e) => {
                error!("Failed to wait for {}: {}", program.display(), e);
                ToolStatus::Failed(-1)
            }
        };

        if status.success() {
            if !output.is_empty() {
                debug!("{} output:\n{}", program.display(), output.trim_end());
            }
        } else {
            error!(
                "{} failed with exit code {}\n{}",
                program.display(),
                status.code(),
                output.trim_end()
            );
        }

        (status, output)
    }
}

#[async_trait]
impl ToolRunner for ProcessRunner {
    async fn run(&self, command: &ToolCommand) -> ToolStatus {
        self.run_captured(command).await.0
    }
}

async fn merge_output(stdout: Option<ChildStdout>, stderr: Option<ChildStderr>) -> String {
    let mut out = stdout.map(|s| BufReader::new(s).split(b'\n'));
    let mut err = stderr.map(|s| BufReader::new(s).split(b'\n'));
    let mut merged = String::new();

    loop {
        tokio::select! {
            segment = next_segment(&mut out), if out.is_some() => {
                if !push_segment(&mut merged, segment) {
                    out = None;
                }
            }
            segment = next_segment(&mut err), if err.is_some() => {
                if !push_segment(&mut merged, segment) {
                    err = None;
                }
            }
            else => break,
        }
    }

    merged
}

async fn next_segment<R>(stream: &mut Option<Split<R>>) -> io::Result<Option<Vec<u8>>>
where
    R: AsyncBufRead + Unpin,
{
    match stream {
        Some(split) => split.next_segment().await,
        None => Ok(None),
    }
}

/// Append one line; returns false once the stream is exhausted
fn push_segment(merged: &mut String, segment: io::Result<Option<Vec<u8>>>) -> bool {
    match segment {
        Ok(Some(bytes)) => {
            let line = String::from_utf8_lossy(&bytes);
            merged.push_str(line.trim_end_matches('\r'));
            merged.push('\n');
            true
        }
        Ok(None) => false,
        Err(e) => {
            warn!("Failed to read tool output: {}", e);
            false
        }
    }
}
