//! External command execution.
//!
//! Every version-control query and submission goes through a
//! [`CommandRunner`], so the pipeline can be exercised against a scripted
//! runner in tests. [`ProcessRunner`] is the real implementation.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::debug;

/// A single command to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory (inherits the caller's when `None`)
    pub cwd: Option<PathBuf>,
    pub timeout: Duration,
}

impl Invocation {
    pub fn new<I, S>(program: impl Into<String>, args: I, timeout: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Invocation {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
            timeout,
        }
    }

    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code (-1 when terminated by a signal)
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Best available explanation of a failure: stderr, else stdout, else
    /// the exit code.
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        format!("exited with code {}", self.exit_code)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} timed out after {secs}s")]
    TimedOut { program: String, secs: u64 },
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run to completion, capturing output. A non-zero exit is reported in
    /// the output, not as an error.
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, RunnerError>;
}

/// Runs commands as child processes on the tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, RunnerError> {
        let start = Instant::now();
        debug!(program = %invocation.program, args = ?invocation.args, "spawning");

        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &invocation.cwd {
            command.current_dir(dir);
        }

        let child = command.spawn().map_err(|source| RunnerError::Spawn {
            program: invocation.program.clone(),
            source,
        })?;

        let output = tokio::time::timeout(invocation.timeout, child.wait_with_output())
            .await
            .map_err(|_| RunnerError::TimedOut {
                program: invocation.program.clone(),
                secs: invocation.timeout.as_secs(),
            })?
            .map_err(|source| RunnerError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;

        Ok(CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}
