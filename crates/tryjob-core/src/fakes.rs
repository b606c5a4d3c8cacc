//! Scripted command runner (testing only)
//!
//! `ScriptedRunner` answers invocations from per-program queues and records
//! every call, so tests can assert both what the pipeline ran and that it
//! ran nothing at all.

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::process::{CommandOutput, CommandRunner, Invocation, RunnerError};

#[derive(Debug, Clone)]
enum Scripted {
    Output(CommandOutput),
    Timeout,
}

/// In-memory runner keyed by program stem (`gcl`, `svn`, `python`, ...).
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    responses: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<Vec<Invocation>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful run printing `stdout`.
    pub fn succeed(self, program: &str, stdout: &str) -> Self {
        self.push(
            program,
            Scripted::Output(CommandOutput {
                exit_code: 0,
                stdout: stdout.to_string(),
                ..Default::default()
            }),
        )
    }

    /// Queue a failed run with `exit_code` and `stderr`.
    pub fn fail(self, program: &str, exit_code: i32, stderr: &str) -> Self {
        self.push(
            program,
            Scripted::Output(CommandOutput {
                exit_code,
                stderr: stderr.to_string(),
                ..Default::default()
            }),
        )
    }

    pub fn time_out(self, program: &str) -> Self {
        self.push(program, Scripted::Timeout)
    }

    /// Every invocation seen so far, in order.
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, program: &str) -> Vec<Invocation> {
        self.calls()
            .into_iter()
            .filter(|c| program_key(&c.program) == program)
            .collect()
    }

    fn push(self, program: &str, response: Scripted) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry(program.to_string())
            .or_default()
            .push_back(response);
        self
    }
}

fn program_key(program: &str) -> String {
    Path::new(program)
        .file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.to_string())
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, RunnerError> {
        self.calls.lock().unwrap().push(invocation.clone());

        let key = program_key(&invocation.program);
        let next = self
            .responses
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(VecDeque::pop_front);

        match next {
            Some(Scripted::Output(output)) => Ok(output),
            Some(Scripted::Timeout) => Err(RunnerError::TimedOut {
                program: invocation.program.clone(),
                secs: invocation.timeout.as_secs(),
            }),
            None => Err(RunnerError::Spawn {
                program: invocation.program.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("no scripted response for {key}"),
                ),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_responses_are_consumed_in_order() {
        let runner = ScriptedRunner::new()
            .succeed("svn", "first")
            .fail("svn", 1, "second");
        let inv = Invocation::new("svn", ["info"], Duration::from_secs(1));

        assert_eq!(runner.run(&inv).await.unwrap().stdout, "first");
        assert_eq!(runner.run(&inv).await.unwrap().exit_code, 1);
        assert!(runner.run(&inv).await.is_err());
        assert_eq!(runner.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_programs_match_by_base_name() {
        let runner = ScriptedRunner::new().succeed("gcl", "ok");
        let inv = Invocation::new("/opt/depot_tools/gcl", ["try"], Duration::from_secs(1));

        assert!(runner.run(&inv).await.unwrap().success());
        assert_eq!(runner.calls_to("gcl").len(), 1);
    }
}
