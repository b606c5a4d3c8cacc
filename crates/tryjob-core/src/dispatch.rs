//! Try-job submission.
//!
//! Subversion checkouts submit with `gcl try`. git checkouts submit with
//! `trychange.py` pointed at the trusted SVN try server, so both substrates
//! end up on the same try server.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, warn};

use crate::config::TryConfig;
use crate::domain::{
    Result, SubmissionReceipt, SubstrateKind, TryJobError, TryRequest, TryServerEndpoint,
};
use crate::obs;
use crate::process::{CommandRunner, Invocation};

pub struct DispatchClient {
    runner: Arc<dyn CommandRunner>,
    config: TryConfig,
}

impl DispatchClient {
    pub fn new(runner: Arc<dyn CommandRunner>, config: &TryConfig) -> Self {
        DispatchClient {
            runner,
            config: config.clone(),
        }
    }

    /// Build the submission command without running it.
    pub fn plan(
        &self,
        request: &TryRequest,
        kind: SubstrateKind,
        root: &str,
        endpoint: Option<&TryServerEndpoint>,
    ) -> Result<Invocation> {
        let bots = request.wire_targets(&self.config.trybot_suffix);
        let mut args: Vec<String> = Vec::new();

        let program = match kind {
            SubstrateKind::Centralized => {
                let changelist = request.changelist().ok_or_else(|| TryJobError::Dispatch {
                    diagnostic: "Subversion submission without a changelist".to_string(),
                })?;
                args.extend(["try".to_string(), changelist.to_string()]);
                self.config.gcl_program()
            }
            SubstrateKind::Distributed => {
                let endpoint = endpoint.ok_or_else(|| TryJobError::Dispatch {
                    diagnostic: "no trusted try server resolved for git submission".to_string(),
                })?;
                if let Some(changelist) = request.changelist() {
                    warn!(changelist = %changelist, "changelist ignored for git checkouts");
                }
                args.extend([
                    self.config.trychange_script(),
                    "--use_svn".to_string(),
                    "--svn_repo".to_string(),
                    endpoint.svn_url().to_string(),
                ]);
                self.config.python.clone()
            }
        };

        args.extend(["--root".to_string(), root.to_string(), "--bot".to_string(), bots]);
        if let Some(revision) = request.revision() {
            args.extend(["--revision".to_string(), revision.to_string()]);
        }

        Ok(Invocation::new(program, args, self.config.submit_timeout()))
    }

    /// Run the submission command.
    ///
    /// Never retried: a failure may still have registered a job remotely.
    pub async fn submit(
        &self,
        request: &TryRequest,
        kind: SubstrateKind,
        root: &str,
        endpoint: Option<&TryServerEndpoint>,
    ) -> Result<SubmissionReceipt> {
        let invocation = self.plan(request, kind, root, endpoint)?;
        let bots = request.wire_targets(&self.config.trybot_suffix);
        obs::emit_submission_started(kind, &bots, false);

        let start = Instant::now();
        let output = match self.runner.run(&invocation).await {
            Ok(output) => output,
            Err(e) => {
                let err = TryJobError::Dispatch {
                    diagnostic: e.to_string(),
                };
                obs::emit_submission_failed(kind, &err);
                return Err(err);
            }
        };

        if !output.success() {
            let err = TryJobError::Dispatch {
                diagnostic: output.diagnostic(),
            };
            obs::emit_submission_failed(kind, &err);
            return Err(err);
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        debug!(stdout = %output.stdout.trim(), "submission output");
        obs::emit_submission_finished(kind, duration_ms);

        Ok(SubmissionReceipt {
            substrate: kind,
            root: root.to_string(),
            bots,
            revision: request.revision(),
            program: invocation.program,
            args: invocation.args,
            stdout: output.stdout,
            duration_ms,
            submitted_at: Utc::now(),
            dry_run: false,
        })
    }

    /// Receipt describing what [`submit`](Self::submit) would run.
    pub fn dry_run(
        &self,
        request: &TryRequest,
        kind: SubstrateKind,
        root: &str,
        endpoint: Option<&TryServerEndpoint>,
    ) -> Result<SubmissionReceipt> {
        let invocation = self.plan(request, kind, root, endpoint)?;
        let bots = request.wire_targets(&self.config.trybot_suffix);
        obs::emit_submission_started(kind, &bots, true);

        Ok(SubmissionReceipt {
            substrate: kind,
            root: root.to_string(),
            bots,
            revision: request.revision(),
            program: invocation.program,
            args: invocation.args,
            stdout: String::new(),
            duration_ms: 0,
            submitted_at: Utc::now(),
            dry_run: true,
        })
    }
}
