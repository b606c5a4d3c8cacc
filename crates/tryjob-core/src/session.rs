//! End-to-end try-job pipeline.
//!
//! Runs the fixed sequence detect → catalog → root → validate → endpoint →
//! submit, each step awaited to completion before the next starts. Any
//! failure aborts the remaining steps; validation failures in particular
//! abort before anything is submitted.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use buildmaster_client::BuildMasterClient;
use tracing::{info, Instrument};

use crate::catalog::fetch_catalog;
use crate::config::TryConfig;
use crate::dispatch::DispatchClient;
use crate::domain::{BuilderCatalog, Result, SubmissionReceipt, SubstrateKind, TryJobError};
use crate::obs;
use crate::process::CommandRunner;
use crate::repo::RepoContext;
use crate::validate::{validate_request, RawRequest};

/// Whether the final step actually runs the submission command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitMode {
    #[default]
    Submit,
    DryRun,
}

pub struct TrySession {
    config: TryConfig,
    client: BuildMasterClient,
    repo: RepoContext,
    dispatch: DispatchClient,
}

impl TrySession {
    /// Build a session for the checkout at `checkout`, detecting its substrate.
    pub fn new(
        config: TryConfig,
        runner: Arc<dyn CommandRunner>,
        checkout: impl Into<PathBuf>,
    ) -> Result<Self> {
        let checkout = checkout.into();
        let client = BuildMasterClient::new(config.buildmaster.clone())
            .map_err(|e| TryJobError::UnreachableCatalog(e.to_string()))?;
        let repo = RepoContext::detect(&checkout, runner.clone(), &config);
        let dispatch = DispatchClient::new(runner, &config);

        Ok(TrySession {
            config,
            client,
            repo,
            dispatch,
        })
    }

    pub fn substrate(&self) -> SubstrateKind {
        self.repo.kind()
    }

    pub fn checkout(&self) -> &Path {
        self.repo.checkout()
    }

    pub fn config(&self) -> &TryConfig {
        &self.config
    }

    pub async fn fetch_catalog(&self) -> Result<BuilderCatalog> {
        fetch_catalog(&self.client, &self.config.trybot_suffix).await
    }

    /// Run the whole pipeline for `raw`.
    pub async fn run(&self, raw: &RawRequest, mode: SubmitMode) -> Result<SubmissionReceipt> {
        let span = obs::submit_span(self.repo.kind());
        self.run_steps(raw, mode).instrument(span).await
    }

    async fn run_steps(&self, raw: &RawRequest, mode: SubmitMode) -> Result<SubmissionReceipt> {
        let kind = self.repo.kind();

        let catalog = self.fetch_catalog().await?;
        let root = self.repo.resolve_root().await?;

        let request = validate_request(raw, &catalog, kind)?;
        obs::emit_request_validated(request.targets().len(), request.revision());

        let endpoint = match kind {
            SubstrateKind::Distributed => {
                Some(self.repo.resolve_trusted_endpoint(&self.client).await?)
            }
            SubstrateKind::Centralized => None,
        };

        match mode {
            SubmitMode::Submit => {
                let receipt = self
                    .dispatch
                    .submit(&request, kind, &root, endpoint.as_ref())
                    .await?;
                info!(bots = %receipt.bots, "try job submitted");
                Ok(receipt)
            }
            SubmitMode::DryRun => self
                .dispatch
                .dry_run(&request, kind, &root, endpoint.as_ref()),
        }
    }
}
