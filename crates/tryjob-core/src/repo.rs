//! Checkout identity and trusted try-server resolution.
//!
//! Both substrates answer the same two questions, what the checkout's root
//! label is and where the trusted try server lives, through different
//! commands and outputs. `RepoContext` hides that difference from the
//! validator and the dispatcher.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use buildmaster_client::BuildMasterClient;
use tracing::debug;

use crate::config::TryConfig;
use crate::domain::{Result, SubstrateKind, TryJobError, TryServerEndpoint};
use crate::obs;
use crate::process::{CommandRunner, Invocation};

/// Root label of a Subversion checkout of the repository top.
pub const SVN_TOP_ROOT: &str = "svn";

const REPO_ROOT_PREFIX: &str = "Repository Root: ";
const URL_PREFIX: &str = "URL: ";

pub struct RepoContext {
    kind: SubstrateKind,
    checkout: PathBuf,
    runner: Arc<dyn CommandRunner>,
    settings_key: String,
    query_timeout: Duration,
}

impl RepoContext {
    /// Detect the substrate of `checkout` and build a context for it.
    pub fn detect(checkout: &Path, runner: Arc<dyn CommandRunner>, config: &TryConfig) -> Self {
        let kind = SubstrateKind::detect(checkout);
        debug!(substrate = %kind, checkout = %checkout.display(), "substrate detected");
        Self::new(kind, checkout, runner, config)
    }

    pub fn new(
        kind: SubstrateKind,
        checkout: &Path,
        runner: Arc<dyn CommandRunner>,
        config: &TryConfig,
    ) -> Self {
        RepoContext {
            kind,
            checkout: checkout.to_path_buf(),
            runner,
            settings_key: config.settings_key.clone(),
            query_timeout: config.query_timeout(),
        }
    }

    pub fn kind(&self) -> SubstrateKind {
        self.kind
    }

    pub fn checkout(&self) -> &Path {
        &self.checkout
    }

    /// Logical root label of the checkout.
    ///
    /// Subversion: `"svn"` at the repository top, otherwise the URL path
    /// below the repository root. git: base name of the work-tree top.
    pub async fn resolve_root(&self) -> Result<String> {
        let root = match self.kind {
            SubstrateKind::Centralized => {
                let info = self.query("svn", &["info"]).await?;
                svn_checkout_root(&info)?
            }
            SubstrateKind::Distributed => {
                let toplevel = self.query("git", &["rev-parse", "--show-toplevel"]).await?;
                git_checkout_root(&toplevel)?
            }
        };
        obs::emit_root_resolved(self.kind, &root);
        Ok(root)
    }

    /// Trusted try-server endpoint from the hosted `codereview.settings`.
    ///
    /// There is no default endpoint. Any fetch failure or a missing key is
    /// an `EndpointResolution` error.
    pub async fn resolve_trusted_endpoint(
        &self,
        client: &BuildMasterClient,
    ) -> Result<TryServerEndpoint> {
        let settings = client
            .fetch_settings()
            .await
            .map_err(|e| TryJobError::EndpointResolution(e.to_string()))?;

        let url = settings.get(&self.settings_key).ok_or_else(|| {
            TryJobError::EndpointResolution(format!(
                "{} not found in {}",
                self.settings_key,
                client.config().settings_url
            ))
        })?;

        obs::emit_endpoint_resolved(url);
        Ok(TryServerEndpoint::new(url))
    }

    async fn query(&self, program: &str, args: &[&str]) -> Result<String> {
        let invocation = Invocation::new(program, args.iter().copied(), self.query_timeout)
            .in_dir(&self.checkout);

        let output = self
            .runner
            .run(&invocation)
            .await
            .map_err(|e| TryJobError::RootResolution(e.to_string()))?;

        if !output.success() {
            return Err(TryJobError::RootResolution(format!(
                "{} {} failed: {}",
                program,
                args.join(" "),
                output.diagnostic()
            )));
        }
        Ok(output.stdout)
    }
}

/// Derive the root label from `svn info` output.
pub fn svn_checkout_root(info: &str) -> Result<String> {
    let mut repo_root = None;
    let mut url = None;
    for line in info.lines() {
        if let Some(value) = line.strip_prefix(REPO_ROOT_PREFIX) {
            repo_root = repo_root.or(Some(value.trim()));
        } else if let Some(value) = line.strip_prefix(URL_PREFIX) {
            url = url.or(Some(value.trim()));
        }
    }

    let repo_root = repo_root.ok_or_else(|| {
        TryJobError::RootResolution("svn info output has no Repository Root".to_string())
    })?;
    let url =
        url.ok_or_else(|| TryJobError::RootResolution("svn info output has no URL".to_string()))?;

    if url == repo_root {
        return Ok(SVN_TOP_ROOT.to_string());
    }

    let relative = url
        .strip_prefix(repo_root)
        .filter(|rest| rest.starts_with('/'))
        .map(|rest| rest.trim_matches('/'))
        .ok_or_else(|| {
            TryJobError::RootResolution(format!(
                "URL {url} is not under repository root {repo_root}"
            ))
        })?;

    if relative.is_empty() {
        Ok(SVN_TOP_ROOT.to_string())
    } else {
        Ok(relative.to_string())
    }
}

/// Derive the root label from `git rev-parse --show-toplevel` output.
pub fn git_checkout_root(toplevel: &str) -> Result<String> {
    let toplevel = toplevel.trim();
    Path::new(toplevel)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            TryJobError::RootResolution(format!("cannot take base name of {toplevel:?}"))
        })
}
