//! Process-wide try-job configuration.
//!
//! Built once at startup (environment first, CLI overrides second) and
//! passed by reference to every component. Nothing in the core reads the
//! environment after this point.

use buildmaster_client::BuildMasterConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::domain::TRYBOT_SUFFIX;

/// Settings key naming the trusted try-server repository.
pub const TRYSERVER_SETTINGS_KEY: &str = "TRYSERVER_SVN_URL";

const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 60;
const DEFAULT_SUBMIT_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TryConfig {
    /// Build master and settings resource locations
    pub buildmaster: BuildMasterConfig,
    /// Suffix every try builder carries on the build master
    pub trybot_suffix: String,
    /// Key of the trusted try-server line in `codereview.settings`
    pub settings_key: String,
    /// depot_tools checkout providing `gcl` and `trychange.py`
    pub depot_tools: Option<PathBuf>,
    /// Interpreter used to run `trychange.py`
    pub python: String,
    /// Timeout for `svn info` / `git rev-parse`
    pub query_timeout_secs: u64,
    /// Timeout for the submission command
    pub submit_timeout_secs: u64,
}

impl Default for TryConfig {
    fn default() -> Self {
        TryConfig {
            buildmaster: BuildMasterConfig::default(),
            trybot_suffix: TRYBOT_SUFFIX.to_string(),
            settings_key: TRYSERVER_SETTINGS_KEY.to_string(),
            depot_tools: None,
            python: "python".to_string(),
            query_timeout_secs: DEFAULT_QUERY_TIMEOUT_SECS,
            submit_timeout_secs: DEFAULT_SUBMIT_TIMEOUT_SECS,
        }
    }
}

impl TryConfig {
    /// Read `DEPOT_TOOLS`, `TRYJOB_PYTHON`, `TRYJOB_QUERY_TIMEOUT_SECS`,
    /// `TRYJOB_SUBMIT_TIMEOUT_SECS` and the build-master variables.
    pub fn from_env() -> Self {
        TryConfig {
            buildmaster: BuildMasterConfig::from_env(),
            depot_tools: std::env::var_os("DEPOT_TOOLS")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            python: std::env::var("TRYJOB_PYTHON").unwrap_or_else(|_| "python".to_string()),
            query_timeout_secs: secs_from_env(
                "TRYJOB_QUERY_TIMEOUT_SECS",
                DEFAULT_QUERY_TIMEOUT_SECS,
            ),
            submit_timeout_secs: secs_from_env(
                "TRYJOB_SUBMIT_TIMEOUT_SECS",
                DEFAULT_SUBMIT_TIMEOUT_SECS,
            ),
            ..Self::default()
        }
    }

    pub fn with_buildmaster(mut self, buildmaster: BuildMasterConfig) -> Self {
        self.buildmaster = buildmaster;
        self
    }

    pub fn with_depot_tools(mut self, path: impl Into<PathBuf>) -> Self {
        self.depot_tools = Some(path.into());
        self
    }

    pub fn with_python(mut self, python: impl Into<String>) -> Self {
        self.python = python.into();
        self
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn with_submit_timeout(mut self, timeout: Duration) -> Self {
        self.submit_timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    pub fn submit_timeout(&self) -> Duration {
        Duration::from_secs(self.submit_timeout_secs)
    }

    /// `gcl` launcher, inside depot_tools when configured.
    pub fn gcl_program(&self) -> String {
        let name = if cfg!(windows) { "gcl.bat" } else { "gcl" };
        self.depot_tool(name)
    }

    /// Path of `trychange.py`, inside depot_tools when configured.
    pub fn trychange_script(&self) -> String {
        self.depot_tool("trychange.py")
    }

    fn depot_tool(&self, name: &str) -> String {
        match &self.depot_tools {
            Some(dir) => join_display(dir, name),
            None => name.to_string(),
        }
    }
}

fn secs_from_env(var: &str, default: u64) -> u64 {
    match std::env::var(var) {
        Ok(raw) => parse_timeout_secs(&raw).unwrap_or_else(|| {
            warn!(value = %raw, "ignoring invalid {}, using {}s", var, default);
            default
        }),
        Err(_) => default,
    }
}

/// Positive whole seconds, or `None`.
fn parse_timeout_secs(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|secs| *secs > 0)
}

fn join_display(dir: &Path, name: &str) -> String {
    dir.join(name).to_string_lossy().into_owned()
}
