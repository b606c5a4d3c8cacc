//! Validated try requests and submission results.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

use super::builder::BuilderName;
use super::substrate::SubstrateKind;

/// A validated unit of work, ready for dispatch.
///
/// Only the validator constructs these, so holding one means: targets are
/// non-empty catalog members, the revision parsed, and a changelist is
/// present when the substrate needs one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TryRequest {
    targets: BTreeSet<BuilderName>,
    revision: Option<u64>,
    changelist: Option<String>,
}

impl TryRequest {
    pub(crate) fn new(
        targets: BTreeSet<BuilderName>,
        revision: Option<u64>,
        changelist: Option<String>,
    ) -> Self {
        debug_assert!(!targets.is_empty());
        TryRequest {
            targets,
            revision,
            changelist,
        }
    }

    pub fn targets(&self) -> &BTreeSet<BuilderName> {
        &self.targets
    }

    pub fn revision(&self) -> Option<u64> {
        self.revision
    }

    pub fn changelist(&self) -> Option<&str> {
        self.changelist.as_deref()
    }

    /// Comma-joined target list, each name carrying exactly one `suffix`.
    pub fn wire_targets(&self, suffix: &str) -> String {
        self.targets
            .iter()
            .map(|t| t.wire_name(suffix))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Trusted try-server repository that git checkouts submit through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TryServerEndpoint {
    svn_url: String,
}

impl TryServerEndpoint {
    pub fn new(svn_url: impl Into<String>) -> Self {
        TryServerEndpoint {
            svn_url: svn_url.into(),
        }
    }

    pub fn svn_url(&self) -> &str {
        &self.svn_url
    }
}

/// Record of a submission (or of what a dry run would have submitted).
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReceipt {
    pub substrate: SubstrateKind,
    pub root: String,
    /// Wire-form target list passed to the submission command
    pub bots: String,
    pub revision: Option<u64>,
    pub program: String,
    pub args: Vec<String>,
    pub stdout: String,
    pub duration_ms: u64,
    pub submitted_at: DateTime<Utc>,
    pub dry_run: bool,
}

impl SubmissionReceipt {
    /// Shell-style rendering of the submission command.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
