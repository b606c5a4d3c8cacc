//! Version-control substrate of the local checkout.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Directory whose presence marks a Subversion working copy.
pub const SVN_MARKER_DIR: &str = ".svn";

/// Which version-control system governs root resolution and submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubstrateKind {
    /// Subversion: changelist-based, submits through `gcl try`.
    Centralized,
    /// git: submits through `trychange.py` against the SVN try server.
    Distributed,
}

impl SubstrateKind {
    /// Inspect `dir` for substrate markers.
    ///
    /// A `.svn` directory means Centralized; anything else is treated as a
    /// git checkout, which root resolution then verifies.
    pub fn detect(dir: &Path) -> Self {
        if dir.join(SVN_MARKER_DIR).is_dir() {
            SubstrateKind::Centralized
        } else {
            SubstrateKind::Distributed
        }
    }

    pub fn requires_changelist(self) -> bool {
        matches!(self, SubstrateKind::Centralized)
    }

    pub fn vcs_name(self) -> &'static str {
        match self {
            SubstrateKind::Centralized => "svn",
            SubstrateKind::Distributed => "git",
        }
    }
}

impl fmt::Display for SubstrateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.vcs_name())
    }
}
