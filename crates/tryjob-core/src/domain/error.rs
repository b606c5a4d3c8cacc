//! Error taxonomy for try-job dispatch.

/// Caller-input mistakes, detected before anything is submitted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("unknown builder(s): {}", names.join(", "))]
    UnknownBuilder { names: Vec<String> },

    #[error("no builders selected")]
    EmptyTargetSet,

    #[error("invalid revision {raw:?}: expected a non-negative integer")]
    InvalidRevision { raw: String },

    #[error("a changelist is required when submitting from a Subversion checkout")]
    MissingChangelist,

    #[error("invalid builder pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Try-job errors. All are terminal for the current invocation.
#[derive(Debug, thiserror::Error)]
pub enum TryJobError {
    #[error("builder catalog unreachable: {0}")]
    UnreachableCatalog(String),

    #[error("could not resolve checkout root: {0}")]
    RootResolution(String),

    #[error("could not resolve trusted try server: {0}")]
    EndpointResolution(String),

    #[error("invalid try request: {0}")]
    Validation(#[from] ValidationError),

    #[error("try job submission failed: {diagnostic}")]
    Dispatch { diagnostic: String },
}

impl TryJobError {
    pub fn is_validation(&self) -> bool {
        matches!(self, TryJobError::Validation(_))
    }

    /// Whether rerunning the same invocation could succeed.
    ///
    /// A `Dispatch` failure may have partially registered a job remotely, so
    /// callers should check the try server before resubmitting.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TryJobError::UnreachableCatalog(_)
                | TryJobError::EndpointResolution(_)
                | TryJobError::Dispatch { .. }
        )
    }
}

/// Result type for try-job operations.
pub type Result<T> = std::result::Result<T, TryJobError>;
