//! tryjob core library
//!
//! Discovers the try builders a build master offers, validates a try
//! request against them, and submits it from either a Subversion or a git
//! checkout.
//!
//! ## Components
//!
//! - [`catalog`]: fresh builder catalog per invocation
//! - [`repo`]: checkout root and trusted try-server resolution
//! - [`validate`]: pure request validation
//! - [`dispatch`]: substrate-specific submission
//! - [`session`]: the fixed-order pipeline tying them together

pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod fakes;
pub mod obs;
pub mod process;
pub mod repo;
pub mod session;
pub mod telemetry;
pub mod validate;

pub use buildmaster_client::{BuildMasterClient, BuildMasterConfig, BuildMasterError};

pub use catalog::fetch_catalog;
pub use config::{TryConfig, TRYSERVER_SETTINGS_KEY};
pub use dispatch::DispatchClient;
pub use domain::{
    BuilderCatalog, BuilderName, Result, SubmissionReceipt, SubstrateKind, TryJobError,
    TryRequest, TryServerEndpoint, ValidationError, TRYBOT_SUFFIX,
};
pub use process::{CommandOutput, CommandRunner, Invocation, ProcessRunner, RunnerError};
pub use repo::RepoContext;
pub use session::{SubmitMode, TrySession};
pub use validate::{validate, validate_request, RawRequest, ALL_ALIAS, COMPILE_ALIAS};

pub use obs::{
    emit_catalog_fetched, emit_endpoint_resolved, emit_request_validated, emit_root_resolved,
    emit_submission_failed, emit_submission_finished, emit_submission_started, submit_span,
};
pub use telemetry::init_tracing;

/// tryjob version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
