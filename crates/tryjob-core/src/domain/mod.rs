//! Domain model for try-job dispatch.

pub mod builder;
pub mod error;
pub mod request;
pub mod substrate;

pub use builder::{BuilderCatalog, BuilderName, TRYBOT_SUFFIX};
pub use error::{Result, TryJobError, ValidationError};
pub use request::{SubmissionReceipt, TryRequest, TryServerEndpoint};
pub use substrate::SubstrateKind;
