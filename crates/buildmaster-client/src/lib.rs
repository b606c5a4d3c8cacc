//! Build-master client: builder listing and code-review settings over HTTP
//!
//! This crate is the transport layer for the try-job tooling. It knows how
//! to reach the build master's JSON API and the hosted `codereview.settings`
//! resource, and nothing about trybot naming or substrate rules; those live
//! in `tryjob-core`.
//!
//! Every request carries an explicit timeout taken from
//! [`BuildMasterConfig`], so a stalled coordination service can never hang
//! the caller.

pub mod client;
pub mod config;
pub mod error;
pub mod settings;

pub use client::{parse_builder_listing, BuildMasterClient};
pub use config::BuildMasterConfig;
pub use error::BuildMasterError;
pub use settings::CodeReviewSettings;

/// Result type for build-master operations
pub type Result<T> = std::result::Result<T, BuildMasterError>;
