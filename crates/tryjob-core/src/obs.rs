//! Structured lifecycle events for a try-job submission.
//!
//! Each step of the pipeline emits one `event = "..."` record so a JSON log
//! of an invocation reads as a timeline: catalog, root, validation,
//! endpoint, submission.

use tracing::{info, warn, Span};

use crate::domain::SubstrateKind;

/// Submission-scoped span, tagged with the substrate.
///
/// ```ignore
/// pipeline.instrument(submit_span(SubstrateKind::Distributed)).await
/// // every event inside is tagged with substrate = "git"
/// ```
pub fn submit_span(substrate: SubstrateKind) -> Span {
    tracing::info_span!("tryjob.submit", substrate = %substrate)
}

/// Emit event: builder listing fetched and filtered.
pub fn emit_catalog_fetched(url: &str, listed: usize, retained: usize) {
    info!(event = "catalog.fetched", url = %url, listed = listed, retained = retained);
}

pub fn emit_root_resolved(substrate: SubstrateKind, root: &str) {
    info!(event = "root.resolved", substrate = %substrate, root = %root);
}

pub fn emit_request_validated(targets: usize, revision: Option<u64>) {
    info!(event = "request.validated", targets = targets, revision = ?revision);
}

pub fn emit_endpoint_resolved(url: &str) {
    info!(event = "endpoint.resolved", url = %url);
}

pub fn emit_submission_started(substrate: SubstrateKind, bots: &str, dry_run: bool) {
    info!(event = "submission.started", substrate = %substrate, bots = %bots, dry_run = dry_run);
}

pub fn emit_submission_finished(substrate: SubstrateKind, duration_ms: u64) {
    info!(event = "submission.finished", substrate = %substrate, duration_ms = duration_ms);
}

/// Emit event: submission failed (warning level).
pub fn emit_submission_failed(substrate: SubstrateKind, error: &dyn std::fmt::Display) {
    warn!(event = "submission.failed", substrate = %substrate, error = %error);
}
