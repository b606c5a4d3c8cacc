//! Try request validation.
//!
//! Pure: no I/O. A rejected request is rejected whole, so nothing from it
//! reaches the dispatcher.

use regex::Regex;
use std::collections::BTreeSet;

use crate::domain::{BuilderCatalog, BuilderName, SubstrateKind, TryRequest, ValidationError};

/// Expands to every builder in the catalog.
pub const ALL_ALIAS: &str = "all";

/// Expands to every builder whose name contains [`COMPILE_MARKER`].
pub const COMPILE_ALIAS: &str = "compile";

pub const COMPILE_MARKER: &str = "Compile";

/// Unvalidated caller intent, as it arrives from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRequest {
    /// Builder names or aliases; entries may be comma-separated lists
    pub targets: Vec<String>,
    /// Optional regular expression selecting additional builders
    pub pattern: Option<String>,
    pub revision: Option<String>,
    pub changelist: Option<String>,
}

/// Validate targets, revision and changelist against `catalog` and `kind`.
pub fn validate(
    raw_targets: &[String],
    raw_revision: Option<&str>,
    changelist: Option<&str>,
    catalog: &BuilderCatalog,
    kind: SubstrateKind,
) -> Result<TryRequest, ValidationError> {
    let raw = RawRequest {
        targets: raw_targets.to_vec(),
        pattern: None,
        revision: raw_revision.map(str::to_string),
        changelist: changelist.map(str::to_string),
    };
    validate_request(&raw, catalog, kind)
}

/// Validate a [`RawRequest`], including its optional builder pattern.
///
/// Checks run in a fixed order: targets (unknown names, then emptiness),
/// revision, changelist. The first failing check decides the error.
pub fn validate_request(
    raw: &RawRequest,
    catalog: &BuilderCatalog,
    kind: SubstrateKind,
) -> Result<TryRequest, ValidationError> {
    let targets = select_targets(raw, catalog)?;
    let revision = parse_revision(raw.revision.as_deref())?;

    let changelist = raw
        .changelist
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string);
    if kind.requires_changelist() && changelist.is_none() {
        return Err(ValidationError::MissingChangelist);
    }

    Ok(TryRequest::new(targets, revision, changelist))
}

fn select_targets(
    raw: &RawRequest,
    catalog: &BuilderCatalog,
) -> Result<BTreeSet<BuilderName>, ValidationError> {
    let mut selected = BTreeSet::new();
    let mut unknown: Vec<String> = Vec::new();

    let names = raw
        .targets
        .iter()
        .flat_map(|entry| entry.split(','))
        .map(str::trim)
        .filter(|name| !name.is_empty());

    for name in names {
        match name {
            ALL_ALIAS => selected.extend(catalog.iter().cloned()),
            COMPILE_ALIAS => selected.extend(
                catalog
                    .iter()
                    .filter(|b| b.as_str().contains(COMPILE_MARKER))
                    .cloned(),
            ),
            name => match catalog.get(name) {
                Some(builder) => {
                    selected.insert(builder.clone());
                }
                None => {
                    if !unknown.iter().any(|u| u == name) {
                        unknown.push(name.to_string());
                    }
                }
            },
        }
    }

    if let Some(pattern) = raw.pattern.as_deref() {
        let re = Regex::new(pattern).map_err(|e| ValidationError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        selected.extend(catalog.iter().filter(|b| re.is_match(b.as_str())).cloned());
    }

    if !unknown.is_empty() {
        return Err(ValidationError::UnknownBuilder { names: unknown });
    }
    if selected.is_empty() {
        return Err(ValidationError::EmptyTargetSet);
    }
    Ok(selected)
}

fn parse_revision(raw: Option<&str>) -> Result<Option<u64>, ValidationError> {
    raw.map(|r| {
        r.trim()
            .parse::<u64>()
            .map_err(|_| ValidationError::InvalidRevision { raw: r.to_string() })
    })
    .transpose()
}
