//! Builder names and the per-invocation builder catalog.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;

/// Every try builder on the build master carries this suffix.
pub const TRYBOT_SUFFIX: &str = "_Trybot";

/// A try-job target, stored without its trybot suffix.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuilderName(String);

impl BuilderName {
    pub fn new(name: impl Into<String>) -> Self {
        BuilderName(name.into())
    }

    /// Strip exactly one `suffix` from a listed builder name.
    ///
    /// Returns `None` for names that do not end in the suffix, or that are
    /// nothing but the suffix.
    pub fn from_listed(listed: &str, suffix: &str) -> Option<Self> {
        listed
            .strip_suffix(suffix)
            .filter(|stem| !stem.is_empty())
            .map(BuilderName::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name as the try server expects it: with exactly one trailing suffix.
    pub fn wire_name(&self, suffix: &str) -> String {
        format!("{}{}", self.0, suffix)
    }
}

// Derived Ord compares the inner String, as str does.
impl Borrow<str> for BuilderName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BuilderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable snapshot of the try builders available for this invocation.
///
/// Ordered, so every expansion and wire serialization is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuilderCatalog {
    builders: BTreeSet<BuilderName>,
}

impl BuilderCatalog {
    pub fn new<I>(builders: I) -> Self
    where
        I: IntoIterator<Item = BuilderName>,
    {
        BuilderCatalog {
            builders: builders.into_iter().collect(),
        }
    }

    /// Build a catalog from a raw build-master listing.
    ///
    /// Only names ending in `suffix` are retained, with the suffix stripped.
    pub fn from_listing<I, S>(listing: I, suffix: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(
            listing
                .into_iter()
                .filter_map(|name| BuilderName::from_listed(name.as_ref(), suffix)),
        )
    }

    /// Look up a builder by its suffix-less name.
    pub fn get(&self, name: &str) -> Option<&BuilderName> {
        self.builders.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BuilderName> {
        self.builders.iter()
    }

    pub fn len(&self) -> usize {
        self.builders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }
}
