//! Package descriptors as seen by the source sync engine.

use serde::{Deserialize, Serialize};

/// The slice of a package definition that source acquisition cares about.
///
/// A descriptor names the package, pins the exact VCS reference that must end
/// up checked out, and lists the candidate clone URLs in the order they should
/// be attempted. The preferred URL is the canonical one for the package and is
/// what remotes are pointed back at once a clone from any candidate succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDescriptor {
    /// Package name, e.g. `acme/widget`.
    pub name: String,
    /// Normalized version string, e.g. `1.0.0.0` or `dev-master`.
    pub version: String,
    /// Human-facing version string, e.g. `1.0.0` or `dev-master`.
    pub pretty_version: String,
    /// The exact reference (commit hash, tag or branch) to check out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_reference: Option<String>,
    /// Candidate clone URLs in attempt order. Mirrors come first, but the
    /// canonical URL stays the one in `source_url`.
    #[serde(default)]
    pub source_urls: Vec<String>,
    /// Canonical source URL when it differs from the first candidate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl PackageDescriptor {
    /// Creates a descriptor with the given name and normalized version.
    ///
    /// The pretty version defaults to the normalized version until overridden.
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        let version = version.into();
        Self {
            name: name.into(),
            pretty_version: version.clone(),
            version,
            source_reference: None,
            source_urls: Vec::new(),
            source_url: None,
        }
    }

    /// Sets the human-facing version string.
    #[must_use]
    pub fn with_pretty_version(mut self, pretty: impl Into<String>) -> Self {
        self.pretty_version = pretty.into();
        self
    }

    /// Sets the reference to check out after cloning.
    #[must_use]
    pub fn with_source_reference(mut self, reference: impl Into<String>) -> Self {
        self.source_reference = Some(reference.into());
        self
    }

    /// Sets the candidate clone URLs in attempt order.
    #[must_use]
    pub fn with_source_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source_urls = urls.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the canonical source URL explicitly.
    #[must_use]
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    /// The preferred URL for the package.
    ///
    /// Falls back to the first candidate URL when no canonical URL was set.
    #[must_use]
    pub fn preferred_source_url(&self) -> Option<&str> {
        self.source_url
            .as_deref()
            .or_else(|| self.source_urls.first().map(String::as_str))
    }
}
