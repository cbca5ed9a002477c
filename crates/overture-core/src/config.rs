//! User configuration consumed by the source sync engine.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Protocol preference for GitHub-style hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GitProtocol {
    /// `https://` fetch URLs.
    Https,
    /// `git@host:path` fetch URLs.
    Ssh,
    /// Legacy `git://` hosts; fetched over ssh as well.
    Git,
}

impl GitProtocol {
    /// The protocol name as it appears in configuration files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Https => "https",
            Self::Ssh => "ssh",
            Self::Git => "git",
        }
    }
}

const DEFAULT_GITHUB_PROTOCOLS: [GitProtocol; 3] =
    [GitProtocol::Https, GitProtocol::Ssh, GitProtocol::Git];

/// Configuration knobs that influence source acquisition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Root directory for bare mirror clones. Unset or empty disables the
    /// mirror cache entirely.
    pub cache_vcs_dir: Option<PathBuf>,
    /// GitHub protocol preference, in attempt order.
    pub github_protocols: Vec<GitProtocol>,
    /// Hosts treated as GitHub-style for protocol rewriting.
    pub github_domains: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_vcs_dir: None,
            github_protocols: DEFAULT_GITHUB_PROTOCOLS.to_vec(),
            github_domains: vec!["github.com".to_owned()],
        }
    }
}

impl Config {
    /// The mirror cache root, if caching is enabled.
    ///
    /// An empty path counts as disabled, matching an empty string in a
    /// configuration file.
    #[must_use]
    pub fn cache_dir(&self) -> Option<&Path> {
        self.cache_vcs_dir
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }

    /// The GitHub protocol preference, in attempt order.
    ///
    /// An empty list in a configuration file falls back to the default
    /// order rather than disabling GitHub URLs outright.
    #[must_use]
    pub fn github_protocols(&self) -> &[GitProtocol] {
        if self.github_protocols.is_empty() {
            &DEFAULT_GITHUB_PROTOCOLS
        } else {
            &self.github_protocols
        }
    }

    /// Sets the mirror cache root.
    #[must_use]
    pub fn with_cache_vcs_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_vcs_dir = Some(dir.into());
        self
    }

    /// Sets the GitHub protocol preference.
    #[must_use]
    pub fn with_github_protocols(mut self, protocols: impl Into<Vec<GitProtocol>>) -> Self {
        self.github_protocols = protocols.into();
        self
    }
}
