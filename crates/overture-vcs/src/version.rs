//! Installed git version detection.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use semver::Version;

use overture_core::ProcessExecutor;

static VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)(?:\.(\d+))?(?:\.(\d+))?").expect("valid version pattern"));

/// `git clone --dissociate` appeared in this release.
static MIN_DISSOCIATE: Lazy<Version> = Lazy::new(|| Version::new(2, 3, 0));

/// Detects the installed git version once and answers feature gates from it.
///
/// The first query shells out to `git --version`; the result is memoized for
/// the lifetime of the gate. [`set_version`](Self::set_version) overrides the
/// memo, which tests use to pin a version without a process round-trip.
#[derive(Debug, Default)]
pub struct GitVersionGate {
    cached: Mutex<Option<Version>>,
}

impl GitVersionGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The installed git version, or `None` when git is unavailable or its
    /// banner is unparseable.
    pub fn version(&self, process: &dyn ProcessExecutor) -> Option<Version> {
        if let Some(version) = self.cached.lock().clone() {
            return Some(version);
        }
        let version = Self::query(process)?;
        *self.cached.lock() = Some(version.clone());
        Some(version)
    }

    /// Overrides the memoized version.
    pub fn set_version(&self, version: Option<Version>) {
        *self.cached.lock() = version;
    }

    /// Re-runs `git --version` ignoring the memo.
    ///
    /// Used after a failed fetch to tell a broken remote apart from git
    /// itself having vanished from PATH.
    pub fn probe(&self, process: &dyn ProcessExecutor) -> bool {
        let mut banner = String::new();
        matches!(
            process.execute("git --version", Some(&mut banner), None),
            Ok(0)
        )
    }

    /// Whether `git clone --dissociate` is available.
    pub fn supports_dissociate(&self, process: &dyn ProcessExecutor) -> bool {
        self.version(process)
            .is_some_and(|version| version >= *MIN_DISSOCIATE)
    }

    fn query(process: &dyn ProcessExecutor) -> Option<Version> {
        let mut banner = String::new();
        match process.execute("git --version", Some(&mut banner), None) {
            Ok(0) => parse_version_banner(&banner),
            Ok(_) | Err(_) => None,
        }
    }
}

/// Parses the version out of a `git --version` banner.
///
/// Accepts partial versions (`git version 2.31`) and vendor suffixes
/// (`2.39.2 (Apple Git-143)`), padding missing components with zero.
#[must_use]
pub fn parse_version_banner(banner: &str) -> Option<Version> {
    let captures = VERSION_RE.captures(banner)?;
    let component = |index: usize| {
        captures
            .get(index)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    };
    Some(Version::new(
        captures.get(1)?.as_str().parse().ok()?,
        component(2),
        component(3),
    ))
}
