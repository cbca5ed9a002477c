//! The git downloader: clone, update and remove working copies.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use semver::Version;
use tracing::{debug, info};

use overture_core::{Config, Filesystem, LogReporter, PackageDescriptor, ProcessExecutor, Reporter};

use crate::cache::GitMirrorCache;
use crate::commands::{CommandBuilder, Shell};
use crate::error::{Result, VcsError};
use crate::fallback::{AttemptOutcome, try_each};
use crate::github::{GitHubUrl, protocol_variants};
use crate::version::GitVersionGate;

/// How a package lands on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallationSource {
    /// A VCS checkout of the package sources.
    Source,
    /// An extracted distribution archive.
    Dist,
}

impl InstallationSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Dist => "dist",
        }
    }
}

/// Acquires and synchronizes git working copies for packages.
///
/// All git interaction goes through shell command lines executed by the
/// process collaborator; compound chains let the shell short-circuit
/// multi-step operations. Candidate URLs are attempted in order, GitHub URLs
/// additionally cycle through the configured protocols, and clones borrow
/// objects from the local mirror cache when one is configured.
pub struct GitDownloader {
    config: Config,
    process: Arc<dyn ProcessExecutor>,
    reporter: Arc<dyn Reporter>,
    filesystem: Filesystem,
    commands: CommandBuilder,
    version_gate: GitVersionGate,
    is_floating: fn(&str) -> bool,
}

impl fmt::Debug for GitDownloader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitDownloader")
            .field("config", &self.config)
            .field("commands", &self.commands)
            .field("version_gate", &self.version_gate)
            .finish_non_exhaustive()
    }
}

impl GitDownloader {
    #[must_use]
    pub fn new(config: Config, process: Arc<dyn ProcessExecutor>) -> Self {
        Self {
            commands: CommandBuilder::new(Shell::current()),
            version_gate: GitVersionGate::new(),
            filesystem: Filesystem::new(),
            reporter: Arc::new(LogReporter),
            is_floating: default_is_floating,
            config,
            process,
        }
    }

    /// Routes advisory notices somewhere other than the log.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Forces a shell dialect instead of detecting the platform.
    #[must_use]
    pub fn with_shell(mut self, shell: Shell) -> Self {
        self.commands = CommandBuilder::new(shell);
        self
    }

    /// Replaces the predicate that decides whether a version string is a
    /// floating (branch-style) reference.
    #[must_use]
    pub fn with_floating_predicate(mut self, predicate: fn(&str) -> bool) -> Self {
        self.is_floating = predicate;
        self
    }

    /// The git version gate, exposed so callers can pin a version up front.
    #[must_use]
    pub fn version_gate(&self) -> &GitVersionGate {
        &self.version_gate
    }

    /// Packages acquired through this downloader are source checkouts.
    #[must_use]
    pub const fn installation_source(&self) -> InstallationSource {
        InstallationSource::Source
    }

    /// Clones `package` into `path` and checks out its pinned reference.
    ///
    /// Candidate URLs are attempted in order; the first one whose clone
    /// succeeds wins. After the clone the `origin` and `composer` remotes are
    /// pinned to the package's preferred URL, and for GitHub-style hosts the
    /// push URL is corrected according to the protocol preference.
    pub fn download(&self, package: &PackageDescriptor, path: &Path) -> Result<()> {
        let reference =
            package
                .source_reference
                .as_deref()
                .ok_or_else(|| VcsError::MissingSourceReference {
                    package: package.name.clone(),
                })?;
        if package.source_urls.is_empty() {
            return Err(VcsError::MissingSourceUrl {
                package: package.name.clone(),
            });
        }

        info!(package = %package.name, reference, path = %path.display(), "cloning");
        let winning = try_each(package.source_urls.iter(), |url| {
            self.clone_attempt(path, url, reference)
        })?;

        self.pin_remotes(package, path, &winning)?;
        self.update_to_reference(path, reference, &package.pretty_version)
    }

    /// Fetches new history into the checkout at `path` and moves it to the
    /// target's pinned reference.
    ///
    /// Refuses to touch a dirty tree. Warns (without aborting) when HEAD sits
    /// on a local branch no remote knows about. When the repository's remotes
    /// have drifted from the declared source URLs they are repointed at the
    /// preferred URL once the fetch succeeds.
    pub fn update(
        &self,
        initial: &PackageDescriptor,
        target: &PackageDescriptor,
        path: &Path,
    ) -> Result<()> {
        let reference =
            target
                .source_reference
                .as_deref()
                .ok_or_else(|| VcsError::MissingSourceReference {
                    package: target.name.clone(),
                })?;
        if target.source_urls.is_empty() {
            return Err(VcsError::MissingSourceUrl {
                package: target.name.clone(),
            });
        }
        if !path.join(".git").exists() {
            return Err(VcsError::NotRepository {
                path: path.to_path_buf(),
            });
        }

        self.warn_unpushed_commits(path);
        self.assert_clean(path)?;
        self.report_transition(initial, target);

        info!(package = %target.name, reference, "fetching and checking out");
        let mut repoint_origin = false;
        try_each(target.source_urls.iter(), |url| {
            self.fetch_attempt(target, path, url, reference, &mut repoint_origin)
        })?;

        self.update_to_reference(path, reference, &target.pretty_version)?;

        if repoint_origin {
            if let Some(preferred) = target.preferred_source_url() {
                self.update_origin_url(path, preferred)?;
            }
        }
        Ok(())
    }

    /// Deletes the working copy at `path`, refusing if it has uncommitted
    /// changes.
    pub fn remove(&self, package: &PackageDescriptor, path: &Path) -> Result<()> {
        info!(package = %package.name, path = %path.display(), "removing working copy");
        if path.join(".git").exists() {
            self.assert_clean(path)?;
        }
        if !self.filesystem.remove_directory(path) {
            return Err(VcsError::RemoveFailed {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }

    /// One candidate URL: try each protocol variant, cache-assisted when the
    /// mirror cache has the reference. Returns the candidate URL on success.
    fn clone_attempt(&self, path: &Path, url: &str, reference: &str) -> AttemptOutcome<String> {
        let target = path.display().to_string();
        let mut mirror = self.mirror_for(url, reference);
        let dissociate =
            mirror.is_some() && self.version_gate.supports_dissociate(self.process.as_ref());

        let mut failures = Vec::new();
        for candidate in protocol_variants(url, &self.config) {
            loop {
                let command = match &mirror {
                    Some(dir) => self.commands.clone_from_cache(
                        &dir.display().to_string(),
                        &target,
                        &candidate,
                        dissociate,
                    ),
                    None => self.commands.clone_direct(&candidate, &target),
                };
                debug!(command = %command, "cloning");
                match self.process.execute(&command, None, None) {
                    Ok(0) => return AttemptOutcome::Ok(url.to_owned()),
                    Ok(_) => {
                        failures.push(format!("{candidate}: {}", self.process.error_output()));
                        // A failed clone may leave a partial checkout behind.
                        self.filesystem.remove_directory(path);
                        if mirror.take().is_some() {
                            // A broken mirror must not block the direct path.
                            continue;
                        }
                        break;
                    }
                    Err(err) => return AttemptOutcome::Abort(err.into()),
                }
            }
        }
        AttemptOutcome::Failed(failures.join("\n"))
    }

    /// The mirror directory holding `reference` for `url`, when the cache is
    /// configured, the git version is known, and the mirror can be brought up
    /// to date. Anything else disables cache assistance for this attempt.
    fn mirror_for(&self, url: &str, reference: &str) -> Option<PathBuf> {
        let root = self.config.cache_dir()?;
        self.version_gate.version(self.process.as_ref())?;
        let cache = GitMirrorCache::new(root.to_path_buf(), self.commands, self.filesystem);
        cache.ensure_ref(self.process.as_ref(), url, reference)
    }

    /// One candidate URL of an update: reconcile remotes, then run the fetch
    /// chain per protocol variant.
    fn fetch_attempt(
        &self,
        target: &PackageDescriptor,
        path: &Path,
        url: &str,
        reference: &str,
        repoint_origin: &mut bool,
    ) -> AttemptOutcome<String> {
        let origin = match self.remote_url(path, "origin") {
            Ok(url) => url,
            Err(err) => return AttemptOutcome::Abort(err),
        };
        let composer = match self.remote_url(path, "composer") {
            Ok(url) => url,
            Err(err) => return AttemptOutcome::Abort(err),
        };
        let declared = |remote: &str| target.source_urls.iter().any(|s| s == remote);
        *repoint_origin = origin.as_deref().is_some_and(|u| !declared(u))
            || composer.as_deref().is_some_and(|u| !declared(u));

        let mut failures = Vec::new();
        for candidate in protocol_variants(url, &self.config) {
            let command = self.commands.fetch_ref(&candidate, reference);
            match self.process.execute(&command, None, Some(path)) {
                Ok(0) => return AttemptOutcome::Ok(url.to_owned()),
                Ok(_) => {
                    let stderr = self.process.error_output();
                    // A failed fetch can mean the remote is unreachable or
                    // that git itself is gone; probe before blaming the URL.
                    if !self.version_gate.probe(self.process.as_ref()) {
                        return AttemptOutcome::Abort(VcsError::GitNotFound);
                    }
                    failures.push(format!("{candidate}: {stderr}"));
                }
                Err(err) => return AttemptOutcome::Abort(err.into()),
            }
        }
        AttemptOutcome::Failed(failures.join("\n"))
    }

    /// Points remotes back at the preferred URL after a clone from `winning`.
    fn pin_remotes(
        &self,
        package: &PackageDescriptor,
        path: &Path,
        winning: &str,
    ) -> Result<()> {
        let Some(preferred) = package.preferred_source_url() else {
            return Ok(());
        };
        if winning == preferred {
            self.set_push_url(path, preferred)
        } else {
            self.update_origin_url(path, preferred)
        }
    }

    fn update_origin_url(&self, path: &Path, url: &str) -> Result<()> {
        self.run(&self.commands.remote_set_url("origin", url), Some(path))?;
        self.set_push_url(path, url)
    }

    /// For GitHub-style hosts, pushing goes over ssh unless the configuration
    /// allows https alone.
    fn set_push_url(&self, path: &Path, url: &str) -> Result<()> {
        if let Some(github) = GitHubUrl::parse(url, &self.config.github_domains) {
            let push_url = github.push_url(self.config.github_protocols());
            self.run(
                &self.commands.remote_set_push_url("origin", &push_url),
                Some(path),
            )?;
        }
        Ok(())
    }

    /// Moves the checkout at `path` to `reference`.
    ///
    /// Strategy order: a reference naming a known remote branch becomes a
    /// tracked local branch; a commit hash is checked out through the
    /// version-derived branch name so the tree does not end up on a detached
    /// HEAD needlessly; anything else falls back to a detached checkout plus
    /// hard reset.
    fn update_to_reference(
        &self,
        path: &Path,
        reference: &str,
        pretty_version: &str,
    ) -> Result<()> {
        let mut branches = String::new();
        match self.process.execute(
            self.commands.branch_remote(),
            Some(&mut branches),
            Some(path),
        ) {
            Ok(0) => {}
            Ok(_) => branches.clear(),
            Err(err) => return Err(err.into()),
        }

        let is_commit = reference.len() == 40 && reference.bytes().all(|b| b.is_ascii_hexdigit());

        if !is_commit && branch_listed(&branches, reference) {
            let branch = version_branch(pretty_version);
            let command = self
                .commands
                .checkout_branch_reset(&branch, &format!("composer/{reference}"));
            if self.try_run(&command, path)? {
                return Ok(());
            }
        }

        if is_commit {
            let mut branch = version_branch(pretty_version);
            if !branch_listed(&branches, &branch) && branch_listed(&branches, &format!("v{branch}"))
            {
                branch = format!("v{branch}");
            }
            let checked_out = self.try_run(&self.commands.checkout(&branch), path)?
                || self.try_run(
                    &self
                        .commands
                        .checkout_branch(&branch, &format!("composer/{branch}")),
                    path,
                )?;
            if checked_out && self.try_run(&self.commands.reset_hard(reference), path)? {
                return Ok(());
            }
        }

        if self.try_run(&self.commands.checkout_reset(reference), path)? {
            return Ok(());
        }
        Err(VcsError::CheckoutFailed {
            reference: reference.to_owned(),
            stderr: self.process.error_output(),
        })
    }

    /// The fetch URL of `remote`, read from `git remote -v`.
    fn remote_url(&self, path: &Path, remote: &str) -> Result<Option<String>> {
        let mut output = String::new();
        if self
            .process
            .execute(self.commands.remote_verbose(), Some(&mut output), Some(path))?
            != 0
        {
            return Ok(None);
        }
        for line in output.lines() {
            let mut fields = line.split_whitespace();
            if fields.next() == Some(remote) {
                if let (Some(url), Some("(fetch)")) = (fields.next(), fields.next()) {
                    return Ok(Some(url.to_owned()));
                }
            }
        }
        Ok(None)
    }

    /// Advisory only: points out a HEAD commit no remote-tracking ref shares.
    fn warn_unpushed_commits(&self, path: &Path) {
        let mut refs = String::new();
        match self
            .process
            .execute(self.commands.show_head_refs(), Some(&mut refs), Some(path))
        {
            Ok(0) => {}
            Ok(_) | Err(_) => return,
        }
        let Some(head) = refs
            .lines()
            .find_map(|line| line.strip_suffix(" HEAD").map(str::trim))
        else {
            return;
        };

        let mut local_branch = None;
        let mut shared_with_remote = false;
        for line in refs.lines() {
            let Some((sha, name)) = line.split_once(' ') else {
                continue;
            };
            if sha != head {
                continue;
            }
            if let Some(branch) = name.strip_prefix("refs/heads/") {
                local_branch = Some(branch.to_owned());
            }
            if name.starts_with("refs/remotes/") {
                shared_with_remote = true;
            }
        }

        if let Some(branch) = local_branch {
            if !shared_with_remote {
                self.reporter.notice(&format!(
                    "The local branch '{branch}' is not on any remote; changes on it may be lost"
                ));
            }
        }
    }

    /// Errors out when the tree at `path` has uncommitted tracked changes.
    fn assert_clean(&self, path: &Path) -> Result<()> {
        let mut status = String::new();
        let command = self.commands.status_porcelain();
        if self
            .process
            .execute(command, Some(&mut status), Some(path))?
            != 0
        {
            return Err(VcsError::command_failed(command, self.process.error_output()));
        }
        if !status.trim().is_empty() {
            return Err(VcsError::LocalChanges {
                path: path.to_path_buf(),
                details: status.trim_end().to_owned(),
            });
        }
        Ok(())
    }

    /// Announces the version transition, calling out real downgrades.
    fn report_transition(&self, initial: &PackageDescriptor, target: &PackageDescriptor) {
        let action = if self.is_downgrade(&initial.version, &target.version) {
            "Downgrading"
        } else {
            "Updating"
        };
        self.reporter.notice(&format!(
            "{action} {} ({} => {})",
            target.name, initial.pretty_version, target.pretty_version
        ));
    }

    /// A downgrade needs two fixed versions with the target strictly older.
    /// Floating references never count; there is no order between branch
    /// heads.
    fn is_downgrade(&self, from: &str, to: &str) -> bool {
        if from == to || (self.is_floating)(from) || (self.is_floating)(to) {
            return false;
        }
        match (normalized_semver(from), normalized_semver(to)) {
            (Some(from), Some(to)) => to < from,
            _ => false,
        }
    }

    fn run(&self, command: &str, cwd: Option<&Path>) -> Result<()> {
        if self.process.execute(command, None, cwd)? != 0 {
            return Err(VcsError::command_failed(command, self.process.error_output()));
        }
        Ok(())
    }

    fn try_run(&self, command: &str, cwd: &Path) -> Result<bool> {
        Ok(self.process.execute(command, None, Some(cwd))? == 0)
    }
}

/// Whether `git branch -r` listed `composer/<name>`.
fn branch_listed(branches: &str, name: &str) -> bool {
    let wanted = format!("composer/{name}");
    branches.lines().any(|line| line.trim() == wanted)
}

/// Derives a local branch name from a pretty version: `dev-master` becomes
/// `master`, `2.2.x-dev` becomes `2.2`, fixed versions pass through.
fn version_branch(pretty_version: &str) -> String {
    let lower = pretty_version.to_ascii_lowercase();
    if let Some(rest) = lower.strip_prefix("dev-") {
        return pretty_version[pretty_version.len() - rest.len()..].to_owned();
    }
    if lower.ends_with(".x-dev") {
        return pretty_version[..pretty_version.len() - 6].to_owned();
    }
    if lower.ends_with("-dev") {
        return pretty_version[..pretty_version.len() - 4].to_owned();
    }
    pretty_version.to_owned()
}

/// Branch-style references: `dev-` prefixed or `-dev` suffixed.
fn default_is_floating(version: &str) -> bool {
    version.starts_with("dev-") || version.ends_with("-dev")
}

/// Parses a normalized version like `1.2.0.0` down to its first three
/// components. Non-numeric components disqualify the comparison.
fn normalized_semver(version: &str) -> Option<Version> {
    let version = version.trim_start_matches('v');
    let mut parts = [0u64; 3];
    for (index, piece) in version.split('.').enumerate() {
        if index >= 3 {
            break;
        }
        parts[index] = piece.parse().ok()?;
    }
    Some(Version::new(parts[0], parts[1], parts[2]))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn version_branch_strips_floating_markers() {
        assert_eq!(version_branch("dev-master"), "master");
        assert_eq!(version_branch("2.2.x-dev"), "2.2");
        assert_eq!(version_branch("feature-dev"), "feature");
        assert_eq!(version_branch("1.0.0"), "1.0.0");
    }

    #[test]
    fn floating_detection_covers_both_markers() {
        assert!(default_is_floating("dev-master"));
        assert!(default_is_floating("1.x-dev"));
        assert!(!default_is_floating("1.0.0.0"));
    }

    #[test]
    fn normalized_versions_compare_on_three_components() {
        assert_eq!(normalized_semver("1.2.0.0"), Some(Version::new(1, 2, 0)));
        assert_eq!(normalized_semver("v2.0.1"), Some(Version::new(2, 0, 1)));
        assert_eq!(normalized_semver("dev-master"), None);
    }

    #[test]
    fn branch_listing_matches_exact_remote_names() {
        let branches = "  composer/1.0\n  composer/master\n  origin/master\n";
        assert!(branch_listed(branches, "1.0"));
        assert!(branch_listed(branches, "master"));
        assert!(!branch_listed(branches, "2.0"));
    }

    #[test]
    fn installation_source_is_source() {
        assert_eq!(InstallationSource::Source.as_str(), "source");
        assert_eq!(InstallationSource::Dist.as_str(), "dist");
    }
}
