//! Local mirror cache for git clones.
//!
//! Each upstream URL maps to a bare mirror clone under the cache root. A
//! download first makes sure the wanted reference exists in the mirror
//! (refreshing or rebuilding it as needed), then clones from the mirror with
//! `--reference` so objects are borrowed from local disk instead of the
//! network. Every failure here is non-fatal; callers degrade to a direct
//! clone.

use std::path::{Path, PathBuf};

use tracing::debug;

use overture_core::{Filesystem, ProcessExecutor};

use crate::commands::CommandBuilder;

/// Manages bare mirror clones under a cache root directory.
#[derive(Debug, Clone)]
pub struct GitMirrorCache {
    root: PathBuf,
    commands: CommandBuilder,
    filesystem: Filesystem,
}

impl GitMirrorCache {
    #[must_use]
    pub fn new(root: PathBuf, commands: CommandBuilder, filesystem: Filesystem) -> Self {
        Self {
            root,
            commands,
            filesystem,
        }
    }

    /// The mirror directory for `url`.
    ///
    /// The URL is slugified by replacing every character outside
    /// `[A-Za-z0-9.]` with `-`. The mapping is deterministic and keeps
    /// unrelated URLs distinct, so concurrent consumers agree on cache
    /// locations.
    #[must_use]
    pub fn mirror_path(&self, url: &str) -> PathBuf {
        let slug: String = url
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' { c } else { '-' })
            .collect();
        self.root.join(slug)
    }

    /// Ensures the mirror for `url` contains `reference`.
    ///
    /// Returns the mirror directory when the reference is now present there.
    /// Tries the existing mirror first, refreshes it from upstream when the
    /// reference is missing, and rebuilds from scratch when the directory is
    /// not a usable mirror at all.
    pub fn ensure_ref(
        &self,
        process: &dyn ProcessExecutor,
        url: &str,
        reference: &str,
    ) -> Option<PathBuf> {
        let mirror = self.mirror_path(url);
        if self.ref_in_mirror(process, &mirror, reference) {
            return Some(mirror);
        }
        if !self.sync_mirror(process, url, &mirror) {
            debug!(url, "mirror sync failed, skipping cache");
            return None;
        }
        if self.ref_in_mirror(process, &mirror, reference) {
            Some(mirror)
        } else {
            debug!(url, reference, "reference absent from mirror after sync");
            None
        }
    }

    fn is_mirror(&self, process: &dyn ProcessExecutor, mirror: &Path) -> bool {
        if !mirror.is_dir() {
            return false;
        }
        let mut git_dir = String::new();
        matches!(
            process.execute(
                self.commands.rev_parse_git_dir(),
                Some(&mut git_dir),
                Some(mirror),
            ),
            Ok(0)
        ) && git_dir.trim() == "."
    }

    fn ref_in_mirror(&self, process: &dyn ProcessExecutor, mirror: &Path, reference: &str) -> bool {
        self.is_mirror(process, mirror)
            && matches!(
                process.execute(&self.commands.rev_parse_verify(reference), None, Some(mirror)),
                Ok(0)
            )
    }

    fn sync_mirror(&self, process: &dyn ProcessExecutor, url: &str, mirror: &Path) -> bool {
        if self.is_mirror(process, mirror) {
            debug!(url, "refreshing mirror");
            return matches!(
                process.execute(&self.commands.sync_mirror(url), None, Some(mirror)),
                Ok(0)
            );
        }

        // Not a mirror: stale checkout, partial clone, or nothing at all.
        self.filesystem.remove_directory(mirror);
        debug!(url, "creating mirror");
        matches!(
            process.execute(
                &self.commands.clone_mirror(url, &mirror.display().to_string()),
                None,
                None,
            ),
            Ok(0)
        )
    }
}
