//! Git command line construction.
//!
//! Every git interaction is a full shell command line, built here and nowhere
//! else. Clone and fetch chains are compound (`&&`, `||`, subshells) so a
//! single [`overture_core::ProcessExecutor`] call performs a whole logical
//! step; the shell short-circuits the rest of a chain when an early link
//! fails.

/// Target shell dialect for quoting and directory changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    /// POSIX sh: single-quote escaping, plain `cd`.
    Posix,
    /// cmd.exe: double-quote escaping, `cd /D` to switch drives.
    Windows,
}

impl Shell {
    /// The dialect of the platform this binary runs on.
    #[must_use]
    pub fn current() -> Self {
        if cfg!(windows) { Self::Windows } else { Self::Posix }
    }

    /// Quotes `argument` for this shell.
    #[must_use]
    pub fn escape(self, argument: &str) -> String {
        match self {
            Self::Posix => format!("'{}'", argument.replace('\'', "'\\''")),
            Self::Windows => format!("\"{}\"", argument.replace('"', "\"\"")),
        }
    }

    const fn cd(self) -> &'static str {
        match self {
            Self::Posix => "cd",
            Self::Windows => "cd /D",
        }
    }
}

/// Builds the exact git command lines the engine runs.
#[derive(Debug, Clone, Copy)]
pub struct CommandBuilder {
    shell: Shell,
}

impl CommandBuilder {
    #[must_use]
    pub const fn new(shell: Shell) -> Self {
        Self { shell }
    }

    #[must_use]
    pub const fn shell(&self) -> Shell {
        self.shell
    }

    /// Direct clone chain: clone without checkout, add the `composer` remote,
    /// prime it with a fetch, then pin both remotes to the URL.
    #[must_use]
    pub fn clone_direct(&self, url: &str, path: &str) -> String {
        let url = self.shell.escape(url);
        let path = self.shell.escape(path);
        format!(
            "git clone --no-checkout {url} {path} && {cd} {path} && git remote add composer {url} && git fetch composer && git remote set-url origin {url} && git remote set-url composer {url}",
            cd = self.shell.cd()
        )
    }

    /// Cache-assisted clone chain: clone from the local mirror with
    /// `--reference` so objects are borrowed, then point both remotes at the
    /// upstream URL. `--dissociate` detaches from the mirror afterwards and
    /// needs git 2.3.0.
    #[must_use]
    pub fn clone_from_cache(&self, cache: &str, path: &str, url: &str, dissociate: bool) -> String {
        let cache = self.shell.escape(cache);
        let path = self.shell.escape(path);
        let url = self.shell.escape(url);
        let flags = if dissociate {
            format!("--dissociate --reference {cache}")
        } else {
            format!("--reference {cache}")
        };
        format!(
            "git clone --no-checkout {cache} {path} {flags} && {cd} {path} && git remote set-url origin {url} && git remote add composer {url}",
            cd = self.shell.cd()
        )
    }

    /// Bare mirror clone into the cache directory.
    #[must_use]
    pub fn clone_mirror(&self, url: &str, path: &str) -> String {
        format!(
            "git clone --mirror {} {}",
            self.shell.escape(url),
            self.shell.escape(path)
        )
    }

    /// Refreshes an existing mirror from its upstream, pruning stale refs.
    #[must_use]
    pub fn sync_mirror(&self, url: &str) -> String {
        format!(
            "git remote set-url origin {} && git remote update --prune origin",
            self.shell.escape(url)
        )
    }

    /// Update fetch chain: point the `composer` remote at the URL, then fetch
    /// only when the wanted reference does not already resolve locally. The
    /// trailing set-url keeps the remote pinned even when the fetch branch
    /// was skipped.
    #[must_use]
    pub fn fetch_ref(&self, url: &str, reference: &str) -> String {
        let url = self.shell.escape(url);
        let commit = self.shell.escape(&format!("{reference}^{{commit}}"));
        format!(
            "(git remote set-url composer {url} && git rev-parse --quiet --verify {commit} || (git fetch composer && git fetch --tags composer)) && git remote set-url composer {url}"
        )
    }

    /// Checks whether `reference` resolves to a commit.
    #[must_use]
    pub fn rev_parse_verify(&self, reference: &str) -> String {
        format!(
            "git rev-parse --quiet --verify {}",
            self.shell.escape(&format!("{reference}^{{commit}}"))
        )
    }

    /// Detached checkout of a reference.
    #[must_use]
    pub fn checkout(&self, reference: &str) -> String {
        format!("git checkout {} --", self.shell.escape(reference))
    }

    /// Hard reset to a reference.
    #[must_use]
    pub fn reset_hard(&self, reference: &str) -> String {
        format!("git reset --hard {} --", self.shell.escape(reference))
    }

    /// Combined checkout and hard reset of the same reference.
    #[must_use]
    pub fn checkout_reset(&self, reference: &str) -> String {
        format!("{} && {}", self.checkout(reference), self.reset_hard(reference))
    }

    /// Creates or resets local `branch` tracking `remote_ref`.
    #[must_use]
    pub fn checkout_branch(&self, branch: &str, remote_ref: &str) -> String {
        format!(
            "git checkout -B {} {} --",
            self.shell.escape(branch),
            self.shell.escape(remote_ref)
        )
    }

    /// Creates local `branch` from `remote_ref` and hard resets to it.
    #[must_use]
    pub fn checkout_branch_reset(&self, branch: &str, remote_ref: &str) -> String {
        format!(
            "{} && {}",
            self.checkout_branch(branch, remote_ref),
            self.reset_hard(remote_ref)
        )
    }

    /// Repoints a remote's fetch URL.
    #[must_use]
    pub fn remote_set_url(&self, remote: &str, url: &str) -> String {
        format!("git remote set-url {remote} {}", self.shell.escape(url))
    }

    /// Repoints a remote's push URL only.
    #[must_use]
    pub fn remote_set_push_url(&self, remote: &str, url: &str) -> String {
        format!(
            "git remote set-url --push {remote} {}",
            self.shell.escape(url)
        )
    }

    /// Lists remote-tracking branches.
    #[must_use]
    pub const fn branch_remote(&self) -> &'static str {
        "git branch -r"
    }

    /// Lists remotes with their URLs.
    #[must_use]
    pub const fn remote_verbose(&self) -> &'static str {
        "git remote -v"
    }

    /// Lists all refs including HEAD, dereferencing tags.
    #[must_use]
    pub const fn show_head_refs(&self) -> &'static str {
        "git show-ref --head -d"
    }

    /// Reports tracked modifications only.
    #[must_use]
    pub const fn status_porcelain(&self) -> &'static str {
        "git status --porcelain --untracked-files=no"
    }

    /// Prints the repository directory; a bare mirror answers `.`.
    #[must_use]
    pub const fn rev_parse_git_dir(&self) -> &'static str {
        "git rev-parse --git-dir"
    }

    /// Probes for the git binary and its version.
    #[must_use]
    pub const fn git_version(&self) -> &'static str {
        "git --version"
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn posix_escape_wraps_in_single_quotes() {
        assert_eq!(Shell::Posix.escape("abc"), "'abc'");
        assert_eq!(Shell::Posix.escape("it's"), "'it'\\''s'");
    }

    #[test]
    fn windows_escape_doubles_embedded_quotes() {
        assert_eq!(Shell::Windows.escape("abc"), "\"abc\"");
        assert_eq!(Shell::Windows.escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn direct_clone_adds_and_pins_both_remotes() {
        let builder = CommandBuilder::new(Shell::Posix);
        assert_eq!(
            builder.clone_direct("https://example.com/composer/composer", "composerPath"),
            "git clone --no-checkout 'https://example.com/composer/composer' 'composerPath' && cd 'composerPath' && git remote add composer 'https://example.com/composer/composer' && git fetch composer && git remote set-url origin 'https://example.com/composer/composer' && git remote set-url composer 'https://example.com/composer/composer'"
        );
    }

    #[test]
    fn windows_clone_uses_drive_aware_cd() {
        let builder = CommandBuilder::new(Shell::Windows);
        let command = builder.clone_direct("https://example.com/a/a", "C:\\pkg");
        assert!(command.contains("&& cd /D \"C:\\pkg\" &&"));
    }

    #[test]
    fn cache_clone_borrows_objects_from_mirror() {
        let builder = CommandBuilder::new(Shell::Posix);
        assert_eq!(
            builder.clone_from_cache("/cache/repo", "pkg", "https://example.com/a/a", true),
            "git clone --no-checkout '/cache/repo' 'pkg' --dissociate --reference '/cache/repo' && cd 'pkg' && git remote set-url origin 'https://example.com/a/a' && git remote add composer 'https://example.com/a/a'"
        );
    }

    #[test]
    fn cache_clone_drops_dissociate_for_old_git() {
        let builder = CommandBuilder::new(Shell::Posix);
        let command = builder.clone_from_cache("/cache/repo", "pkg", "https://example.com/a/a", false);
        assert!(!command.contains("--dissociate"));
        assert!(command.contains("--reference '/cache/repo'"));
    }

    #[test]
    fn fetch_chain_short_circuits_on_resolvable_reference() {
        let builder = CommandBuilder::new(Shell::Posix);
        assert_eq!(
            builder.fetch_ref("https://example.com/a/a", "deadbeef"),
            "(git remote set-url composer 'https://example.com/a/a' && git rev-parse --quiet --verify 'deadbeef^{commit}' || (git fetch composer && git fetch --tags composer)) && git remote set-url composer 'https://example.com/a/a'"
        );
    }

    #[test]
    fn checkout_forms_terminate_with_pathspec_separator() {
        let builder = CommandBuilder::new(Shell::Posix);
        assert_eq!(builder.checkout("master"), "git checkout 'master' --");
        assert_eq!(builder.reset_hard("ref"), "git reset --hard 'ref' --");
        assert_eq!(
            builder.checkout_branch_reset("1.0", "composer/1.0"),
            "git checkout -B '1.0' 'composer/1.0' -- && git reset --hard 'composer/1.0' --"
        );
    }
}
