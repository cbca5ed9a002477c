//! GitHub-style URL recognition and protocol rewriting.

use regex::Regex;

use overture_core::{Config, GitProtocol};

/// Coordinates of a repository on a GitHub-style host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubUrl {
    /// Host name, e.g. `github.com`.
    pub domain: String,
    /// Organization or user.
    pub owner: String,
    /// Repository name, without a `.git` suffix.
    pub repo: String,
}

impl GitHubUrl {
    /// Recognizes `https://`, `http://` and `git://` URLs on one of the
    /// configured hosts. Other schemes (notably `git@host:path`) are left
    /// alone; they already carry an explicit protocol choice.
    #[must_use]
    pub fn parse(url: &str, domains: &[String]) -> Option<Self> {
        if domains.is_empty() {
            return None;
        }
        let hosts = domains
            .iter()
            .map(|domain| regex::escape(domain))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!(r"^(?:https?|git)://({hosts})/([^/]+)/([^/]+?)(?:\.git)?/?$");
        let re = Regex::new(&pattern).ok()?;
        let captures = re.captures(url)?;
        Some(Self {
            domain: captures[1].to_owned(),
            owner: captures[2].to_owned(),
            repo: captures[3].to_owned(),
        })
    }

    /// The `https://` clone URL.
    #[must_use]
    pub fn https_url(&self) -> String {
        format!("https://{}/{}/{}", self.domain, self.owner, self.repo)
    }

    /// The `git@host:path` clone URL.
    #[must_use]
    pub fn ssh_url(&self) -> String {
        format!("git@{}:{}/{}", self.domain, self.owner, self.repo)
    }

    /// The fetch URL for one protocol preference.
    #[must_use]
    pub fn fetch_url(&self, protocol: GitProtocol) -> String {
        match protocol {
            GitProtocol::Https => self.https_url(),
            GitProtocol::Ssh | GitProtocol::Git => self.ssh_url(),
        }
    }

    /// The push URL for this repository given the protocol preference.
    ///
    /// Pushing stays on ssh unless the configuration allows https alone.
    #[must_use]
    pub fn push_url(&self, protocols: &[GitProtocol]) -> String {
        if matches!(protocols, [GitProtocol::Https]) {
            format!("{}.git", self.https_url())
        } else {
            format!("{}.git", self.ssh_url())
        }
    }
}

/// The per-protocol fetch URLs to attempt for `url`, in preference order.
///
/// Non-GitHub URLs get a single attempt, unchanged. Consecutive duplicates
/// (ssh and git rewrite identically) are collapsed.
#[must_use]
pub fn protocol_variants(url: &str, config: &Config) -> Vec<String> {
    match GitHubUrl::parse(url, &config.github_domains) {
        Some(github) => {
            let mut variants: Vec<String> = config
                .github_protocols()
                .iter()
                .map(|protocol| github.fetch_url(*protocol))
                .collect();
            variants.dedup();
            variants
        }
        None => vec![url.to_owned()],
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn domains() -> Vec<String> {
        vec!["github.com".to_owned()]
    }

    #[test]
    fn parses_https_url() {
        let github = GitHubUrl::parse("https://github.com/composer/composer", &domains()).unwrap();
        assert_eq!(github.owner, "composer");
        assert_eq!(github.repo, "composer");
        assert_eq!(github.domain, "github.com");
    }

    #[test]
    fn strips_dot_git_suffix() {
        let github =
            GitHubUrl::parse("https://github.com/composer/composer.git", &domains()).unwrap();
        assert_eq!(github.repo, "composer");
    }

    #[test]
    fn recognizes_git_scheme() {
        assert!(GitHubUrl::parse("git://github.com/acme/widget", &domains()).is_some());
    }

    #[test]
    fn ignores_other_hosts_and_schemes() {
        assert!(GitHubUrl::parse("https://example.com/acme/widget", &domains()).is_none());
        assert!(GitHubUrl::parse("git@github.com:acme/widget", &domains()).is_none());
    }

    #[test]
    fn respects_extra_domains() {
        let domains = vec!["github.com".to_owned(), "github.example.org".to_owned()];
        let github =
            GitHubUrl::parse("https://github.example.org/acme/widget", &domains).unwrap();
        assert_eq!(github.domain, "github.example.org");
    }

    #[test]
    fn ssh_and_git_protocols_rewrite_to_ssh_form() {
        let github = GitHubUrl::parse("https://github.com/acme/widget", &domains()).unwrap();
        assert_eq!(
            github.fetch_url(overture_core::GitProtocol::Ssh),
            "git@github.com:acme/widget"
        );
        assert_eq!(
            github.fetch_url(overture_core::GitProtocol::Git),
            "git@github.com:acme/widget"
        );
        assert_eq!(
            github.fetch_url(overture_core::GitProtocol::Https),
            "https://github.com/acme/widget"
        );
    }

    #[test]
    fn default_variants_are_https_then_ssh() {
        let config = overture_core::Config::default();
        assert_eq!(
            protocol_variants("https://github.com/mirrors/composer", &config),
            vec![
                "https://github.com/mirrors/composer".to_owned(),
                "git@github.com:mirrors/composer".to_owned(),
            ]
        );
    }

    #[test]
    fn empty_protocol_preference_still_yields_variants() {
        let config = overture_core::Config::default().with_github_protocols([]);
        assert_eq!(
            protocol_variants("https://github.com/mirrors/composer", &config),
            vec![
                "https://github.com/mirrors/composer".to_owned(),
                "git@github.com:mirrors/composer".to_owned(),
            ]
        );
    }

    #[test]
    fn non_github_url_passes_through_untouched() {
        let config = overture_core::Config::default();
        assert_eq!(
            protocol_variants("https://example.com/a/a", &config),
            vec!["https://example.com/a/a".to_owned()]
        );
    }

    #[test]
    fn push_url_stays_on_ssh_unless_https_only() {
        use overture_core::GitProtocol::{Git, Https, Ssh};
        let github = GitHubUrl::parse("https://github.com/composer/composer", &domains()).unwrap();
        assert_eq!(github.push_url(&[Ssh]), "git@github.com:composer/composer.git");
        assert_eq!(
            github.push_url(&[Https, Ssh, Git]),
            "git@github.com:composer/composer.git"
        );
        assert_eq!(
            github.push_url(&[Https]),
            "https://github.com/composer/composer.git"
        );
    }
}
