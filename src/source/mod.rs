//! Git dependency sources
//!
//! [`GitSourceDescriptor`] is the parsed form of a dependency specifier.
//! Accepted forms:
//!
//! - `owner/repo`, `owner/repo@ref`, `owner/repo/sub/path@ref` (default host)
//! - `github:owner/repo@ref`, `gitlab:…`, `bitbucket:…`
//! - `https://host/owner/repo[.git][/sub/path][@ref]`, `ssh://…`, `http://…`
//! - `git@host:owner/repo[.git][@ref]`
//! - `file:///path/to/owner/repo[@ref]` (platform `local`)
//!
//! The subpath always comes before the `@ref`. Local paths (`./`, `../`,
//! `/`) are rejected; those are `path` dependencies, not git sources.
//!
//! [`GitSourceResolver`] turns a descriptor into a cached snapshot.

mod resolver;

use std::fmt;

use crate::error::{Result, source};

pub use resolver::{GitSourceResolver, MaterializedSource, ResolveOptions};

/// Platform name used for `file://` sources
pub const LOCAL_PLATFORM: &str = "local";

const HOST_SHORTHANDS: &[(&str, &str)] = &[
    ("github:", "github.com"),
    ("gitlab:", "gitlab.com"),
    ("bitbucket:", "bitbucket.org"),
];

const URL_SCHEMES: &[&str] = &["https://", "http://", "ssh://", "git://"];

/// Parsed dependency specifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GitSourceDescriptor {
    /// Hosting platform (`github.com`, `gitlab.com`, `local`, …)
    pub platform: String,
    pub owner: String,
    pub repo: String,
    /// Requested ref; `None` means the remote's default branch
    pub git_ref: Option<String>,
    /// Clone URL, without a `.git` suffix for hosted repositories
    pub repo_url: String,
    /// Subpath inside the repository (`sub/path`), if any
    pub entry_point: Option<String>,
}

impl GitSourceDescriptor {
    /// Parse a specifier, expanding `owner/repo` shorthand against `default_host`
    ///
    /// `default_host` is a base URL such as `https://github.com` or
    /// `file:///srv/mirror`.
    pub fn parse(specifier: &str, default_host: &str) -> Result<Self> {
        let input = specifier.trim();
        if input.is_empty() {
            return Err(source::invalid_specifier(specifier, "empty specifier"));
        }
        if input.starts_with("./") || input.starts_with("../") || input.starts_with('/') {
            return Err(source::invalid_specifier(
                specifier,
                "local paths are not git sources; declare them with 'path'",
            ));
        }

        let (location, git_ref) = split_ref(input);
        if git_ref.is_some_and(str::is_empty) {
            return Err(source::invalid_specifier(specifier, "empty ref after '@'"));
        }
        let git_ref = git_ref.map(str::to_string);

        let mut descriptor = if let Some(path) = location.strip_prefix("file://") {
            parse_file_url(specifier, path)?
        } else if let Some(scheme) = URL_SCHEMES.iter().find(|s| location.starts_with(**s)) {
            parse_url(specifier, scheme, &location[scheme.len()..])?
        } else if let Some(rest) = location.strip_prefix("git@") {
            parse_scp(specifier, rest)?
        } else if let Some((prefix, host)) = HOST_SHORTHANDS
            .iter()
            .find(|(prefix, _)| location.starts_with(*prefix))
        {
            let base = format!("https://{host}");
            parse_shorthand(specifier, &location[prefix.len()..], &base)?
        } else {
            parse_shorthand(specifier, location, default_host)?
        };

        descriptor.git_ref = git_ref;
        Ok(descriptor)
    }

    /// `owner/repo`
    pub fn package_key(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl fmt::Display for GitSourceDescriptor {
    /// `repo_url[/entry_point][@ref]`, which parses back to the same descriptor
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.repo_url)?;
        if let Some(entry) = &self.entry_point {
            write!(f, "/{entry}")?;
        }
        if let Some(git_ref) = &self.git_ref {
            write!(f, "@{git_ref}")?;
        }
        Ok(())
    }
}

/// Split `location@ref`
///
/// Only an `@` after the host part counts, so `git@host:…` and
/// `https://user@host/…` keep their user info.
fn split_ref(input: &str) -> (&str, Option<&str>) {
    let search_from = if let Some(idx) = input.find("://") {
        let after = idx + 3;
        input[after..].find('/').map_or(input.len(), |slash| after + slash)
    } else if input.starts_with("git@") {
        input.find(':').unwrap_or(input.len())
    } else {
        0
    };

    match input[search_from..].rfind('@') {
        Some(idx) => {
            let at = search_from + idx;
            let location = &input[..at];
            if location.contains('/') {
                (location, Some(&input[at + 1..]))
            } else {
                (input, None)
            }
        }
        None => (input, None),
    }
}

fn valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Split a path into `(owner, repo, entry_point)`
fn split_path<'a>(specifier: &str, path: &'a str) -> Result<(&'a str, String, Option<String>)> {
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    if segments.len() < 2 {
        return Err(source::invalid_specifier(
            specifier,
            "expected at least owner/repo",
        ));
    }
    if let Some(bad) = segments.iter().find(|s| !valid_segment(s)) {
        return Err(source::invalid_specifier(
            specifier,
            format!("invalid path segment '{bad}'"),
        ));
    }

    let repo = segments[1].strip_suffix(".git").unwrap_or(segments[1]);
    if repo.is_empty() {
        return Err(source::invalid_specifier(specifier, "empty repository name"));
    }
    let entry_point = (segments.len() > 2).then(|| segments[2..].join("/"));
    Ok((segments[0], repo.to_string(), entry_point))
}

fn host_name(authority: &str) -> &str {
    let without_user = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    without_user
        .split_once(':')
        .map_or(without_user, |(host, _)| host)
}

fn parse_url(specifier: &str, scheme: &str, rest: &str) -> Result<GitSourceDescriptor> {
    let (authority, path) = rest.split_once('/').unwrap_or((rest, ""));
    let host = host_name(authority);
    if host.is_empty() {
        return Err(source::invalid_specifier(specifier, "missing host"));
    }
    let (owner, repo, entry_point) = split_path(specifier, path)?;

    Ok(GitSourceDescriptor {
        platform: host.to_string(),
        owner: owner.to_string(),
        repo_url: format!("{scheme}{authority}/{owner}/{repo}"),
        repo,
        git_ref: None,
        entry_point,
    })
}

fn parse_scp(specifier: &str, rest: &str) -> Result<GitSourceDescriptor> {
    let (host, path) = rest
        .split_once(':')
        .ok_or_else(|| source::invalid_specifier(specifier, "expected git@host:owner/repo"))?;
    let (owner, repo, entry_point) = split_path(specifier, path)?;

    Ok(GitSourceDescriptor {
        platform: host.to_string(),
        owner: owner.to_string(),
        repo_url: format!("git@{host}:{owner}/{repo}"),
        repo,
        git_ref: None,
        entry_point,
    })
}

/// `file:///srv/git/acme/core[.git]`: the last two segments are owner/repo
fn parse_file_url(specifier: &str, path: &str) -> Result<GitSourceDescriptor> {
    let trimmed = path.trim_end_matches('/');
    let mut segments = trimmed.rsplit('/');
    let repo_segment = segments.next().unwrap_or_default();
    let owner = segments.next().unwrap_or_default();
    let repo = repo_segment.strip_suffix(".git").unwrap_or(repo_segment);

    if !valid_segment(owner) || !valid_segment(repo) {
        return Err(source::invalid_specifier(
            specifier,
            "file URLs must end in <owner>/<repo>",
        ));
    }

    Ok(GitSourceDescriptor {
        platform: LOCAL_PLATFORM.to_string(),
        owner: owner.to_string(),
        repo: repo.to_string(),
        git_ref: None,
        repo_url: format!("file://{trimmed}"),
        entry_point: None,
    })
}

/// `owner/repo[/sub]` relative to a base URL
fn parse_shorthand(specifier: &str, path: &str, base: &str) -> Result<GitSourceDescriptor> {
    let (owner, repo, entry_point) = split_path(specifier, path)?;
    let base = base.trim_end_matches('/');

    let platform = if base.starts_with("file://") {
        LOCAL_PLATFORM.to_string()
    } else {
        let rest = base.split_once("://").map_or(base, |(_, rest)| rest);
        let authority = rest.split('/').next().unwrap_or(rest);
        host_name(authority).to_string()
    };

    Ok(GitSourceDescriptor {
        platform,
        owner: owner.to_string(),
        repo_url: format!("{base}/{owner}/{repo}"),
        repo,
        git_ref: None,
        entry_point,
    })
}
