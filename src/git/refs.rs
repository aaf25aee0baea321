//! Git reference resolution
//!
//! This module handles:
//! - Listing a remote's refs without cloning (the `ls-remote` equivalent)
//! - Matching a branch or tag name against that listing
//! - Resolving refs (branches, tags, partial SHAs) inside a local clone

use git2::{Direction, Remote, RemoteCallbacks, Repository};
use tracing::debug;

use super::auth::setup_auth_callbacks;
use super::error::interpret_git_error;
use super::url::normalize_for_git;
use crate::error::{Result, git};

const PEELED_SUFFIX: &str = "^{}";

/// One advertised ref of a remote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRef {
    /// Full ref name, e.g. `refs/tags/v1.0.0` or `refs/tags/v1.0.0^{}`
    pub name: String,
    /// Object the ref points at
    pub oid: String,
}

/// List every ref a remote advertises
pub fn list_remote_refs(url: &str) -> Result<Vec<RemoteRef>> {
    let mut remote =
        Remote::create_detached(normalize_for_git(url)).map_err(|e| list_failed(url, &e))?;

    let mut callbacks = RemoteCallbacks::new();
    setup_auth_callbacks(&mut callbacks);

    debug!(url, "listing remote refs");
    let connection = remote
        .connect_auth(Direction::Fetch, Some(callbacks), None)
        .map_err(|e| list_failed(url, &e))?;

    let heads = connection
        .list()
        .map_err(|e| list_failed(url, &e))?;

    Ok(heads
        .iter()
        .map(|head| RemoteRef {
            name: head.name().to_string(),
            oid: head.oid().to_string(),
        })
        .collect())
}

fn list_failed(url: &str, err: &git2::Error) -> crate::error::DepsError {
    git::operation_failed(format!("listing refs of {url}: {}", interpret_git_error(err)))
}

/// Find the commit a branch or tag name points at in a remote listing
///
/// Tags win over branches. Annotated tags resolve through their peeled
/// `^{}` entry so the result is always a commit, never a tag object.
pub fn find_remote_ref(refs: &[RemoteRef], git_ref: &str) -> Option<String> {
    let lookup = |name: &str| {
        refs.iter()
            .find(|r| r.name == name)
            .map(|r| r.oid.clone())
    };

    if git_ref == "HEAD" {
        return lookup("HEAD");
    }

    let tag = format!("refs/tags/{git_ref}");
    lookup(&format!("{tag}{PEELED_SUFFIX}"))
        .or_else(|| lookup(&tag))
        .or_else(|| lookup(&format!("refs/heads/{git_ref}")))
        .or_else(|| git_ref.starts_with("refs/").then(|| lookup(git_ref)).flatten())
}

/// Tag names advertised by a remote, without the `refs/tags/` prefix
pub fn remote_tags(refs: &[RemoteRef]) -> Vec<String> {
    refs.iter()
        .filter_map(|r| r.name.strip_prefix("refs/tags/"))
        .filter(|name| !name.ends_with(PEELED_SUFFIX))
        .map(str::to_string)
        .collect()
}

/// Resolve a git ref (branch, tag, or partial SHA) to a full SHA
///
/// If no ref is provided, defaults to HEAD.
pub fn resolve_ref(repo: &Repository, git_ref: Option<&str>) -> Result<String> {
    let commit = match git_ref {
        Some(refname) => resolve_reference(repo, refname)?,
        None => repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map_err(|e| git::ref_resolve_failed("HEAD", e.message()))?,
    };

    Ok(commit.id().to_string())
}

fn resolve_reference<'a>(repo: &'a Repository, refname: &str) -> Result<git2::Commit<'a>> {
    let candidates = [
        refname.to_string(),
        format!("refs/tags/{refname}"),
        format!("refs/heads/{refname}"),
        format!("refs/remotes/origin/{refname}"),
    ];

    for candidate in &candidates {
        if let Ok(commit) = repo
            .find_reference(candidate)
            .and_then(|reference| reference.peel_to_commit())
        {
            return Ok(commit);
        }
    }

    // Abbreviated SHAs and other revspecs
    repo.revparse_single(refname)
        .and_then(|object| object.peel_to_commit())
        .map_err(|_| git::ref_resolve_failed(refname, "Could not resolve reference"))
}
