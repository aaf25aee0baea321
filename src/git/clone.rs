//! Repository cloning and commit fetching

use std::path::Path;

use git2::{FetchOptions, Oid, Remote, RemoteCallbacks, Repository, build::RepoBuilder};
use tracing::debug;

use super::auth::setup_auth_callbacks;
use super::error::interpret_git_error;
use super::url::{is_local_url, normalize_for_git};
use crate::error::{Result, git};

/// libgit2's sentinel depth for converting a shallow clone into a full one
const UNSHALLOW_DEPTH: i32 = i32::MAX;

fn fetch_options<'a>() -> FetchOptions<'a> {
    let mut callbacks = RemoteCallbacks::new();
    setup_auth_callbacks(&mut callbacks);

    let mut options = FetchOptions::new();
    options.remote_callbacks(callbacks);
    options
}

/// Clone a git repository to a target directory
///
/// `shallow` requests depth 1 and is ignored for local URLs, which libgit2
/// cannot clone shallow.
pub fn clone(url: &str, target: &Path, shallow: bool) -> Result<Repository> {
    let mut options = fetch_options();
    if shallow && !is_local_url(url) {
        options.depth(1);
    }

    let mut builder = RepoBuilder::new();
    builder.fetch_options(options);

    debug!(url, target = %target.display(), shallow, "cloning repository");
    builder
        .clone(&normalize_for_git(url), target)
        .map_err(|e| git::clone_failed(url, interpret_git_error(&e)))
}

/// Make sure `sha` is present in `repo`, fetching it from `origin` if needed
///
/// Tries a fetch by SHA first. Servers that refuse unadvertised objects get a
/// second, full fetch of every branch and tag (unshallowing the clone).
pub fn fetch_commit(repo: &Repository, sha: &str) -> Result<()> {
    let oid = Oid::from_str(sha).map_err(|e| git::fetch_failed(e.message()))?;
    if repo.find_commit(oid).is_ok() {
        return Ok(());
    }

    let mut remote = repo
        .find_remote("origin")
        .map_err(|e| git::fetch_failed(interpret_git_error(&e)))?;

    debug!(sha, "commit missing from clone, fetching by SHA");
    let fetched = fetch(&mut remote, &[sha], false).is_ok() && repo.find_commit(oid).is_ok();
    if !fetched {
        debug!(sha, "fetch by SHA failed, fetching all refs");
        fetch(
            &mut remote,
            &[
                "+refs/heads/*:refs/remotes/origin/*",
                "+refs/tags/*:refs/tags/*",
            ],
            repo.is_shallow(),
        )?;
    }

    repo.find_commit(oid)
        .map(|_| ())
        .map_err(|_| git::fetch_failed(format!("commit {sha} not found on remote")))
}

fn fetch(remote: &mut Remote<'_>, refspecs: &[&str], unshallow: bool) -> Result<()> {
    let mut options = fetch_options();
    if unshallow {
        options.depth(UNSHALLOW_DEPTH);
    }
    remote
        .fetch(refspecs, Some(&mut options), None)
        .map_err(|e| git::fetch_failed(interpret_git_error(&e)))
}
