//! Git operations for materializing dependency snapshots
//!
//! This module handles:
//! - Cloning repositories (HTTPS, SSH and `file://`)
//! - Listing remote refs without cloning
//! - Resolving refs (branches, tags, abbreviated SHAs) to exact SHAs
//! - Fetching a specific commit missing from a shallow clone
//! - Checking out a commit and stripping `.git` from the result
//!
//! Authentication is delegated entirely to git's native system:
//! - SSH keys from ~/.ssh/
//! - Git credential helpers
//! - Environment variables (`GIT_SSH_COMMAND`, etc.)

mod auth;
mod checkout;
mod clone;
mod error;
mod refs;
mod url;

pub use checkout::{checkout_commit, strip_git_metadata};
pub use clone::{clone, fetch_commit};
pub use error::interpret_git_error;
pub use refs::{RemoteRef, find_remote_ref, list_remote_refs, remote_tags, resolve_ref};
pub use url::is_local_url;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_fixtures::GitRepoFixture;
    use tempfile::TempDir;

    #[test]
    fn test_clone_and_checkout_local_repo() {
        let fixture = GitRepoFixture::new();
        let first = fixture.commit_file("model.yaml", "model:\n  name: acme/core\n");
        fixture.tag("v1.0.0");
        fixture.commit_file("index.dlang", "entity Foo {}\n");

        let temp = TempDir::new().unwrap();
        let target = temp.path().join("snapshot");
        let repo = clone(&fixture.url(), &target, true).unwrap();
        checkout_commit(&repo, &first).unwrap();
        drop(repo);

        assert!(target.join("model.yaml").exists());
        assert!(!target.join("index.dlang").exists());

        strip_git_metadata(&target).unwrap();
        assert!(!target.join(".git").exists());
        assert!(target.join("model.yaml").exists());
    }

    #[test]
    fn test_list_remote_refs_sees_tags_and_branches() {
        let fixture = GitRepoFixture::new();
        let sha = fixture.commit_file("README.md", "# core\n");
        fixture.tag("v1.0.0");
        fixture.annotated_tag("v1.1.0");

        let refs = list_remote_refs(&fixture.url()).unwrap();
        assert_eq!(find_remote_ref(&refs, "v1.0.0").as_deref(), Some(sha.as_str()));
        assert_eq!(find_remote_ref(&refs, "v1.1.0").as_deref(), Some(sha.as_str()));
        assert_eq!(find_remote_ref(&refs, "main").as_deref(), Some(sha.as_str()));
        assert_eq!(find_remote_ref(&refs, "HEAD").as_deref(), Some(sha.as_str()));
        assert!(find_remote_ref(&refs, "v9.9.9").is_none());

        let mut tags = remote_tags(&refs);
        tags.sort();
        assert_eq!(tags, ["v1.0.0", "v1.1.0"]);
    }

    #[test]
    fn test_resolve_abbreviated_sha() {
        let fixture = GitRepoFixture::new();
        let sha = fixture.commit_file("README.md", "# core\n");

        let temp = TempDir::new().unwrap();
        let repo = clone(&fixture.url(), &temp.path().join("full"), false).unwrap();
        assert_eq!(resolve_ref(&repo, Some(&sha[..7])).unwrap(), sha);
        assert_eq!(resolve_ref(&repo, None).unwrap(), sha);
    }

    #[test]
    fn test_clone_missing_repo_fails() {
        let temp = TempDir::new().unwrap();
        let missing = format!("file://{}", temp.path().join("nope").display());
        let result = clone(&missing, &temp.path().join("target"), true);
        assert!(result.is_err());
    }
}
