//! Test fixtures: temp workspaces and local git repositories.
//!
//! Every git fixture is served over `file://`, so tests that resolve
//! dependencies run without network access.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_fixtures::GitHost;
//!
//! #[test]
//! fn my_test() {
//!     // Directory laid out as <root>/<owner>/<repo>, usable as DLANG_GIT_HOST
//!     let host = GitHost::new();
//!     let core = host.repo("acme", "core");
//!     let sha = core.commit_file("index.dlang", "entity Core {}\n");
//!     core.tag("v1.0.0");
//! }
//! ```

#![allow(clippy::expect_used)]

use std::fs;
use std::path::{Path, PathBuf};

use git2::{Commit, Repository, RepositoryInitOptions, Signature};
use tempfile::TempDir;

use crate::settings::MANIFEST_FILE;

/// Create a temp directory in the system temp location.
///
/// # Panics
///
/// Panics if the temp directory cannot be created.
#[must_use]
pub fn create_temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// Create a workspace directory containing `model.yaml` with `manifest`.
///
/// # Panics
///
/// Panics if the directory or manifest cannot be written.
#[must_use]
pub fn create_workspace(manifest: &str) -> TempDir {
    let temp = create_temp_dir();
    fs::write(temp.path().join(MANIFEST_FILE), manifest).expect("Failed to write manifest");
    temp
}

/// Write `content` to `root/relative`, creating parent directories.
///
/// # Panics
///
/// Panics if the file cannot be written.
pub fn write_file(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(&path, content).expect("Failed to write file");
    path
}

/// A directory of repositories laid out as `<root>/<owner>/<repo>`.
///
/// Its [`url`](GitHost::url) works as a default git host, so `owner/repo`
/// shorthand resolves to the fixture repositories.
pub struct GitHost {
    temp: TempDir,
}

impl Default for GitHost {
    fn default() -> Self {
        Self::new()
    }
}

impl GitHost {
    #[must_use]
    pub fn new() -> Self {
        Self {
            temp: create_temp_dir(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    /// `file://` base URL
    pub fn url(&self) -> String {
        format!("file://{}", self.root().display())
    }

    /// Create an empty repository at `<root>/<owner>/<name>`
    pub fn repo(&self, owner: &str, name: &str) -> GitRepoFixture {
        GitRepoFixture::init(self.root().join(owner).join(name), None)
    }
}

/// A local git repository with a `main` branch.
pub struct GitRepoFixture {
    _temp: Option<TempDir>,
    path: PathBuf,
}

impl Default for GitRepoFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl GitRepoFixture {
    /// Repository in its own temp directory
    #[must_use]
    pub fn new() -> Self {
        let temp = create_temp_dir();
        let path = temp.path().join("repo");
        Self::init(path, Some(temp))
    }

    fn init(path: PathBuf, temp: Option<TempDir>) -> Self {
        fs::create_dir_all(&path).expect("Failed to create repository directory");
        let mut options = RepositoryInitOptions::new();
        options.initial_head("main");
        Repository::init_opts(&path, &options).expect("Failed to init git repository");
        Self { _temp: temp, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn url(&self) -> String {
        format!("file://{}", self.path.display())
    }

    fn open(&self) -> Repository {
        Repository::open(&self.path).expect("Failed to open fixture repository")
    }

    /// Write a file and commit it on `main`; returns the commit SHA
    pub fn commit_file(&self, relative: &str, content: &str) -> String {
        write_file(&self.path, relative, content);

        let repo = self.open();
        let mut index = repo.index().expect("Failed to open index");
        index
            .add_path(Path::new(relative))
            .expect("Failed to stage file");
        index.write().expect("Failed to write index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = repo.find_tree(tree_id).expect("Failed to find tree");

        let signature = Signature::now("Test", "test@example.com").expect("Failed to sign");
        let parent = repo.head().ok().and_then(|head| head.peel_to_commit().ok());
        let parents: Vec<&Commit<'_>> = parent.iter().collect();

        repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            &format!("Update {relative}"),
            &tree,
            &parents,
        )
        .expect("Failed to commit")
        .to_string()
    }

    /// Commit a `model.yaml`
    pub fn commit_manifest(&self, manifest: &str) -> String {
        self.commit_file(MANIFEST_FILE, manifest)
    }

    /// Lightweight tag at HEAD
    pub fn tag(&self, name: &str) {
        let repo = self.open();
        let head = repo.head().and_then(|h| h.peel_to_commit()).expect("No HEAD commit");
        repo.tag_lightweight(name, head.as_object(), false)
            .expect("Failed to create tag");
    }

    /// Annotated tag at HEAD
    pub fn annotated_tag(&self, name: &str) {
        let repo = self.open();
        let head = repo.head().and_then(|h| h.peel_to_commit()).expect("No HEAD commit");
        let signature = Signature::now("Test", "test@example.com").expect("Failed to sign");
        repo.tag(name, head.as_object(), &signature, name, false)
            .expect("Failed to create tag");
    }
}
