//! Common test utilities for dlang-deps integration tests
//!
//! Every test gets its own workspace, cache directory and `file://` git host,
//! passed to the binary through `DLANG_CACHE_DIR` and `DLANG_GIT_HOST`.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use git2::{Commit, IndexAddOption, Repository, RepositoryInitOptions, Signature};
use tempfile::TempDir;

/// A workspace, a cache directory and a git host in temp directories
pub struct TestEnv {
    workspace: TempDir,
    cache: TempDir,
    host: TempDir,
    /// Canonical workspace root
    pub path: PathBuf,
}

impl TestEnv {
    /// Create an environment whose workspace manifest is `manifest`
    pub fn new(manifest: &str) -> Self {
        let workspace = TempDir::new().expect("Failed to create workspace directory");
        let path = dunce::canonicalize(workspace.path()).expect("Failed to canonicalize");
        let env = Self {
            workspace,
            cache: TempDir::new().expect("Failed to create cache directory"),
            host: TempDir::new().expect("Failed to create git host directory"),
            path,
        };
        env.write_file("model.yaml", manifest);
        env
    }

    pub fn cache_dir(&self) -> &Path {
        self.cache.path()
    }

    /// `file://` base URL used as `DLANG_GIT_HOST`
    pub fn host_url(&self) -> String {
        format!("file://{}", self.host.path().display())
    }

    /// Repository at `<host>/<owner>/<name>`
    pub fn repo(&self, owner: &str, name: &str) -> TestRepo {
        TestRepo::init(self.host.path().join(owner).join(name))
    }

    /// Write a file in the workspace
    pub fn write_file(&self, path: &str, content: &str) -> PathBuf {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }

    /// Read a file from the workspace
    pub fn read_file(&self, path: &str) -> String {
        std::fs::read_to_string(self.path.join(path)).expect("Failed to read file")
    }

    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    /// The binary, pointed at this environment's workspace, cache and host
    pub fn cmd(&self) -> Command {
        let mut cmd = dlang_cmd();
        cmd.current_dir(&self.path)
            .env("DLANG_CACHE_DIR", self.cache.path())
            .env("DLANG_GIT_HOST", self.host_url())
            .env_remove("DLANG_WORKSPACE")
            .env_remove("DLANG_LOG");
        cmd
    }
}

/// The binary with no environment set up
#[allow(deprecated)]
pub fn dlang_cmd() -> Command {
    Command::cargo_bin("dlang-deps").expect("binary is built")
}

/// A git repository with a `main` branch
pub struct TestRepo {
    pub path: PathBuf,
}

impl TestRepo {
    fn init(path: PathBuf) -> Self {
        std::fs::create_dir_all(&path).expect("Failed to create repository directory");
        let mut options = RepositoryInitOptions::new();
        options.initial_head("main");
        Repository::init_opts(&path, &options).expect("Failed to init repository");
        Self { path }
    }

    fn open(&self) -> Repository {
        Repository::open(&self.path).expect("Failed to open repository")
    }

    /// Write and commit several files at once; returns the commit SHA
    pub fn commit(&self, files: &[(&str, &str)]) -> String {
        for (relative, content) in files {
            let file = self.path.join(relative);
            if let Some(parent) = file.parent() {
                std::fs::create_dir_all(parent).expect("Failed to create parent directory");
            }
            std::fs::write(file, content).expect("Failed to write file");
        }

        let repo = self.open();
        let mut index = repo.index().expect("Failed to open index");
        index
            .add_all(["*"], IndexAddOption::DEFAULT, None)
            .expect("Failed to stage files");
        index.write().expect("Failed to write index");
        let tree = repo
            .find_tree(index.write_tree().expect("Failed to write tree"))
            .expect("Failed to find tree");

        let signature = Signature::now("Test", "test@example.com").expect("Failed to sign");
        let parent = repo.head().ok().and_then(|head| head.peel_to_commit().ok());
        let parents: Vec<&Commit<'_>> = parent.iter().collect();
        repo.commit(Some("HEAD"), &signature, &signature, "update", &tree, &parents)
            .expect("Failed to commit")
            .to_string()
    }

    /// Lightweight tag at HEAD
    pub fn tag(&self, name: &str) {
        let repo = self.open();
        let head = repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .expect("No HEAD commit");
        repo.tag_lightweight(name, head.as_object(), false)
            .expect("Failed to create tag");
    }

    /// Delete the repository, simulating an unreachable remote
    pub fn remove(&self) {
        std::fs::remove_dir_all(&self.path).expect("Failed to remove repository");
    }
}
