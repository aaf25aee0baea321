//! Configuration file handling
//!
//! This module contains data structures for:
//! - `model.yaml` - Workspace manifest
//! - `model.lock` - Lock file with resolved dependencies
//!
//! plus [`ConfigCache`], which memoizes both.

pub mod cache;
pub mod lockfile;
pub mod manifest;

// Re-export commonly used types
pub use cache::ConfigCache;
pub use lockfile::{LOCK_FILE_VERSION, LockFile, LockedDependency};
pub use manifest::{Dependency, DependencyDecl, DependencySpec, Manifest, Metadata, ModelInfo};
