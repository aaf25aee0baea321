//! BLAKE3 hashing for snapshot integrity

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use blake3::Hasher;
use walkdir::WalkDir;

use crate::error::{DepsError, Result, config};
use crate::path_utils::to_forward_slashes;
use crate::settings::LOCK_FILE;

/// Hash prefix for BLAKE3 hashes
pub const HASH_PREFIX: &str = "blake3:";

/// Calculate BLAKE3 hash of a directory's contents
///
/// Files are visited in sorted relative-path order, each contributing
/// `path \0 contents \0`, so the result is independent of filesystem
/// iteration order. A nested `model.lock` is excluded.
pub fn hash_directory(path: &Path) -> Result<String> {
    if !path.is_dir() {
        return Err(DepsError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let mut files: Vec<_> = WalkDir::new(path)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file() && e.file_name() != LOCK_FILE)
        .map(walkdir::DirEntry::into_path)
        .collect();
    files.sort();

    let mut hasher = Hasher::new();
    for file_path in files {
        let relative = to_forward_slashes(file_path.strip_prefix(path).unwrap_or(&file_path));
        hasher.update(relative.as_bytes());
        hasher.update(b"\0");

        let file = File::open(&file_path)
            .map_err(|e| config::read_failed(file_path.display().to_string(), e.to_string()))?;
        io::copy(&mut BufReader::new(file), &mut hasher)
            .map_err(|e| config::read_failed(file_path.display().to_string(), e.to_string()))?;

        hasher.update(b"\0");
    }

    Ok(format!("{HASH_PREFIX}{}", hasher.finalize().to_hex()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_hash_directory() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("index.dlang"), "entity A {}").unwrap();
        std::fs::create_dir(temp.path().join("sub")).unwrap();
        std::fs::write(temp.path().join("sub/types.dlang"), "type B").unwrap();

        let hash = hash_directory(temp.path()).unwrap();
        assert!(hash.starts_with(HASH_PREFIX));
        assert_eq!(hash, hash_directory(temp.path()).unwrap());
    }

    #[test]
    fn test_hash_changes_with_content_and_names() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.dlang"), "aaa").unwrap();
        let before = hash_directory(temp.path()).unwrap();

        std::fs::write(temp.path().join("a.dlang"), "aab").unwrap();
        let edited = hash_directory(temp.path()).unwrap();
        assert_ne!(before, edited);

        std::fs::rename(temp.path().join("a.dlang"), temp.path().join("b.dlang")).unwrap();
        assert_ne!(edited, hash_directory(temp.path()).unwrap());
    }

    #[test]
    fn test_hash_directory_excludes_lock_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("index.dlang"), "content").unwrap();
        let before = hash_directory(temp.path()).unwrap();

        std::fs::write(temp.path().join(LOCK_FILE), "{}").unwrap();
        assert_eq!(before, hash_directory(temp.path()).unwrap());
    }

    #[test]
    fn test_hash_missing_directory() {
        let result = hash_directory(Path::new("/nonexistent/snapshot"));
        assert!(matches!(result, Err(DepsError::FileNotFound { .. })));
    }
}
