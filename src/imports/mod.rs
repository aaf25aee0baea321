//! Import path resolution
//!
//! Three kinds of specifier, told apart by their first characters:
//!
//! | Specifier            | Base                                     |
//! |----------------------|------------------------------------------|
//! | `./x`, `../x`        | directory of the importing document      |
//! | `@alias/x`, `@/x`    | `paths` entry (or the root) of the workspace |
//! | `owner/package/x`    | installed snapshot of a declared dependency |
//!
//! Every target resolves directory-first: a directory's entry file (its
//! manifest's `model.entry`, else `index.dlang`) wins over a sibling
//! `<target>.dlang`.
//!
//! External imports never reach the network. A dependency that is declared
//! but not yet installed is reported as such.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DepsError, Result, imports};
use crate::path_utils::{is_relative_specifier, lexical_join};
use crate::settings::{MANIFEST_FILE, SOURCE_EXTENSION};
use crate::source::ResolveOptions;
use crate::workspace::{DependencyImport, WorkspaceResolver};

/// Entry file of a directory without a declared entry
const INDEX_FILE: &str = "index";

/// One import as produced by the document parser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDecl {
    #[serde(alias = "uri")]
    pub specifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl ImportDecl {
    pub fn new(specifier: impl Into<String>) -> Self {
        Self {
            specifier: specifier.into(),
            alias: None,
        }
    }
}

/// Outcome for one [`ImportDecl`]
#[derive(Debug)]
pub struct ResolvedImport {
    pub import: ImportDecl,
    pub result: Result<PathBuf>,
}

/// Resolves import specifiers to source files
pub struct ImportResolver<'a> {
    workspace: &'a WorkspaceResolver,
}

impl<'a> ImportResolver<'a> {
    pub fn new(workspace: &'a WorkspaceResolver) -> Self {
        Self { workspace }
    }

    /// Absolute path of the file `specifier` names, seen from `base_dir`
    ///
    /// # Errors
    ///
    /// - `InvalidExtension` for an explicit extension other than `.dlang`
    /// - `ImportNotFound` listing the candidates that were tried
    /// - `UnknownAlias` for an undeclared `@alias`
    /// - `ManifestRequired`, `DependencyNotInstalled` or
    ///   `DependencyNotDeclared` for external specifiers
    pub fn resolve_from(&self, base_dir: &Path, specifier: &str) -> Result<PathBuf> {
        let specifier = specifier.trim();
        let resolved = if is_relative_specifier(specifier) {
            let explicit = check_extension(specifier)?;
            self.resolve_target(specifier, &lexical_join(base_dir, specifier), explicit)
        } else if specifier.starts_with('@') {
            self.resolve_alias(base_dir, specifier)
        } else {
            self.resolve_external(base_dir, specifier)
        }?;
        debug!(specifier, path = %resolved.display(), "resolved import");
        Ok(resolved)
    }

    /// Resolve every import of the document at `document_path`
    ///
    /// Failures are reported per import; one bad import does not stop the rest.
    pub fn resolve_imports(&self, document_path: &Path, imports: &[ImportDecl]) -> Vec<ResolvedImport> {
        let base_dir = document_path.parent().unwrap_or_else(|| Path::new("."));
        imports
            .iter()
            .map(|import| ResolvedImport {
                import: import.clone(),
                result: self.resolve_from(base_dir, &import.specifier),
            })
            .collect()
    }

    fn resolve_alias(&self, base_dir: &Path, specifier: &str) -> Result<PathBuf> {
        let explicit = check_extension(specifier)?;
        let root = self.workspace.initialize(base_dir)?;
        let manifest = self.workspace.manifest()?;

        let declared = manifest
            .paths
            .iter()
            .filter(|(alias, _)| prefix_matches(specifier, alias.trim_end_matches('/')))
            .max_by_key(|(alias, _)| alias.trim_end_matches('/').len());

        let target = match declared {
            Some((alias, dir)) => {
                let rest = &specifier[alias.trim_end_matches('/').len()..];
                lexical_join(&lexical_join(&root, dir), rest.trim_start_matches('/'))
            }
            None => match specifier.strip_prefix("@/") {
                Some(rest) => lexical_join(&root, rest),
                None => {
                    let alias = specifier.split('/').next().unwrap_or(specifier);
                    return Err(DepsError::UnknownAlias {
                        alias: alias.to_string(),
                    });
                }
            },
        };
        self.resolve_target(specifier, &target, explicit)
    }

    fn resolve_external(&self, base_dir: &Path, specifier: &str) -> Result<PathBuf> {
        if let Err(err) = self.workspace.initialize(base_dir) {
            return Err(match err {
                DepsError::WorkspaceNotFound { .. } => DepsError::ManifestRequired {
                    specifier: specifier.to_string(),
                },
                other => other,
            });
        }

        if self.workspace.lock_file()?.is_none() {
            return Err(imports::not_installed(package_part(specifier)));
        }
        let import = self
            .workspace
            .resolve_dependency_import(specifier)?
            .ok_or_else(|| imports::not_declared(package_part(specifier)))?;

        let explicit = check_extension(specifier)?;
        match import {
            DependencyImport::Local { path } => self.resolve_target(specifier, &path, explicit),
            DependencyImport::Git {
                specifier: git_specifier,
            } => {
                let source = self
                    .workspace
                    .sources()
                    .resolve(&git_specifier, ResolveOptions::OFFLINE)?;
                self.resolve_target(specifier, &source.entry_path(), explicit)
            }
        }
    }

    /// Directory-first lookup of `target`
    fn resolve_target(&self, specifier: &str, target: &Path, explicit: bool) -> Result<PathBuf> {
        if explicit {
            return if target.is_file() {
                Ok(target.to_path_buf())
            } else {
                Err(imports::not_found(specifier, &[target]))
            };
        }

        let entry = target.join(self.entry_file(target)?);
        if target.is_dir() && entry.is_file() {
            return Ok(entry);
        }

        let file = with_source_extension(target);
        if file.is_file() {
            return Ok(file);
        }

        Err(imports::not_found(specifier, &[&entry, &file]))
    }

    /// Entry file name for a directory target
    fn entry_file(&self, dir: &Path) -> Result<String> {
        let declared = self
            .workspace
            .configs()
            .manifest_if_exists(&dir.join(MANIFEST_FILE))?
            .and_then(|m| m.entry().map(str::to_string));
        Ok(declared.unwrap_or_else(|| format!("{INDEX_FILE}.{SOURCE_EXTENSION}")))
    }
}

/// Whether the specifier carries an explicit `.dlang` extension
///
/// # Errors
///
/// `InvalidExtension` for any other extension.
fn check_extension(specifier: &str) -> Result<bool> {
    let last = specifier.rsplit('/').next().unwrap_or(specifier);
    let Some(extension) = Path::new(last).extension().and_then(|e| e.to_str()) else {
        return Ok(false);
    };
    if extension == SOURCE_EXTENSION {
        Ok(true)
    } else {
        Err(DepsError::InvalidExtension {
            specifier: specifier.to_string(),
            extension: extension.to_string(),
            expected: SOURCE_EXTENSION.to_string(),
        })
    }
}

fn with_source_extension(target: &Path) -> PathBuf {
    let mut file = OsString::from(target.as_os_str());
    file.push(".");
    file.push(SOURCE_EXTENSION);
    PathBuf::from(file)
}

fn prefix_matches(path: &str, key: &str) -> bool {
    !key.is_empty() && (path == key || path.strip_prefix(key).is_some_and(|r| r.starts_with('/')))
}

/// `owner/package` part of an external specifier
fn package_part(specifier: &str) -> String {
    specifier.splitn(3, '/').take(2).collect::<Vec<_>>().join("/")
}
