//! Workspace manifest (model.yaml)
//!
//! The core never writes manifests; they are edited by hand and read here.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{DepsError, Result, config, deps};
use crate::governance::GovernancePolicy;

/// Parsed `model.yaml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelInfo>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,

    /// Import alias prefix → directory, relative to the workspace root
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub paths: IndexMap<String, String>,

    /// Alias → declaration, in declaration order
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub dependencies: IndexMap<String, DependencySpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub governance: Option<GovernancePolicy>,
}

/// The `model` block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Entry file, relative to the manifest's directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,
    /// SPDX license identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
}

/// Ownership metadata used by governance checks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

/// A dependency as written in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependencySpec {
    /// `"owner/repo": "ref"` or `alias: "owner/repo@ref"`
    Short(String),
    /// `{ source, ref }` or `{ path }`
    Long(DependencyDecl),
}

/// Long-form dependency declaration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyDecl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,
}

/// A validated dependency
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dependency {
    Git {
        alias: String,
        /// Specifier without the ref (`acme/core`, `https://…`)
        source: String,
        /// Declared ref or constraint (`v1.0.0`, `^2.1.0`, `main`)
        git_ref: String,
    },
    Local {
        alias: String,
        /// Directory relative to the declaring manifest
        path: String,
    },
}

impl Dependency {
    pub fn alias(&self) -> &str {
        match self {
            Dependency::Git { alias, .. } | Dependency::Local { alias, .. } => alias,
        }
    }
}

impl DependencySpec {
    /// Validate and normalize a declaration
    pub fn resolve(&self, alias: &str) -> Result<Dependency> {
        match self {
            DependencySpec::Short(value) => {
                let value = value.trim();
                if value.is_empty() {
                    return Err(deps::invalid(alias, "missing ref"));
                }
                // `alias: owner/repo@ref` names its own source
                if let Some((source, git_ref)) = value.rsplit_once('@') {
                    if source.contains('/') && !git_ref.is_empty() {
                        return Ok(Dependency::Git {
                            alias: alias.to_string(),
                            source: source.to_string(),
                            git_ref: git_ref.to_string(),
                        });
                    }
                }
                Ok(Dependency::Git {
                    alias: alias.to_string(),
                    source: alias.to_string(),
                    git_ref: value.to_string(),
                })
            }
            DependencySpec::Long(decl) => decl.resolve(alias),
        }
    }
}

impl DependencyDecl {
    fn resolve(&self, alias: &str) -> Result<Dependency> {
        match (&self.source, &self.path) {
            (Some(_), Some(_)) => Err(deps::invalid(
                alias,
                "declares both 'source' and 'path'",
            )),
            (None, None) => Err(deps::invalid(alias, "declares neither 'source' nor 'path'")),
            (Some(source), None) => {
                let git_ref = self
                    .git_ref
                    .as_deref()
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .ok_or_else(|| deps::invalid(alias, "git source requires a 'ref'"))?;
                Ok(Dependency::Git {
                    alias: alias.to_string(),
                    source: source.trim().to_string(),
                    git_ref: git_ref.to_string(),
                })
            }
            (None, Some(path)) => {
                if path.starts_with('/') || Path::new(path).is_absolute() {
                    return Err(deps::invalid(alias, "'path' must be relative"));
                }
                Ok(Dependency::Local {
                    alias: alias.to_string(),
                    path: path.clone(),
                })
            }
        }
    }
}

impl Manifest {
    /// Parse manifest YAML
    ///
    /// An empty document is an empty manifest.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(DepsError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        let content = fs::read_to_string(path)
            .map_err(|e| config::read_failed(path.display().to_string(), e.to_string()))?;
        Self::from_yaml(&content).map_err(|e| match e {
            DepsError::ConfigParseFailed { reason, .. } => {
                config::parse_failed(path.display().to_string(), reason)
            }
            other => other,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.model.as_ref()?.name.as_deref()
    }

    /// Declared entry file, if any
    pub fn entry(&self) -> Option<&str> {
        self.model.as_ref()?.entry.as_deref()
    }

    pub fn license(&self) -> Option<&str> {
        self.model.as_ref()?.license.as_deref()
    }

    /// Look up one dependency by alias
    pub fn dependency(&self, alias: &str) -> Result<Option<Dependency>> {
        self.dependencies
            .get(alias)
            .map(|spec| spec.resolve(alias))
            .transpose()
    }

    /// Every declared dependency, validated, in declaration order
    pub fn resolved_dependencies(&self) -> Result<Vec<Dependency>> {
        self.dependencies
            .iter()
            .map(|(alias, spec)| spec.resolve(alias))
            .collect()
    }
}
