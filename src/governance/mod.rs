//! Organizational policy checks over a lock file
//!
//! The policy lives in the workspace manifest's `governance` block. Every
//! field is optional and an absent field places no restriction. Findings are
//! returned as [`GovernanceViolation`] values; they are never errors.

mod report;

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;
use wax::{CandidatePath, Glob, Pattern};

use crate::analysis::locked_manifest;
use crate::config::{ConfigCache, LockFile, LockedDependency, Manifest};
use crate::error::Result;
use crate::resolver::WORKSPACE_PARENT;
use crate::settings::MANIFEST_FILE;
use crate::source::GitSourceResolver;
use crate::version;

/// The manifest's `governance` block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GovernancePolicy {
    /// Host/owner prefixes (`github.com/acme`) or globs a source must match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_sources: Option<Vec<String>>,

    /// Substrings that reject a package key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_packages: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_stable_versions: Option<bool>,

    /// Require `metadata.team` and `metadata.contact` on the workspace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_team_ownership: Option<bool>,

    /// SPDX identifiers a dependency's `model.license` must be one of
    /// (compared case-insensitively)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_licenses: Option<Vec<String>>,
}

/// What a violation is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationKind {
    BlockedSource,
    BlockedPackage,
    UnstableVersion,
    MissingMetadata,
    DisallowedLicense,
    UnknownLicense,
}

impl ViolationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ViolationKind::BlockedSource => "blocked-source",
            ViolationKind::BlockedPackage => "blocked-package",
            ViolationKind::UnstableVersion => "unstable-version",
            ViolationKind::MissingMetadata => "missing-metadata",
            ViolationKind::DisallowedLicense => "disallowed-license",
            ViolationKind::UnknownLicense => "unknown-license",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors sort before warnings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        })
    }
}

/// One policy finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GovernanceViolation {
    #[serde(rename = "type")]
    pub kind: ViolationKind,
    pub package_key: String,
    pub message: String,
    pub severity: Severity,
}

impl GovernanceViolation {
    fn error(kind: ViolationKind, package_key: &str, message: String) -> Self {
        Self {
            kind,
            package_key: package_key.to_string(),
            message,
            severity: Severity::Error,
        }
    }

    fn warning(kind: ViolationKind, package_key: &str, message: String) -> Self {
        Self {
            kind,
            package_key: package_key.to_string(),
            message,
            severity: Severity::Warning,
        }
    }
}

/// Checks a lock file against a [`GovernancePolicy`]
pub struct GovernanceValidator<'a> {
    policy: GovernancePolicy,
    sources: &'a GitSourceResolver,
    configs: &'a ConfigCache,
}

impl<'a> GovernanceValidator<'a> {
    pub fn new(
        policy: GovernancePolicy,
        sources: &'a GitSourceResolver,
        configs: &'a ConfigCache,
    ) -> Self {
        Self {
            policy,
            sources,
            configs,
        }
    }

    /// Validator for the policy declared in `workspace_root/model.yaml`
    pub fn for_workspace(
        workspace_root: &Path,
        sources: &'a GitSourceResolver,
        configs: &'a ConfigCache,
    ) -> Result<Self> {
        let manifest = configs.manifest(&workspace_root.join(MANIFEST_FILE))?;
        let policy = manifest.governance.clone().unwrap_or_default();
        Ok(Self::new(policy, sources, configs))
    }

    pub fn policy(&self) -> &GovernancePolicy {
        &self.policy
    }

    /// Collect every violation, in lock order, followed by workspace checks
    ///
    /// # Errors
    ///
    /// Only when a manifest cannot be read or parsed. Policy findings are
    /// always returned as values.
    pub fn validate(
        &self,
        lock: &LockFile,
        workspace_root: &Path,
    ) -> Result<Vec<GovernanceViolation>> {
        let mut violations = Vec::new();

        for (package_key, locked) in &lock.dependencies {
            self.check_source(package_key, locked, &mut violations);
            self.check_blocked(package_key, &mut violations);
            self.check_stability(package_key, locked, &mut violations);
            self.check_license(package_key, locked, &mut violations)?;
        }

        if self.policy.require_team_ownership == Some(true) {
            let manifest = self
                .configs
                .manifest_if_exists(&workspace_root.join(MANIFEST_FILE))?;
            check_ownership(manifest.as_deref(), &mut violations);
        }

        debug!(count = violations.len(), "governance validation finished");
        Ok(violations)
    }

    fn check_source(
        &self,
        package_key: &str,
        locked: &LockedDependency,
        violations: &mut Vec<GovernanceViolation>,
    ) {
        let Some(allowed) = self.policy.allowed_sources.as_ref().filter(|a| !a.is_empty()) else {
            return;
        };
        let location = source_location(&locked.resolved);
        if allowed
            .iter()
            .any(|pattern| source_matches(pattern, &location) || source_matches(pattern, package_key))
        {
            return;
        }
        violations.push(GovernanceViolation::error(
            ViolationKind::BlockedSource,
            package_key,
            format!(
                "source '{}' is not in allowedSources ({})",
                if locked.resolved.starts_with("file:") { package_key } else { location.as_str() },
                allowed.join(", ")
            ),
        ));
    }

    fn check_blocked(&self, package_key: &str, violations: &mut Vec<GovernanceViolation>) {
        let Some(blocked) = &self.policy.blocked_packages else {
            return;
        };
        if let Some(entry) = blocked
            .iter()
            .find(|b| !b.is_empty() && package_key.contains(b.as_str()))
        {
            violations.push(GovernanceViolation::error(
                ViolationKind::BlockedPackage,
                package_key,
                format!("package matches blocked entry '{entry}'"),
            ));
        }
    }

    fn check_stability(
        &self,
        package_key: &str,
        locked: &LockedDependency,
        violations: &mut Vec<GovernanceViolation>,
    ) {
        if self.policy.require_stable_versions == Some(true) && version::is_prerelease(&locked.version)
        {
            violations.push(GovernanceViolation::error(
                ViolationKind::UnstableVersion,
                package_key,
                format!("version '{}' is a pre-release", locked.version),
            ));
        }
    }

    fn check_license(
        &self,
        package_key: &str,
        locked: &LockedDependency,
        violations: &mut Vec<GovernanceViolation>,
    ) -> Result<()> {
        let Some(allowed) = self.policy.allowed_licenses.as_ref().filter(|a| !a.is_empty()) else {
            return Ok(());
        };
        let manifest = locked_manifest(self.sources, self.configs, locked)?;
        match manifest.as_deref().and_then(Manifest::license) {
            None => violations.push(GovernanceViolation::warning(
                ViolationKind::UnknownLicense,
                package_key,
                "package declares no license".to_string(),
            )),
            Some(license) if !allowed.iter().any(|a| a.eq_ignore_ascii_case(license)) => {
                violations.push(GovernanceViolation::error(
                    ViolationKind::DisallowedLicense,
                    package_key,
                    format!(
                        "license '{license}' is not in allowedLicenses ({})",
                        allowed.join(", ")
                    ),
                ));
            }
            Some(_) => {}
        }
        Ok(())
    }
}

fn check_ownership(manifest: Option<&Manifest>, violations: &mut Vec<GovernanceViolation>) {
    let label = manifest
        .and_then(Manifest::name)
        .unwrap_or(WORKSPACE_PARENT);
    let metadata = manifest.and_then(|m| m.metadata.as_ref());
    let present = |value: Option<&String>| value.is_some_and(|v| !v.trim().is_empty());

    if !present(metadata.and_then(|m| m.team.as_ref())) {
        violations.push(GovernanceViolation::error(
            ViolationKind::MissingMetadata,
            label,
            "workspace declares no metadata.team".to_string(),
        ));
    }
    if !present(metadata.and_then(|m| m.contact.as_ref())) {
        violations.push(GovernanceViolation::warning(
            ViolationKind::MissingMetadata,
            label,
            "workspace declares no metadata.contact".to_string(),
        ));
    }
}

/// `host/owner/repo` form of a clone URL
///
/// `https://github.com/acme/core.git`, `ssh://git@github.com:22/acme/core` and
/// `git@github.com:acme/core` all become `github.com/acme/core`. Userinfo and
/// ports never take part in matching.
fn source_location(url: &str) -> String {
    let (authority, path) = match url.split_once("://") {
        Some((_, rest)) => {
            let (authority, path) = rest.split_once('/').unwrap_or((rest, ""));
            (strip_port(strip_userinfo(authority)), path)
        }
        None => match url.split_once(':') {
            Some((authority, path)) if !authority.contains('/') => (strip_userinfo(authority), path),
            _ => return url.trim_end_matches('/').trim_end_matches(".git").to_string(),
        },
    };
    let path = path.trim_matches('/').trim_end_matches(".git");
    format!("{authority}/{path}")
}

fn strip_userinfo(authority: &str) -> &str {
    authority.rsplit_once('@').map_or(authority, |(_, host)| host)
}

fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        return host.split_once(']').map_or(host, |(v6, _)| &host[..=v6.len()]);
    }
    host.split_once(':').map_or(host, |(name, _)| name)
}

/// Segment-aware prefix match, or a glob when the pattern contains glob syntax
fn source_matches(pattern: &str, candidate: &str) -> bool {
    let pattern = pattern.trim().trim_end_matches('/');
    if pattern.is_empty() {
        return false;
    }
    if pattern.contains(['*', '?', '[', '{']) {
        return Glob::new(pattern)
            .map(|glob| glob.matched(&CandidatePath::from(candidate)).is_some())
            .unwrap_or(false);
    }
    candidate == pattern || candidate.starts_with(&format!("{pattern}/"))
}
