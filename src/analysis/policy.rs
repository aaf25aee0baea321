//! Version selection policies (`latest`, `stable`, or a pinned version)

use std::fmt;
use std::str::FromStr;

use crate::error::{DepsError, Result};
use crate::version;

/// How to pick one version from the available tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionPolicy {
    /// Highest version, pre-releases included; branch names never qualify
    Latest,
    /// Highest version that is not a pre-release
    Stable,
    /// Exactly this version (`1.2.0` also matches `v1.2.0`)
    Pinned(String),
}

impl FromStr for VersionPolicy {
    type Err = DepsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "" => Err(DepsError::ConfigInvalid {
                message: "version policy cannot be empty".to_string(),
            }),
            "latest" => Ok(VersionPolicy::Latest),
            "stable" => Ok(VersionPolicy::Stable),
            pinned => Ok(VersionPolicy::Pinned(pinned.to_string())),
        }
    }
}

impl fmt::Display for VersionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionPolicy::Latest => f.write_str("latest"),
            VersionPolicy::Stable => f.write_str("stable"),
            VersionPolicy::Pinned(v) => f.write_str(v),
        }
    }
}

/// Outcome of [`resolve_version_policy`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSelection {
    pub package: String,
    pub policy: VersionPolicy,
    pub version: String,
    /// Versions the policy considered, ascending
    pub candidates: Vec<String>,
}

/// Pick a version of `package` from `available` according to `policy`
///
/// # Errors
///
/// `NoMatchingVersion` when no available version satisfies the policy.
pub fn resolve_version_policy(
    package: &str,
    policy: &VersionPolicy,
    available: &[String],
) -> Result<VersionSelection> {
    let mut candidates: Vec<String> = available
        .iter()
        .filter(|v| match policy {
            VersionPolicy::Latest => version::parse_version(v).is_some(),
            VersionPolicy::Stable => {
                version::parse_version(v).is_some() && !version::is_prerelease(v)
            }
            VersionPolicy::Pinned(pinned) => pins_match(pinned, v),
        })
        .cloned()
        .collect();
    version::sort_versions(&mut candidates);

    let chosen = match policy {
        // Prefer the literal spelling when both `1.2.0` and `v1.2.0` exist
        VersionPolicy::Pinned(pinned) => candidates
            .iter()
            .find(|v| *v == pinned)
            .or_else(|| candidates.last())
            .cloned(),
        VersionPolicy::Latest | VersionPolicy::Stable => candidates.last().cloned(),
    };

    let Some(version) = chosen else {
        return Err(DepsError::NoMatchingVersion {
            package: package.to_string(),
            policy: policy.to_string(),
        });
    };

    Ok(VersionSelection {
        package: package.to_string(),
        policy: policy.clone(),
        version,
        candidates,
    })
}

fn pins_match(pinned: &str, candidate: &str) -> bool {
    if pinned == candidate {
        return true;
    }
    match (version::parse_version(pinned), version::parse_version(candidate)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
