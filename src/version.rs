//! Ref classification and version comparison
//!
//! Refs arrive as free-form strings from manifests (`v1.2.0`, `main`,
//! `3f2a9c1`, `^1.0.0`). This module decides what kind of ref a string is and
//! orders version-like tags. It does not solve ranges: a constraint collapses
//! to one concrete token via [`concrete_version`].

use std::cmp::Ordering;

use semver::Version;

/// Markers that make a version string a pre-release for governance purposes
pub const PRERELEASE_MARKERS: &[&str] = &["alpha", "beta", "rc", "pre", "dev", "snapshot"];

/// What a ref string refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    /// Full or abbreviated commit hash
    Commit,
    /// Version-like tag (`v1.2.0`, `2.0`, `1.0.0-beta.1`)
    Tag,
    /// Anything else
    Branch,
}

/// Classify a ref string
pub fn classify_ref(git_ref: &str) -> RefKind {
    if is_commit_hash(git_ref) {
        RefKind::Commit
    } else if parse_version(git_ref).is_some() {
        RefKind::Tag
    } else {
        RefKind::Branch
    }
}

/// Whether a ref looks like a commit hash (7 to 40 hex characters)
pub fn is_commit_hash(git_ref: &str) -> bool {
    (7..=40).contains(&git_ref.len()) && git_ref.chars().all(|c| c.is_ascii_hexdigit())
}

/// Whether a ref is a full 40-character commit hash
pub fn is_full_commit_hash(git_ref: &str) -> bool {
    git_ref.len() == 40 && git_ref.chars().all(|c| c.is_ascii_hexdigit())
}

/// Parse a version-like string, tolerating a leading `v` and missing components
///
/// `v1` → `1.0.0`, `1.2` → `1.2.0`, `v2.0.0-beta` → `2.0.0-beta`.
pub fn parse_version(input: &str) -> Option<Version> {
    let trimmed = input
        .trim()
        .strip_prefix(['v', 'V'])
        .unwrap_or(input.trim());

    if let Ok(version) = Version::parse(trimmed) {
        return Some(version);
    }

    // Pad "1" / "1.2" (with optional pre-release) to three components
    let (core, rest) = match trimmed.find(['-', '+']) {
        Some(idx) => trimmed.split_at(idx),
        None => (trimmed, ""),
    };
    let parts: Vec<&str> = core.split('.').collect();
    if parts.is_empty()
        || parts.len() > 2
        || parts
            .iter()
            .any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit()))
    {
        return None;
    }
    let padded = match parts.len() {
        1 => format!("{}.0.0{rest}", parts[0]),
        _ => format!("{}.{}.0{rest}", parts[0], parts[1]),
    };
    Version::parse(&padded).ok()
}

/// Whether a version string denotes a pre-release
///
/// True for semver pre-releases and for any string carrying one of the
/// [`PRERELEASE_MARKERS`], so `1.0.0-SNAPSHOT` and `nightly-dev` both count.
pub fn is_prerelease(input: &str) -> bool {
    if parse_version(input).is_some_and(|v| !v.pre.is_empty()) {
        return true;
    }
    let lower = input.to_ascii_lowercase();
    PRERELEASE_MARKERS.iter().any(|m| lower.contains(m))
}

/// Compare two version strings
///
/// Parseable versions compare by semver precedence and sort above anything
/// unparseable; two unparseable strings compare lexically.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    match (parse_version(a), parse_version(b)) {
        (Some(va), Some(vb)) => va.cmp(&vb).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => a.cmp(b),
    }
}

/// Sort versions ascending by [`compare_versions`]
pub fn sort_versions(versions: &mut [String]) {
    versions.sort_by(|a, b| compare_versions(a, b));
}

/// Collapse a declared constraint to a concrete ref token
///
/// Strips an embedded `pkg@` prefix and any leading range operator
/// (`^`, `~`, `>=`, `<=`, `>`, `<`, `=`): `^1.2.0` → `1.2.0`,
/// `acme/core@~2.0` → `2.0`, `>= 1.0` → `1.0`, `main` → `main`.
/// `^1.2.0` and `^1.5.0` are not reconciled into one compatible version;
/// each collapses to its own pin.
pub fn concrete_version(constraint: &str) -> String {
    let token = constraint
        .rsplit_once('@')
        .map_or(constraint, |(_, version)| version)
        .trim();
    token
        .trim_start_matches(|c: char| matches!(c, '^' | '~' | '>' | '<' | '=') || c.is_whitespace())
        .to_string()
}

/// Alternate tag spelling to try when a version-like ref is not found
///
/// `1.2.0` ↔ `v1.2.0`. Returns `None` for refs that are not version-like.
pub fn alternate_tag(git_ref: &str) -> Option<String> {
    parse_version(git_ref)?;
    match git_ref.strip_prefix('v') {
        Some(bare) => Some(bare.to_string()),
        None => Some(format!("v{git_ref}")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_ref() {
        assert_eq!(
            classify_ref("3f2a9c1d4e5b6a7980f1e2d3c4b5a69788796a5b"),
            RefKind::Commit
        );
        assert_eq!(classify_ref("3f2a9c1"), RefKind::Commit);
        assert_eq!(classify_ref("v1.2.0"), RefKind::Tag);
        assert_eq!(classify_ref("2.0"), RefKind::Tag);
        assert_eq!(classify_ref("v2.0.0-beta"), RefKind::Tag);
        assert_eq!(classify_ref("main"), RefKind::Branch);
        assert_eq!(classify_ref("feature/login"), RefKind::Branch);
    }

    #[test]
    fn test_short_hex_words_are_commits() {
        // "deadbeef" is valid hex, so it classifies as a commit
        assert_eq!(classify_ref("deadbeef"), RefKind::Commit);
        assert_eq!(classify_ref("cafe"), RefKind::Branch);
    }

    #[test]
    fn test_parse_version_padding() {
        assert_eq!(parse_version("v1").unwrap(), Version::new(1, 0, 0));
        assert_eq!(parse_version("1.2").unwrap(), Version::new(1, 2, 0));
        assert_eq!(parse_version("V3.4.5").unwrap(), Version::new(3, 4, 5));
        let beta = parse_version("v2.0-beta").unwrap();
        assert_eq!(beta.major, 2);
        assert!(!beta.pre.is_empty());
        assert!(parse_version("main").is_none());
        assert!(parse_version("1.2.3.4").is_none());
        assert!(parse_version("").is_none());
    }

    #[test]
    fn test_compare_versions() {
        assert_eq!(compare_versions("v1.0.0", "v2.0.0"), Ordering::Less);
        assert_eq!(compare_versions("v2.0.0-beta", "v1.5.0"), Ordering::Greater);
        assert_eq!(compare_versions("v2.0.0-beta", "v2.0.0"), Ordering::Less);
        assert_eq!(compare_versions("1.10.0", "1.9.0"), Ordering::Greater);
        assert_eq!(compare_versions("main", "v0.0.1"), Ordering::Less);
    }

    #[test]
    fn test_sort_versions() {
        let mut versions = vec![
            "v1.10.0".to_string(),
            "v1.2.0".to_string(),
            "nightly".to_string(),
            "v1.9.0".to_string(),
        ];
        sort_versions(&mut versions);
        assert_eq!(versions, ["nightly", "v1.2.0", "v1.9.0", "v1.10.0"]);
    }

    #[test]
    fn test_is_prerelease() {
        assert!(is_prerelease("v2.0.0-beta"));
        assert!(is_prerelease("1.0.0-rc.1"));
        assert!(is_prerelease("1.0.0-SNAPSHOT"));
        assert!(is_prerelease("nightly-dev"));
        assert!(!is_prerelease("v1.5.0"));
        assert!(!is_prerelease("main"));
    }

    #[test]
    fn test_concrete_version() {
        assert_eq!(concrete_version("^1.2.0"), "1.2.0");
        assert_eq!(concrete_version("~2.0"), "2.0");
        assert_eq!(concrete_version("acme/core@^1.4.0"), "1.4.0");
        assert_eq!(concrete_version("v1.0.0"), "v1.0.0");
        assert_eq!(concrete_version("main"), "main");
    }

    #[test]
    fn test_concrete_version_comparison_operators() {
        assert_eq!(concrete_version(">=1.0"), "1.0");
        assert_eq!(concrete_version(">= 1.0"), "1.0");
        assert_eq!(concrete_version("<2.0.0"), "2.0.0");
        assert_eq!(concrete_version("=2.1.0"), "2.1.0");
        assert_eq!(concrete_version("acme/core@>=v1.4.0"), "v1.4.0");
    }

    #[test]
    fn test_alternate_tag() {
        assert_eq!(alternate_tag("1.2.0").as_deref(), Some("v1.2.0"));
        assert_eq!(alternate_tag("v1.2.0").as_deref(), Some("1.2.0"));
        assert_eq!(alternate_tag("main"), None);
    }
}
