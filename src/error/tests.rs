//! Error type tests
//!
//! Tests for DepsError and its conversions.

#![allow(clippy::expect_used)]

use std::path::Path;

use miette::Diagnostic;

use super::DepsError;
use super::{cache, config, deps, fs, git, imports, source, workspace};

macro_rules! test_error_contains {
    ($test_name:ident, $err:expr, $($contains:expr),+ $(,)?) => {
        #[test]
        fn $test_name() {
            let err = $err;
            let error_string = err.to_string();
            $(
                assert!(error_string.contains($contains),
                    "Error message should contain '{}', got: {}",
                    $contains,
                    error_string
                );
            )+
        }
    };
}

#[test]
fn test_error_display() {
    let err = DepsError::DependencyNotInstalled {
        package: "acme/core".to_string(),
    };
    assert_eq!(err.to_string(), "Dependency 'acme/core' is not installed");
}

#[test]
fn test_error_code() {
    let err = workspace::not_found("/tmp/nowhere");
    assert_eq!(
        err.code().map(|c| c.to_string()),
        Some("dlang::workspace::not_found".to_string())
    );
}

#[test]
fn test_actionable_errors_carry_help() {
    let errs = [
        imports::not_installed("acme/core"),
        imports::not_declared("core"),
        DepsError::ManifestRequired {
            specifier: "acme/core".to_string(),
        },
        DepsError::UnknownAlias {
            alias: "@lib".to_string(),
        },
        deps::invalid("core", "missing ref"),
    ];
    for err in errs {
        assert!(err.is_actionable(), "{err} should be actionable");
        assert!(err.help().is_some(), "{err} should carry a hint");
    }
}

#[test]
fn test_unresolved_version_is_not_actionable() {
    let err = deps::unresolved_version("acme/core");
    assert!(!err.is_actionable());
    assert!(err.to_string().contains("acme/core"));
}

#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: DepsError = io_err.into();
    assert!(matches!(err, DepsError::IoError { .. }));
}

#[test]
fn test_yaml_error_conversion() {
    let parse_result: std::result::Result<serde_yaml::Value, _> =
        serde_yaml::from_str("invalid: yaml: content: [unclosed");
    let err: DepsError = parse_result.expect_err("yaml should not parse").into();
    assert!(matches!(err, DepsError::ConfigParseFailed { .. }));
}

#[test]
fn test_json_error_conversion() {
    let parse_result: std::result::Result<serde_json::Value, _> =
        serde_json::from_str("invalid json content");
    let err: DepsError = parse_result.expect_err("json should not parse").into();
    assert!(matches!(err, DepsError::ConfigParseFailed { .. }));
}

#[test]
fn test_git_error_conversion() {
    let err: DepsError = git2::Error::from_str("git error").into();
    assert!(matches!(err, DepsError::GitOperationFailed { .. }));
}

#[test]
fn test_import_not_found_lists_candidates() {
    let err = imports::not_found(
        "./widgets",
        &[
            Path::new("/ws/widgets/index.dlang"),
            Path::new("/ws/widgets.dlang"),
        ],
    );
    let message = err.to_string();
    assert!(message.contains("/ws/widgets/index.dlang"));
    assert!(message.contains("/ws/widgets.dlang"));
}

#[test]
fn test_resolution_failed_names_specifier() {
    let inner = git::clone_failed("https://github.com/acme/core", "Repository not found");
    let err = source::resolution_failed("acme/core@v1.0.0", &inner);
    assert!(matches!(err, DepsError::SourceResolutionFailed { .. }));
    assert!(err.to_string().contains("acme/core@v1.0.0"));
    assert!(err.to_string().contains("Repository not found"));
}

test_error_contains!(
    test_invalid_specifier,
    source::invalid_specifier("./local", "local paths are not git sources"),
    "Invalid dependency specifier",
    "./local"
);

test_error_contains!(
    test_ref_resolve_failed,
    git::ref_resolve_failed("nonexistent-branch", "reference not found"),
    "Failed to resolve git ref"
);

test_error_contains!(
    test_checkout_failed,
    git::checkout_failed("abc123", "object not found"),
    "Failed to checkout commit"
);

test_error_contains!(
    test_fetch_failed,
    git::fetch_failed("connection reset"),
    "Failed to fetch"
);

test_error_contains!(
    test_git_operation_failed,
    git::operation_failed("connection timed out"),
    "Git operation failed"
);

test_error_contains!(
    test_config_parse_failed,
    config::parse_failed("/ws/model.yaml", "invalid YAML"),
    "Failed to parse configuration file",
    "/ws/model.yaml"
);

test_error_contains!(
    test_config_read_failed,
    config::read_failed("/ws/model.lock", "permission denied"),
    "Failed to read configuration file"
);

test_error_contains!(
    test_config_invalid,
    config::invalid("unsupported lock file version"),
    "Invalid configuration"
);

test_error_contains!(
    test_file_write_failed,
    fs::write_failed("/ws/model.lock", "disk full"),
    "Failed to write file"
);

test_error_contains!(test_io_error, fs::io_error("some error"), "IO error");

test_error_contains!(
    test_cache_operation_failed,
    cache::operation_failed("cache directory missing"),
    "Cache operation failed"
);
