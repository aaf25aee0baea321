//! Audit command implementation
//!
//! Prints the governance report (or the violations as JSON) and reports
//! whether the workspace passed.

use std::path::PathBuf;

use serde::Serialize;

use dlang_deps::error::Result;
use dlang_deps::governance::{GovernanceValidator, GovernanceViolation, Severity};

use super::open_workspace;
use crate::cli::AuditArgs;

#[derive(Serialize)]
struct AuditJson<'a> {
    passed: bool,
    violations: &'a [GovernanceViolation],
}

/// Run audit command; `Ok(false)` when any violation is an error
pub fn run(workspace: Option<PathBuf>, args: AuditArgs) -> Result<bool> {
    let resolver = open_workspace(workspace)?;
    let lock = resolver.ensure_lock_file()?;
    let root = resolver.workspace_root()?;

    let validator = GovernanceValidator::for_workspace(&root, resolver.sources(), resolver.configs())?;
    let violations = validator.validate(&lock, &root)?;
    let passed = passed(&violations);

    if args.json {
        let json = serde_json::to_string_pretty(&AuditJson {
            passed,
            violations: &violations,
        })?;
        println!("{json}");
    } else {
        print!("{}", validator.generate_audit_report(&lock, &root)?);
    }
    Ok(passed)
}

fn passed(violations: &[GovernanceViolation]) -> bool {
    violations.iter().all(|v| v.severity != Severity::Error)
}
