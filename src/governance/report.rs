//! Plain-text audit report
//!
//! The output depends only on the manifest, the lock file and the policy.
//! Paths, timestamps and terminal styling are left out, so CI can diff two
//! reports byte for byte.

use std::fmt::Write as _;
use std::path::Path;

use super::{GovernanceValidator, GovernanceViolation, Severity};
use crate::config::LockFile;
use crate::error::Result;
use crate::settings::MANIFEST_FILE;

const SHORT_COMMIT: usize = 7;

impl GovernanceValidator<'_> {
    /// Render the workspace, its locked dependencies and every policy violation
    pub fn generate_audit_report(&self, lock: &LockFile, workspace_root: &Path) -> Result<String> {
        render(self, lock, workspace_root)
    }
}

fn render(validator: &GovernanceValidator<'_>, lock: &LockFile, workspace_root: &Path) -> Result<String> {
    let manifest = validator
        .configs
        .manifest_if_exists(&workspace_root.join(MANIFEST_FILE))?;
    let mut violations = validator.validate(lock, workspace_root)?;
    violations.sort_by(|a, b| {
        (a.severity, &a.package_key, a.kind, &a.message).cmp(&(
            b.severity,
            &b.package_key,
            b.kind,
            &b.message,
        ))
    });

    let mut out = String::new();
    let title = "Dependency Audit Report";
    let _ = writeln!(out, "{title}\n{}\n", "=".repeat(title.len()));

    let model = manifest.as_ref().and_then(|m| m.model.as_ref());
    let metadata = manifest.as_ref().and_then(|m| m.metadata.as_ref());
    let field = |value: Option<&String>| value.map_or("-", String::as_str).to_string();
    let _ = writeln!(out, "Workspace: {}", field(model.and_then(|m| m.name.as_ref())));
    let _ = writeln!(out, "Version:   {}", field(model.and_then(|m| m.version.as_ref())));
    let _ = writeln!(out, "Team:      {}", field(metadata.and_then(|m| m.team.as_ref())));
    let _ = writeln!(out, "Contact:   {}", field(metadata.and_then(|m| m.contact.as_ref())));

    let mut keys: Vec<&str> = lock.package_keys().collect();
    keys.sort_unstable();
    let _ = writeln!(out, "\nDependencies ({})", keys.len());
    for key in keys {
        if let Some(locked) = lock.get(key) {
            let commit = locked.commit.get(..SHORT_COMMIT).unwrap_or(&locked.commit);
            let _ = writeln!(out, "  {key}@{} ({commit})", locked.version);
        }
    }

    let errors = count(&violations, Severity::Error);
    let warnings = count(&violations, Severity::Warning);
    let _ = writeln!(
        out,
        "\nViolations ({errors} errors, {warnings} warnings)"
    );
    if violations.is_empty() {
        let _ = writeln!(out, "  none");
    }
    for v in &violations {
        let _ = writeln!(
            out,
            "  [{}] {} {}: {}",
            v.severity, v.kind, v.package_key, v.message
        );
    }

    let status = if errors == 0 { "PASS" } else { "FAIL" };
    let _ = writeln!(out, "\nResult: {status}");
    Ok(out)
}

fn count(violations: &[GovernanceViolation], severity: Severity) -> usize {
    violations.iter().filter(|v| v.severity == severity).count()
}
