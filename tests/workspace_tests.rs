//! Library API tests driven by process environment settings

mod common;

use common::TestEnv;
use dlang_deps::imports::{ImportDecl, ImportResolver};
use dlang_deps::workspace::WorkspaceResolver;
use serial_test::serial;

struct EnvGuard;

impl EnvGuard {
    fn set(env: &TestEnv) -> Self {
        // SAFETY: every test touching the environment runs under #[serial]
        unsafe {
            std::env::set_var("DLANG_CACHE_DIR", env.cache_dir());
            std::env::set_var("DLANG_GIT_HOST", env.host_url());
        }
        EnvGuard
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        // SAFETY: see EnvGuard::set
        unsafe {
            std::env::remove_var("DLANG_CACHE_DIR");
            std::env::remove_var("DLANG_GIT_HOST");
        }
    }
}

#[test]
#[serial]
fn test_from_env_uses_configured_cache_and_host() {
    let env = TestEnv::new("dependencies:\n  acme/core: v1.0.0\n");
    let core = env.repo("acme", "core");
    let commit = core.commit(&[("index.dlang", "entity Core {}\n")]);
    core.tag("v1.0.0");
    let _guard = EnvGuard::set(&env);

    let resolver = WorkspaceResolver::from_env().expect("settings");
    assert_eq!(resolver.settings().cache_root, env.cache_dir());

    resolver.initialize(&env.path).expect("initialize");
    let lock = resolver.ensure_lock_file().expect("lock");
    assert_eq!(lock.get("acme/core").expect("locked").commit, commit);
    assert!(
        env.cache_dir()
            .join("local/acme/core")
            .join(&commit)
            .join("index.dlang")
            .is_file()
    );
}

#[test]
#[serial]
fn test_document_imports_resolve_per_entry() {
    let env = TestEnv::new("dependencies:\n  acme/core: v1.0.0\npaths:\n  \"@shared\": ./shared\n");
    let core = env.repo("acme", "core");
    core.commit(&[("index.dlang", ""), ("types/money.dlang", "")]);
    core.tag("v1.0.0");
    env.write_file("shared/ids.dlang", "");
    let document = env.write_file("models/order.dlang", "");
    let _guard = EnvGuard::set(&env);

    let resolver = WorkspaceResolver::from_env().expect("settings");
    resolver.initialize(&document).expect("initialize");
    resolver.ensure_lock_file().expect("lock");

    let imports = [
        ImportDecl::new("acme/core/types/money"),
        ImportDecl::new("@shared/ids"),
        ImportDecl::new("./missing"),
    ];
    let results = ImportResolver::new(&resolver).resolve_imports(&document, &imports);

    assert!(
        results[0]
            .result
            .as_ref()
            .is_ok_and(|p| p.ends_with("types/money.dlang"))
    );
    assert_eq!(
        results[1].result.as_ref().ok(),
        Some(&env.path.join("shared/ids.dlang"))
    );
    assert!(results[2].result.is_err());
}
