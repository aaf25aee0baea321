//! Git authentication callbacks
//!
//! Credentials come from git's native sources only:
//! - SSH agent, then keys from ~/.ssh/
//! - Git credential helpers
//! - Environment variables (`GIT_SSH_COMMAND`, etc.)

use git2::{Config, Cred, CredentialType, Error, ErrorClass, ErrorCode, RemoteCallbacks};

const SSH_KEY_NAMES: &[&str] = &["id_ed25519", "id_rsa", "id_ecdsa"];

fn auth_failed(message: &str) -> Error {
    Error::new(ErrorCode::Auth, ErrorClass::Http, message)
}

fn ssh_key_from_disk(username: &str) -> Result<Cred, Error> {
    let ssh_dir = dirs::home_dir().unwrap_or_default().join(".ssh");

    for key_name in SSH_KEY_NAMES {
        let private_key = ssh_dir.join(key_name);
        if !private_key.exists() {
            continue;
        }
        let public_key = ssh_dir.join(format!("{key_name}.pub"));
        let public_key = public_key.exists().then_some(public_key.as_path());

        if let Ok(cred) = Cred::ssh_key(username, public_key, &private_key, None) {
            return Ok(cred);
        }
    }

    Err(auth_failed("SSH key not found"))
}

fn credential_helper(url: &str, username_from_url: Option<&str>) -> Result<Cred, Error> {
    let config = Config::open_default().or_else(|_| Config::new())?;

    Cred::credential_helper(&config, url, username_from_url)
        .or_else(|_| Cred::userpass_plaintext(username_from_url.unwrap_or(""), ""))
        .map_err(|_| auth_failed("authentication failed"))
}

/// Install credential callbacks that defer to git's own configuration
pub(crate) fn setup_auth_callbacks(callbacks: &mut RemoteCallbacks<'_>) {
    callbacks.credentials(|url, username_from_url, allowed_types| {
        if allowed_types.contains(CredentialType::DEFAULT) {
            return Cred::default();
        }

        if allowed_types.contains(CredentialType::SSH_KEY) {
            let username = username_from_url.unwrap_or("git");
            return Cred::ssh_key_from_agent(username).or_else(|_| ssh_key_from_disk(username));
        }

        if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) {
            return credential_helper(url, username_from_url);
        }

        Err(auth_failed("authentication failed"))
    });
}
