//! API key resolution and storage.
//!
//! The key is looked up once at startup: system keyring first (unless
//! `--env-only`), then the `OPENAI_API_KEY` environment variable. Absence
//! is fatal; nothing is served without credentials.

use keyring::Entry;
use std::error::Error as StdError;
use std::fmt;

use crate::core::constants::DEFAULT_OPENAI_BASE_URL;

const KEYRING_SERVICE: &str = "studiolo";
const KEYRING_USER: &str = "openai";

#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: String,
    pub base_url: String,
}

/// No API key could be resolved at startup.
#[derive(Debug)]
pub struct AuthError;

impl AuthError {
    pub fn quick_fixes(&self) -> Vec<&'static str> {
        vec![
            "Run `studiolo auth` to store an API key in your system keyring",
            "Or export OPENAI_API_KEY=\"your-api-key-here\"",
            "Optionally export OPENAI_BASE_URL for a custom endpoint",
        ]
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "No API key configured")
    }
}

impl StdError for AuthError {}

fn keyring_entry() -> Result<Entry, keyring::Error> {
    Entry::new(KEYRING_SERVICE, KEYRING_USER)
}

fn api_key_from_keyring() -> Option<String> {
    let entry = match keyring_entry() {
        Ok(entry) => entry,
        Err(e) => {
            tracing::debug!(error = %e, "keyring unavailable");
            return None;
        }
    };
    match entry.get_password() {
        Ok(key) if !key.is_empty() => Some(key),
        Ok(_) => None,
        Err(keyring::Error::NoEntry) => None,
        Err(e) => {
            tracing::debug!(error = %e, "keyring lookup failed");
            None
        }
    }
}

/// Resolve credentials for this run. `env_only` skips the keyring, which
/// keeps tests and constrained environments deterministic.
pub fn resolve_credentials(env_only: bool) -> Result<Credentials, AuthError> {
    let base_url = std::env::var("OPENAI_BASE_URL")
        .ok()
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());

    let api_key = if env_only {
        None
    } else {
        api_key_from_keyring()
    };

    let api_key = api_key
        .or_else(|| {
            std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty())
        })
        .ok_or(AuthError)?;

    Ok(Credentials { api_key, base_url })
}

/// Store an API key in the system keyring (the `auth` subcommand).
pub fn store_api_key(api_key: &str) -> Result<(), Box<dyn StdError>> {
    keyring_entry()?.set_password(api_key)?;
    Ok(())
}

/// Remove the stored API key (the `deauth` subcommand).
pub fn remove_api_key() -> Result<(), Box<dyn StdError>> {
    match keyring_entry()?.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(Box::new(e)),
    }
}
