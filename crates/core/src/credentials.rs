//! # Credential Resolution
//!
//! API keys arrive from the UI form when the user pasted them, otherwise
//! from the read-only secret store snapshotted at startup. Resolved keys
//! are carried in an explicit [`Credentials`] value passed into the client
//! constructors; the process environment is never mutated during a run.
//!
//! The length check is a rough plausibility filter, not validation: a
//! short garbage value falls through to the store here, a long garbage
//! value fails later at the external call.

use std::collections::HashMap;
use std::fmt;

use crate::error::PipelineError;

/// Secret store key for the Anthropic API key.
pub const ANTHROPIC_KEY: &str = "ANTHROPIC_API_KEY";

/// Secret store key for the Serper API key.
pub const SERPER_KEY: &str = "SERPER_API_KEY";

/// User input at or below this length falls through to the secret store.
const MIN_USER_KEY_LEN: usize = 10;

/// Read-only credential store, snapshotted once at startup.
#[derive(Debug, Clone, Default)]
pub struct SecretStore {
    entries: HashMap<String, String>,
}

impl SecretStore {
    /// Snapshot the process environment.
    pub fn from_env() -> Self {
        Self {
            entries: std::env::vars().collect(),
        }
    }

    /// Build a store from explicit pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

/// Resolve a single credential.
///
/// User input wins when it is non-empty and longer than ten characters;
/// otherwise the store is consulted. Returns `None` when neither source
/// has a value - the caller decides how to react.
pub fn resolve(user_input: Option<&str>, key: &str, store: &SecretStore) -> Option<String> {
    if let Some(input) = user_input {
        if !input.is_empty() && input.len() > MIN_USER_KEY_LEN {
            return Some(input.to_string());
        }
    }
    store.get(key).map(str::to_string)
}

/// Resolved API keys for one run. Never persisted.
#[derive(Clone)]
pub struct Credentials {
    pub anthropic: String,
    pub serper: String,
}

impl Credentials {
    /// Resolve both required keys, naming every missing one in the error.
    pub fn resolve(
        store: &SecretStore,
        anthropic_input: Option<&str>,
        serper_input: Option<&str>,
    ) -> Result<Self, PipelineError> {
        let anthropic = resolve(anthropic_input, ANTHROPIC_KEY, store);
        let serper = resolve(serper_input, SERPER_KEY, store);

        match (anthropic, serper) {
            (Some(anthropic), Some(serper)) => Ok(Self { anthropic, serper }),
            (anthropic, serper) => {
                let mut keys = Vec::new();
                if anthropic.is_none() {
                    keys.push(ANTHROPIC_KEY.to_string());
                }
                if serper.is_none() {
                    keys.push(SERPER_KEY.to_string());
                }
                Err(PipelineError::MissingCredentials { keys })
            }
        }
    }
}

impl fmt::Debug for Credentials {
    /// Keys never end up in logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("anthropic", &"<redacted>")
            .field("serper", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(key: &str, value: &str) -> SecretStore {
        SecretStore::from_pairs([(key, value)])
    }

    #[test]
    fn test_long_user_input_wins_over_store() {
        let store = store_with(ANTHROPIC_KEY, "store-value");
        let resolved = resolve(Some("sk-ant-user-key"), ANTHROPIC_KEY, &store);
        assert_eq!(resolved.as_deref(), Some("sk-ant-user-key"));
    }

    #[test]
    fn test_short_user_input_falls_through_to_store() {
        let store = store_with(ANTHROPIC_KEY, "store-value");
        // Exactly ten characters is not "longer than 10".
        assert_eq!(
            resolve(Some("0123456789"), ANTHROPIC_KEY, &store).as_deref(),
            Some("store-value")
        );
        assert_eq!(
            resolve(Some(""), ANTHROPIC_KEY, &store).as_deref(),
            Some("store-value")
        );
        assert_eq!(
            resolve(None, ANTHROPIC_KEY, &store).as_deref(),
            Some("store-value")
        );
    }

    #[test]
    fn test_missing_everywhere_is_none() {
        let store = SecretStore::default();
        assert_eq!(resolve(Some("short"), ANTHROPIC_KEY, &store), None);
        assert_eq!(resolve(None, ANTHROPIC_KEY, &store), None);
    }

    #[test]
    fn test_credentials_resolve_both_present() {
        let store = SecretStore::from_pairs([
            (ANTHROPIC_KEY, "sk-ant-from-store"),
            (SERPER_KEY, "serper-from-store"),
        ]);
        let creds = Credentials::resolve(&store, None, None).unwrap();
        assert_eq!(creds.anthropic, "sk-ant-from-store");
        assert_eq!(creds.serper, "serper-from-store");
    }

    #[test]
    fn test_credentials_resolve_names_every_missing_key() {
        let store = store_with(ANTHROPIC_KEY, "sk-ant-from-store");
        let err = Credentials::resolve(&store, None, None).unwrap_err();
        match err {
            PipelineError::MissingCredentials { keys } => {
                assert_eq!(keys, vec![SERPER_KEY.to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }

        let empty = SecretStore::default();
        let err = Credentials::resolve(&empty, Some("short"), None).unwrap_err();
        match err {
            PipelineError::MissingCredentials { keys } => {
                assert_eq!(keys.len(), 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_debug_redacts_keys() {
        let creds = Credentials {
            anthropic: "sk-ant-secret".to_string(),
            serper: "serper-secret".to_string(),
        };
        let debug = format!("{creds:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }
}
