//! Bearer credential lookup.
//!
//! A `CredentialStore` is a read-only key/value source. The token is looked up
//! under `ACCESS_TOKEN_KEY`; when the store has nothing, the configured
//! fallback token is used instead. There is no expiry or refresh.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

/// Key under which the access token is stored.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Read-only key/value lookup for credentials.
pub trait CredentialStore {
    fn get(&self, key: &str) -> Option<String>;
}

impl<S: CredentialStore + ?Sized> CredentialStore for &S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
}

impl<S: CredentialStore + ?Sized> CredentialStore for Arc<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
}

/// Resolve the bearer token: the stored value if present and non-empty,
/// otherwise `fallback`.
pub fn resolve_bearer_token<S: CredentialStore + ?Sized>(store: &S, fallback: &str) -> String {
    match store.get(ACCESS_TOKEN_KEY).filter(|token| !token.is_empty()) {
        Some(token) => {
            debug!("using stored access token");
            token
        }
        None => {
            debug!("no stored access token, using fallback");
            fallback.to_string()
        }
    }
}

/// In-process store. Shared behind `&` so a login flow can update it while
/// the service reads from it.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_access_token(token: &str) -> Self {
        let store = Self::new();
        store.set(ACCESS_TOKEN_KEY, token);
        store
    }

    pub fn set(&self, key: &str, value: &str) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

/// Reads credentials from environment variables.
///
/// `accessToken` is looked up as `<prefix>ACCESS_TOKEN`.
#[derive(Debug, Clone)]
pub struct EnvCredentialStore {
    prefix: String,
}

impl Default for EnvCredentialStore {
    fn default() -> Self {
        Self::with_prefix("POSTS_")
    }
}

impl EnvCredentialStore {
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }

    pub fn var_name(&self, key: &str) -> String {
        let mut name = self.prefix.clone();
        for (i, ch) in key.chars().enumerate() {
            if ch.is_ascii_uppercase() && i > 0 {
                name.push('_');
            }
            name.push(ch.to_ascii_uppercase());
        }
        name
    }
}

impl CredentialStore for EnvCredentialStore {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(self.var_name(key)).ok()
    }
}

#[cfg(feature = "keychain")]
pub use self::keychain::KeychainCredentialStore;

#[cfg(feature = "keychain")]
mod keychain {
    use std::collections::hash_map::Entry as Slot;
    use std::collections::HashMap;
    use std::sync::{Mutex, PoisonError};

    use keyring::Entry;
    use tracing::warn;

    use super::CredentialStore;
    use crate::error::ApiError;

    /// OS keychain store, one entry per key under a fixed service name.
    ///
    /// Each key's `Entry` is opened once and reused for later reads and writes.
    pub struct KeychainCredentialStore {
        service: String,
        entries: Mutex<HashMap<String, Entry>>,
    }

    impl KeychainCredentialStore {
        pub fn new(service: &str) -> Self {
            Self {
                service: service.to_string(),
                entries: Mutex::new(HashMap::new()),
            }
        }

        pub fn service(&self) -> &str {
            &self.service
        }

        /// Save `secret` under `key`, e.g. once a login flow has a token.
        pub fn set(&self, key: &str, secret: &str) -> Result<(), ApiError> {
            self.with_entry(key, |entry| entry.set_password(secret))
                .map_err(|e| ApiError::Credential(e.to_string()))
        }

        /// Forget `key`. Removing a key that was never saved is not an error.
        pub fn remove(&self, key: &str) -> Result<(), ApiError> {
            match self.with_entry(key, Entry::delete_credential) {
                Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
                Err(e) => Err(ApiError::Credential(e.to_string())),
            }
        }

        fn with_entry<R>(
            &self,
            key: &str,
            op: impl FnOnce(&Entry) -> keyring::Result<R>,
        ) -> keyring::Result<R> {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            let entry = match entries.entry(key.to_string()) {
                Slot::Occupied(slot) => slot.into_mut(),
                Slot::Vacant(slot) => slot.insert(Entry::new(&self.service, key)?),
            };
            op(entry)
        }
    }

    impl CredentialStore for KeychainCredentialStore {
        fn get(&self, key: &str) -> Option<String> {
            match self.with_entry(key, Entry::get_password) {
                Ok(secret) => Some(secret),
                Err(keyring::Error::NoEntry) => None,
                Err(err) => {
                    warn!(error = %err, "keychain read failed");
                    None
                }
            }
        }
    }
}
