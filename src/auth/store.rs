//! Credential stores.
//!
//! # Responsibilities
//! - Decide whether a submitted pair matches a known account
//! - Decide whether a username is already taken
//!
//! # Design Decisions
//! - Handlers depend on the `CredentialStore` trait, never on literal values
//! - Comparisons are exact: case-sensitive, no trimming
//! - Reloads swap a whole store at once via `ArcSwap`, readers never block

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::auth::credentials::Credentials;
use crate::config::{AccountConfig, CredentialsConfig};

/// Lookup capability for login and registration checks.
pub trait CredentialStore: Send + Sync {
    /// True when both fields are present and match a known account.
    fn verify(&self, credentials: &Credentials) -> bool;

    /// True when the username is present and belongs to a known account.
    fn is_reserved(&self, username: Option<&str>) -> bool;
}

/// Fixed set of accounts held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialStore {
    accounts: HashMap<String, String>,
}

impl InMemoryCredentialStore {
    /// A store holding exactly one account.
    pub fn single(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::from_accounts([AccountConfig {
            username: username.into(),
            password: password.into(),
        }])
    }

    pub fn from_accounts(accounts: impl IntoIterator<Item = AccountConfig>) -> Self {
        Self {
            accounts: accounts
                .into_iter()
                .map(|account| (account.username, account.password))
                .collect(),
        }
    }

    pub fn from_config(config: &CredentialsConfig) -> Self {
        Self::from_accounts(config.accounts.iter().cloned())
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn verify(&self, credentials: &Credentials) -> bool {
        match (credentials.username(), credentials.password()) {
            (Some(username), Some(password)) => self
                .accounts
                .get(username)
                .is_some_and(|expected| expected == password),
            _ => false,
        }
    }

    fn is_reserved(&self, username: Option<&str>) -> bool {
        username.is_some_and(|name| self.accounts.contains_key(name))
    }
}

/// An in-memory store that can be replaced while requests are in flight.
pub struct SwappableCredentialStore {
    current: ArcSwap<InMemoryCredentialStore>,
}

impl SwappableCredentialStore {
    pub fn new(store: InMemoryCredentialStore) -> Self {
        Self {
            current: ArcSwap::from_pointee(store),
        }
    }

    /// Atomically install a new set of accounts.
    pub fn replace(&self, store: InMemoryCredentialStore) {
        self.current.store(Arc::new(store));
    }

    pub fn snapshot(&self) -> Arc<InMemoryCredentialStore> {
        self.current.load_full()
    }
}

impl CredentialStore for SwappableCredentialStore {
    fn verify(&self, credentials: &Credentials) -> bool {
        self.current.load().verify(credentials)
    }

    fn is_reserved(&self, username: Option<&str>) -> bool {
        self.current.load().is_reserved(username)
    }
}
