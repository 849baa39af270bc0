//! Local, file-backed identity provider.
//!
//! Keeps accounts in a JSON store under the platform data directory and
//! remembers who is signed in across runs. Passwords are stored as salted
//! BLAKE3 digests.
//!
//! Structure:
//! - Pure functions: key/uid/salt derivation, password digests
//! - Effect functions: store load/save
//! - `LocalIdentityProvider`: the `IdentityProvider` implementation

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identity::{
    AuthCallback, AuthError, IdentityProvider, Listeners, Subscription, check_new_password,
    normalize_email,
};
use crate::types::User;

/// Current store format version.
const STORE_VERSION: u32 = 1;

/// Store filename within the data directory.
const STORE_FILENAME: &str = "accounts.json";

/// BLAKE3 key-derivation context for password digests.
const PASSWORD_CONTEXT: &str = "vocab-retention 2026-01-01 password digest v1";

// ============================================================================
// STORE TYPES
// ============================================================================

/// On-disk account store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStore {
    pub version: u32,
    /// Keyed by lower-cased email.
    pub accounts: BTreeMap<String, Account>,
    /// uid of the signed-in account, if any.
    pub signed_in: Option<String>,
}

impl Default for AccountStore {
    fn default() -> Self {
        AccountStore {
            version: STORE_VERSION,
            accounts: BTreeMap::new(),
            signed_in: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub uid: String,
    /// As typed at sign-up (trimmed).
    pub email: String,
    pub salt: String,
    /// Hex BLAKE3 digest of salt and password.
    pub password_hash: String,
    /// Unix seconds.
    pub created_at: u64,
}

impl Account {
    fn user(&self) -> User {
        User {
            uid: self.uid.clone(),
            email: self.email.clone(),
        }
    }
}

/// Error reading or writing the account store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot access account store {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt account store {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("account store {path} has unsupported version {found}")]
    UnsupportedVersion { path: PathBuf, found: u32 },
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        AuthError::Storage(err.to_string())
    }
}

// ============================================================================
// PURE FUNCTIONS
// ============================================================================

/// Default store location.
///
/// On Linux: ~/.local/share/vocab-retention/accounts.json
pub fn default_account_store() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vocab-retention")
        .join(STORE_FILENAME)
}

/// Lookup key for an already-normalized email.
fn account_key(email: &str) -> String {
    email.to_lowercase()
}

/// Unique-enough hex token derived from `seed`, the clock and the pid.
fn generate_token(seed: &str, hex_len: usize) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);

    let mut hasher = blake3::Hasher::new();
    hasher.update(seed.as_bytes());
    hasher.update(&nanos.to_le_bytes());
    hasher.update(&std::process::id().to_le_bytes());
    let hex = hasher.finalize().to_hex();
    let hex = hex.as_str();
    hex[..hex_len.min(hex.len())].to_string()
}

fn current_unix_secs() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Salted password digest.
pub fn password_digest(salt: &str, password: &str) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new_derive_key(PASSWORD_CONTEXT);
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hasher.finalize()
}

/// Check `password` against a stored account. Comparison is constant-time.
fn verify_password(account: &Account, password: &str) -> bool {
    match blake3::Hash::from_hex(&account.password_hash) {
        Ok(stored) => password_digest(&account.salt, password) == stored,
        Err(_) => false,
    }
}

// ============================================================================
// EFFECT FUNCTIONS
// ============================================================================

/// Load the store; a missing file is an empty store.
pub fn load_store(path: &Path) -> Result<AccountStore, StoreError> {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(AccountStore::default()),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let store: AccountStore = serde_json::from_str(&contents).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    if store.version != STORE_VERSION {
        return Err(StoreError::UnsupportedVersion {
            path: path.to_path_buf(),
            found: store.version,
        });
    }
    Ok(store)
}

/// Write the store atomically (temp file + rename).
pub fn save_store(store: &AccountStore, path: &Path) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let contents = serde_json::to_string_pretty(store).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)
}

// ============================================================================
// PROVIDER
// ============================================================================

/// `IdentityProvider` backed by a local JSON file.
#[derive(Debug)]
pub struct LocalIdentityProvider {
    /// None for in-memory providers (tests).
    path: Option<PathBuf>,
    store: AccountStore,
    listeners: Listeners,
}

impl LocalIdentityProvider {
    /// Open (or start) the store at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let store = load_store(path)?;
        tracing::debug!(
            path = %path.display(),
            accounts = store.accounts.len(),
            signed_in = store.signed_in.is_some(),
            "opened account store"
        );
        Ok(LocalIdentityProvider {
            path: Some(path.to_path_buf()),
            store,
            listeners: Listeners::default(),
        })
    }

    /// Provider that never touches the filesystem.
    pub fn in_memory() -> Self {
        LocalIdentityProvider {
            path: None,
            store: AccountStore::default(),
            listeners: Listeners::default(),
        }
    }

    pub fn store(&self) -> &AccountStore {
        &self.store
    }

    fn persist(&self) -> Result<(), StoreError> {
        match &self.path {
            Some(path) => save_store(&self.store, path),
            None => Ok(()),
        }
    }

    fn set_signed_in(&mut self, uid: Option<String>) -> Result<(), AuthError> {
        if self.store.signed_in == uid {
            return Ok(());
        }
        let previous = std::mem::replace(&mut self.store.signed_in, uid);
        if let Err(e) = self.persist() {
            self.store.signed_in = previous;
            return Err(e.into());
        }
        let user = self.current_user();
        self.listeners.notify(user.as_ref());
        Ok(())
    }
}

impl IdentityProvider for LocalIdentityProvider {
    fn current_user(&self) -> Option<User> {
        let uid = self.store.signed_in.as_deref()?;
        self.store
            .accounts
            .values()
            .find(|a| a.uid == uid)
            .map(Account::user)
    }

    fn subscribe(&mut self, mut callback: AuthCallback) -> Subscription {
        let user = self.current_user();
        callback(user.as_ref());
        self.listeners.add(callback)
    }

    fn unsubscribe(&mut self, subscription: Subscription) {
        if !self.listeners.remove(subscription) {
            tracing::debug!(?subscription, "unsubscribe: unknown handle");
        }
    }

    fn sign_in(&mut self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = normalize_email(email)?;
        if password.is_empty() {
            return Err(AuthError::MissingPassword);
        }

        let account = self
            .store
            .accounts
            .get(&account_key(&email))
            .filter(|a| verify_password(a, password))
            .cloned();

        let Some(account) = account else {
            tracing::warn!(email = %email, "sign-in rejected");
            return Err(AuthError::InvalidCredential);
        };

        self.set_signed_in(Some(account.uid.clone()))?;
        tracing::info!(uid = %account.uid, "signed in");
        Ok(account.user())
    }

    fn sign_up(&mut self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = normalize_email(email)?;
        check_new_password(password)?;

        let key = account_key(&email);
        if self.store.accounts.contains_key(&key) {
            return Err(AuthError::EmailAlreadyInUse);
        }

        let salt = generate_token(&format!("salt:{key}"), 32);
        let account = Account {
            uid: generate_token(&format!("uid:{key}"), 28),
            email,
            password_hash: password_digest(&salt, password).to_hex().to_string(),
            salt,
            created_at: current_unix_secs(),
        };
        let user = account.user();
        self.store.accounts.insert(key.clone(), account);

        if let Err(e) = self.set_signed_in(Some(user.uid.clone())) {
            // Keep memory consistent with disk
            self.store.accounts.remove(&key);
            return Err(e);
        }
        tracing::info!(uid = %user.uid, "account created");
        Ok(user)
    }

    fn sign_out(&mut self) -> Result<(), AuthError> {
        self.set_signed_in(None)?;
        tracing::info!("signed out");
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
