//! Identity/session provider contract.
//!
//! The app only needs four things from an identity service: who is
//! signed in, a way to be told when that changes, and sign-in / sign-up /
//! sign-out. Everything else (routing, display name) is derived here.

use thiserror::Error;

use crate::types::User;

/// Minimum password length accepted by `sign_up`.
pub const MIN_PASSWORD_LEN: usize = 6;

// ============================================================================
// ERRORS
// ============================================================================

/// Failure of an identity operation.
///
/// The `Display` text is shown to the user as-is.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Please enter a valid email address.")]
    InvalidEmail,

    #[error("Please enter a password.")]
    MissingPassword,

    #[error("Password should be at least {} characters.", MIN_PASSWORD_LEN)]
    WeakPassword,

    #[error("An account with this email already exists.")]
    EmailAlreadyInUse,

    #[error("Invalid email or password.")]
    InvalidCredential,

    #[error("Account storage failed: {0}")]
    Storage(String),
}

// ============================================================================
// SUBSCRIPTIONS
// ============================================================================

/// Auth-state listener. Called with the current user on subscribe and
/// after every change.
pub type AuthCallback = Box<dyn FnMut(Option<&User>) + Send>;

/// Handle returned by `subscribe`; pass it back to `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(pub(crate) u64);

/// Ordered set of listeners, reusable by provider implementations.
#[derive(Default)]
pub struct Listeners {
    next_id: u64,
    entries: Vec<(Subscription, AuthCallback)>,
}

impl Listeners {
    pub fn add(&mut self, callback: AuthCallback) -> Subscription {
        let sub = Subscription(self.next_id);
        self.next_id += 1;
        self.entries.push((sub, callback));
        sub
    }

    /// Returns false for unknown handles.
    pub fn remove(&mut self, sub: Subscription) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(s, _)| *s != sub);
        self.entries.len() != before
    }

    pub fn notify(&mut self, user: Option<&User>) {
        for (_, callback) in &mut self.entries {
            callback(user);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}

// ============================================================================
// PROVIDER TRAIT
// ============================================================================

/// An identity service.
pub trait IdentityProvider {
    fn current_user(&self) -> Option<User>;

    /// Register a listener. It is invoked immediately with the current
    /// user, then on every sign-in, sign-up and sign-out.
    fn subscribe(&mut self, callback: AuthCallback) -> Subscription;

    /// Remove a listener. Unknown handles are ignored.
    fn unsubscribe(&mut self, subscription: Subscription);

    fn sign_in(&mut self, email: &str, password: &str) -> Result<User, AuthError>;

    fn sign_up(&mut self, email: &str, password: &str) -> Result<User, AuthError>;

    fn sign_out(&mut self) -> Result<(), AuthError>;
}

// ============================================================================
// VALIDATION
// ============================================================================

/// Trim and sanity-check an email address.
pub fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return Err(AuthError::InvalidEmail);
    };
    if local.is_empty()
        || domain.is_empty()
        || domain.contains('@')
        || email.chars().any(char::is_whitespace)
    {
        return Err(AuthError::InvalidEmail);
    }
    Ok(email.to_string())
}

/// Check a password for sign-up.
pub fn check_new_password(password: &str) -> Result<(), AuthError> {
    if password.is_empty() {
        return Err(AuthError::MissingPassword);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword);
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
