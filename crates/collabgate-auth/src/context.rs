//! The single source of truth for "who is signed in".
//!
//! Shared via `Arc` by the store, the gateway, and the route guard. Only
//! code inside this crate can change it; everyone else reads.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{MemoryTokenStorage, StorageError, Token, TokenStorage, UserProfile};

#[derive(Debug, Default)]
struct Credentials {
    token: Option<Token>,
    user: Option<UserProfile>,
}

/// Current token and cached user profile.
///
/// Authenticated means "a token is present". It is derived on every read,
/// never stored.
pub struct AuthContext {
    credentials: RwLock<Credentials>,
    storage: Box<dyn TokenStorage>,
}

impl AuthContext {
    /// Creates a context backed by `storage`, restoring any token it holds.
    ///
    /// An unreadable store starts out signed out rather than failing.
    pub fn new(storage: impl TokenStorage + 'static) -> Self {
        let token = match storage.load() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "could not restore token, starting signed out");
                None
            }
        };
        if token.is_some() {
            tracing::debug!("restored persisted token");
        }

        Self {
            credentials: RwLock::new(Credentials { token, user: None }),
            storage: Box::new(storage),
        }
    }

    /// A context that forgets everything when the process exits.
    pub fn in_memory() -> Self {
        Self::new(MemoryTokenStorage::new())
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().token.is_some()
    }

    pub fn token(&self) -> Option<Token> {
        self.read().token.clone()
    }

    /// The cached profile. May be absent even while authenticated, until
    /// the profile has been fetched.
    pub fn user(&self) -> Option<UserProfile> {
        self.read().user.clone()
    }

    /// Persists and installs a new token. The cached profile belongs to
    /// the old token and is dropped.
    ///
    /// Storage is written under the same lock as memory, so the two never
    /// disagree once a call returns.
    pub(crate) fn set_token(&self, token: Token) -> Result<(), StorageError> {
        let mut credentials = self.write();
        self.storage.save(&token)?;
        credentials.token = Some(token);
        credentials.user = None;
        Ok(())
    }

    /// Caches `user`. Ignored when signed out, so a late profile response
    /// can't resurrect a cleared session. Returns whether it was stored.
    pub(crate) fn set_user(&self, user: UserProfile) -> bool {
        let mut credentials = self.write();
        if credentials.token.is_none() {
            return false;
        }
        credentials.user = Some(user);
        true
    }

    /// Drops the token and profile, in memory and in storage. Idempotent.
    pub(crate) fn clear(&self) {
        let mut credentials = self.write();
        credentials.token = None;
        credentials.user = None;
        if let Err(e) = self.storage.clear() {
            tracing::warn!(error = %e, "failed to clear persisted token");
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Credentials> {
        self.credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Credentials> {
        self.credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let credentials = self.read();
        f.debug_struct("AuthContext")
            .field("authenticated", &credentials.token.is_some())
            .field("user", &credentials.user.as_ref().map(|u| &u.email))
            .finish()
    }
}
