//! The Auth Store: sign-in, sign-up, sign-out.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::{
    ApiError, AuthApi, AuthContext, AuthError, HttpClient, NewUser, RequestGateway, Token,
    UserProfile,
};

const LOGIN_FAILED: &str = "Login failed";
const REGISTRATION_FAILED: &str = "Registration failed";

/// Owns the credential lifecycle. Build one per process and share it.
pub struct AuthStore<H: HttpClient> {
    api: AuthApi<H>,
    auth: Arc<AuthContext>,
    loading: AtomicBool,
    last_error: Mutex<Option<String>>,
}

impl<H: HttpClient> AuthStore<H> {
    pub fn new(gateway: Arc<RequestGateway<H>>) -> Self {
        let auth = Arc::clone(gateway.auth());
        Self {
            api: AuthApi::new(gateway),
            auth,
            loading: AtomicBool::new(false),
            last_error: Mutex::new(None),
        }
    }

    pub fn context(&self) -> &Arc<AuthContext> {
        &self.auth
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    pub fn token(&self) -> Option<Token> {
        self.auth.token()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.auth.user()
    }

    /// Whether a login, registration, or profile fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// User-facing message of the last failed login or registration.
    /// Reset when the next one starts.
    pub fn last_error(&self) -> Option<String> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Signs in, then fetches the profile.
    ///
    /// Signed in means the token was obtained. If only the profile fetch
    /// fails the token is kept and this still succeeds, unless that fetch
    /// was a 401, which signs out again and is returned as an error.
    ///
    /// # Errors
    /// - [`AuthError::Credential`] if the server refused the credentials
    /// - [`AuthError::Api`] if the server could not be reached
    /// - [`AuthError::Storage`] if the token could not be persisted
    pub async fn login(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let _loading = self.begin();
        self.set_last_error(None);

        let access = match self.api.login(email, password).await {
            Ok(access) => access,
            Err(e) => return Err(self.fail(e, LOGIN_FAILED)),
        };
        if let Err(e) = self.auth.set_token(Token::new(access.access_token)) {
            self.set_last_error(Some(LOGIN_FAILED.into()));
            return Err(e.into());
        }
        tracing::info!(email, "signed in");

        match self.api.current_user().await {
            Ok(user) => {
                self.auth.set_user(user);
                Ok(())
            }
            Err(e @ ApiError::AuthorizationExpired { .. }) => {
                self.set_last_error(Some(LOGIN_FAILED.into()));
                Err(e.into())
            }
            Err(e) => {
                tracing::warn!(error = %e, "signed in but profile fetch failed, keeping token");
                Ok(())
            }
        }
    }

    /// Creates an account. Never signs in.
    ///
    /// # Errors
    /// - [`AuthError::Credential`] if the server refused the data
    /// - [`AuthError::Api`] if the server could not be reached
    pub async fn register(&self, user: &NewUser) -> Result<UserProfile, AuthError> {
        let _loading = self.begin();
        self.set_last_error(None);

        match self.api.register(user).await {
            Ok(profile) => {
                tracing::info!(email = %profile.email, "registered");
                Ok(profile)
            }
            Err(e) => Err(self.fail(e, REGISTRATION_FAILED)),
        }
    }

    /// Signs out: drops the token, the profile, and the persisted token.
    /// Idempotent.
    pub fn logout(&self) {
        let was_signed_in = self.auth.is_authenticated();
        self.auth.clear();
        if was_signed_in {
            tracing::info!("signed out");
        }
    }

    /// Refreshes the cached profile.
    ///
    /// Returns `Ok(None)` without a request when signed out. Only a 401
    /// signs out; any other failure leaves the token in place.
    pub async fn get_current_user(&self) -> Result<Option<UserProfile>, ApiError> {
        if !self.auth.is_authenticated() {
            return Ok(None);
        }
        let _loading = self.begin();

        match self.api.current_user().await {
            Ok(user) => {
                self.auth.set_user(user.clone());
                Ok(Some(user))
            }
            Err(e @ ApiError::AuthorizationExpired { .. }) => {
                self.logout();
                Err(e)
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to refresh profile");
                Err(e)
            }
        }
    }

    /// Maps a login/registration failure to the user-facing error and
    /// records its message.
    fn fail(&self, error: ApiError, fallback: &str) -> AuthError {
        let message = error.detail().unwrap_or(fallback).to_owned();
        self.set_last_error(Some(message.clone()));
        tracing::debug!(error = %error, operation = fallback, "request rejected");

        match error {
            ApiError::Status { .. } | ApiError::AuthorizationExpired { .. } => {
                AuthError::Credential {
                    message,
                    source: error,
                }
            }
            other => AuthError::Api(other),
        }
    }

    fn set_last_error(&self, message: Option<String>) {
        *self
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = message;
    }

    fn begin(&self) -> LoadingGuard<'_> {
        self.loading.store(true, Ordering::Release);
        LoadingGuard(&self.loading)
    }
}

/// Clears the loading flag when the operation ends, however it ends.
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
