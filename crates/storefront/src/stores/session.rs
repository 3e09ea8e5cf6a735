//! Session store: access token and user profile.
//!
//! The token and profile live in memory and are mirrored into a
//! [`KeyValueCache`] so a restart keeps the user signed in. The cache is
//! treated as best-effort: read failures degrade to "not logged in", write
//! failures are logged and otherwise ignored.

use std::fmt;
use std::sync::Arc;

use secrecy::SecretString;
use thiserror::Error;
use tracing::{info, warn};

use taproom_core::{Email, EmailError, UserProfile};

use crate::api::{ApiClient, ApiFailure, Credentials, Registration};
use crate::cache::KeyValueCache;

/// Minimum password length the backend accepts on registration.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Nav label shown when nobody is logged in.
pub const ANONYMOUS_GREETING: &str = "Mi Cuenta";

/// Cache keys for persisted session data.
pub mod keys {
    /// Key for the bearer token.
    pub const ACCESS_TOKEN: &str = "access_token";

    /// Key for the JSON-encoded [`UserProfile`](taproom_core::UserProfile).
    pub const CURRENT_USER: &str = "current_user";
}

/// Why a login or registration did not go through.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A required form field was left blank.
    #[error("Completa los campos")]
    MissingFields,

    /// The email is not structurally valid.
    #[error("Email inválido: {0}")]
    InvalidEmail(#[from] EmailError),

    /// The password is shorter than the backend allows.
    #[error("La contraseña debe tener al menos {min} caracteres")]
    PasswordTooShort { min: usize },

    /// The backend refused the request or could not be reached.
    #[error("{}", .0.detail)]
    Api(#[from] ApiFailure),
}

/// Authentication state.
pub struct SessionStore {
    cache: Arc<dyn KeyValueCache>,
    token: Option<SecretString>,
    user: Option<UserProfile>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// A logged-out session persisted into `cache`.
    #[must_use]
    pub fn new(cache: Arc<dyn KeyValueCache>) -> Self {
        Self {
            cache,
            token: None,
            user: None,
        }
    }

    /// Load whatever session the cache holds.
    ///
    /// Never fails: an unreadable cache, a corrupt profile or a token without
    /// a profile leaves the session logged out.
    #[must_use]
    pub fn restore(cache: Arc<dyn KeyValueCache>) -> Self {
        let mut session = Self::new(cache);

        let token = match session.cache.get(keys::ACCESS_TOKEN) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "Could not read cached session, starting logged out");
                return session;
            }
        };

        let user = match session.cache.get(keys::CURRENT_USER) {
            Ok(Some(raw)) => match serde_json::from_str::<UserProfile>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!(error = %e, "Cached user profile is corrupt, ignoring it");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Could not read cached user profile");
                None
            }
        };

        match (token, user) {
            (Some(token), Some(user)) => {
                session.token = Some(SecretString::from(token));
                session.user = Some(user);
                info!("Restored cached session");
            }
            (None, None) => {}
            _ => {
                warn!("Cached session is incomplete, starting logged out");
                session.forget_cached();
            }
        }
        session
    }

    /// Drop both persisted session keys, leaving unrelated entries alone.
    fn forget_cached(&self) {
        for key in [keys::ACCESS_TOKEN, keys::CURRENT_USER] {
            if let Err(e) = self.cache.remove(key) {
                warn!(error = %e, key, "Failed to drop cached session key");
            }
        }
    }

    /// Log in against the backend.
    ///
    /// Blank fields are rejected before any request is made. On success the
    /// token and profile are kept in memory and written to the cache.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::MissingFields` for blank input, or
    /// `SessionError::Api` carrying the backend's message.
    pub async fn login(
        &mut self,
        api: &ApiClient,
        email: &str,
        password: &str,
    ) -> Result<&UserProfile, SessionError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(SessionError::MissingFields);
        }

        let credentials = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = api.login(&credentials).await?;

        info!(email = %response.user.email, "Logged in");
        self.persist(&response.access_token, &response.user);
        self.token = Some(SecretString::from(response.access_token));
        Ok(self.user.insert(response.user))
    }

    /// Create an account. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns a validation variant when the form is incomplete, the email is
    /// malformed or the password is too short (no request is made), or
    /// `SessionError::Api` with the backend's message.
    pub async fn register(
        api: &ApiClient,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(), SessionError> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(SessionError::MissingFields);
        }
        let email = Email::parse(email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(SessionError::PasswordTooShort {
                min: MIN_PASSWORD_LEN,
            });
        }

        let registration = Registration {
            name: name.to_string(),
            email: email.into_inner(),
            password: password.to_string(),
        };
        api.register(&registration).await?;

        info!(email = %registration.email, "Account registered");
        Ok(())
    }

    /// Forget the session and wipe the whole cache.
    pub fn logout(&mut self) {
        self.token = None;
        self.user = None;
        if let Err(e) = self.cache.clear() {
            warn!(error = %e, "Failed to clear session cache");
        }
        info!("Logged out");
    }

    fn persist(&self, token: &str, user: &UserProfile) {
        if let Err(e) = self.cache.set(keys::ACCESS_TOKEN, token) {
            warn!(error = %e, "Failed to cache access token");
        }
        match serde_json::to_string(user) {
            Ok(raw) => {
                if let Err(e) = self.cache.set(keys::CURRENT_USER, &raw) {
                    warn!(error = %e, "Failed to cache user profile");
                }
            }
            Err(e) => warn!(error = %e, "Failed to encode user profile"),
        }
    }

    /// Whether a token is held. Expiry is the backend's business.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// The bearer token, if logged in.
    #[must_use]
    pub const fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    /// The logged-in user's profile.
    #[must_use]
    pub const fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    /// Name for the nav link: the user's first name, or "Mi Cuenta".
    #[must_use]
    pub fn greeting_name(&self) -> &str {
        match (&self.token, &self.user) {
            (Some(_), Some(user)) => user.first_name(),
            _ => ANONYMOUS_GREETING,
        }
    }
}
