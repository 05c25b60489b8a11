//! Authentication service.
//!
//! Owns registration, credential verification, bearer-token issuing, and
//! profile updates. Passwords are stored only as Argon2id hashes; tokens are
//! opaque 40-character hex keys with no expiry, one per user.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use rand::RngCore;
use sqlx::PgPool;

use skillet_core::{Email, UserId};

use crate::db::RepositoryError;
use crate::db::tokens::TokenRepository;
use crate::db::users::UserRepository;
use crate::models::User;
use crate::validation::{FieldErrors, REQUIRED};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Length of a token key in bytes of entropy (40 hex characters).
const TOKEN_KEY_BYTES: usize = 20;

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    tokens: TokenRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
            tokens: TokenRepository::new(pool),
        }
    }

    /// Register a new user with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` with every violated field when the
    /// email is missing/invalid or the password is missing/too short.
    /// Returns `AuthError::UserAlreadyExists` if the email is registered.
    pub async fn register(
        &self,
        email: Option<&str>,
        password: Option<&str>,
        name: Option<&str>,
    ) -> Result<User, AuthError> {
        self.create_user(email, password, name, false, false).await
    }

    /// Register a privileged user: same as [`Self::register`] plus the staff
    /// and superuser flags. Reachable only from the management CLI.
    ///
    /// # Errors
    ///
    /// Same as [`Self::register`].
    pub async fn create_superuser(
        &self,
        email: Option<&str>,
        password: Option<&str>,
        name: Option<&str>,
    ) -> Result<User, AuthError> {
        self.create_user(email, password, name, true, true).await
    }

    async fn create_user(
        &self,
        email: Option<&str>,
        password: Option<&str>,
        name: Option<&str>,
        is_staff: bool,
        is_superuser: bool,
    ) -> Result<User, AuthError> {
        let mut errors = FieldErrors::new();

        let email = match email {
            None => {
                errors.push("email", REQUIRED);
                None
            }
            Some(raw) => match Email::parse(raw) {
                Ok(email) => Some(email),
                Err(e) => {
                    errors.push("email", e.to_string());
                    None
                }
            },
        };

        match password {
            None => errors.push("password", REQUIRED),
            Some(raw) => {
                if let Err(message) = validate_password(raw) {
                    errors.push("password", message);
                }
            }
        }

        let (email, password) = match (email, password) {
            (Some(email), Some(password)) if errors.is_empty() => (email, password),
            _ => return Err(errors.into()),
        };

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(
                &email,
                &password_hash,
                name.unwrap_or_default(),
                is_staff,
                is_superuser,
            )
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Verify credentials and hand back the user's bearer token, generating
    /// one on first login.
    ///
    /// Unknown email, wrong password, and empty fields all fail identically.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` on any credential mismatch.
    pub async fn issue_token(&self, email: &str, password: &str) -> Result<String, AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_with_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        if let Some(key) = self.tokens.find_for_user(user.id).await? {
            return Ok(key);
        }

        let key = generate_token_key();
        match self.tokens.insert(&key, user.id).await {
            Ok(()) => Ok(key),
            // Lost a race against a concurrent first login; reuse its key.
            Err(RepositoryError::Conflict(_)) => Ok(self
                .tokens
                .find_for_user(user.id)
                .await?
                .ok_or(AuthError::InvalidCredentials)?),
            Err(other) => Err(other.into()),
        }
    }

    /// Partially update a user's profile. The email is re-normalized and the
    /// password re-hashed when supplied.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` with every violated field.
    /// Returns `AuthError::UserAlreadyExists` if the new email is taken.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        email: Option<&str>,
        name: Option<&str>,
        password: Option<&str>,
    ) -> Result<User, AuthError> {
        let mut errors = FieldErrors::new();

        let email = match email {
            None => None,
            Some(raw) => match Email::parse(raw) {
                Ok(email) => Some(email),
                Err(e) => {
                    errors.push("email", e.to_string());
                    None
                }
            },
        };

        if let Some(raw) = password
            && let Err(message) = validate_password(raw)
        {
            errors.push("password", message);
        }

        if !errors.is_empty() {
            return Err(errors.into());
        }

        let password_hash = password.map(hash_password).transpose()?;

        let user = self
            .users
            .update(user_id, email.as_ref(), name, password_hash.as_deref())
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Ensure this field has at least {MIN_PASSWORD_LENGTH} characters."
        ));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Generate a fresh opaque token key (40 hex characters).
fn generate_token_key() -> String {
    let mut bytes = [0u8; TOKEN_KEY_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
