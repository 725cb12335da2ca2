//! Authentication service.
//!
//! Password registration and login. Passwords are hashed with Argon2id
//! and only the hash is ever stored.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::SqlitePool;

use pizzeria_core::Email;

use crate::db::{RepositoryError, UserRepository};
use crate::models::user::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Errors that can occur during authentication operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] pizzeria_core::EmailError),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Authentication service.
///
/// Handles user registration and login.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user with email and password.
    ///
    /// New accounts always start as customers; roles are only changed
    /// through operator tooling.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email)?;

        validate_password(password)?;

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(&email, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Login with email and password.
    ///
    /// A malformed email, an unknown email, and a wrong password all
    /// collapse into the same error so the response doesn't reveal
    /// which accounts exist.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let Ok(email) = Email::parse(email) else {
            return Err(AuthError::InvalidCredentials);
        };

        let (user, password_hash) = self
            .users
            .get_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }
}

/// Validate password strength.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
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
