//! Domain service for accounts and token authentication.
//!
//! Handles registration, login, profile reads and API token rotation.

use serde::Serialize;
use thiserror::Error;

use crate::db::User;
use crate::domain::{CurrentUser, UserId};

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Email already exists")]
    EmailTaken,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

/// Public account fields. Never carries the password hash or token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: &'static str,
    pub avatar: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role.as_str(),
            avatar: user.avatar,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub avatar: Option<String>,
}

/// Login result containing the bearer token and the profile.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub token: String,
    pub user: UserProfile,
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates a regular account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::EmailTaken`] if the email is registered and
    /// [`AuthError::Validation`] for malformed input.
    async fn register(&self, registration: Registration) -> Result<UserProfile, AuthError>;

    /// Verifies credentials and returns the account token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if login fails.
    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AuthError>;

    /// Resolves a presented token to the identity it belongs to.
    async fn authenticate(&self, token: &str) -> Result<Option<CurrentUser>, AuthError>;

    async fn profile(&self, user_id: UserId) -> Result<UserProfile, AuthError>;

    /// Invalidates the current token and returns the new one.
    async fn regenerate_token(&self, user_id: UserId) -> Result<String, AuthError>;
}
