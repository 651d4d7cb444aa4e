//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::config::SecurityConfig;
use crate::db::{NewUser, Store};
use crate::domain::{CurrentUser, Role, UserId};
use crate::services::auth_service::{
    AuthError, AuthService, LoginResult, Registration, UserProfile,
};

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    fn validate(&self, registration: &Registration) -> Result<(), AuthError> {
        if registration.name.trim().is_empty() {
            return Err(AuthError::Validation("name is required".to_string()));
        }

        let email = registration.email.trim();
        let valid_email = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !valid_email {
            return Err(AuthError::Validation("email is invalid".to_string()));
        }

        if registration.password.chars().count() < self.security.min_password_length {
            return Err(AuthError::Validation(format!(
                "password must be at least {} characters",
                self.security.min_password_length
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, registration: Registration) -> Result<UserProfile, AuthError> {
        self.validate(&registration)?;

        let avatar = registration
            .avatar
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| self.security.default_avatar.clone());

        let new = NewUser {
            name: registration.name.trim().to_string(),
            email: registration.email,
            password: registration.password,
            role: Role::User,
            avatar: Some(avatar),
        };

        let user = self
            .store
            .create_user(new, &self.security)
            .await?
            .ok_or(AuthError::EmailTaken)?;

        info!(user_id = user.id, "User registered");
        Ok(user.into())
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AuthError> {
        let user = self
            .store
            .verify_user_password(email, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        Ok(LoginResult {
            token: user.api_key.clone(),
            user: user.into(),
        })
    }

    async fn authenticate(&self, token: &str) -> Result<Option<CurrentUser>, AuthError> {
        if token.is_empty() {
            return Ok(None);
        }

        let user = self.store.verify_api_key(token).await?;
        Ok(user.map(|u| CurrentUser {
            id: UserId::new(u.id),
            role: u.role,
        }))
    }

    async fn profile(&self, user_id: UserId) -> Result<UserProfile, AuthError> {
        self.store
            .get_user_by_id(user_id.value())
            .await?
            .map(UserProfile::from)
            .ok_or(AuthError::UserNotFound)
    }

    async fn regenerate_token(&self, user_id: UserId) -> Result<String, AuthError> {
        if self.store.get_user_by_id(user_id.value()).await?.is_none() {
            return Err(AuthError::UserNotFound);
        }
        let token = self.store.regenerate_api_key(user_id.value()).await?;
        info!(user_id = user_id.value(), "API token regenerated");
        Ok(token)
    }
}
