//! `SeaORM` implementation of the `AuthService` trait.

use crate::config::SecurityConfig;
use crate::db::{NewUser, Store, is_unique_violation};
use crate::services::auth_service::{AuthError, AuthService, Registration, UserInfo};
use async_trait::async_trait;
use tracing::info;

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, registration: &Registration) -> Result<UserInfo, AuthError> {
        registration.validate()?;

        let username = registration.username.trim();
        if self.store.get_user_by_username(username).await?.is_some() {
            return Err(username_taken());
        }

        let created = self
            .store
            .create_user(
                NewUser {
                    username,
                    email: registration.email(),
                    password: &registration.password,
                },
                &self.security,
            )
            .await;
        let user = match created {
            Ok(user) => user,
            Err(e) if is_unique_violation(&e) => return Err(username_taken()),
            Err(e) => return Err(e.into()),
        };

        info!(user_id = user.id, username = %user.username, "User registered");

        Ok(UserInfo::from(user))
    }

    async fn login(&self, username: &str, password: &str) -> Result<UserInfo, AuthError> {
        // Verify credentials against database
        let user = self
            .store
            .verify_user_password(username, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        Ok(UserInfo::from(user))
    }

    async fn verify_api_key(&self, api_key: &str) -> Result<Option<UserInfo>, AuthError> {
        let user = self.store.verify_api_key(api_key).await?;
        Ok(user.map(UserInfo::from))
    }

    async fn get_user(&self, user_id: i32) -> Result<UserInfo, AuthError> {
        let user = self
            .store
            .get_user_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(UserInfo::from(user))
    }

    async fn delete_user(&self, username: &str) -> Result<(), AuthError> {
        if !self.store.delete_user(username).await? {
            return Err(AuthError::UserNotFound);
        }

        info!(username, "User deleted");
        Ok(())
    }
}

fn username_taken() -> AuthError {
    AuthError::Conflict("A user with that username already exists.".to_string())
}
