//! Domain service for accounts and authentication.
//!
//! Handles registration, password login and API key lookup. Sessions are
//! managed by the HTTP layer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::limits::{PASSWORD_MIN_LEN, USERNAME_MAX_LEN};
use crate::db::User;
use crate::domain::FieldError;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Validation failed: {0}")]
    Validation(FieldError),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<FieldError> for AuthError {
    fn from(err: FieldError) -> Self {
        Self::Validation(err)
    }
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// User info DTO for responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: i32,
    pub username: String,
    pub email: Option<String>,
    pub api_key: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            api_key: user.api_key,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Sign-up payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Registration {
    pub username: String,
    pub email: Option<String>,
    pub password: String,
    pub password_confirm: String,
}

impl Registration {
    /// Field checks that need no database access.
    ///
    /// ```
    /// use mediashelf::services::auth_service::Registration;
    ///
    /// let ok = Registration {
    ///     username: "kate.b+1@home".into(),
    ///     email: None,
    ///     password: "hunter2hunter2".into(),
    ///     password_confirm: "hunter2hunter2".into(),
    /// };
    /// assert!(ok.validate().is_ok());
    /// ```
    pub fn validate(&self) -> Result<(), FieldError> {
        let username = self.username.trim();
        if username.is_empty() {
            return Err(FieldError::new("username", "This field is required."));
        }
        if username.chars().count() > USERNAME_MAX_LEN {
            return Err(FieldError::new(
                "username",
                format!("Ensure this value has at most {USERNAME_MAX_LEN} characters."),
            ));
        }
        if !username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
        {
            return Err(FieldError::new(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            ));
        }

        if let Some(email) = self.email.as_deref().map(str::trim).filter(|e| !e.is_empty())
            && !is_plausible_email(email)
        {
            return Err(FieldError::new("email", "Enter a valid email address."));
        }

        if self.password.chars().count() < PASSWORD_MIN_LEN {
            return Err(FieldError::new(
                "password",
                format!(
                    "This password is too short. It must contain at least {PASSWORD_MIN_LEN} characters."
                ),
            ));
        }
        if self.password != self.password_confirm {
            return Err(FieldError::new(
                "password_confirm",
                "The two password fields didn't match.",
            ));
        }

        Ok(())
    }

    /// Trimmed email, `None` when blank.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().map(str::trim).filter(|e| !e.is_empty())
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@') && !email.contains(' ')
        }
        None => false,
    }
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates an account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] for bad fields and
    /// [`AuthError::Conflict`] if the username is taken.
    async fn register(&self, registration: &Registration) -> Result<UserInfo, AuthError>;

    /// Verifies credentials and returns user info.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if login fails.
    async fn login(&self, username: &str, password: &str) -> Result<UserInfo, AuthError>;

    /// Verifies an API key and returns the associated user if valid.
    async fn verify_api_key(&self, api_key: &str) -> Result<Option<UserInfo>, AuthError>;

    /// Gets information for a specific user.
    async fn get_user(&self, user_id: i32) -> Result<UserInfo, AuthError>;

    /// Deletes a user and, through the foreign keys, their library.
    async fn delete_user(&self, username: &str) -> Result<(), AuthError>;
}
