//! Domain service for the single watchlist account.
//!
//! Handles credential checks, resolving session identities, and profile edits.

use thiserror::Error;

use crate::db::{UpsertOutcome, User};

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No user row exists yet, so nobody can log in.
    #[error("User table is empty")]
    EmptyUserTable,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

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
        Self::Internal(err.to_string())
    }
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Checks the submitted credentials against the first user row.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::EmptyUserTable`] when there is no user at all and
    /// [`AuthError::InvalidCredentials`] when username or password do not match.
    async fn login(&self, username: &str, password: &str) -> Result<User, AuthError>;

    /// Looks up the user a session points at. A vanished row is `None`, not an error.
    async fn resolve(&self, user_id: i32) -> Result<Option<User>, AuthError>;

    /// The user whose watchlist this is (first row), if any.
    async fn owner(&self) -> Result<Option<User>, AuthError>;

    /// Changes the display name.
    async fn rename(&self, user_id: i32, name: &str) -> Result<(), AuthError>;

    /// Sets username and password on the first user, creating it if the table is empty.
    async fn provision_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UpsertOutcome, AuthError>;
}
