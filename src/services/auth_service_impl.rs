//! `SeaORM` implementation of the `AuthService` trait.

use crate::config::SecurityConfig;
use crate::db::repositories::user::{hash_password_blocking, verify_password_blocking};
use crate::db::{Store, UpsertOutcome, User};
use crate::services::auth_service::{AuthError, AuthService};
use async_trait::async_trait;

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
    async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let (user, password_hash) = self
            .store
            .first_user_with_password()
            .await?
            .ok_or(AuthError::EmptyUserTable)?;

        if user.username.as_deref() != Some(username) {
            return Err(AuthError::InvalidCredentials);
        }

        // The seeded demo user has no password and can never log in
        let Some(password_hash) = password_hash else {
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password_blocking(&password_hash, password).await? {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    async fn resolve(&self, user_id: i32) -> Result<Option<User>, AuthError> {
        Ok(self.store.get_user(user_id).await?)
    }

    async fn owner(&self) -> Result<Option<User>, AuthError> {
        Ok(self.store.first_user().await?)
    }

    async fn rename(&self, user_id: i32, name: &str) -> Result<(), AuthError> {
        if !self.store.set_user_name(user_id, name).await? {
            return Err(AuthError::UserNotFound);
        }
        Ok(())
    }

    async fn provision_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UpsertOutcome, AuthError> {
        let password_hash = hash_password_blocking(password, &self.security).await?;
        Ok(self.store.upsert_admin(username, &password_hash).await?)
    }
}
