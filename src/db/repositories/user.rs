use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, Set,
};
use tokio::task;
use tracing::info;

use crate::config::SecurityConfig;
use crate::entities::users;

/// Display name given to an account created by the `admin` command.
pub const DEFAULT_ADMIN_NAME: &str = "Admin";

/// User data returned from repository (without sensitive password hash)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub username: Option<String>,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            username: model.username,
        }
    }
}

/// What `upsert_admin` did to the user table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created(i32),
    Updated(i32),
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    async fn first_model(&self) -> Result<Option<users::Model>> {
        users::Entity::find()
            .order_by_asc(users::Column::Id)
            .one(&self.conn)
            .await
            .context("Failed to query first user")
    }

    /// The application treats the first row as "the user".
    pub async fn first(&self) -> Result<Option<User>> {
        Ok(self.first_model().await?.map(User::from))
    }

    /// First user together with its password hash, for login checks.
    pub async fn first_with_password(&self) -> Result<Option<(User, Option<String>)>> {
        Ok(self.first_model().await?.map(|u| {
            let password_hash = u.password_hash.clone();
            (User::from(u), password_hash)
        }))
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> Result<Option<User>> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    pub async fn count(&self) -> Result<u64> {
        users::Entity::find()
            .count(&self.conn)
            .await
            .context("Failed to count users")
    }

    pub async fn create(
        &self,
        name: &str,
        username: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<i32> {
        let active = users::ActiveModel {
            name: Set(name.to_string()),
            username: Set(username.map(str::to_string)),
            password_hash: Set(password_hash.map(str::to_string)),
            ..Default::default()
        };

        let res = users::Entity::insert(active)
            .exec(&self.conn)
            .await
            .context("Failed to insert user")?;

        info!("Created user {} ({})", res.last_insert_id, name);
        Ok(res.last_insert_id)
    }

    async fn update_with<F>(&self, id: i32, apply: F) -> Result<bool>
    where
        F: FnOnce(&mut users::ActiveModel),
    {
        let Some(user) = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for update")?
        else {
            return Ok(false);
        };

        let mut active: users::ActiveModel = user.into();
        apply(&mut active);
        active
            .update(&self.conn)
            .await
            .context("Failed to update user")?;

        Ok(true)
    }

    pub async fn set_name(&self, id: i32, name: &str) -> Result<bool> {
        let name = name.to_string();
        self.update_with(id, |u| u.name = Set(name)).await
    }

    pub async fn set_username(&self, id: i32, username: &str) -> Result<bool> {
        let username = username.to_string();
        self.update_with(id, |u| u.username = Set(Some(username)))
            .await
    }

    pub async fn set_password_hash(&self, id: i32, password_hash: &str) -> Result<bool> {
        let password_hash = password_hash.to_string();
        self.update_with(id, |u| u.password_hash = Set(Some(password_hash)))
            .await
    }

    /// Point the first user at new credentials, creating the row when the table is empty.
    pub async fn upsert_admin(&self, username: &str, password_hash: &str) -> Result<UpsertOutcome> {
        if let Some(user) = self.first_model().await? {
            let id = user.id;
            let mut active: users::ActiveModel = user.into();
            active.username = Set(Some(username.to_string()));
            active.password_hash = Set(Some(password_hash.to_string()));
            active
                .update(&self.conn)
                .await
                .context("Failed to update admin credentials")?;

            info!("Updated credentials for user {}", id);
            return Ok(UpsertOutcome::Updated(id));
        }

        let id = self
            .create(DEFAULT_ADMIN_NAME, Some(username), Some(password_hash))
            .await?;
        Ok(UpsertOutcome::Created(id))
    }
}

/// Hash a password using Argon2id with optional custom params.
/// If config is None, uses the crate's default params.
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Check a plaintext password against a stored PHC hash.
/// The hash carries its own params, so any Argon2 variant we wrote verifies here.
pub fn verify_password(password_hash: &str, password: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Argon2 is CPU-heavy; keep it off the async workers.
pub async fn hash_password_blocking(password: &str, config: &SecurityConfig) -> Result<String> {
    let password = password.to_string();
    let config = config.clone();
    task::spawn_blocking(move || hash_password(&password, Some(&config)))
        .await
        .context("Password hashing task panicked")?
}

pub async fn verify_password_blocking(password_hash: &str, password: &str) -> Result<bool> {
    let password_hash = password_hash.to_string();
    let password = password.to_string();
    task::spawn_blocking(move || verify_password(&password_hash, &password))
        .await
        .context("Password verification task panicked")?
}
