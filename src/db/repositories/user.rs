use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tokio::task;
use tracing::info;

use crate::config::SecurityConfig;
use crate::domain::{Role, UserId};
use crate::entities::{comments, ratings, users, watchlist_anime, watchlists};

/// User data returned from repository (without sensitive password hash)
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub firstname: String,
    pub lastname: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub api_key: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: UserId::new(model.id),
            firstname: model.firstname,
            lastname: model.lastname,
            username: model.username,
            email: model.email,
            role: model.role,
            api_key: model.api_key,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Fields needed to create an account. The password is still plain text here.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub firstname: String,
    pub lastname: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Profile fields to overwrite. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Get user by username
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")?;

        Ok(user.map(User::from))
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>> {
        let user = users::Entity::find_by_id(id.value())
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        let rows = users::Entity::find()
            .order_by_asc(users::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list users")?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Returns `(username_taken, email_taken)`, ignoring the account `except`.
    pub async fn identity_taken(
        &self,
        username: &str,
        email: &str,
        except: Option<UserId>,
    ) -> Result<(bool, bool)> {
        let mut query = users::Entity::find().filter(
            Condition::any()
                .add(users::Column::Username.eq(username))
                .add(users::Column::Email.eq(email)),
        );
        if let Some(id) = except {
            query = query.filter(users::Column::Id.ne(id.value()));
        }

        let rows = query
            .all(&self.conn)
            .await
            .context("Failed to check for existing user")?;

        let username_taken = rows.iter().any(|u| u.username == username);
        let email_taken = rows.iter().any(|u| u.email == email);
        Ok((username_taken, email_taken))
    }

    pub async fn create(&self, new_user: NewUser, config: &SecurityConfig) -> Result<User> {
        let password = new_user.password;
        let config = config.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password, Some(&config)))
            .await
            .context("Password hashing task panicked")??;

        let now = chrono::Utc::now().to_rfc3339();
        let active = users::ActiveModel {
            firstname: Set(new_user.firstname),
            lastname: Set(new_user.lastname),
            username: Set(new_user.username),
            email: Set(new_user.email),
            password_hash: Set(password_hash),
            role: Set(new_user.role),
            api_key: Set(generate_api_key()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert user")?;

        info!("Created user {} ({})", model.username, model.role);
        Ok(User::from(model))
    }

    /// Verify password for a user
    /// Note: This uses `spawn_blocking` because Argon2 hashing is CPU-intensive
    /// and would block the async runtime if run directly.
    pub async fn verify_password(&self, username: &str, password: &str) -> Result<bool> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user for password verification")?;

        let Some(user) = user else {
            return Ok(false);
        };

        let password_hash = user.password_hash;
        let password = password.to_string();

        task::spawn_blocking(move || verify_password_hash(&password_hash, &password))
            .await
            .context("Password verification task panicked")?
    }

    /// Update password for a user (hashes the new password)
    pub async fn update_password(
        &self,
        id: UserId,
        new_password: &str,
        config: &SecurityConfig,
    ) -> Result<()> {
        let user = users::Entity::find_by_id(id.value())
            .one(&self.conn)
            .await
            .context("Failed to query user for password update")?
            .ok_or_else(|| anyhow::anyhow!("User not found: {id}"))?;

        let password = new_password.to_string();
        let config = config.clone();
        let new_hash = task::spawn_blocking(move || hash_password(&password, Some(&config)))
            .await
            .context("Password hashing task panicked")??;

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(new_hash);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(&self.conn).await?;

        Ok(())
    }

    /// Applies the set fields of `changes`. `None` when the user is gone.
    pub async fn update_profile(
        &self,
        id: UserId,
        changes: ProfileChanges,
    ) -> Result<Option<User>> {
        let Some(user) = users::Entity::find_by_id(id.value())
            .one(&self.conn)
            .await
            .context("Failed to query user for profile update")?
        else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = user.into();
        if let Some(firstname) = changes.firstname {
            active.firstname = Set(firstname);
        }
        if let Some(lastname) = changes.lastname {
            active.lastname = Set(lastname);
        }
        if let Some(username) = changes.username {
            active.username = Set(username);
        }
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update user profile")?;

        info!("Updated profile of user {}", model.id);
        Ok(Some(User::from(model)))
    }

    /// Verify API key and return the associated user
    pub async fn verify_api_key(&self, api_key: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::ApiKey.eq(api_key))
            .one(&self.conn)
            .await
            .context("Failed to query user by API key")?;

        Ok(user.map(User::from))
    }

    /// Regenerate API key for a user
    pub async fn regenerate_api_key(&self, id: UserId) -> Result<String> {
        let user = users::Entity::find_by_id(id.value())
            .one(&self.conn)
            .await
            .context("Failed to query user for API key regeneration")?
            .ok_or_else(|| anyhow::anyhow!("User not found: {id}"))?;

        let new_api_key = generate_api_key();

        let mut active: users::ActiveModel = user.into();
        active.api_key = Set(new_api_key.clone());
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(&self.conn).await?;

        Ok(new_api_key)
    }

    /// Deletes a user and everything they own in one transaction.
    pub async fn remove(&self, id: UserId) -> Result<bool> {
        let txn = self.conn.begin().await?;

        if let Some(watchlist) = watchlists::Entity::find()
            .filter(watchlists::Column::UserId.eq(id.value()))
            .one(&txn)
            .await?
        {
            watchlist_anime::Entity::delete_many()
                .filter(watchlist_anime::Column::WatchlistId.eq(watchlist.id))
                .exec(&txn)
                .await?;
            watchlists::Entity::delete_by_id(watchlist.id)
                .exec(&txn)
                .await?;
        }

        ratings::Entity::delete_many()
            .filter(ratings::Column::UserId.eq(id.value()))
            .exec(&txn)
            .await?;

        comments::Entity::delete_many()
            .filter(comments::Column::UserId.eq(id.value()))
            .exec(&txn)
            .await?;

        let result = users::Entity::delete_by_id(id.value()).exec(&txn).await?;

        txn.commit().await?;

        let removed = result.rows_affected > 0;
        if removed {
            info!("Removed user with ID: {}", id);
        }
        Ok(removed)
    }
}

/// Hash a password using Argon2id with optional custom params.
/// If config is None, uses the argon2 crate defaults.
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

/// Checks a candidate password against a stored PHC-format hash. The hash
/// carries its own parameters, so no config is needed here.
pub fn verify_password_hash(stored_hash: &str, candidate: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(stored_hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

    Ok(Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Generate a random API key (64 character hex string)
#[must_use]
pub fn generate_api_key() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}
