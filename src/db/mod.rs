use crate::config::SecurityConfig;
use crate::domain::{AnimeId, RatingValue, UserId};
use crate::models::{Anime, AnimeDraft, Comment, Rating, Watchlist};
use anyhow::Result;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, SqlErr, Statement,
};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::user::{NewUser, ProfileChanges, User};
pub use repositories::watchlist::MembershipChange;

/// Whether `err` was caused by a unique index rejecting a write.
#[must_use]
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause.downcast_ref::<DbErr>().is_some_and(|db| {
            matches!(db.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
        })
    })
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        // Every pooled connection to an in-memory database sees its own empty
        // database, so those are pinned to a single connection.
        let in_memory = db_url.contains(":memory:");
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            let path_str = db_url.trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
            (max_connections, min_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .sqlx_logging(false);
        if !in_memory {
            opt.max_lifetime(Duration::from_secs(600));
        }

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn anime_repo(&self) -> repositories::anime::AnimeRepository {
        repositories::anime::AnimeRepository::new(self.conn.clone())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn comment_repo(&self) -> repositories::comment::CommentRepository {
        repositories::comment::CommentRepository::new(self.conn.clone())
    }

    fn rating_repo(&self) -> repositories::rating::RatingRepository {
        repositories::rating::RatingRepository::new(self.conn.clone())
    }

    fn watchlist_repo(&self) -> repositories::watchlist::WatchlistRepository {
        repositories::watchlist::WatchlistRepository::new(self.conn.clone())
    }

    pub async fn list_all_anime(&self) -> Result<Vec<Anime>> {
        self.anime_repo().list().await
    }

    pub async fn get_anime(&self, id: AnimeId) -> Result<Option<Anime>> {
        self.anime_repo().get(id).await
    }

    pub async fn get_animes_by_ids(&self, ids: &[AnimeId]) -> Result<Vec<Anime>> {
        self.anime_repo().get_many(ids).await
    }

    pub async fn get_anime_by_title(&self, title: &str) -> Result<Option<Anime>> {
        self.anime_repo().get_by_title(title).await
    }

    pub async fn anime_ids_for_titles(&self, titles: &[String]) -> Result<HashMap<String, AnimeId>> {
        self.anime_repo().ids_for_titles(titles).await
    }

    pub async fn add_anime(&self, draft: &AnimeDraft) -> Result<Anime> {
        self.anime_repo().insert(draft).await
    }

    pub async fn update_anime(&self, id: AnimeId, draft: &AnimeDraft) -> Result<Option<Anime>> {
        self.anime_repo().update(id, draft).await
    }

    pub async fn remove_anime(&self, id: AnimeId) -> Result<bool> {
        self.anime_repo().remove(id).await
    }

    pub async fn count_anime(&self) -> Result<u64> {
        self.anime_repo().count().await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repo().list().await
    }

    pub async fn user_identity_taken(
        &self,
        username: &str,
        email: &str,
        except: Option<UserId>,
    ) -> Result<(bool, bool)> {
        self.user_repo()
            .identity_taken(username, email, except)
            .await
    }

    pub async fn update_user_profile(
        &self,
        id: UserId,
        changes: ProfileChanges,
    ) -> Result<Option<User>> {
        self.user_repo().update_profile(id, changes).await
    }

    pub async fn create_user(&self, new_user: NewUser, config: &SecurityConfig) -> Result<User> {
        self.user_repo().create(new_user, config).await
    }

    pub async fn verify_user_password(&self, username: &str, password: &str) -> Result<bool> {
        self.user_repo().verify_password(username, password).await
    }

    pub async fn update_user_password(
        &self,
        id: UserId,
        new_password: &str,
        config: &SecurityConfig,
    ) -> Result<()> {
        self.user_repo()
            .update_password(id, new_password, config)
            .await
    }

    pub async fn verify_api_key(&self, api_key: &str) -> Result<Option<User>> {
        self.user_repo().verify_api_key(api_key).await
    }

    pub async fn regenerate_user_api_key(&self, id: UserId) -> Result<String> {
        self.user_repo().regenerate_api_key(id).await
    }

    pub async fn remove_user(&self, id: UserId) -> Result<bool> {
        self.user_repo().remove(id).await
    }

    pub async fn list_comments_for_anime(&self, anime_id: AnimeId) -> Result<Vec<Comment>> {
        self.comment_repo().list_for_anime(anime_id).await
    }

    pub async fn list_comments_for_user(&self, user_id: UserId) -> Result<Vec<Comment>> {
        self.comment_repo().list_for_user(user_id).await
    }

    pub async fn get_comment(&self, id: i32) -> Result<Option<Comment>> {
        self.comment_repo().get(id).await
    }

    pub async fn add_comment(
        &self,
        anime_id: AnimeId,
        user_id: UserId,
        content: &str,
    ) -> Result<i32> {
        self.comment_repo().insert(anime_id, user_id, content).await
    }

    pub async fn update_comment(&self, id: i32, content: &str) -> Result<bool> {
        self.comment_repo().update_content(id, content).await
    }

    pub async fn remove_comment(&self, id: i32) -> Result<bool> {
        self.comment_repo().remove(id).await
    }

    pub async fn upsert_rating(
        &self,
        user_id: UserId,
        anime_id: AnimeId,
        value: RatingValue,
    ) -> Result<Rating> {
        self.rating_repo().upsert(user_id, anime_id, value).await
    }

    pub async fn get_rating(&self, id: i32) -> Result<Option<Rating>> {
        self.rating_repo().get(id).await
    }

    pub async fn get_rating_by_key(&self, key: &str) -> Result<Option<Rating>> {
        self.rating_repo().get_by_key(key).await
    }

    pub async fn list_ratings_for_anime(&self, anime_id: AnimeId) -> Result<Vec<Rating>> {
        self.rating_repo().list_for_anime(anime_id).await
    }

    pub async fn list_ratings_for_user(&self, user_id: UserId) -> Result<Vec<Rating>> {
        self.rating_repo().list_for_user(user_id).await
    }

    pub async fn rating_values_for_anime(&self, anime_id: AnimeId) -> Result<Vec<i32>> {
        self.rating_repo().values_for_anime(anime_id).await
    }

    pub async fn update_rating_value(&self, id: i32, value: RatingValue) -> Result<Option<Rating>> {
        self.rating_repo().update_value(id, value).await
    }

    pub async fn remove_rating(&self, id: i32) -> Result<bool> {
        self.rating_repo().remove(id).await
    }

    pub async fn get_watchlist(&self, user_id: UserId) -> Result<Option<Watchlist>> {
        self.watchlist_repo().get_for_user(user_id).await
    }

    pub async fn add_to_watchlist(
        &self,
        user_id: UserId,
        anime_id: AnimeId,
    ) -> Result<MembershipChange> {
        self.watchlist_repo().add(user_id, anime_id).await
    }

    pub async fn remove_from_watchlist(
        &self,
        user_id: UserId,
        anime_id: AnimeId,
    ) -> Result<MembershipChange> {
        self.watchlist_repo().remove(user_id, anime_id).await
    }

    pub async fn watchlist_contains(&self, user_id: UserId, anime_id: AnimeId) -> Result<bool> {
        self.watchlist_repo().contains(user_id, anime_id).await
    }
}
