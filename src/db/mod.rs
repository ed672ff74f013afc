use anyhow::Result;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, SqlErr, Statement,
};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::domain::KindDescriptor;
use crate::filters::{CatalogFilters, LibraryFilters, PageWindow};
use crate::models::library::LinkUpdate;
use crate::models::media::{Genre, MediaInput};

pub mod migrator;
pub mod repositories;
pub mod schema;

pub use repositories::library::LinkRow;
pub use repositories::media::MediaRow;
pub use repositories::user::{NewUser, User};

/// Whether `err` was caused by a unique index rejecting a write.
#[must_use]
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<DbErr>().and_then(DbErr::sql_err),
        Some(SqlErr::UniqueConstraintViolation(_))
    )
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

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

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

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn genre_repo(&self) -> repositories::genre::GenreRepository {
        repositories::genre::GenreRepository::new(self.conn.clone())
    }

    fn media_repo(&self) -> repositories::media::MediaRepository {
        repositories::media::MediaRepository::new(self.conn.clone())
    }

    fn library_repo(&self) -> repositories::library::LibraryRepository {
        repositories::library::LibraryRepository::new(self.conn.clone())
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub async fn create_user(&self, new_user: NewUser<'_>, config: &SecurityConfig) -> Result<User> {
        self.user_repo().create(new_user, config).await
    }

    pub async fn get_user_by_id(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn verify_user_password(&self, username: &str, password: &str) -> Result<Option<User>> {
        self.user_repo().verify_password(username, password).await
    }

    pub async fn verify_api_key(&self, api_key: &str) -> Result<Option<User>> {
        self.user_repo().verify_api_key(api_key).await
    }

    pub async fn delete_user(&self, username: &str) -> Result<bool> {
        self.user_repo().delete_by_username(username).await
    }

    // ========================================================================
    // Genres
    // ========================================================================

    pub async fn list_genres(&self) -> Result<Vec<Genre>> {
        self.genre_repo().list().await
    }

    pub async fn find_genre_by_name(&self, name: &str) -> Result<Option<Genre>> {
        self.genre_repo().find_by_name(name).await
    }

    pub async fn create_genre(&self, name: &str) -> Result<Genre> {
        self.genre_repo().create(name).await
    }

    pub async fn missing_genre_ids(&self, ids: &[i32]) -> Result<Vec<i32>> {
        self.genre_repo().missing_ids(ids).await
    }

    // ========================================================================
    // Media
    // ========================================================================

    pub async fn count_catalog(
        &self,
        descriptor: &KindDescriptor,
        filters: &CatalogFilters,
    ) -> Result<u64> {
        self.media_repo().count_catalog(descriptor, filters).await
    }

    pub async fn catalog_page(
        &self,
        descriptor: &KindDescriptor,
        filters: &CatalogFilters,
        window: &PageWindow,
    ) -> Result<Vec<MediaRow>> {
        self.media_repo()
            .catalog_page(descriptor, filters, window)
            .await
    }

    pub async fn get_media(&self, descriptor: &KindDescriptor, id: i32) -> Result<Option<MediaRow>> {
        self.media_repo().get(descriptor, id).await
    }

    pub async fn media_exists(&self, descriptor: &KindDescriptor, id: i32) -> Result<bool> {
        self.media_repo().exists(descriptor, id).await
    }

    pub async fn media_genres(
        &self,
        descriptor: &KindDescriptor,
        media_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<Genre>>> {
        self.media_repo().genres_for(descriptor, media_ids).await
    }

    pub async fn average_rates(
        &self,
        descriptor: &KindDescriptor,
        media_ids: &[i32],
    ) -> Result<HashMap<i32, f64>> {
        self.media_repo().average_rates(descriptor, media_ids).await
    }

    pub async fn library_member_ids(
        &self,
        descriptor: &KindDescriptor,
        user_id: i32,
        media_ids: &[i32],
    ) -> Result<HashSet<i32>> {
        self.media_repo()
            .member_ids(descriptor, user_id, media_ids)
            .await
    }

    pub async fn create_media(&self, descriptor: &KindDescriptor, input: &MediaInput) -> Result<i32> {
        self.media_repo().create(descriptor, input).await
    }

    pub async fn update_media(
        &self,
        descriptor: &KindDescriptor,
        id: i32,
        input: &MediaInput,
    ) -> Result<bool> {
        self.media_repo().update(descriptor, id, input).await
    }

    pub async fn delete_media(&self, descriptor: &KindDescriptor, id: i32) -> Result<bool> {
        self.media_repo().delete(descriptor, id).await
    }

    // ========================================================================
    // Library links
    // ========================================================================

    pub async fn count_library(
        &self,
        descriptor: &KindDescriptor,
        user_id: i32,
        filters: &LibraryFilters,
    ) -> Result<u64> {
        self.library_repo()
            .count_page(descriptor, user_id, filters)
            .await
    }

    pub async fn library_page(
        &self,
        descriptor: &KindDescriptor,
        user_id: i32,
        filters: &LibraryFilters,
        window: &PageWindow,
    ) -> Result<Vec<LinkRow>> {
        self.library_repo()
            .list_page(descriptor, user_id, filters, window)
            .await
    }

    pub async fn get_link(
        &self,
        descriptor: &KindDescriptor,
        user_id: i32,
        media_id: i32,
    ) -> Result<Option<LinkRow>> {
        self.library_repo().get(descriptor, user_id, media_id).await
    }

    pub async fn toggle_link(
        &self,
        descriptor: &KindDescriptor,
        user_id: i32,
        media_id: i32,
    ) -> Result<bool> {
        self.library_repo()
            .toggle(descriptor, user_id, media_id)
            .await
    }

    pub async fn update_link(
        &self,
        descriptor: &KindDescriptor,
        user_id: i32,
        media_id: i32,
        update: &LinkUpdate,
    ) -> Result<bool> {
        self.library_repo()
            .update(descriptor, user_id, media_id, update)
            .await
    }

    pub async fn library_count(&self, descriptor: &KindDescriptor, user_id: i32) -> Result<u64> {
        self.library_repo()
            .count_for_user(descriptor, user_id)
            .await
    }
}
