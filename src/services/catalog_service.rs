//! Domain service for the shared catalogs and the genre registry.
//!
//! Every operation takes a [`MediaKind`]; the same code serves all four
//! catalogs through the kind's descriptor.

use thiserror::Error;

use crate::domain::{FieldError, MediaKind};
use crate::filters::{CatalogFilters, PageError};
use crate::models::media::{Genre, MediaDetail, MediaForm};
use crate::models::page::CatalogPage;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{kind} {id} not found")]
    NotFound { kind: MediaKind, id: i32 },

    #[error(transparent)]
    Page(#[from] PageError),

    #[error("Validation failed: {0}")]
    Validation(FieldError),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<FieldError> for CatalogError {
    fn from(err: FieldError) -> Self {
        Self::Validation(err)
    }
}

impl From<sea_orm::DbErr> for CatalogError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for CatalogError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait CatalogService: Send + Sync {
    /// One filtered, ordered page of a catalog, annotated for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Page`] when the requested page does not exist.
    async fn list(
        &self,
        kind: MediaKind,
        user_id: i32,
        filters: CatalogFilters,
    ) -> Result<CatalogPage, CatalogError>;

    /// An item with its genres, average rate and `user_id`'s library entry.
    async fn get(&self, kind: MediaKind, user_id: i32, id: i32)
    -> Result<MediaDetail, CatalogError>;

    /// # Errors
    ///
    /// Returns [`CatalogError::Validation`] for a bad field or an unknown
    /// genre id; nothing is written in that case.
    async fn create(
        &self,
        kind: MediaKind,
        user_id: i32,
        form: &MediaForm,
    ) -> Result<MediaDetail, CatalogError>;

    /// Replaces every field and the genre set.
    async fn update(
        &self,
        kind: MediaKind,
        user_id: i32,
        id: i32,
        form: &MediaForm,
    ) -> Result<MediaDetail, CatalogError>;

    /// Deletes the item together with all library links to it.
    async fn delete(&self, kind: MediaKind, id: i32) -> Result<(), CatalogError>;

    async fn list_genres(&self) -> Result<Vec<Genre>, CatalogError>;

    /// # Errors
    ///
    /// Returns [`CatalogError::Conflict`] if a genre with the same name
    /// (ignoring case) exists.
    async fn create_genre(&self, name: &str) -> Result<Genre, CatalogError>;
}
