//! Domain service for a user's personal library.
//!
//! A library entry is the link between one user and one media item; it
//! carries the user's rate, watch status and comment.

use thiserror::Error;

use crate::domain::{FieldError, MediaKind};
use crate::filters::{LibraryFilters, PageError};
use crate::models::library::{LibraryEntry, LibrarySummary, LinkForm, ToggleOutcome};
use crate::models::page::LibraryPage;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("{kind} {id} not found")]
    MediaNotFound { kind: MediaKind, id: i32 },

    #[error("{kind} {id} is not in your library")]
    EntryNotFound { kind: MediaKind, id: i32 },

    #[error(transparent)]
    Page(#[from] PageError),

    #[error("Validation failed: {0}")]
    Validation(FieldError),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<FieldError> for LibraryError {
    fn from(err: FieldError) -> Self {
        Self::Validation(err)
    }
}

impl From<sea_orm::DbErr> for LibraryError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for LibraryError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait LibraryService: Send + Sync {
    /// The user's entries for one kind, best rated first.
    async fn list(
        &self,
        kind: MediaKind,
        user_id: i32,
        filters: LibraryFilters,
    ) -> Result<LibraryPage, LibraryError>;

    /// # Errors
    ///
    /// Returns [`LibraryError::MediaNotFound`] or
    /// [`LibraryError::EntryNotFound`].
    async fn get_entry(
        &self,
        kind: MediaKind,
        user_id: i32,
        media_id: i32,
    ) -> Result<LibraryEntry, LibraryError>;

    /// Validates and writes rate, status and comment.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::Validation`] without writing anything when a
    /// field is invalid, e.g. a rate outside 0 to 5.
    async fn update_entry(
        &self,
        kind: MediaKind,
        user_id: i32,
        media_id: i32,
        form: &LinkForm,
    ) -> Result<LibraryEntry, LibraryError>;

    /// Adds the item to the library if absent, removes it if present.
    async fn toggle(
        &self,
        kind: MediaKind,
        user_id: i32,
        media_id: i32,
    ) -> Result<ToggleOutcome, LibraryError>;

    async fn summary(&self, user_id: i32) -> Result<LibrarySummary, LibraryError>;
}
