//! `SeaORM` implementation of the `LibraryService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::Store;
use crate::domain::{MediaId, MediaKind, WatchStatus};
use crate::filters::{LibraryFilters, PageWindow};
use crate::models::library::{LibraryEntry, LibrarySummary, LinkForm, ToggleOutcome};
use crate::models::page::{LibraryPage, Page};
use crate::services::library_service::{LibraryError, LibraryService};

pub struct SeaOrmLibraryService {
    store: Store,
    page_size: u64,
}

impl SeaOrmLibraryService {
    #[must_use]
    pub const fn new(store: Store, page_size: u64) -> Self {
        Self { store, page_size }
    }

    async fn ensure_media(&self, kind: MediaKind, media_id: i32) -> Result<(), LibraryError> {
        if self.store.media_exists(kind.descriptor(), media_id).await? {
            Ok(())
        } else {
            Err(LibraryError::MediaNotFound { kind, id: media_id })
        }
    }
}

#[async_trait]
impl LibraryService for SeaOrmLibraryService {
    async fn list(
        &self,
        kind: MediaKind,
        user_id: i32,
        filters: LibraryFilters,
    ) -> Result<LibraryPage, LibraryError> {
        let descriptor = kind.descriptor();

        let total = self
            .store
            .count_library(descriptor, user_id, &filters)
            .await?;
        let window = PageWindow::resolve(filters.page, total, self.page_size)?;
        let items = self
            .store
            .library_page(descriptor, user_id, &filters, &window)
            .await?
            .into_iter()
            .map(|row| row.into_entry(descriptor))
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(LibraryPage {
            page: Page::new(items, &window),
            filters: filters.active(),
            statuses: WatchStatus::ALL.to_vec(),
        })
    }

    async fn get_entry(
        &self,
        kind: MediaKind,
        user_id: i32,
        media_id: i32,
    ) -> Result<LibraryEntry, LibraryError> {
        self.ensure_media(kind, media_id).await?;

        let descriptor = kind.descriptor();
        let row = self
            .store
            .get_link(descriptor, user_id, media_id)
            .await?
            .ok_or(LibraryError::EntryNotFound { kind, id: media_id })?;

        Ok(row.into_entry(descriptor)?)
    }

    async fn update_entry(
        &self,
        kind: MediaKind,
        user_id: i32,
        media_id: i32,
        form: &LinkForm,
    ) -> Result<LibraryEntry, LibraryError> {
        self.ensure_media(kind, media_id).await?;

        let descriptor = kind.descriptor();
        if self.store.get_link(descriptor, user_id, media_id).await?.is_none() {
            return Err(LibraryError::EntryNotFound { kind, id: media_id });
        }

        let update = form.validate()?;
        if !self
            .store
            .update_link(descriptor, user_id, media_id, &update)
            .await?
        {
            return Err(LibraryError::EntryNotFound { kind, id: media_id });
        }

        info!(kind = %kind, media_id, user_id, status = %update.status, "Library entry updated");

        self.get_entry(kind, user_id, media_id).await
    }

    async fn toggle(
        &self,
        kind: MediaKind,
        user_id: i32,
        media_id: i32,
    ) -> Result<ToggleOutcome, LibraryError> {
        self.ensure_media(kind, media_id).await?;

        let in_library = self
            .store
            .toggle_link(kind.descriptor(), user_id, media_id)
            .await?;

        info!(kind = %kind, media_id, user_id, in_library, "Library membership toggled");

        Ok(ToggleOutcome {
            kind,
            media_id: MediaId::new(media_id),
            in_library,
        })
    }

    async fn summary(&self, user_id: i32) -> Result<LibrarySummary, LibraryError> {
        let mut summary = LibrarySummary::default();
        for kind in MediaKind::ALL {
            let count = self.store.library_count(kind.descriptor(), user_id).await?;
            summary.set(kind, count);
        }
        Ok(summary)
    }
}
