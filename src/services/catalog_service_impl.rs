//! `SeaORM` implementation of the `CatalogService` trait.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::constants::limits::GENRE_NAME_MAX_LEN;
use crate::db::{MediaRow, Store, is_unique_violation};
use crate::domain::{FieldError, KindDescriptor, MediaKind};
use crate::filters::{CatalogFilters, PageWindow};
use crate::models::media::{CatalogItem, Genre, MediaDetail, MediaForm, MediaInput};
use crate::models::page::{CatalogPage, OrderOption, Page};
use crate::services::catalog_service::{CatalogError, CatalogService};

pub struct SeaOrmCatalogService {
    store: Store,
    page_size: u64,
}

impl SeaOrmCatalogService {
    #[must_use]
    pub const fn new(store: Store, page_size: u64) -> Self {
        Self { store, page_size }
    }

    async fn detail(
        &self,
        descriptor: &KindDescriptor,
        user_id: i32,
        row: MediaRow,
    ) -> Result<MediaDetail, CatalogError> {
        let ids = [row.id];
        let genres = self
            .store
            .media_genres(descriptor, &ids)
            .await?
            .remove(&row.id)
            .unwrap_or_default();
        let average_rate = self
            .store
            .average_rates(descriptor, &ids)
            .await?
            .get(&row.id)
            .copied();
        let library_entry = self
            .store
            .get_link(descriptor, user_id, row.id)
            .await?
            .map(|link| link.into_entry(descriptor))
            .transpose()?;

        Ok(MediaDetail {
            item: row.into_item(descriptor, genres),
            average_rate,
            library_entry,
        })
    }

    async fn fetch_detail(
        &self,
        kind: MediaKind,
        user_id: i32,
        id: i32,
    ) -> Result<MediaDetail, CatalogError> {
        let descriptor = kind.descriptor();
        let row = self
            .store
            .get_media(descriptor, id)
            .await?
            .ok_or(CatalogError::NotFound { kind, id })?;

        self.detail(descriptor, user_id, row).await
    }

    /// Validates the form and checks that every genre id exists.
    async fn validated_input(
        &self,
        kind: MediaKind,
        form: &MediaForm,
    ) -> Result<MediaInput, CatalogError> {
        let input = form.validate(kind)?;

        let missing = self.store.missing_genre_ids(&input.genre_ids).await?;
        if let Some(id) = missing.first() {
            return Err(FieldError::new(
                "genres",
                format!("Select a valid choice. {id} is not one of the available choices."),
            )
            .into());
        }

        Ok(input)
    }
}

#[async_trait]
impl CatalogService for SeaOrmCatalogService {
    async fn list(
        &self,
        kind: MediaKind,
        user_id: i32,
        mut filters: CatalogFilters,
    ) -> Result<CatalogPage, CatalogError> {
        let descriptor = kind.descriptor();

        if !filters.genres.is_empty() {
            let missing = self.store.missing_genre_ids(&filters.genres).await?;
            if !missing.is_empty() {
                debug!(?missing, "Ignoring genre filter with unknown ids");
                filters.without_genres();
            }
        }

        let total = self.store.count_catalog(descriptor, &filters).await?;
        let window = PageWindow::resolve(filters.page, total, self.page_size)?;
        let rows = self
            .store
            .catalog_page(descriptor, &filters, &window)
            .await?;

        let ids: Vec<i32> = rows.iter().map(|row| row.id).collect();
        let mut genres = self.store.media_genres(descriptor, &ids).await?;
        let averages = self.store.average_rates(descriptor, &ids).await?;
        let members = self
            .store
            .library_member_ids(descriptor, user_id, &ids)
            .await?;

        let items = rows
            .into_iter()
            .map(|row| {
                let id = row.id;
                CatalogItem {
                    average_rate: averages.get(&id).copied(),
                    in_library: members.contains(&id),
                    item: row.into_item(descriptor, genres.remove(&id).unwrap_or_default()),
                }
            })
            .collect();

        Ok(CatalogPage {
            page: Page::new(items, &window),
            filters: filters.active(),
            order_options: descriptor
                .order_fields
                .iter()
                .copied()
                .map(OrderOption::from)
                .collect(),
            genres: self.store.list_genres().await?,
        })
    }

    async fn get(
        &self,
        kind: MediaKind,
        user_id: i32,
        id: i32,
    ) -> Result<MediaDetail, CatalogError> {
        self.fetch_detail(kind, user_id, id).await
    }

    async fn create(
        &self,
        kind: MediaKind,
        user_id: i32,
        form: &MediaForm,
    ) -> Result<MediaDetail, CatalogError> {
        let input = self.validated_input(kind, form).await?;
        let id = self.store.create_media(kind.descriptor(), &input).await?;

        info!(kind = %kind, id, title = %input.title, "Media item created");

        self.fetch_detail(kind, user_id, id).await
    }

    async fn update(
        &self,
        kind: MediaKind,
        user_id: i32,
        id: i32,
        form: &MediaForm,
    ) -> Result<MediaDetail, CatalogError> {
        let descriptor = kind.descriptor();
        if !self.store.media_exists(descriptor, id).await? {
            return Err(CatalogError::NotFound { kind, id });
        }

        let input = self.validated_input(kind, form).await?;
        if !self.store.update_media(descriptor, id, &input).await? {
            return Err(CatalogError::NotFound { kind, id });
        }

        info!(kind = %kind, id, "Media item updated");

        self.fetch_detail(kind, user_id, id).await
    }

    async fn delete(&self, kind: MediaKind, id: i32) -> Result<(), CatalogError> {
        if !self.store.delete_media(kind.descriptor(), id).await? {
            return Err(CatalogError::NotFound { kind, id });
        }

        info!(kind = %kind, id, "Media item deleted");
        Ok(())
    }

    async fn list_genres(&self) -> Result<Vec<Genre>, CatalogError> {
        Ok(self.store.list_genres().await?)
    }

    async fn create_genre(&self, name: &str) -> Result<Genre, CatalogError> {
        let name = validate_genre_name(name)?;

        if self.store.find_genre_by_name(name).await?.is_some() {
            return Err(genre_conflict(name));
        }

        // A concurrent create of the same name loses on the unique index.
        let genre = match self.store.create_genre(name).await {
            Ok(genre) => genre,
            Err(e) if is_unique_violation(&e) => return Err(genre_conflict(name)),
            Err(e) => return Err(e.into()),
        };
        info!(id = genre.id, name = %genre.name, "Genre created");
        Ok(genre)
    }
}

fn genre_conflict(name: &str) -> CatalogError {
    CatalogError::Conflict(format!("Genre '{name}' already exists"))
}

fn validate_genre_name(raw: &str) -> Result<&str, FieldError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(FieldError::new("name", "This field is required."));
    }

    let len = name.chars().count();
    if len > GENRE_NAME_MAX_LEN {
        return Err(FieldError::new(
            "name",
            format!("Ensure this value has at most {GENRE_NAME_MAX_LEN} characters (it has {len})."),
        ));
    }

    Ok(name)
}
