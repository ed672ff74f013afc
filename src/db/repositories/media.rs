//! Generic media-table access, parameterised by a [`KindDescriptor`].

use anyhow::{Context, Result};
use sea_orm::sea_query::{
    Alias, Condition, Expr, Func, Order, Query, SelectStatement, SimpleExpr,
};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, FromQueryResult, TransactionTrait,
};
use std::collections::{HashMap, HashSet};

use crate::db::schema::{Genres as GenreCols, KindTables, Media, MediaGenre, MediaLink};
use crate::domain::{KindDescriptor, MediaId};
use crate::filters::stages::{TitleFilterable, apply_catalog_order, genre_condition, search_key};
use crate::filters::{CatalogFilters, PageWindow};
use crate::models::media::{Genre, MediaInput, MediaItem};

/// A media row without its genres.
#[derive(Debug, Clone, FromQueryResult)]
pub struct MediaRow {
    pub id: i32,
    pub title: String,
    pub year_released: Option<i32>,
    pub seasons: Option<i32>,
    pub episodes: Option<i32>,
    pub description: Option<String>,
}

impl MediaRow {
    #[must_use]
    pub fn into_item(self, descriptor: &KindDescriptor, genres: Vec<Genre>) -> MediaItem {
        MediaItem {
            id: MediaId::new(self.id),
            kind: descriptor.kind,
            title: self.title,
            year_released: self.year_released,
            seasons: self.seasons,
            episodes: self.episodes,
            description: self.description,
            genres,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct CountRow {
    count: i64,
}

#[derive(Debug, FromQueryResult)]
struct GenreLinkRow {
    media_id: i32,
    id: i32,
    name: String,
    name_key: String,
}

#[derive(Debug, FromQueryResult)]
struct AverageRow {
    media_id: i32,
    average_rate: f64,
}

#[derive(Debug, FromQueryResult)]
struct IdRow {
    media_id: i32,
}

pub struct MediaRepository {
    conn: DatabaseConnection,
}

impl MediaRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    // ========================================================================
    // Catalog Queries
    // ========================================================================

    pub async fn count_catalog(
        &self,
        descriptor: &KindDescriptor,
        filters: &CatalogFilters,
    ) -> Result<u64> {
        let stmt = Query::select()
            .expr_as(
                Func::count(Expr::col((descriptor.media_table(), Media::Id))),
                Alias::new("count"),
            )
            .from(descriptor.media_table())
            .cond_where(catalog_condition(descriptor, filters))
            .to_owned();

        self.count(&stmt).await
    }

    /// One page of the catalog, narrowed then ordered then sliced in a
    /// single statement.
    pub async fn catalog_page(
        &self,
        descriptor: &KindDescriptor,
        filters: &CatalogFilters,
        window: &PageWindow,
    ) -> Result<Vec<MediaRow>> {
        let mut stmt = Query::select();
        select_media_columns(&mut stmt, descriptor);
        stmt.from(descriptor.media_table())
            .cond_where(catalog_condition(descriptor, filters));
        apply_catalog_order(&mut stmt, descriptor, filters.order);
        stmt.limit(window.per_page).offset(window.offset());

        let backend = self.conn.get_database_backend();
        let rows = MediaRow::find_by_statement(backend.build(&stmt))
            .all(&self.conn)
            .await
            .with_context(|| format!("Failed to list {}", descriptor.table))?;

        Ok(rows)
    }

    pub async fn get(&self, descriptor: &KindDescriptor, id: i32) -> Result<Option<MediaRow>> {
        let mut stmt = Query::select();
        select_media_columns(&mut stmt, descriptor);
        stmt.from(descriptor.media_table())
            .and_where(Expr::col((descriptor.media_table(), Media::Id)).eq(id));

        let backend = self.conn.get_database_backend();
        let row = MediaRow::find_by_statement(backend.build(&stmt))
            .one(&self.conn)
            .await
            .with_context(|| format!("Failed to query {} by ID", descriptor.table))?;

        Ok(row)
    }

    pub async fn exists(&self, descriptor: &KindDescriptor, id: i32) -> Result<bool> {
        let stmt = Query::select()
            .expr_as(Func::count(Expr::col(Media::Id)), Alias::new("count"))
            .from(descriptor.media_table())
            .and_where(Expr::col(Media::Id).eq(id))
            .to_owned();

        Ok(self.count(&stmt).await? > 0)
    }

    /// Genres of each listed item, ordered by name.
    pub async fn genres_for(
        &self,
        descriptor: &KindDescriptor,
        media_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<Genre>>> {
        if media_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let join = descriptor.genre_table();
        let stmt = Query::select()
            .column((join.clone(), MediaGenre::MediaId))
            .column((GenreCols::Table, GenreCols::Id))
            .column((GenreCols::Table, GenreCols::Name))
            .column((GenreCols::Table, GenreCols::NameKey))
            .from(join.clone())
            .inner_join(
                GenreCols::Table,
                Expr::col((join.clone(), MediaGenre::GenreId))
                    .equals((GenreCols::Table, GenreCols::Id)),
            )
            .and_where(Expr::col((join, MediaGenre::MediaId)).is_in(media_ids.iter().copied()))
            .order_by((GenreCols::Table, GenreCols::Name), Order::Asc)
            .to_owned();

        let backend = self.conn.get_database_backend();
        let rows = GenreLinkRow::find_by_statement(backend.build(&stmt))
            .all(&self.conn)
            .await?;

        let mut map: HashMap<i32, Vec<Genre>> = HashMap::new();
        for row in rows {
            map.entry(row.media_id).or_default().push(Genre {
                id: row.id,
                name: row.name,
                name_key: row.name_key,
            });
        }
        Ok(map)
    }

    /// Mean rate per item over links with a rate; unrated items are absent.
    pub async fn average_rates(
        &self,
        descriptor: &KindDescriptor,
        media_ids: &[i32],
    ) -> Result<HashMap<i32, f64>> {
        if media_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let stmt = Query::select()
            .column(MediaLink::MediaId)
            .expr_as(Func::avg(Expr::col(MediaLink::Rate)), Alias::new("average_rate"))
            .from(descriptor.link_table())
            .and_where(Expr::col(MediaLink::MediaId).is_in(media_ids.iter().copied()))
            .and_where(Expr::col(MediaLink::Rate).is_not_null())
            .group_by_col(MediaLink::MediaId)
            .to_owned();

        let backend = self.conn.get_database_backend();
        let rows = AverageRow::find_by_statement(backend.build(&stmt))
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.media_id, row.average_rate))
            .collect())
    }

    /// Which of `media_ids` are in `user_id`'s library.
    pub async fn member_ids(
        &self,
        descriptor: &KindDescriptor,
        user_id: i32,
        media_ids: &[i32],
    ) -> Result<HashSet<i32>> {
        if media_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let stmt = Query::select()
            .column(MediaLink::MediaId)
            .from(descriptor.link_table())
            .and_where(Expr::col(MediaLink::UserId).eq(user_id))
            .and_where(Expr::col(MediaLink::MediaId).is_in(media_ids.iter().copied()))
            .to_owned();

        let backend = self.conn.get_database_backend();
        let rows = IdRow::find_by_statement(backend.build(&stmt))
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(|row| row.media_id).collect())
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    pub async fn create(&self, descriptor: &KindDescriptor, input: &MediaInput) -> Result<i32> {
        let backend = self.conn.get_database_backend();
        let txn = self.conn.begin().await?;

        let (columns, values) = field_values(descriptor, input);
        let insert = Query::insert()
            .into_table(descriptor.media_table())
            .columns(columns)
            .values(values)?
            .to_owned();

        let result = txn.execute(backend.build(&insert)).await?;
        let id = i32::try_from(result.last_insert_id())
            .context("Inserted media id does not fit in i32")?;

        replace_genres(&txn, descriptor, id, &input.genre_ids).await?;

        txn.commit().await?;
        Ok(id)
    }

    /// Full replacement of fields and genre set. `false` if the item is gone.
    pub async fn update(
        &self,
        descriptor: &KindDescriptor,
        id: i32,
        input: &MediaInput,
    ) -> Result<bool> {
        let backend = self.conn.get_database_backend();
        let txn = self.conn.begin().await?;

        let (columns, values) = field_values(descriptor, input);
        let update = Query::update()
            .table(descriptor.media_table())
            .values(columns.into_iter().zip(values))
            .and_where(Expr::col(Media::Id).eq(id))
            .to_owned();

        let result = txn.execute(backend.build(&update)).await?;
        if result.rows_affected() == 0 {
            txn.rollback().await?;
            return Ok(false);
        }

        replace_genres(&txn, descriptor, id, &input.genre_ids).await?;

        txn.commit().await?;
        Ok(true)
    }

    /// Removes the item with its genre rows and every user's link to it.
    pub async fn delete(&self, descriptor: &KindDescriptor, id: i32) -> Result<bool> {
        let backend = self.conn.get_database_backend();
        let txn = self.conn.begin().await?;

        let links = Query::delete()
            .from_table(descriptor.link_table())
            .and_where(Expr::col(MediaLink::MediaId).eq(id))
            .to_owned();
        txn.execute(backend.build(&links)).await?;

        let genres = Query::delete()
            .from_table(descriptor.genre_table())
            .and_where(Expr::col(MediaGenre::MediaId).eq(id))
            .to_owned();
        txn.execute(backend.build(&genres)).await?;

        let media = Query::delete()
            .from_table(descriptor.media_table())
            .and_where(Expr::col(Media::Id).eq(id))
            .to_owned();
        let result = txn.execute(backend.build(&media)).await?;

        txn.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self, stmt: &SelectStatement) -> Result<u64> {
        let backend = self.conn.get_database_backend();
        let row = CountRow::find_by_statement(backend.build(stmt))
            .one(&self.conn)
            .await?;

        Ok(row.map_or(0, |r| u64::try_from(r.count).unwrap_or_default()))
    }
}

/// Narrowing predicates of the catalog list, AND-ed together.
fn catalog_condition(descriptor: &KindDescriptor, filters: &CatalogFilters) -> Condition {
    Condition::all()
        .add_option(
            filters
                .title
                .as_deref()
                .map(|title| descriptor.title_condition(title)),
        )
        .add_option(
            (!filters.genres.is_empty()).then(|| genre_condition(descriptor, &filters.genres)),
        )
}

/// Selects the media columns, padding movies with NULL seasons/episodes so
/// every kind decodes into [`MediaRow`].
fn select_media_columns(stmt: &mut SelectStatement, descriptor: &KindDescriptor) {
    let table = descriptor.media_table();
    stmt.column((table.clone(), Media::Id))
        .column((table.clone(), Media::Title))
        .column((table.clone(), Media::YearReleased));

    if descriptor.has_episodes {
        stmt.column((table.clone(), Media::Seasons))
            .column((table.clone(), Media::Episodes));
    } else {
        stmt.expr_as(Expr::cust("NULL"), Media::Seasons)
            .expr_as(Expr::cust("NULL"), Media::Episodes);
    }

    stmt.column((table, Media::Description));
}

fn field_values(descriptor: &KindDescriptor, input: &MediaInput) -> (Vec<Media>, Vec<SimpleExpr>) {
    let mut columns = vec![
        Media::Title,
        Media::TitleSearch,
        Media::YearReleased,
        Media::Description,
    ];
    let mut values: Vec<SimpleExpr> = vec![
        input.title.clone().into(),
        search_key(&input.title).into(),
        input.year_released.into(),
        input.description.clone().into(),
    ];

    if descriptor.has_episodes {
        columns.extend([Media::Seasons, Media::Episodes]);
        values.extend([input.seasons.into(), input.episodes.into()]);
    }

    (columns, values)
}

async fn replace_genres<C: ConnectionTrait>(
    conn: &C,
    descriptor: &KindDescriptor,
    media_id: i32,
    genre_ids: &[i32],
) -> Result<()> {
    let backend = conn.get_database_backend();

    let clear = Query::delete()
        .from_table(descriptor.genre_table())
        .and_where(Expr::col(MediaGenre::MediaId).eq(media_id))
        .to_owned();
    conn.execute(backend.build(&clear)).await?;

    if genre_ids.is_empty() {
        return Ok(());
    }

    let mut insert = Query::insert();
    insert
        .into_table(descriptor.genre_table())
        .columns([MediaGenre::MediaId, MediaGenre::GenreId]);
    for genre_id in genre_ids {
        insert.values([media_id.into(), (*genre_id).into()])?;
    }
    conn.execute(backend.build(&insert)).await?;

    Ok(())
}
