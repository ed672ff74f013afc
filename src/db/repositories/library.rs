//! Per-user link tables: library membership, rate, status and comment.

use anyhow::{Context, Result};
use sea_orm::sea_query::{Alias, Condition, Expr, Func, Query, SelectStatement};
use sea_orm::{ConnectionTrait, DatabaseConnection, FromQueryResult};

use crate::db::schema::{KindTables, Media, MediaLink};
use crate::domain::{KindDescriptor, MediaId, WatchStatus};
use crate::filters::stages::{TitleFilterable, apply_library_order, status_condition};
use crate::filters::{LibraryFilters, PageWindow};
use crate::models::library::{LibraryEntry, LinkUpdate};

/// A link joined with its media row.
#[derive(Debug, Clone, FromQueryResult)]
pub struct LinkRow {
    pub media_id: i32,
    pub title: String,
    pub year_released: Option<i32>,
    pub seasons: Option<i32>,
    pub episodes: Option<i32>,
    pub rate: Option<f64>,
    pub status: String,
    pub comment: Option<String>,
}

impl LinkRow {
    pub fn into_entry(self, descriptor: &KindDescriptor) -> Result<LibraryEntry> {
        let status = self
            .status
            .parse::<WatchStatus>()
            .with_context(|| format!("Bad status stored in {}", descriptor.link_table))?;

        Ok(LibraryEntry {
            media_id: MediaId::new(self.media_id),
            kind: descriptor.kind,
            title: self.title,
            year_released: self.year_released,
            seasons: self.seasons,
            episodes: self.episodes,
            rate: self.rate,
            status,
            comment: self.comment,
        })
    }
}

#[derive(Debug, FromQueryResult)]
struct CountRow {
    count: i64,
}

#[derive(Debug, FromQueryResult)]
struct LinkIdRow {
    id: i32,
}

pub struct LibraryRepository {
    conn: DatabaseConnection,
}

impl LibraryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn count_page(
        &self,
        descriptor: &KindDescriptor,
        user_id: i32,
        filters: &LibraryFilters,
    ) -> Result<u64> {
        let stmt = Query::select()
            .expr_as(
                Func::count(Expr::col((descriptor.link_table(), MediaLink::Id))),
                Alias::new("count"),
            )
            .from(descriptor.link_table())
            .inner_join(
                descriptor.media_table(),
                Expr::col((descriptor.link_table(), MediaLink::MediaId))
                    .equals((descriptor.media_table(), Media::Id)),
            )
            .cond_where(library_condition(descriptor, user_id, filters))
            .to_owned();

        self.count(&stmt).await
    }

    pub async fn list_page(
        &self,
        descriptor: &KindDescriptor,
        user_id: i32,
        filters: &LibraryFilters,
        window: &PageWindow,
    ) -> Result<Vec<LinkRow>> {
        let mut stmt = joined_select(descriptor);
        stmt.cond_where(library_condition(descriptor, user_id, filters));
        apply_library_order(&mut stmt, descriptor);
        stmt.limit(window.per_page).offset(window.offset());

        let backend = self.conn.get_database_backend();
        let rows = LinkRow::find_by_statement(backend.build(&stmt))
            .all(&self.conn)
            .await
            .with_context(|| format!("Failed to list {}", descriptor.link_table))?;

        Ok(rows)
    }

    pub async fn get(
        &self,
        descriptor: &KindDescriptor,
        user_id: i32,
        media_id: i32,
    ) -> Result<Option<LinkRow>> {
        let mut stmt = joined_select(descriptor);
        stmt.and_where(Expr::col((descriptor.link_table(), MediaLink::UserId)).eq(user_id))
            .and_where(Expr::col((descriptor.link_table(), MediaLink::MediaId)).eq(media_id));

        let backend = self.conn.get_database_backend();
        let row = LinkRow::find_by_statement(backend.build(&stmt))
            .one(&self.conn)
            .await?;

        Ok(row)
    }

    /// Adds the item if absent, removes it if present. Returns the new
    /// membership.
    ///
    /// Two statements without a transaction: a concurrent double submit can
    /// cancel out, and the unique index rejects a duplicate insert.
    pub async fn toggle(
        &self,
        descriptor: &KindDescriptor,
        user_id: i32,
        media_id: i32,
    ) -> Result<bool> {
        let backend = self.conn.get_database_backend();

        let find = Query::select()
            .column(MediaLink::Id)
            .from(descriptor.link_table())
            .and_where(Expr::col(MediaLink::UserId).eq(user_id))
            .and_where(Expr::col(MediaLink::MediaId).eq(media_id))
            .to_owned();
        let existing = LinkIdRow::find_by_statement(backend.build(&find))
            .one(&self.conn)
            .await?;

        if let Some(link) = existing {
            let delete = Query::delete()
                .from_table(descriptor.link_table())
                .and_where(Expr::col(MediaLink::Id).eq(link.id))
                .to_owned();
            self.conn.execute(backend.build(&delete)).await?;
            return Ok(false);
        }

        let insert = Query::insert()
            .into_table(descriptor.link_table())
            .columns([MediaLink::UserId, MediaLink::MediaId, MediaLink::Status])
            .values([
                user_id.into(),
                media_id.into(),
                WatchStatus::default().as_str().into(),
            ])?
            .to_owned();
        self.conn.execute(backend.build(&insert)).await?;

        Ok(true)
    }

    /// Writes rate/status/comment. `false` when the user has no such link.
    pub async fn update(
        &self,
        descriptor: &KindDescriptor,
        user_id: i32,
        media_id: i32,
        update: &LinkUpdate,
    ) -> Result<bool> {
        let backend = self.conn.get_database_backend();

        let stmt = Query::update()
            .table(descriptor.link_table())
            .values([
                (MediaLink::Rate, update.rate.map(|r| r.value()).into()),
                (MediaLink::Status, update.status.as_str().into()),
                (MediaLink::Comment, update.comment.clone().into()),
            ])
            .and_where(Expr::col(MediaLink::UserId).eq(user_id))
            .and_where(Expr::col(MediaLink::MediaId).eq(media_id))
            .to_owned();

        let result = self.conn.execute(backend.build(&stmt)).await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_for_user(&self, descriptor: &KindDescriptor, user_id: i32) -> Result<u64> {
        let stmt = Query::select()
            .expr_as(Func::count(Expr::col(MediaLink::Id)), Alias::new("count"))
            .from(descriptor.link_table())
            .and_where(Expr::col(MediaLink::UserId).eq(user_id))
            .to_owned();

        self.count(&stmt).await
    }

    async fn count(&self, stmt: &SelectStatement) -> Result<u64> {
        let backend = self.conn.get_database_backend();
        let row = CountRow::find_by_statement(backend.build(stmt))
            .one(&self.conn)
            .await?;

        Ok(row.map_or(0, |r| u64::try_from(r.count).unwrap_or_default()))
    }
}

/// Link columns plus the media columns a library row shows.
fn joined_select(descriptor: &KindDescriptor) -> SelectStatement {
    let link = descriptor.link_table();
    let media = descriptor.media_table();

    let mut stmt = Query::select();
    stmt.column((link.clone(), MediaLink::MediaId))
        .column((media.clone(), Media::Title))
        .column((media.clone(), Media::YearReleased));

    if descriptor.has_episodes {
        stmt.column((media.clone(), Media::Seasons))
            .column((media.clone(), Media::Episodes));
    } else {
        stmt.expr_as(Expr::cust("NULL"), Media::Seasons)
            .expr_as(Expr::cust("NULL"), Media::Episodes);
    }

    stmt.column((link.clone(), MediaLink::Rate))
        .column((link.clone(), MediaLink::Status))
        .column((link.clone(), MediaLink::Comment))
        .from(link.clone())
        .inner_join(
            media.clone(),
            Expr::col((link, MediaLink::MediaId)).equals((media, Media::Id)),
        );

    stmt
}

fn library_condition(
    descriptor: &KindDescriptor,
    user_id: i32,
    filters: &LibraryFilters,
) -> Condition {
    Condition::all()
        .add(Expr::col((descriptor.link_table(), MediaLink::UserId)).eq(user_id))
        .add_option(
            filters
                .title
                .as_deref()
                .map(|title| descriptor.title_condition(title)),
        )
        .add_option(
            filters
                .show_only
                .map(|status| status_condition(descriptor, status)),
        )
}
