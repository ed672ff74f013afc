//! Identifiers for the per-kind tables.
//!
//! The four media kinds share one column layout, so their tables are
//! addressed through these idents plus the table names carried by each
//! [`KindDescriptor`] rather than through one entity per table.

use sea_orm::DeriveIden;
use sea_orm::sea_query::Alias;

use crate::domain::{KindDescriptor, OrderField};

/// Columns of a media table (`movies`, `anime`, ...).
#[derive(DeriveIden, Clone, Copy)]
pub enum Media {
    Id,
    Title,
    /// `title` lowercased with Unicode case mapping, for search.
    TitleSearch,
    YearReleased,
    Seasons,
    Episodes,
    Description,
}

/// Columns of a media/genre join table.
#[derive(DeriveIden, Clone, Copy)]
pub enum MediaGenre {
    MediaId,
    GenreId,
}

/// Columns of a user/media link table.
#[derive(DeriveIden, Clone, Copy)]
pub enum MediaLink {
    Id,
    UserId,
    MediaId,
    Rate,
    Status,
    Comment,
}

#[derive(DeriveIden, Clone, Copy)]
pub enum Genres {
    Table,
    Id,
    Name,
    NameKey,
}

#[derive(DeriveIden, Clone, Copy)]
pub enum Users {
    Table,
    Id,
}

/// Table idents for a kind.
pub trait KindTables {
    fn media_table(&self) -> Alias;
    fn genre_table(&self) -> Alias;
    fn link_table(&self) -> Alias;
}

impl KindTables for KindDescriptor {
    fn media_table(&self) -> Alias {
        Alias::new(self.table)
    }

    fn genre_table(&self) -> Alias {
        Alias::new(self.genre_table)
    }

    fn link_table(&self) -> Alias {
        Alias::new(self.link_table)
    }
}

/// Media column an order field sorts on.
#[must_use]
pub const fn order_column(field: OrderField) -> Media {
    match field {
        OrderField::Title => Media::Title,
        OrderField::YearReleasedDesc => Media::YearReleased,
        OrderField::SeasonsDesc => Media::Seasons,
        OrderField::EpisodesDesc => Media::Episodes,
    }
}
