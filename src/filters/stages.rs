//! SQL fragments for each filter stage.
//!
//! Every stage works on a `SelectStatement` whose FROM clause includes the
//! kind's media table, so the same fragments serve both the catalog and
//! the library queries.

use sea_orm::sea_query::{Expr, LikeExpr, Order, Query, SelectStatement, SimpleExpr};

use crate::db::schema::{KindTables, Media, MediaGenre, MediaLink, order_column};
use crate::domain::{KindDescriptor, OrderField, WatchStatus};

/// Case-insensitive title matching for a media table.
pub trait TitleFilterable {
    /// Predicate keeping rows whose title contains `needle`.
    fn title_condition(&self, needle: &str) -> SimpleExpr;
}

impl TitleFilterable for KindDescriptor {
    fn title_condition(&self, needle: &str) -> SimpleExpr {
        let pattern = format!("%{}%", escape_like(&search_key(needle)));
        Expr::col((self.media_table(), Media::TitleSearch))
            .like(LikeExpr::new(pattern).escape('\\'))
    }
}

/// Case-folded form of a title, as stored in the `title_search` column.
#[must_use]
pub fn search_key(title: &str) -> String {
    title.to_lowercase()
}

/// Escapes LIKE metacharacters so user input matches literally.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Keeps items in at least one of `genre_ids`.
///
/// An IN-subquery rather than a join, so an item matching several genres
/// still appears once.
#[must_use]
pub fn genre_condition(descriptor: &KindDescriptor, genre_ids: &[i32]) -> SimpleExpr {
    Expr::col((descriptor.media_table(), Media::Id)).in_subquery(
        Query::select()
            .column(MediaGenre::MediaId)
            .from(descriptor.genre_table())
            .and_where(Expr::col(MediaGenre::GenreId).is_in(genre_ids.iter().copied()))
            .to_owned(),
    )
}

#[must_use]
pub fn status_condition(descriptor: &KindDescriptor, status: WatchStatus) -> SimpleExpr {
    Expr::col((descriptor.link_table(), MediaLink::Status)).eq(status.as_str())
}

/// Catalog ordering: the requested field, then id for a stable page split.
///
/// SQLite sorts NULL lowest, so descending orders put unknown values last.
pub fn apply_catalog_order(
    stmt: &mut SelectStatement,
    descriptor: &KindDescriptor,
    field: OrderField,
) {
    let field = if descriptor.allows(field) {
        field
    } else {
        OrderField::Title
    };
    let direction = if field.is_descending() {
        Order::Desc
    } else {
        Order::Asc
    };
    stmt.order_by((descriptor.media_table(), order_column(field)), direction)
        .order_by((descriptor.media_table(), Media::Id), Order::Asc);
}

/// Library ordering: best rated first, unrated last, then title and id.
pub fn apply_library_order(stmt: &mut SelectStatement, descriptor: &KindDescriptor) {
    stmt.order_by((descriptor.link_table(), MediaLink::Rate), Order::Desc)
        .order_by((descriptor.media_table(), Media::Title), Order::Asc)
        .order_by((descriptor.media_table(), Media::Id), Order::Asc);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MediaKind;
    use sea_orm::sea_query::{QueryStatementWriter, SqliteQueryBuilder};

    fn base(descriptor: &KindDescriptor) -> SelectStatement {
        Query::select()
            .column((descriptor.media_table(), Media::Id))
            .from(descriptor.media_table())
            .to_owned()
    }

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn search_key_folds_beyond_ascii() {
        assert_eq!(search_key("ÅNGEST"), "ångest");
        assert_eq!(search_key("Amélie"), "amélie");
        assert_eq!(search_key("ÉMOTION"), search_key("émotion"));
    }

    #[test]
    fn title_condition_matches_the_folded_column() {
        let movie = MediaKind::Movie.descriptor();
        let sql = base(movie)
            .and_where(movie.title_condition("ÉliTE_"))
            .to_string(SqliteQueryBuilder);
        assert!(sql.contains(r#""movies"."title_search" LIKE"#), "{sql}");
        assert!(sql.contains("élite"), "{sql}");
        assert!(!sql.contains("ÉliTE"), "{sql}");
        assert!(sql.contains("ESCAPE"), "{sql}");
    }

    #[test]
    fn genre_condition_uses_the_kind_join_table() {
        let anime = MediaKind::Anime.descriptor();
        let sql = base(anime)
            .and_where(genre_condition(anime, &[1, 2]))
            .to_string(SqliteQueryBuilder);
        assert!(sql.contains(r#""anime"."id" IN (SELECT "media_id" FROM "anime_genres""#), "{sql}");
        assert!(sql.contains(r#""genre_id" IN (1, 2)"#), "{sql}");
    }

    #[test]
    fn disallowed_order_falls_back_to_title() {
        let movie = MediaKind::Movie.descriptor();
        let mut stmt = base(movie);
        apply_catalog_order(&mut stmt, movie, OrderField::EpisodesDesc);
        let sql = stmt.to_string(SqliteQueryBuilder);
        assert!(
            sql.ends_with(r#"ORDER BY "movies"."title" ASC, "movies"."id" ASC"#),
            "{sql}"
        );
    }

    #[test]
    fn descending_orders_keep_id_tie_break() {
        let series = MediaKind::Series.descriptor();
        let mut stmt = base(series);
        apply_catalog_order(&mut stmt, series, OrderField::SeasonsDesc);
        let sql = stmt.to_string(SqliteQueryBuilder);
        assert!(
            sql.ends_with(r#"ORDER BY "series"."seasons" DESC, "series"."id" ASC"#),
            "{sql}"
        );
    }
}
