//! Query-string parsing for the list endpoints.
//!
//! Each stage is parsed on its own: a bad value disables that stage only,
//! and the remaining stages still apply.

pub mod pagination;
pub mod stages;

pub use pagination::{PageError, PageSelector, PageWindow};
pub use stages::TitleFilterable;

use tracing::debug;

use crate::constants::limits::TITLE_MAX_LEN;
use crate::domain::{KindDescriptor, OrderField, WatchStatus};
use crate::models::page::ActiveFilters;

/// Decoded `application/x-www-form-urlencoded` query pairs, in order.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    #[must_use]
    pub fn parse(query: Option<&str>) -> Self {
        let pairs = query
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default();
        Self { pairs }
    }

    /// Last value for `key`, matching how forms resolve repeated scalars.
    #[must_use]
    pub fn last(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value for `key`, also accepting the `key[]` spelling.
    #[must_use]
    pub fn all(&self, key: &str) -> Vec<&str> {
        let bracketed = format!("{key}[]");
        self.pairs
            .iter()
            .filter(|(k, _)| k == key || *k == bracketed)
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

/// Title stage input. Blank is a no-op and over-long input is rejected.
#[must_use]
pub fn parse_title(raw: Option<&str>) -> Option<String> {
    let title = raw.map(str::trim).filter(|t| !t.is_empty())?;
    if title.chars().count() > TITLE_MAX_LEN {
        debug!(len = title.chars().count(), "Ignoring over-long title filter");
        return None;
    }
    Some(title.to_string())
}

/// Genre stage input.
///
/// Validated as a whole: one malformed id disables the stage. Existence of
/// the ids is checked later against the genre table.
#[must_use]
pub fn parse_genres(raw: &[&str]) -> Vec<i32> {
    let mut ids = Vec::with_capacity(raw.len());
    for value in raw.iter().map(|v| v.trim()).filter(|v| !v.is_empty()) {
        match value.parse::<i32>() {
            Ok(id) if id > 0 => ids.push(id),
            _ => {
                debug!(value, "Ignoring genre filter with malformed id");
                return Vec::new();
            }
        }
    }
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Status stage input; unknown values disable the stage.
#[must_use]
pub fn parse_status(raw: Option<&str>) -> Option<WatchStatus> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    let status = WatchStatus::from_param(raw);
    if status.is_none() {
        debug!(value = raw, "Ignoring unknown show_only filter");
    }
    status
}

/// Parsed inputs for the shared catalog list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogFilters {
    pub title: Option<String>,
    pub genres: Vec<i32>,
    pub order: OrderField,
    pub page: PageSelector,
}

impl CatalogFilters {
    /// Only the page selector can fail, since a bad page is a 404 rather than
    /// a skipped stage.
    pub fn from_params(
        params: &QueryParams,
        descriptor: &KindDescriptor,
    ) -> Result<Self, PageError> {
        Ok(Self {
            title: parse_title(params.last("title")),
            genres: parse_genres(&params.all("genres")),
            order: descriptor.resolve_order(params.last("order")),
            page: PageSelector::parse(params.last("page"))?,
        })
    }

    /// Drops the genre stage, used when an id names no existing genre.
    pub fn without_genres(&mut self) {
        self.genres.clear();
    }

    #[must_use]
    pub fn active(&self) -> ActiveFilters {
        ActiveFilters {
            title: self.title.clone(),
            genres: self.genres.clone(),
            order: self.order.as_param(),
            show_only: None,
        }
    }
}

/// Parsed inputs for a user's library list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryFilters {
    pub title: Option<String>,
    pub show_only: Option<WatchStatus>,
    pub page: PageSelector,
}

impl LibraryFilters {
    pub fn from_params(params: &QueryParams) -> Result<Self, PageError> {
        Ok(Self {
            title: parse_title(params.last("title")),
            show_only: parse_status(params.last("show_only")),
            page: PageSelector::parse(params.last("page"))?,
        })
    }

    #[must_use]
    pub fn active(&self) -> ActiveFilters {
        ActiveFilters {
            title: self.title.clone(),
            genres: Vec::new(),
            order: "-rate",
            show_only: self.show_only,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MediaKind;

    #[test]
    fn repeated_and_bracketed_genres_are_collected() {
        let params = QueryParams::parse(Some("genres=2&genres%5B%5D=1&genres=2&title=x"));
        assert_eq!(params.all("genres"), vec!["2", "1", "2"]);
        assert_eq!(parse_genres(&params.all("genres")), vec![1, 2]);
    }

    #[test]
    fn last_scalar_wins() {
        let params = QueryParams::parse(Some("order=title&order=-year_released"));
        assert_eq!(params.last("order"), Some("-year_released"));
        assert_eq!(params.last("missing"), None);
    }

    #[test]
    fn malformed_genre_disables_only_that_stage() {
        let params = QueryParams::parse(Some("title=Test&genres=1&genres=abc&order=-year_released"));
        let filters =
            CatalogFilters::from_params(&params, MediaKind::Movie.descriptor()).unwrap();
        assert_eq!(filters.title.as_deref(), Some("Test"));
        assert!(filters.genres.is_empty());
        assert_eq!(filters.order, OrderField::YearReleasedDesc);
    }

    #[test]
    fn title_is_trimmed_and_length_checked() {
        assert_eq!(parse_title(Some("  spirited ")), Some("spirited".to_string()));
        assert_eq!(parse_title(Some("   ")), None);
        assert_eq!(parse_title(Some(&"a".repeat(256))), None);
        assert!(parse_title(Some(&"a".repeat(255))).is_some());
    }

    #[test]
    fn unknown_status_is_ignored() {
        let params = QueryParams::parse(Some("show_only=paused&title=a"));
        let filters = LibraryFilters::from_params(&params).unwrap();
        assert_eq!(filters.show_only, None);
        assert_eq!(filters.title.as_deref(), Some("a"));

        let params = QueryParams::parse(Some("show_only=1"));
        let filters = LibraryFilters::from_params(&params).unwrap();
        assert_eq!(filters.show_only, Some(WatchStatus::Watching));
    }

    #[test]
    fn bad_page_is_an_error() {
        let params = QueryParams::parse(Some("page=abc"));
        assert!(CatalogFilters::from_params(&params, MediaKind::Anime.descriptor()).is_err());
        assert!(LibraryFilters::from_params(&params).is_err());
    }

    #[test]
    fn echo_reports_the_resolved_order() {
        let params = QueryParams::parse(Some("order=-seasons"));
        let filters =
            CatalogFilters::from_params(&params, MediaKind::Movie.descriptor()).unwrap();
        assert_eq!(filters.active().order, "title");
    }
}
