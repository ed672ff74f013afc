use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::forms::{optional_integer, optional_text};
use super::library::LibraryEntry;
use crate::constants::limits::TITLE_MAX_LEN;
use crate::domain::{FieldError, MediaId, MediaKind};
use crate::entities::genres;

pub type Genre = genres::Model;

/// A catalog entry of any kind.
///
/// `seasons` and `episodes` are always `None` for movies and are left out of
/// the serialized form when unset.
#[derive(Debug, Clone, Serialize)]
pub struct MediaItem {
    pub id: MediaId,
    pub kind: MediaKind,
    pub title: String,
    pub year_released: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seasons: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episodes: Option<i32>,
    pub description: Option<String>,
    pub genres: Vec<Genre>,
}

/// A row of the shared catalog list.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogItem {
    #[serde(flatten)]
    pub item: MediaItem,
    /// Mean of all non-null user rates, `None` when nobody rated it.
    pub average_rate: Option<f64>,
    pub in_library: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MediaDetail {
    #[serde(flatten)]
    pub item: MediaItem,
    pub average_rate: Option<f64>,
    pub library_entry: Option<LibraryEntry>,
}

/// Raw create/update payload for a media item.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaForm {
    pub title: Option<String>,
    pub year_released: Option<Value>,
    pub seasons: Option<Value>,
    pub episodes: Option<Value>,
    pub description: Option<String>,
    #[serde(default)]
    pub genres: Vec<Value>,
}

/// Validated media fields, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaInput {
    pub title: String,
    pub year_released: Option<i32>,
    pub seasons: Option<i32>,
    pub episodes: Option<i32>,
    pub description: Option<String>,
    /// Sorted and deduplicated; existence is checked by the service.
    pub genre_ids: Vec<i32>,
}

impl MediaForm {
    /// Checks every field for `kind` and stops at the first bad one.
    pub fn validate(&self, kind: MediaKind) -> Result<MediaInput, FieldError> {
        let title = self.title.as_deref().map(str::trim).unwrap_or_default();
        if title.is_empty() {
            return Err(FieldError::new("title", "This field is required."));
        }
        let title_len = title.chars().count();
        if title_len > TITLE_MAX_LEN {
            return Err(FieldError::new(
                "title",
                format!(
                    "Ensure this value has at most {TITLE_MAX_LEN} characters (it has {title_len})."
                ),
            ));
        }

        let year_released = optional_integer("year_released", self.year_released.as_ref())?;

        let (seasons, episodes) = if kind.descriptor().has_episodes {
            (
                non_negative("seasons", self.seasons.as_ref())?,
                non_negative("episodes", self.episodes.as_ref())?,
            )
        } else {
            reject_for_movies("seasons", self.seasons.as_ref())?;
            reject_for_movies("episodes", self.episodes.as_ref())?;
            (None, None)
        };

        let mut genre_ids = self
            .genres
            .iter()
            .map(genre_id)
            .collect::<Result<Vec<_>, _>>()?;
        genre_ids.sort_unstable();
        genre_ids.dedup();

        Ok(MediaInput {
            title: title.to_string(),
            year_released,
            seasons,
            episodes,
            description: optional_text(self.description.as_deref()),
            genre_ids,
        })
    }
}

fn non_negative(field: &str, value: Option<&Value>) -> Result<Option<i32>, FieldError> {
    match optional_integer(field, value)? {
        Some(v) if v < 0 => Err(FieldError::new(
            field,
            "Ensure this value is greater than or equal to 0.",
        )),
        other => Ok(other),
    }
}

fn reject_for_movies(field: &str, value: Option<&Value>) -> Result<(), FieldError> {
    let supplied = match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    };
    if supplied {
        return Err(FieldError::new(field, "Movies do not have this field."));
    }
    Ok(())
}

pub(crate) fn genre_id(value: &Value) -> Result<i32, FieldError> {
    let parsed = match value {
        Value::Number(n) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
        Value::String(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    };
    parsed.filter(|id| *id > 0).ok_or_else(|| {
        FieldError::new(
            "genres",
            format!("Select a valid choice. {value} is not one of the available choices."),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form(value: Value) -> MediaForm {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn title_is_required() {
        let err = form(json!({ "title": "   " }))
            .validate(MediaKind::Movie)
            .unwrap_err();
        assert_eq!(err.field, "title");
        assert_eq!(err.message, "This field is required.");

        let err = form(json!({})).validate(MediaKind::Anime).unwrap_err();
        assert_eq!(err.field, "title");
    }

    #[test]
    fn title_length_is_capped() {
        let ok = form(json!({ "title": "x".repeat(255) }));
        assert!(ok.validate(MediaKind::Series).is_ok());

        let err = form(json!({ "title": "x".repeat(256) }))
            .validate(MediaKind::Series)
            .unwrap_err();
        assert_eq!(err.field, "title");
    }

    #[test]
    fn movies_refuse_episode_counts() {
        let err = form(json!({ "title": "Heat", "seasons": 2 }))
            .validate(MediaKind::Movie)
            .unwrap_err();
        assert_eq!(err.field, "seasons");

        let ok = form(json!({ "title": "Heat", "seasons": "", "episodes": null }))
            .validate(MediaKind::Movie)
            .unwrap();
        assert_eq!(ok.seasons, None);
    }

    #[test]
    fn episode_counts_must_not_be_negative() {
        let err = form(json!({ "title": "Bleach", "episodes": -1 }))
            .validate(MediaKind::Anime)
            .unwrap_err();
        assert_eq!(err.field, "episodes");

        let ok = form(json!({ "title": "Bleach", "seasons": "16", "episodes": 366 }))
            .validate(MediaKind::Anime)
            .unwrap();
        assert_eq!((ok.seasons, ok.episodes), (Some(16), Some(366)));
    }

    #[test]
    fn genres_are_deduplicated_and_checked() {
        let ok = form(json!({ "title": "Up", "genres": [3, "1", 3] }))
            .validate(MediaKind::Cartoon)
            .unwrap();
        assert_eq!(ok.genre_ids, vec![1, 3]);

        let err = form(json!({ "title": "Up", "genres": ["abc"] }))
            .validate(MediaKind::Cartoon)
            .unwrap_err();
        assert_eq!(err.field, "genres");
    }

    #[test]
    fn blank_description_is_dropped() {
        let ok = form(json!({ "title": " Up ", "description": "  " }))
            .validate(MediaKind::Movie)
            .unwrap();
        assert_eq!(ok.title, "Up");
        assert_eq!(ok.description, None);
    }
}
