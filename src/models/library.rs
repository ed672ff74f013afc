use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::forms::{optional_decimal, optional_text};
use crate::domain::{FieldError, MediaId, MediaKind, Rating, WatchStatus};

/// One media item as it sits in a user's library.
#[derive(Debug, Clone, Serialize)]
pub struct LibraryEntry {
    pub media_id: MediaId,
    pub kind: MediaKind,
    pub title: String,
    pub year_released: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seasons: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episodes: Option<i32>,
    pub rate: Option<f64>,
    pub status: WatchStatus,
    pub comment: Option<String>,
}

/// Raw rate/status/comment payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkForm {
    pub rate: Option<Value>,
    pub status: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkUpdate {
    pub rate: Option<Rating>,
    pub status: WatchStatus,
    pub comment: Option<String>,
}

impl LinkForm {
    pub fn validate(&self) -> Result<LinkUpdate, FieldError> {
        let rate = optional_decimal("rate", self.rate.as_ref())?
            .map(Rating::new)
            .transpose()
            .map_err(|e| FieldError::new("rate", e.to_string()))?;

        let raw_status = self.status.as_deref().map(str::trim).unwrap_or_default();
        if raw_status.is_empty() {
            return Err(FieldError::new("status", "This field is required."));
        }
        let status = raw_status
            .parse::<WatchStatus>()
            .map_err(|e| FieldError::new("status", e.to_string()))?;

        Ok(LinkUpdate {
            rate,
            status,
            comment: optional_text(self.comment.as_deref()),
        })
    }
}

/// Library sizes per kind for one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LibrarySummary {
    pub movies: u64,
    pub anime: u64,
    pub series: u64,
    pub cartoons: u64,
}

impl LibrarySummary {
    pub fn set(&mut self, kind: MediaKind, count: u64) {
        match kind {
            MediaKind::Movie => self.movies = count,
            MediaKind::Anime => self.anime = count,
            MediaKind::Series => self.series = count,
            MediaKind::Cartoon => self.cartoons = count,
        }
    }

    #[must_use]
    pub const fn total(&self) -> u64 {
        self.movies + self.anime + self.series + self.cartoons
    }
}

/// Membership state after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToggleOutcome {
    pub kind: MediaKind,
    pub media_id: MediaId,
    pub in_library: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form(value: Value) -> LinkForm {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn rate_outside_range_is_a_field_error() {
        for bad in [json!(5.5), json!("-1"), json!(10)] {
            let err = form(json!({ "rate": bad, "status": "watching" }))
                .validate()
                .unwrap_err();
            assert_eq!(err.field, "rate");
            assert_eq!(err.message, "Rate must be between 0 and 5");
        }
    }

    #[test]
    fn rate_may_be_blank() {
        let update = form(json!({ "rate": "", "status": "finished" }))
            .validate()
            .unwrap();
        assert_eq!(update.rate, None);
        assert_eq!(update.status, WatchStatus::Finished);
    }

    #[test]
    fn status_accepts_legacy_codes() {
        let update = form(json!({ "rate": 4.5, "status": "3", "comment": " meh " }))
            .validate()
            .unwrap();
        assert_eq!(update.status, WatchStatus::Dropped);
        assert_eq!(update.rate.map(Rating::value), Some(4.5));
        assert_eq!(update.comment.as_deref(), Some("meh"));
    }

    #[test]
    fn status_is_required_and_checked() {
        let err = form(json!({ "rate": 1 })).validate().unwrap_err();
        assert_eq!(err.field, "status");

        let err = form(json!({ "status": "paused" })).validate().unwrap_err();
        assert_eq!(err.field, "status");
    }

    #[test]
    fn summary_totals_every_kind() {
        let mut summary = LibrarySummary::default();
        summary.set(MediaKind::Movie, 2);
        summary.set(MediaKind::Cartoon, 3);
        assert_eq!(summary.total(), 5);
    }
}
