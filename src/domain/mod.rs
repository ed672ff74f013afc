//! Domain types for the media catalog with strong typing.
//!
//! Everything in here is pure: no database handles, no HTTP types. The
//! repositories and services translate between these and their storage or
//! wire representations.

pub mod media_kind;
pub mod rating;
pub mod status;

pub use media_kind::{KindDescriptor, MediaKind, OrderField};
pub use rating::{Rating, RatingError};
pub use status::WatchStatus;

use serde::Serialize;
use std::fmt;

/// Identifier of a media item within its kind's table.
///
/// Ids are only unique per kind, so a `MediaId` is always paired with a
/// [`MediaKind`] when it crosses a service boundary.
///
/// # Examples
///
/// ```rust
/// use mediashelf::domain::MediaId;
///
/// let id = MediaId::new(7);
/// assert_eq!(id.value(), 7);
/// assert_eq!(id.to_string(), "7");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct MediaId(i32);

impl MediaId {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for MediaId {
    fn from(id: i32) -> Self {
        Self::new(id)
    }
}

impl From<MediaId> for i32 {
    fn from(id: MediaId) -> Self {
        id.0
    }
}

/// A validation failure bound to a single input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for FieldError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_id_round_trips_through_i32() {
        let id = MediaId::from(12);
        assert_eq!(i32::from(id), 12);
        assert_eq!(serde_json::to_string(&id).unwrap(), "12");
    }

    #[test]
    fn field_error_display_names_the_field() {
        let err = FieldError::new("rate", "Rate must be between 0 and 5");
        assert_eq!(err.to_string(), "rate: Rate must be between 0 and 5");
    }
}
