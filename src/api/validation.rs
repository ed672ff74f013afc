use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

use super::ApiError;
use crate::domain::MediaKind;

/// Resolves the `{kind}` route segment. Unknown kinds are a missing resource.
pub fn parse_kind(raw: &str) -> Result<MediaKind, ApiError> {
    MediaKind::from_slug(raw)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown media kind: {raw}")))
}

/// Ids start at 1, so anything lower cannot name an item.
pub fn validate_media_id(kind: MediaKind, id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::not_found(&kind.to_string(), id));
    }
    Ok(id)
}

/// The `{kind}/{id}` segments of an item route.
///
/// An unknown kind or an id that is not a positive integer names no item,
/// so both reject with a 404 in the usual envelope.
#[derive(Debug, Clone, Copy)]
pub struct MediaPath {
    pub kind: MediaKind,
    pub id: i32,
}

impl MediaPath {
    fn parse(kind: &str, id: &str) -> Result<Self, ApiError> {
        let kind = parse_kind(kind)?;
        let id = id
            .parse::<i32>()
            .map_err(|_| ApiError::not_found(&kind.to_string(), id))?;
        let id = validate_media_id(kind, id)?;
        Ok(Self { kind, id })
    }
}

impl<S> FromRequestParts<S> for MediaPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path((kind, id)) = Path::<(String, String)>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::NotFound(e.body_text()))?;

        Self::parse(&kind, &id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_kinds_resolve() {
        assert!(matches!(parse_kind("anime"), Ok(MediaKind::Anime)));
        assert!(matches!(parse_kind("movies"), Ok(MediaKind::Movie)));
        assert!(matches!(parse_kind("cartoon"), Ok(MediaKind::Cartoon)));
    }

    #[test]
    fn unknown_kind_is_not_found() {
        assert!(matches!(parse_kind("books"), Err(ApiError::NotFound(_))));
        assert!(matches!(parse_kind("Anime"), Err(ApiError::NotFound(_))));
    }

    #[test]
    fn non_positive_ids_are_not_found() {
        assert!(validate_media_id(MediaKind::Series, 1).is_ok());
        assert!(matches!(
            validate_media_id(MediaKind::Series, 0),
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            validate_media_id(MediaKind::Series, -3),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn media_path_rejects_non_numeric_ids() {
        let path = MediaPath::parse("anime", "12").unwrap();
        assert!(matches!(path.kind, MediaKind::Anime));
        assert_eq!(path.id, 12);

        for id in ["abc", "1.5", "", "99999999999"] {
            assert!(
                matches!(MediaPath::parse("anime", id), Err(ApiError::NotFound(_))),
                "{id:?}"
            );
        }
        assert!(matches!(
            MediaPath::parse("books", "1"),
            Err(ApiError::NotFound(_))
        ));
    }
}
