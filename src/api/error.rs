use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::domain::FieldError;
use crate::services::{AuthError, CatalogError, LibraryError};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    DatabaseError(String),

    ValidationError(String),

    InvalidField { field: String, message: String },

    Conflict(String),

    InternalError(String),

    Unauthorized(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::InvalidField { field, message } => {
                write!(f, "Validation error on {}: {}", field, message)
            }
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::InvalidField { field, message } = self {
            let body = ApiResponse::<()>::field_error(field, message);
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }

        let (status, error_message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::InvalidField { message, .. } => (StatusCode::BAD_REQUEST, message.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
        };

        let body = ApiResponse::<()>::error(error_message);
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<FieldError> for ApiError {
    fn from(err: FieldError) -> Self {
        ApiError::InvalidField {
            field: err.field,
            message: err.message,
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound { .. } | CatalogError::Page(_) => {
                ApiError::NotFound(err.to_string())
            }
            CatalogError::Validation(field) => field.into(),
            CatalogError::Conflict(msg) => ApiError::Conflict(msg),
            CatalogError::Database(msg) => ApiError::DatabaseError(msg),
        }
    }
}

impl From<LibraryError> for ApiError {
    fn from(err: LibraryError) -> Self {
        match err {
            LibraryError::MediaNotFound { .. }
            | LibraryError::EntryNotFound { .. }
            | LibraryError::Page(_) => ApiError::NotFound(err.to_string()),
            LibraryError::Validation(field) => field.into(),
            LibraryError::Database(msg) => ApiError::DatabaseError(msg),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            AuthError::UserNotFound => ApiError::NotFound(err.to_string()),
            AuthError::Validation(field) => field.into(),
            AuthError::Conflict(msg) => ApiError::Conflict(msg),
            AuthError::Database(msg) => ApiError::DatabaseError(msg),
            AuthError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl ApiError {
    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        ApiError::NotFound(format!("{} {} not found", resource, id))
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::InternalError(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MediaKind;
    use crate::filters::PageError;

    #[test]
    fn field_errors_become_bad_requests() {
        let response = ApiError::from(FieldError::new("rate", "Rate must be between 0 and 5"))
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_pages_and_items_are_not_found() {
        let page = ApiError::from(CatalogError::Page(PageError::OutOfRange(9)));
        assert_eq!(page.into_response().status(), StatusCode::NOT_FOUND);

        let item = ApiError::from(LibraryError::MediaNotFound {
            kind: MediaKind::Anime,
            id: 4,
        });
        assert_eq!(item.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn database_errors_hide_details() {
        let response = ApiError::from(CatalogError::Database("disk I/O".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
