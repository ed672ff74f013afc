//! Request logging, Prometheus metrics and response hardening.
//!
//! Every request gets a span carrying a request id and its route template;
//! the auth middleware fills in `user_id`. Metrics are labelled with the
//! route template and, for catalog and library routes, the media kind.

use axum::{
    extract::{MatchedPath, Request, State},
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::api::{ApiError, AppState};
use crate::domain::MediaKind;

pub const REQUESTS_TOTAL: &str = "mediashelf_http_requests_total";
pub const REQUEST_DURATION: &str = "mediashelf_http_request_duration_seconds";

const KIND_SEGMENT: &str = "{kind}";

/// GET /metrics
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let handle = state
        .prometheus_handle
        .as_ref()
        .ok_or_else(|| ApiError::NotFound("Metrics are disabled".to_string()))?;

    Ok(handle.render().into_response())
}

pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id = Uuid::new_v4();

    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string());
    let kind = route
        .as_deref()
        .and_then(|template| route_kind(template, &path))
        .map_or("none", MediaKind::slug);

    let span = info_span!(
        "request",
        %request_id,
        %method,
        %path,
        route = route.as_deref(),
        kind,
        user_id = tracing::field::Empty,
    );

    async move {
        let response = next.run(req).await;
        let status = response.status();
        let elapsed = start.elapsed();

        // Unmatched paths share one label.
        let route_label = route.unwrap_or_else(|| "unmatched".to_string());
        let labels = [
            ("method", method),
            ("route", route_label),
            ("kind", kind.to_string()),
            ("status", status_class(status).to_string()),
        ];
        metrics::counter!(REQUESTS_TOTAL, &labels).increment(1);
        metrics::histogram!(REQUEST_DURATION, &labels).record(elapsed.as_secs_f64());

        info!(
            status = status.as_u16(),
            duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "Request finished"
        );

        response
    }
    .instrument(span)
    .await
}

/// The media kind named by the `{kind}` segment of `route`, read from the
/// same position in `path`.
fn route_kind(route: &str, path: &str) -> Option<MediaKind> {
    route
        .split('/')
        .zip(path.split('/'))
        .find(|(template, _)| *template == KIND_SEGMENT)
        .and_then(|(_, segment)| MediaKind::from_slug(segment))
}

const fn status_class(status: StatusCode) -> &'static str {
    match status.as_u16() {
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        _ => "5xx",
    }
}

const SECURITY_HEADERS: [(&str, &str); 4] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
    ("content-security-policy", "default-src 'none'; frame-ancestors 'none'"),
];

/// Responses are JSON or redirects only, so nothing may be framed or loaded.
pub async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    for (name, value) in SECURITY_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_label_comes_from_the_kind_segment() {
        assert_eq!(
            route_kind("/api/media/{kind}/{id}", "/api/media/movie/4"),
            Some(MediaKind::Movie)
        );
        assert_eq!(
            route_kind("/api/library/{kind}", "/api/library/cartoons"),
            Some(MediaKind::Cartoon)
        );
        assert_eq!(route_kind("/api/genres", "/api/genres"), None);
        assert_eq!(route_kind("/api/media/{kind}", "/api/media/books"), None);
    }

    #[test]
    fn statuses_collapse_to_classes() {
        assert_eq!(status_class(StatusCode::CREATED), "2xx");
        assert_eq!(status_class(StatusCode::SEE_OTHER), "3xx");
        assert_eq!(status_class(StatusCode::NOT_FOUND), "4xx");
        assert_eq!(status_class(StatusCode::INTERNAL_SERVER_ERROR), "5xx");
    }
}
