#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use mediashelf::config::{Config, SecurityConfig};
use serde_json::{Value, json};
use std::path::PathBuf;
use tower::ServiceExt;

/// A router backed by its own SQLite file, removed on drop.
pub struct TestApp {
    pub router: Router,
    db_path: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_path);
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// Titles of `data.items`, in response order.
    pub fn titles(&self) -> Vec<String> {
        self.body["data"]["items"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item["title"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

pub fn test_config(db_path: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.server.secure_cookies = false;
    config.observability.metrics_enabled = false;
    config.security = SecurityConfig {
        argon2_memory_cost_kib: 8,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
    };
    config
}

pub fn temp_db_path() -> PathBuf {
    std::env::temp_dir().join(format!("mediashelf-test-{}.db", uuid::Uuid::new_v4()))
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

pub async fn spawn_app_with(configure: impl FnOnce(&mut Config)) -> TestApp {
    let db_path = temp_db_path();
    let mut config = test_config(&db_path);
    configure(&mut config);

    let state = mediashelf::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    let router = mediashelf::api::router(state).await;

    TestApp { router, db_path }
}

impl TestApp {
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        api_key: Option<&str>,
        body: Option<Value>,
        extra_headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(key) = api_key {
            builder = builder.header("X-Api-Key", key);
        }
        for (name, value) in extra_headers {
            builder = builder.header(*name, *value);
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, api_key: &str) -> TestResponse {
        self.send(Method::GET, uri, Some(api_key), None, &[]).await
    }

    pub async fn post(&self, uri: &str, api_key: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Some(api_key), Some(body), &[])
            .await
    }

    pub async fn put(&self, uri: &str, api_key: &str, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, Some(api_key), Some(body), &[])
            .await
    }

    pub async fn delete(&self, uri: &str, api_key: &str) -> TestResponse {
        self.send(Method::DELETE, uri, Some(api_key), None, &[])
            .await
    }

    /// Registers `username` and returns its API key.
    pub async fn register(&self, username: &str) -> String {
        let response = self
            .send(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({
                    "username": username,
                    "password": "correct horse",
                    "password_confirm": "correct horse",
                })),
                &[],
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.data()["api_key"].as_str().unwrap().to_string()
    }

    pub async fn create_genre(&self, api_key: &str, name: &str) -> i64 {
        let response = self
            .post("/api/genres", api_key, json!({ "name": name }))
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.data()["id"].as_i64().unwrap()
    }

    pub async fn create_media(&self, api_key: &str, kind: &str, body: Value) -> i64 {
        let response = self
            .post(&format!("/api/media/{kind}"), api_key, body)
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.data()["id"].as_i64().unwrap()
    }

    pub async fn toggle(&self, api_key: &str, kind: &str, id: i64) -> TestResponse {
        self.send(
            Method::POST,
            &format!("/api/media/{kind}/{id}/toggle"),
            Some(api_key),
            None,
            &[],
        )
        .await
    }
}

/// The `name=value` part of the session cookie set on `response`.
pub fn session_cookie(response: &TestResponse) -> String {
    response
        .headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .expect("response sets a session cookie")
        .to_string()
}
