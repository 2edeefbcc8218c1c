//! Integration tests for Cartwheel.
//!
//! The whole API router runs in-process against a fresh in-memory `SQLite`
//! database, so `cargo test` needs no running server and no external
//! database.
//!
//! # Test Categories
//!
//! - `products` - Listing, filtering, ordering, detail, mutation
//! - `search` - Substring search and rate limiting
//! - `reviews` - Review creation invariants and mutation permissions
//! - `relations` - Like/Favorite/Cart toggle semantics and listings

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::num::NonZeroU32;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::Value;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tower::ServiceExt;

use cartwheel_api::config::CatalogConfig;
use cartwheel_api::state::AppState;

/// A seeded user with its API token.
pub struct SeededUser {
    pub id: i64,
    pub token: String,
}

/// Status and decoded JSON body of a test request.
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// In-process test harness: the app router plus direct pool access for
/// seeding and storage-level assertions.
pub struct TestContext {
    router: Router,
    pub pool: SqlitePool,
}

impl TestContext {
    /// Build a context with the default (generous) search rate limit.
    pub async fn new() -> Self {
        Self::with_search_rate_limit(600).await
    }

    /// Build a context with a specific search budget per minute.
    ///
    /// # Panics
    ///
    /// Panics when the database cannot be set up; tests have no way to
    /// proceed without one.
    pub async fn with_search_rate_limit(per_minute: u32) -> Self {
        let options = "sqlite::memory:"
            .parse::<SqliteConnectOptions>()
            .expect("valid connection string")
            .foreign_keys(true);

        // One connection so every query sees the same in-memory database,
        // and no reaping so it survives for the context's lifetime.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .expect("connect to in-memory sqlite");

        cartwheel_api::db::MIGRATOR
            .run(&pool)
            .await
            .expect("run migrations");

        let config = CatalogConfig {
            database_url: SecretString::from("sqlite::memory:"),
            host: "127.0.0.1".parse().expect("valid host"),
            port: 0,
            search_rate_limit: NonZeroU32::new(per_minute).expect("nonzero rate limit"),
            sentry_dsn: None,
        };

        let state = AppState::new(config, pool.clone());

        Self {
            router: cartwheel_api::app(state),
            pool,
        }
    }

    /// Insert a user and an API token for them.
    pub async fn seed_user(&self, first_name: &str, last_name: &str, is_staff: bool) -> SeededUser {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO user (first_name, last_name, is_staff) VALUES (?1, ?2, ?3) RETURNING id",
        )
        .bind(first_name)
        .bind(last_name)
        .bind(is_staff)
        .fetch_one(&self.pool)
        .await
        .expect("seed user");

        let token = format!("tok-{id}");
        sqlx::query("INSERT INTO api_token (token, user_id) VALUES (?1, ?2)")
            .bind(&token)
            .bind(id)
            .execute(&self.pool)
            .await
            .expect("seed token");

        SeededUser { id, token }
    }

    /// Insert a product and return its id.
    pub async fn seed_product(
        &self,
        title: &str,
        description: &str,
        price_cents: i64,
        category: &str,
    ) -> i64 {
        sqlx::query_scalar(
            "INSERT INTO product (title, description, price_cents, category) \
             VALUES (?1, ?2, ?3, ?4) RETURNING id",
        )
        .bind(title)
        .bind(description)
        .bind(price_cents)
        .bind(category)
        .fetch_one(&self.pool)
        .await
        .expect("seed product")
    }

    /// Count rows in a table, for storage-level assertions.
    pub async fn row_count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.pool)
            .await
            .expect("count rows")
    }

    /// `GET` without authentication.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None, None, &[]).await
    }

    /// `GET` with a bearer token.
    pub async fn get_auth(&self, path: &str, token: &str) -> TestResponse {
        self.request("GET", path, Some(token), None, &[]).await
    }

    /// `POST` with optional token and JSON body.
    pub async fn post(&self, path: &str, token: Option<&str>, body: Option<Value>) -> TestResponse {
        self.request("POST", path, token, body, &[]).await
    }

    /// `PUT` with a token and JSON body.
    pub async fn put(&self, path: &str, token: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(token), Some(body), &[]).await
    }

    /// `PATCH` with a token and JSON body.
    pub async fn patch(&self, path: &str, token: &str, body: Value) -> TestResponse {
        self.request("PATCH", path, Some(token), Some(body), &[])
            .await
    }

    /// `DELETE` with optional token.
    pub async fn delete(&self, path: &str, token: Option<&str>) -> TestResponse {
        self.request("DELETE", path, token, None, &[]).await
    }

    /// Fully general request; `headers` are extra (name, value) pairs.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let request = builder.body(body).expect("build request");
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("route request");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}
