//! Common test utilities for integration tests
//!
//! Builds the full router over in-memory stores and offers helpers to
//! drive it with JSON requests:
//! - `TestContext::new()`: fresh app with empty storage
//! - `TestContext::send()`: one request, decoded JSON response
//! - `TestContext::register()`: sign up and return a bearer token
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use taskdeck_api::app::{build_router, AppState};
use taskdeck_api::config::Config;
use taskdeck_shared::store::memory::{MemoryIdentityStore, MemoryTaskStore};
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret-32-bytes-min";

/// Header the tests configure as the trusted gateway subject header
pub const SUBJECT_HEADER: &str = "x-auth-subject";

/// Test context containing the router
pub struct TestContext {
    pub app: axum::Router,
}

impl TestContext {
    pub fn new() -> Self {
        let vars: HashMap<&str, &str> = [
            ("JWT_SECRET", TEST_SECRET),
            ("AUTH_SUBJECT_HEADER", SUBJECT_HEADER),
            ("CORS_ORIGINS", "*"),
        ]
        .into_iter()
        .collect();
        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
            .expect("test config");

        let state = AppState::new(
            Arc::new(MemoryIdentityStore::new()),
            Arc::new(MemoryTaskStore::new()),
            config,
        );

        Self {
            app: build_router(state),
        }
    }

    /// Sends one request and decodes the JSON body (`Null` when empty)
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let body = match body {
            Some(body) => {
                builder = builder.header("content-type", "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };

        self.dispatch(builder.body(body).unwrap()).await
    }

    pub async fn dispatch(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }

    /// Registers an identity and returns its session token
    pub async fn register(&self, name: &str, email: &str) -> String {
        let (status, body) = self
            .send(
                "POST",
                "/v1/auth/register",
                None,
                Some(json!({ "name": name, "email": email, "password": "secret1" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    /// Creates a task and returns its JSON
    pub async fn create_task(&self, token: &str, title: &str) -> Value {
        let (status, body) = self
            .send("POST", "/v1/tasks", Some(token), Some(json!({ "title": title })))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
        body
    }

    /// Runs a GraphQL document, optionally as a bearer
    pub async fn graphql(&self, token: Option<&str>, query: &str, variables: Value) -> Value {
        let (status, body) = self
            .send(
                "POST",
                "/graphql",
                token,
                Some(json!({ "query": query, "variables": variables })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body
    }
}
