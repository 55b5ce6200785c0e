/// Common test utilities for integration tests
///
/// Builds the full router over an in-memory store, so these tests need no
/// database, and provides small request/response helpers.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use usercrud_api::app::{build_router, AppState};
use usercrud_api::config::Config;
use usercrud_shared::service::UserService;
use usercrud_shared::store::memory::InMemoryUserStore;

/// Test context holding the router and the store behind it
pub struct TestContext {
    pub app: Router,
    pub store: Arc<InMemoryUserStore>,
}

impl TestContext {
    /// Creates a router over a fresh, empty store
    pub fn new() -> Self {
        let config = Config::from_lookup(|key| match key {
            "USER_STORE" => Some("memory".to_string()),
            _ => None,
        })
        .expect("memory config should load");

        let store = Arc::new(InMemoryUserStore::new());
        let state = AppState::new(UserService::new(store.clone()), config);

        TestContext {
            app: build_router(state),
            store,
        }
    }

    /// Sends a request and returns status plus parsed JSON body
    ///
    /// The body is `Value::Null` when the response has no content.
    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        self.send_request(request).await
    }

    /// Sends a prebuilt request
    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!("non-JSON body: {}", String::from_utf8_lossy(&bytes))
            })
        };

        (status, json)
    }

    /// Creates a user through the API and returns its ID
    pub async fn create_user(&self, email: &str, first_name: &str, last_name: &str) -> i64 {
        let (status, body) = self
            .send(
                "POST",
                "/users",
                Some(serde_json::json!({
                    "email": email,
                    "firstName": first_name,
                    "lastName": last_name,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
        body["id"].as_i64().unwrap()
    }
}
